//! Hit testing: point → control and resize handle.
//!
//! Walks controls front-to-back (last in z-order first). Only the
//! selected control shows resize handles; everywhere else a hit grabs the
//! control body.

use crate::drag::DragAnchor;
use hmi_core::{ControlId, Point, Rect};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTarget {
    pub control: ControlId,
    pub anchor: DragAnchor,
}

/// Find the topmost control at `p`.
///
/// `controls` is in paint order. Returns `None` on empty canvas.
pub fn hit_test(
    controls: &[(ControlId, Rect)],
    p: Point,
    selected: Option<ControlId>,
    handle_size: f64,
) -> Option<DragTarget> {
    let (control, rect) = controls.iter().rev().find(|(_, r)| r.contains(p))?;
    let anchor = if selected == Some(*control) {
        handle_at(rect, p, handle_size)
    } else {
        DragAnchor::ALL
    };
    Some(DragTarget {
        control: *control,
        anchor,
    })
}

/// Resize handle under `p` inside `rect`, or `ALL` for the interior.
pub fn handle_at(rect: &Rect, p: Point, handle_size: f64) -> DragAnchor {
    // Too small to tell edges apart on an axis: that axis is never a handle.
    let band_x = rect.width > handle_size * 2.0;
    let band_y = rect.height > handle_size * 2.0;

    let mut anchor = DragAnchor::empty();
    if band_x {
        if p.x - rect.x < handle_size {
            anchor |= DragAnchor::WEST;
        } else if rect.right() - p.x <= handle_size {
            anchor |= DragAnchor::EAST;
        }
    }
    if band_y {
        if p.y - rect.y < handle_size {
            anchor |= DragAnchor::NORTH;
        } else if rect.bottom() - p.y <= handle_size {
            anchor |= DragAnchor::SOUTH;
        }
    }
    if anchor.is_empty() {
        DragAnchor::ALL
    } else {
        anchor
    }
}
