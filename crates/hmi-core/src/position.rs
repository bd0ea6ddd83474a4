//! Legacy position form: optional `{left, right, top, bottom, width, height}`.
//!
//! Older layouts and the mouse-drag code speak this partial-field format.
//! Per axis it carries at most one pair of opposing edges plus an optional
//! size; the provided fields decide the anchor mode:
//!
//! | Fields | Mode |
//! |--------|------|
//! | `left` + `right` | stretch (a width, if present, is ignored) |
//! | `left` + `width` | start |
//! | `right` + `width` | end |

use crate::anchor::{AxisLayout, BiAxisLayout};
use crate::model::Size;
use serde::{Deserialize, Serialize};

/// Size substituted when an axis carries an edge but no size.
pub const FALLBACK_SIZE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredPositionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl StoredPositionInfo {
    /// `left/top/width/height` form.
    pub fn from_rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Convert to the anchor model, pinning whichever edges are present.
    ///
    /// Missing inputs are not fatal: a diagnostic is logged and the axis
    /// falls back to [`FALLBACK_SIZE`] and/or a zero leading offset.
    pub fn to_bi_axis(&self) -> BiAxisLayout {
        BiAxisLayout {
            horizontal: axis_from_fields("horizontal", self.left, self.right, self.width),
            vertical: axis_from_fields("vertical", self.top, self.bottom, self.height),
        }
    }

    /// Legacy form of `layout`. A centered axis needs the parent size to
    /// resolve its offset and comes back as a start-pinned pair.
    pub fn from_bi_axis(layout: &BiAxisLayout, parent: Size) -> Self {
        let (left, right, width) = fields_from_axis(&layout.horizontal, parent.width);
        let (top, bottom, height) = fields_from_axis(&layout.vertical, parent.height);
        Self {
            left,
            right,
            top,
            bottom,
            width,
            height,
        }
    }
}

fn axis_from_fields(
    axis: &str,
    start: Option<f64>,
    end: Option<f64>,
    size: Option<f64>,
) -> AxisLayout {
    match (start, end, size) {
        (Some(start), Some(end), _) => AxisLayout::Stretch { start, end },
        (Some(start), None, Some(size)) => AxisLayout::Start { start, size },
        (None, Some(end), Some(size)) => AxisLayout::End { end, size },
        (Some(start), None, None) => {
            log::warn!("{axis} position has no size, using {FALLBACK_SIZE}");
            AxisLayout::Start {
                start,
                size: FALLBACK_SIZE,
            }
        }
        (None, Some(end), None) => {
            log::warn!("{axis} position has no size, using {FALLBACK_SIZE}");
            AxisLayout::End {
                end,
                size: FALLBACK_SIZE,
            }
        }
        (None, None, Some(size)) => {
            log::warn!("{axis} position has no edge, pinning to start");
            AxisLayout::Start { start: 0.0, size }
        }
        (None, None, None) => {
            log::warn!("{axis} position is empty, using 0 / {FALLBACK_SIZE}");
            AxisLayout::Start {
                start: 0.0,
                size: FALLBACK_SIZE,
            }
        }
    }
}

fn fields_from_axis(layout: &AxisLayout, parent_size: f64) -> (Option<f64>, Option<f64>, Option<f64>) {
    match *layout {
        AxisLayout::Stretch { start, end } => (Some(start), Some(end), None),
        AxisLayout::Start { start, size } => (Some(start), None, Some(size)),
        AxisLayout::End { end, size } => (None, Some(end), Some(size)),
        AxisLayout::Center { .. } => {
            let s = layout.to_snapshot(parent_size);
            (Some(s.start), None, Some(s.size))
        }
    }
}
