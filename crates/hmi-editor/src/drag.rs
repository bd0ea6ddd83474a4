//! Drag/resize controller.
//!
//! ```text
//! Idle ──pointer down on body/handle──▶ Dragging ──pointer up──▶ Idle
//!                                         │
//!                                         └──cancel──▶ Idle (position restored)
//! ```
//!
//! While dragging, every pointer move is turned into a per-axis
//! [`adjust_anchored_layout`] call and previewed on the container. Nothing
//! is committed until release, when the gesture yields a [`MovePayload`]
//! for the undo queue.

use crate::edits::MovePayload;
use crate::hit::DragTarget;
use crate::positioning::PositioningEngine;
use bitflags::bitflags;
use hmi_core::anchor::boundary_snapshots;
use hmi_core::{AdjustmentMode, AnchoredBoundary, ControlId, Point, Size, adjust_anchored_layout};

bitflags! {
    /// Edges a drag moves. A body drag moves all four.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DragAnchor: u8 {
        const WEST  = 0b0001;
        const EAST  = 0b0010;
        const NORTH = 0b0100;
        const SOUTH = 0b1000;
        const ALL   = Self::WEST.bits() | Self::EAST.bits() | Self::NORTH.bits() | Self::SOUTH.bits();
    }
}

impl DragAnchor {
    /// Adjustment for the horizontal axis: west is the start edge.
    pub fn horizontal(self) -> AdjustmentMode {
        axis_adjustment(self, DragAnchor::WEST, DragAnchor::EAST)
    }

    /// Adjustment for the vertical axis: north is the start edge.
    pub fn vertical(self) -> AdjustmentMode {
        axis_adjustment(self, DragAnchor::NORTH, DragAnchor::SOUTH)
    }
}

fn axis_adjustment(anchor: DragAnchor, start: DragAnchor, end: DragAnchor) -> AdjustmentMode {
    let mut mode = AdjustmentMode::NONE;
    if anchor.contains(start) {
        mode |= AdjustmentMode::START;
    }
    if anchor.contains(end) {
        mode |= AdjustmentMode::END;
    }
    mode
}

#[derive(Debug, Clone)]
struct DragGesture {
    control_id: ControlId,
    size_change: DragAnchor,
    original_position: AnchoredBoundary,
    parent: Size,
    last_point: Point,
    last_updated_boundary: Option<AnchoredBoundary>,
}

/// Pointer-driven move/resize of one control.
#[derive(Debug, Default)]
pub struct DragController {
    gesture: Option<DragGesture>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// While `true` the host must route window-level pointer moves and
    /// releases here, even when the pointer leaves the control.
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn active_control(&self) -> Option<ControlId> {
        self.gesture.as_ref().map(|g| g.control_id)
    }

    /// Boundary currently shown for the dragged control.
    pub fn current_boundary(&self) -> Option<AnchoredBoundary> {
        self.gesture
            .as_ref()
            .map(|g| g.last_updated_boundary.unwrap_or(g.original_position))
    }

    /// Start a gesture on `target` at `point`.
    pub fn begin(&mut self, target: DragTarget, engine: &PositioningEngine, point: Point) {
        if let Some(stale) = &self.gesture {
            log::debug!("drag on {} replaced before release", stale.control_id);
        }
        log::debug!("drag begin {} {:?}", target.control, target.anchor);
        self.gesture = Some(DragGesture {
            control_id: target.control,
            size_change: target.anchor,
            original_position: engine.boundary(),
            parent: engine.parent_size(),
            last_point: point,
            last_updated_boundary: None,
        });
    }

    /// Track a pointer move. Returns `true` if a new boundary was previewed.
    ///
    /// Moves below `jitter_threshold` on both axes are dropped, but the
    /// reference point still advances, so they are lost rather than deferred.
    pub fn pointer_move(
        &mut self,
        point: Point,
        engine: &mut PositioningEngine,
        grid_snap: f64,
        jitter_threshold: f64,
    ) -> bool {
        let Some(gesture) = &mut self.gesture else {
            return false;
        };
        let diff = point - gesture.last_point;
        gesture.last_point = point;
        if diff.x.abs() < jitter_threshold && diff.y.abs() < jitter_threshold {
            return false;
        }

        let current = gesture
            .last_updated_boundary
            .unwrap_or(gesture.original_position);
        let (h, v) = boundary_snapshots(&current, gesture.parent);
        let h = adjust_anchored_layout(&h, gesture.size_change.horizontal(), diff.x, grid_snap);
        let v = adjust_anchored_layout(&v, gesture.size_change.vertical(), diff.y, grid_snap);
        let next = AnchoredBoundary {
            left: h.start,
            top: v.start,
            right: h.end,
            bottom: v.end,
        };
        if next == current {
            return false;
        }
        engine.preview_boundary(&next);
        gesture.last_updated_boundary = Some(next);
        true
    }

    /// Finish the gesture. Returns the move to execute through the undo
    /// queue, or `None` when the control ended where it started.
    pub fn end(&mut self, engine: &mut PositioningEngine) -> Option<MovePayload> {
        let gesture = self.gesture.take()?;
        let ending = gesture.last_updated_boundary?;
        if ending == gesture.original_position {
            log::debug!("drag on {} ended without net movement", gesture.control_id);
            engine.commit_boundary(&gesture.original_position);
            return None;
        }
        log::debug!("drag end {} -> {ending:?}", gesture.control_id);
        Some(MovePayload {
            control_id: gesture.control_id,
            starting_position: gesture.original_position,
            ending_position: ending,
            can_merge: false,
        })
    }

    /// Abandon the gesture and put the control back where it started.
    /// Returns `false` if no gesture was active.
    pub fn cancel(&mut self, engine: &mut PositioningEngine) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        log::debug!("drag on {} cancelled", gesture.control_id);
        engine.commit_boundary(&gesture.original_position);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{HeadlessContainer, LayoutContainer};
    use hmi_core::StoredPositionInfo;
    use pretty_assertions::assert_eq;

    const PARENT: Size = Size::new(400.0, 300.0);

    fn setup() -> (PositioningEngine, HeadlessContainer, ControlId) {
        let id = ControlId::intern("slider");
        let container = HeadlessContainer::new(PARENT);
        let mut engine = PositioningEngine::new(id, PARENT);
        engine.attach(Box::new(container.clone()));
        engine.update(&StoredPositionInfo::from_rect(40.0, 20.0, 100.0, 50.0));
        (engine, container, id)
    }

    fn target(control: ControlId, anchor: DragAnchor) -> DragTarget {
        DragTarget { control, anchor }
    }

    #[test]
    fn anchor_maps_to_axis_adjustments() {
        assert_eq!(DragAnchor::ALL.horizontal(), AdjustmentMode::BOTH);
        assert_eq!(DragAnchor::ALL.vertical(), AdjustmentMode::BOTH);
        assert_eq!(DragAnchor::WEST.horizontal(), AdjustmentMode::START);
        assert_eq!(DragAnchor::WEST.vertical(), AdjustmentMode::NONE);
        let se = DragAnchor::SOUTH | DragAnchor::EAST;
        assert_eq!(se.horizontal(), AdjustmentMode::END);
        assert_eq!(se.vertical(), AdjustmentMode::END);
    }

    #[test]
    fn body_drag_moves_and_yields_payload() {
        let (mut engine, container, id) = setup();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::ALL), &engine, Point::new(50.0, 30.0));

        assert!(drag.pointer_move(Point::new(60.0, 35.0), &mut engine, 1.0, 1.0));
        let moved = AnchoredBoundary::new(50.0, 25.0, 250.0, 225.0);
        assert_eq!(container.boundary(), moved);
        // Preview only: the model is untouched until the command runs.
        assert_eq!(engine.boundary(), AnchoredBoundary::new(40.0, 20.0, 260.0, 230.0));

        let payload = drag.end(&mut engine).unwrap();
        assert_eq!(payload.control_id, id);
        assert_eq!(
            payload.starting_position,
            AnchoredBoundary::new(40.0, 20.0, 260.0, 230.0)
        );
        assert_eq!(payload.ending_position, moved);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn east_handle_resizes_width_only() {
        let (mut engine, container, id) = setup();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::EAST), &engine, Point::new(140.0, 40.0));
        drag.pointer_move(Point::new(160.0, 70.0), &mut engine, 1.0, 1.0);

        let rect = container.offset_rect();
        assert_eq!(rect.x, 40.0);
        assert_eq!(rect.width, 120.0);
        assert_eq!(rect.height, 50.0);
    }

    #[test]
    fn click_without_movement_yields_nothing() {
        let (mut engine, container, id) = setup();
        let before = engine.bi_axis();
        let writes = container.writes();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::ALL), &engine, Point::new(50.0, 30.0));
        drag.pointer_move(Point::new(50.5, 30.5), &mut engine, 1.0, 1.0);

        assert_eq!(drag.end(&mut engine), None);
        assert_eq!(engine.bi_axis(), before);
        assert_eq!(container.writes(), writes);
    }

    #[test]
    fn returning_to_start_yields_nothing() {
        let (mut engine, _container, id) = setup();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::ALL), &engine, Point::new(50.0, 30.0));
        drag.pointer_move(Point::new(70.0, 30.0), &mut engine, 1.0, 1.0);
        drag.pointer_move(Point::new(50.0, 30.0), &mut engine, 1.0, 1.0);
        assert_eq!(drag.end(&mut engine), None);
    }

    #[test]
    fn sub_pixel_moves_are_lost_not_deferred() {
        let (mut engine, _container, id) = setup();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::ALL), &engine, Point::new(0.0, 0.0));
        for i in 1..=4 {
            let x = i as f64 * 0.5;
            assert!(!drag.pointer_move(Point::new(x, 0.0), &mut engine, 1.0, 1.0));
        }
        // 2px travelled in total, none of it applied.
        assert_eq!(drag.current_boundary(), Some(engine.boundary()));
    }

    #[test]
    fn grid_snap_applies_per_move() {
        let (mut engine, container, id) = setup();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::ALL), &engine, Point::new(0.0, 0.0));
        // 40 + 7 → 50 on a grid of 10; vertical 20 + 2 stays at 20.
        drag.pointer_move(Point::new(7.0, 2.0), &mut engine, 10.0, 1.0);
        assert_eq!(container.offset_rect().x, 50.0);
        assert_eq!(container.offset_rect().y, 20.0);
        assert_eq!(container.offset_rect().width, 100.0);
    }

    #[test]
    fn cancel_restores_original_position() {
        let (mut engine, container, id) = setup();
        let original = engine.boundary();
        let mut drag = DragController::new();
        drag.begin(target(id, DragAnchor::ALL), &engine, Point::new(0.0, 0.0));
        drag.pointer_move(Point::new(30.0, 30.0), &mut engine, 1.0, 1.0);
        assert_ne!(container.boundary(), original);

        assert!(drag.cancel(&mut engine));
        assert_eq!(container.boundary(), original);
        assert_eq!(engine.boundary(), original);
        assert!(!drag.cancel(&mut engine));
    }

    #[test]
    fn moves_outside_a_gesture_are_ignored() {
        let (mut engine, _container, _id) = setup();
        let mut drag = DragController::new();
        assert!(!drag.pointer_move(Point::new(10.0, 10.0), &mut engine, 1.0, 1.0));
        assert_eq!(drag.end(&mut engine), None);
    }
}
