//! Designer view-model.
//!
//! Ties the pieces together for a host (the WASM bridge or a native
//! shell): the controls and their positioning engines, the undo queue with
//! the built-in edit handlers, the drag controller and the selection.
//!
//! Every structural change goes through the queue, so everything a user
//! can do on the canvas can be undone.

use crate::commands::{Added, CommandCreator, UndoRedoQueue};
use crate::config::DesignerConfig;
use crate::container::LayoutContainer;
use crate::controls::{ControlSet, DesignerControl};
use crate::drag::DragController;
use crate::edits::{
    AddControlHandler, AddControlPayload, AnchorHandler, AnchorPayload, MergeWindow, MoveHandler,
    MovePayload, PropertyHandler, PropertyPayload, RemoveControlHandler, RemoveControlPayload,
};
use crate::hit::{DragTarget, hit_test};
use crate::input::InputEvent;
use hmi_core::anchor::boundary_snapshots;
use hmi_core::document::RootInfo;
use hmi_core::{
    AdjustmentMode, AnchorMode, AnchoredBoundary, BiAxisLayout, ControlId, LayoutDocument, Point,
    Properties, Result, SerializedControl, adjust_anchored_layout, convert_to_anchor_layout,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One direction of a control's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// The view-model's command creators. There is no global registry:
/// whoever issues edits owns the handlers.
#[derive(Debug)]
struct Creators {
    moves: CommandCreator<MoveHandler>,
    properties: CommandCreator<PropertyHandler>,
    adds: CommandCreator<AddControlHandler>,
    removes: CommandCreator<RemoveControlHandler>,
    anchors: CommandCreator<AnchorHandler>,
}

impl Creators {
    fn new(config: &DesignerConfig) -> Self {
        let window = MergeWindow {
            last_modified_ms: config.merge_window_ms,
            creation_ms: config.session_window_ms,
        };
        Self {
            moves: CommandCreator::new("move", MoveHandler { window }),
            properties: CommandCreator::new("property", PropertyHandler { window }),
            adds: CommandCreator::new("add", AddControlHandler),
            removes: CommandCreator::new("remove", RemoveControlHandler),
            anchors: CommandCreator::new("anchor", AnchorHandler),
        }
    }
}

#[derive(Debug)]
pub struct Designer {
    config: DesignerConfig,
    root: RootInfo,
    controls: ControlSet,
    queue: UndoRedoQueue<ControlSet>,
    creators: Creators,
    drag: DragController,
    selected: Option<ControlId>,
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}

impl Designer {
    pub fn new(config: DesignerConfig) -> Self {
        Self {
            root: RootInfo::default(),
            controls: ControlSet::new(config.canvas),
            queue: UndoRedoQueue::new(config.max_undo_depth),
            creators: Creators::new(&config),
            drag: DragController::new(),
            selected: None,
            config,
        }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn control(&self, id: ControlId) -> Result<&DesignerControl> {
        self.controls.get(id)
    }

    pub fn queue(&self) -> &UndoRedoQueue<ControlSet> {
        &self.queue
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the canvas with a persisted layout of any known version.
    /// Clears undo history.
    pub fn load_document(&mut self, json: &str) -> Result<()> {
        let doc = hmi_core::load_document(json)?;
        self.load(doc)
    }

    pub fn load(&mut self, doc: LayoutDocument) -> Result<()> {
        let canvas = self.config.canvas;
        let mut controls = ControlSet::new(canvas);
        for (index, control) in doc.controls.iter().enumerate() {
            controls.insert(index, DesignerControl::from_serialized(control, canvas))?;
        }
        log::debug!("loaded {} controls", controls.len());

        self.drag = DragController::new();
        self.queue.clear();
        self.root = doc.root;
        self.selected = doc.selected.filter(|id| controls.contains(*id));
        self.controls = controls;
        Ok(())
    }

    pub fn to_document(&self) -> LayoutDocument {
        LayoutDocument {
            root: self.root.clone(),
            controls: self.controls.iter().map(|c| c.to_serialized()).collect(),
            selected: self.selected,
            ..LayoutDocument::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(self.to_document().to_json()?)
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Add a new control on top with a generated id.
    pub fn add_control(
        &mut self,
        type_id: &str,
        position: BiAxisLayout,
        properties: Properties,
    ) -> Result<ControlId> {
        let id = ControlId::with_prefix(type_id);
        self.insert_control(SerializedControl {
            id,
            type_id: type_id.to_string(),
            position,
            properties,
        })?;
        Ok(id)
    }

    /// Add a fully specified control on top.
    pub fn insert_control(&mut self, control: SerializedControl) -> Result<()> {
        let payload = AddControlPayload {
            control,
            index: None,
        };
        self.queue
            .add(&mut self.controls, &self.creators.adds, payload)?;
        Ok(())
    }

    pub fn remove_control(&mut self, id: ControlId) -> Result<()> {
        if self.drag.active_control() == Some(id) {
            self.cancel_drag();
        }
        self.queue.add(
            &mut self.controls,
            &self.creators.removes,
            RemoveControlPayload::new(id),
        )?;
        self.prune_selection();
        Ok(())
    }

    /// Set a property as its own undo step.
    pub fn set_property(&mut self, id: ControlId, name: &str, value: Value) -> Result<()> {
        let payload = PropertyPayload::new(id, name, value);
        self.queue
            .add(&mut self.controls, &self.creators.properties, payload)?;
        Ok(())
    }

    /// Set a property, merging into the previous step when it edited the
    /// same property moments ago (typing into a field).
    pub fn set_property_merging(&mut self, id: ControlId, name: &str, value: Value) -> Result<()> {
        let payload = PropertyPayload::new(id, name, value).mergeable();
        self.queue
            .add(&mut self.controls, &self.creators.properties, payload)?;
        Ok(())
    }

    /// Re-anchor one axis without moving the control. Returns `false` if
    /// the axis already had that layout.
    pub fn set_anchor_mode(&mut self, id: ControlId, axis: Axis, mode: AnchorMode) -> Result<bool> {
        let engine = &self.controls.get(id)?.engine;
        let before = engine.bi_axis();
        let rendered = match axis {
            Axis::Horizontal => engine.calculate_anchor_horizontal(mode),
            Axis::Vertical => engine.calculate_anchor_vertical(mode),
        };
        // Detached controls re-anchor against the stored layout.
        let parent = engine.parent_size();
        let layout = rendered.unwrap_or_else(|| match axis {
            Axis::Horizontal => {
                convert_to_anchor_layout(&before.horizontal.to_snapshot(parent.width), mode)
            }
            Axis::Vertical => {
                convert_to_anchor_layout(&before.vertical.to_snapshot(parent.height), mode)
            }
        });
        let after = match axis {
            Axis::Horizontal => BiAxisLayout {
                horizontal: layout,
                ..before
            },
            Axis::Vertical => BiAxisLayout {
                vertical: layout,
                ..before
            },
        };
        if after == before {
            return Ok(false);
        }
        let payload = AnchorPayload {
            control_id: id,
            before,
            after,
        };
        self.queue
            .add(&mut self.controls, &self.creators.anchors, payload)?;
        Ok(true)
    }

    /// Move a control by whole pixels, unsnapped (arrow keys). Consecutive
    /// nudges of the same control merge into one step.
    pub fn nudge(&mut self, id: ControlId, dx: f64, dy: f64) -> Result<()> {
        let engine = &self.controls.get(id)?.engine;
        let start = engine.boundary();
        let (h, v) = boundary_snapshots(&start, engine.parent_size());
        let h = adjust_anchored_layout(&h, AdjustmentMode::BOTH, dx, 0.0);
        let v = adjust_anchored_layout(&v, AdjustmentMode::BOTH, dy, 0.0);
        let end = AnchoredBoundary::new(h.start, v.start, h.end, v.end);
        if end == start {
            return Ok(());
        }
        let payload = MovePayload {
            control_id: id,
            starting_position: start,
            ending_position: end,
            can_merge: true,
        };
        self.queue
            .add(&mut self.controls, &self.creators.moves, payload)?;
        Ok(())
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<ControlId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ControlId>) -> Result<()> {
        if let Some(id) = id {
            self.controls.get(id)?;
        }
        self.selected = id;
        Ok(())
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected
            && !self.controls.contains(id)
        {
            self.selected = None;
        }
    }

    // ─── Pointer gestures ────────────────────────────────────────────────

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Select whatever is under `p` and start dragging it. A click on
    /// empty canvas clears the selection.
    pub fn pointer_down(&mut self, p: Point) -> Option<DragTarget> {
        if self.drag.is_dragging() {
            self.cancel_drag();
        }
        let hit = hit_test(
            &self.controls.hit_rects(),
            p,
            self.selected,
            self.config.handle_size,
        );
        let Some(target) = hit else {
            self.selected = None;
            return None;
        };
        self.selected = Some(target.control);
        let engine = &self.controls.get(target.control).ok()?.engine;
        self.drag.begin(target, engine, p);
        Some(target)
    }

    /// Returns `true` if the control moved on screen.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        let Some(id) = self.drag.active_control() else {
            return false;
        };
        let Ok(control) = self.controls.get_mut(id) else {
            return false;
        };
        self.drag.pointer_move(
            p,
            &mut control.engine,
            self.config.grid_snap,
            self.config.jitter_threshold,
        )
    }

    /// Finish the drag, recording it as one undo step if the control
    /// actually moved.
    pub fn pointer_up(&mut self, _p: Point) -> Result<Option<Added>> {
        let Some(id) = self.drag.active_control() else {
            return Ok(None);
        };
        let control = match self.controls.get_mut(id) {
            Ok(control) => control,
            Err(e) => {
                self.drag = DragController::new();
                return Err(e);
            }
        };
        let Some(payload) = self.drag.end(&mut control.engine) else {
            return Ok(None);
        };
        let added = self
            .queue
            .add(&mut self.controls, &self.creators.moves, payload)?;
        Ok(Some(added))
    }

    /// Abandon an active drag, restoring the control. Returns `false` if
    /// nothing was being dragged.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(id) = self.drag.active_control() else {
            return false;
        };
        match self.controls.get_mut(id) {
            Ok(control) => self.drag.cancel(&mut control.engine),
            Err(_) => {
                self.drag = DragController::new();
                true
            }
        }
    }

    /// Dispatch a normalized pointer event.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<()> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.pointer_down(Point::new(x, y));
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer_move(Point::new(x, y));
            }
            InputEvent::PointerUp { x, y } => {
                self.pointer_up(Point::new(x, y))?;
            }
            InputEvent::Cancel => {
                self.cancel_drag();
            }
        }
        Ok(())
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<Option<String>> {
        self.cancel_drag();
        let label = self.queue.undo(&mut self.controls)?;
        self.prune_selection();
        Ok(label)
    }

    pub fn redo(&mut self) -> Result<Option<String>> {
        self.cancel_drag();
        let label = self.queue.redo(&mut self.controls)?;
        self.prune_selection();
        Ok(label)
    }

    pub fn can_undo(&self) -> bool {
        self.queue.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.queue.can_redo()
    }

    /// Label of the step [`undo`](Self::undo) would revert.
    pub fn undo_label(&self) -> Option<String> {
        self.queue.undo_label()
    }

    pub fn redo_label(&self) -> Option<String> {
        self.queue.redo_label()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Connect a control to its rendered element.
    pub fn attach_container(&mut self, id: ControlId, container: Box<dyn LayoutContainer>) -> Result<()> {
        self.controls.get_mut(id)?.engine.attach(container);
        Ok(())
    }

    pub fn detach_container(&mut self, id: ControlId) -> Result<Option<Box<dyn LayoutContainer>>> {
        Ok(self.controls.get_mut(id)?.engine.detach())
    }

    /// Register a layout observer on one control.
    pub fn observe_layout(
        &mut self,
        id: ControlId,
        observer: impl FnMut(ControlId, &BiAxisLayout) + 'static,
    ) -> Result<()> {
        self.controls.get_mut(id)?.engine.on_layout_changed(observer);
        Ok(())
    }
}
