//! Built-in undoable edits over a [`ControlSet`].
//!
//! | Handler | Payload | Merges |
//! |---------|---------|--------|
//! | [`MoveHandler`] | start/end boundary | nudges of the same control |
//! | [`PropertyHandler`] | old/new value | typing into the same property |
//! | [`AddControlHandler`] | serialized control + index | never |
//! | [`RemoveControlHandler`] | id, snapshot captured on initialize | never |
//! | [`AnchorHandler`] | layout before/after | never |

use crate::commands::{DateInfo, MergeResult, UndoHandler};
use crate::controls::{ControlSet, DesignerControl};
use hmi_core::{AnchoredBoundary, BiAxisLayout, ControlId, Result, SerializedControl};
use serde_json::Value;

/// Time limits for coalescing consecutive edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeWindow {
    /// Max time since the top entry was last modified.
    pub last_modified_ms: i64,
    /// Max time since the top entry was created.
    pub creation_ms: i64,
}

impl Default for MergeWindow {
    fn default() -> Self {
        Self {
            last_modified_ms: 3000,
            creation_ms: 5000,
        }
    }
}

impl MergeWindow {
    fn allows(&self, dates: &DateInfo) -> bool {
        dates.is_last_modified_within(self.last_modified_ms)
            && dates.is_original_creation_within(self.creation_ms)
    }
}

// ─── Move / resize ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MovePayload {
    pub control_id: ControlId,
    pub starting_position: AnchoredBoundary,
    pub ending_position: AnchoredBoundary,
    pub can_merge: bool,
}

#[derive(Debug, Default)]
pub struct MoveHandler {
    pub window: MergeWindow,
}

impl UndoHandler<ControlSet> for MoveHandler {
    type Data = MovePayload;

    fn label(&self, data: &MovePayload) -> String {
        let start = &data.starting_position;
        let end = &data.ending_position;
        // A translation shifts opposite edges by opposite amounts.
        let translated = start.left - end.left == end.right - start.right
            && start.top - end.top == end.bottom - start.bottom;
        if translated {
            format!("move {}", data.control_id)
        } else {
            format!("resize {}", data.control_id)
        }
    }

    fn undo(&self, ctx: &mut ControlSet, data: &MovePayload) -> Result<()> {
        let control = ctx.get_mut(data.control_id)?;
        control.engine.commit_boundary(&data.starting_position);
        Ok(())
    }

    fn redo(&self, ctx: &mut ControlSet, data: &MovePayload) -> Result<()> {
        let control = ctx.get_mut(data.control_id)?;
        control.engine.commit_boundary(&data.ending_position);
        Ok(())
    }

    fn try_merge(
        &self,
        existing: &MovePayload,
        incoming: &MovePayload,
        dates: &DateInfo,
    ) -> MergeResult<MovePayload> {
        if incoming.can_merge
            && existing.control_id == incoming.control_id
            && self.window.allows(dates)
        {
            MergeResult::Merged(MovePayload {
                ending_position: incoming.ending_position,
                ..existing.clone()
            })
        } else {
            MergeResult::Rejected
        }
    }
}

// ─── Property edit ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPayload {
    pub control_id: ControlId,
    pub property: String,
    /// Filled in by `initialize`; `None` if the property was unset.
    pub old_value: Option<Value>,
    pub new_value: Value,
    pub can_merge: bool,
}

impl PropertyPayload {
    pub fn new(control_id: ControlId, property: impl Into<String>, new_value: Value) -> Self {
        Self {
            control_id,
            property: property.into(),
            old_value: None,
            new_value,
            can_merge: false,
        }
    }

    pub fn mergeable(self) -> Self {
        Self {
            can_merge: true,
            ..self
        }
    }
}

#[derive(Debug, Default)]
pub struct PropertyHandler {
    pub window: MergeWindow,
}

impl UndoHandler<ControlSet> for PropertyHandler {
    type Data = PropertyPayload;

    fn label(&self, data: &PropertyPayload) -> String {
        format!("edit {}.{}", data.control_id, data.property)
    }

    fn initialize(&self, ctx: &ControlSet, data: &mut PropertyPayload) -> Result<()> {
        let control = ctx.get(data.control_id)?;
        data.old_value = control.properties.get(&data.property).cloned();
        Ok(())
    }

    fn undo(&self, ctx: &mut ControlSet, data: &PropertyPayload) -> Result<()> {
        let control = ctx.get_mut(data.control_id)?;
        match &data.old_value {
            Some(old) => {
                control.properties.insert(data.property.clone(), old.clone());
            }
            None => {
                control.properties.remove(&data.property);
            }
        }
        Ok(())
    }

    fn redo(&self, ctx: &mut ControlSet, data: &PropertyPayload) -> Result<()> {
        let control = ctx.get_mut(data.control_id)?;
        control
            .properties
            .insert(data.property.clone(), data.new_value.clone());
        Ok(())
    }

    fn try_merge(
        &self,
        existing: &PropertyPayload,
        incoming: &PropertyPayload,
        dates: &DateInfo,
    ) -> MergeResult<PropertyPayload> {
        if incoming.can_merge
            && existing.control_id == incoming.control_id
            && existing.property == incoming.property
            && self.window.allows(dates)
        {
            MergeResult::Merged(PropertyPayload {
                new_value: incoming.new_value.clone(),
                ..existing.clone()
            })
        } else {
            MergeResult::Rejected
        }
    }
}

// ─── Add / remove ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AddControlPayload {
    pub control: SerializedControl,
    /// Paint-order slot; `None` puts the control on top.
    pub index: Option<usize>,
}

#[derive(Debug, Default)]
pub struct AddControlHandler;

impl UndoHandler<ControlSet> for AddControlHandler {
    type Data = AddControlPayload;

    fn label(&self, data: &AddControlPayload) -> String {
        format!("add {}", data.control.id)
    }

    fn initialize(&self, ctx: &ControlSet, data: &mut AddControlPayload) -> Result<()> {
        if data.index.is_none() {
            data.index = Some(ctx.len());
        }
        Ok(())
    }

    fn undo(&self, ctx: &mut ControlSet, data: &AddControlPayload) -> Result<()> {
        ctx.remove(data.control.id)?;
        Ok(())
    }

    fn redo(&self, ctx: &mut ControlSet, data: &AddControlPayload) -> Result<()> {
        let control = DesignerControl::from_serialized(&data.control, ctx.canvas());
        ctx.insert(data.index.unwrap_or(ctx.len()), control)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveControlPayload {
    pub control_id: ControlId,
    /// Paint-order slot and state at removal, captured by `initialize`.
    pub snapshot: Option<(usize, SerializedControl)>,
}

impl RemoveControlPayload {
    pub fn new(control_id: ControlId) -> Self {
        Self {
            control_id,
            snapshot: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RemoveControlHandler;

impl UndoHandler<ControlSet> for RemoveControlHandler {
    type Data = RemoveControlPayload;

    fn label(&self, data: &RemoveControlPayload) -> String {
        format!("remove {}", data.control_id)
    }

    fn initialize(&self, ctx: &ControlSet, data: &mut RemoveControlPayload) -> Result<()> {
        let index = ctx.index_of(data.control_id)?;
        let control = ctx.get(data.control_id)?;
        data.snapshot = Some((index, control.to_serialized()));
        Ok(())
    }

    fn undo(&self, ctx: &mut ControlSet, data: &RemoveControlPayload) -> Result<()> {
        let Some((index, control)) = &data.snapshot else {
            return Ok(());
        };
        let restored = DesignerControl::from_serialized(control, ctx.canvas());
        ctx.insert(*index, restored)
    }

    fn redo(&self, ctx: &mut ControlSet, data: &RemoveControlPayload) -> Result<()> {
        ctx.remove(data.control_id)?;
        Ok(())
    }
}

// ─── Re-anchor ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPayload {
    pub control_id: ControlId,
    pub before: BiAxisLayout,
    pub after: BiAxisLayout,
}

#[derive(Debug, Default)]
pub struct AnchorHandler;

impl UndoHandler<ControlSet> for AnchorHandler {
    type Data = AnchorPayload;

    fn label(&self, data: &AnchorPayload) -> String {
        format!("anchor {}", data.control_id)
    }

    fn undo(&self, ctx: &mut ControlSet, data: &AnchorPayload) -> Result<()> {
        ctx.get_mut(data.control_id)?.engine.set_layout(data.before);
        Ok(())
    }

    fn redo(&self, ctx: &mut ControlSet, data: &AnchorPayload) -> Result<()> {
        ctx.get_mut(data.control_id)?.engine.set_layout(data.after);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandCreator, UndoRedoQueue};
    use chrono::{DateTime, TimeDelta, Utc};
    use hmi_core::{AnchorMode, AxisLayout, Error, Properties, Size};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CANVAS: Size = Size::new(800.0, 600.0);

    fn lamp(name: &str) -> SerializedControl {
        let mut properties = Properties::new();
        properties.insert("color".into(), json!("green"));
        SerializedControl {
            id: ControlId::intern(name),
            type_id: "lamp".into(),
            position: BiAxisLayout::default(),
            properties,
        }
    }

    fn scene(names: &[&str]) -> ControlSet {
        let mut set = ControlSet::new(CANVAS);
        for (i, name) in names.iter().enumerate() {
            set.insert(i, DesignerControl::from_serialized(&lamp(name), CANVAS))
                .unwrap();
        }
        set
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn move_commits_and_reverts() {
        let mut set = scene(&["pump"]);
        let id = ControlId::intern("pump");
        let start = set.get(id).unwrap().engine.boundary();
        let end = AnchoredBoundary::new(start.left + 20.0, start.top, start.right - 20.0, start.bottom);

        let mut queue = UndoRedoQueue::new(10);
        let moves = CommandCreator::new("move", MoveHandler::default());
        let payload = MovePayload {
            control_id: id,
            starting_position: start,
            ending_position: end,
            can_merge: false,
        };
        queue.add(&mut set, &moves, payload).unwrap();
        assert_eq!(set.get(id).unwrap().engine.boundary(), end);
        assert_eq!(queue.undo_label().as_deref(), Some("move pump"));

        queue.undo(&mut set).unwrap();
        assert_eq!(set.get(id).unwrap().engine.boundary(), start);
    }

    #[test]
    fn nudges_merge_into_one_move() {
        let mut set = scene(&["pump"]);
        let id = ControlId::intern("pump");
        let b0 = set.get(id).unwrap().engine.boundary();
        let step = |b: AnchoredBoundary| AnchoredBoundary::new(b.left + 1.0, b.top, b.right - 1.0, b.bottom);
        let b1 = step(b0);
        let b2 = step(b1);

        let mut queue = UndoRedoQueue::new(10);
        let moves = CommandCreator::new("move", MoveHandler::default());
        let nudge = |from, to| MovePayload {
            control_id: id,
            starting_position: from,
            ending_position: to,
            can_merge: true,
        };
        queue.add_at(&mut set, &moves, nudge(b0, b1), t0()).unwrap();
        queue
            .add_at(&mut set, &moves, nudge(b1, b2), t0() + TimeDelta::milliseconds(500))
            .unwrap();
        assert_eq!(queue.undo_depth(), 1);

        queue.undo(&mut set).unwrap();
        assert_eq!(set.get(id).unwrap().engine.boundary(), b0);
    }

    #[test]
    fn property_edit_seeds_old_value() {
        let mut set = scene(&["lamp1"]);
        let id = ControlId::intern("lamp1");
        let mut queue = UndoRedoQueue::new(10);
        let props = CommandCreator::new("property", PropertyHandler::default());

        queue
            .add(&mut set, &props, PropertyPayload::new(id, "color", json!("red")))
            .unwrap();
        queue
            .add(&mut set, &props, PropertyPayload::new(id, "blink", json!(true)))
            .unwrap();
        assert_eq!(set.get(id).unwrap().properties["color"], json!("red"));

        queue.undo(&mut set).unwrap();
        assert!(!set.get(id).unwrap().properties.contains_key("blink"));
        queue.undo(&mut set).unwrap();
        assert_eq!(set.get(id).unwrap().properties["color"], json!("green"));
    }

    #[test]
    fn typing_merges_and_undo_restores_first_value() {
        let mut set = scene(&["label"]);
        let id = ControlId::intern("label");
        let mut queue = UndoRedoQueue::new(10);
        let props = CommandCreator::new("property", PropertyHandler::default());

        for (i, text) in ["g", "gr", "gre"].iter().enumerate() {
            let at = t0() + TimeDelta::milliseconds(400 * i as i64);
            let edit = PropertyPayload::new(id, "color", json!(text)).mergeable();
            queue.add_at(&mut set, &props, edit, at).unwrap();
        }
        assert_eq!(queue.undo_depth(), 1);
        assert_eq!(set.get(id).unwrap().properties["color"], json!("gre"));

        queue.undo(&mut set).unwrap();
        assert_eq!(set.get(id).unwrap().properties["color"], json!("green"));
    }

    #[test]
    fn edits_on_unknown_controls_fail() {
        let mut set = scene(&[]);
        let ghost = ControlId::intern("ghost");
        let mut queue = UndoRedoQueue::new(10);
        let props = CommandCreator::new("property", PropertyHandler::default());
        let err = queue
            .add(&mut set, &props, PropertyPayload::new(ghost, "x", json!(1)))
            .unwrap_err();
        assert_eq!(err, Error::UnknownControl(ghost));
        assert!(!queue.can_undo());
    }

    #[test]
    fn remove_restores_paint_order() {
        let mut set = scene(&["a", "b", "c"]);
        let mut queue = UndoRedoQueue::new(10);
        let removes = CommandCreator::new("remove", RemoveControlHandler);

        queue
            .add(&mut set, &removes, RemoveControlPayload::new(ControlId::intern("b")))
            .unwrap();
        assert_eq!(set.len(), 2);

        queue.undo(&mut set).unwrap();
        assert_eq!(
            set.ids(),
            vec![ControlId::intern("a"), ControlId::intern("b"), ControlId::intern("c")]
        );
        assert_eq!(set.get(ControlId::intern("b")).unwrap().properties["color"], json!("green"));
    }

    #[test]
    fn add_goes_on_top_and_undoes() {
        let mut set = scene(&["a"]);
        let mut queue = UndoRedoQueue::new(10);
        let adds = CommandCreator::new("add", AddControlHandler);

        let payload = AddControlPayload {
            control: lamp("fresh"),
            index: None,
        };
        queue.add(&mut set, &adds, payload).unwrap();
        assert_eq!(set.ids(), vec![ControlId::intern("a"), ControlId::intern("fresh")]);

        queue.undo(&mut set).unwrap();
        queue.redo(&mut set).unwrap();
        assert_eq!(set.len(), 2);

        let dup = AddControlPayload {
            control: lamp("a"),
            index: None,
        };
        assert_eq!(
            queue.add(&mut set, &adds, dup).unwrap_err(),
            Error::DuplicateControl(ControlId::intern("a"))
        );
    }

    #[test]
    fn anchor_swaps_layouts() {
        let mut set = scene(&["gauge"]);
        let id = ControlId::intern("gauge");
        let before = set.get(id).unwrap().engine.bi_axis();
        let after = BiAxisLayout {
            horizontal: AxisLayout::End {
                end: 700.0,
                size: 100.0,
            },
            ..before
        };

        let mut queue = UndoRedoQueue::new(10);
        let anchors = CommandCreator::new("anchor", AnchorHandler);
        queue
            .add(&mut set, &anchors, AnchorPayload { control_id: id, before, after })
            .unwrap();
        assert_eq!(set.get(id).unwrap().engine.anchor_horizontal().mode(), AnchorMode::End);
        // Same place on the canvas either way.
        assert_eq!(set.get(id).unwrap().engine.boundary(), before.to_boundary(CANVAS));

        queue.undo(&mut set).unwrap();
        assert_eq!(set.get(id).unwrap().engine.bi_axis(), before);
    }
}
