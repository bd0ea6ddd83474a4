//! Controls on the canvas, in paint order.
//!
//! This is the state every undoable edit operates on.

use crate::positioning::PositioningEngine;
use hmi_core::{ControlId, Error, Properties, Rect, Result, SerializedControl, Size};

/// One control: identity, opaque properties and its positioning engine.
#[derive(Debug)]
pub struct DesignerControl {
    pub id: ControlId,
    pub type_id: String,
    pub properties: Properties,
    pub engine: PositioningEngine,
}

impl DesignerControl {
    /// Rebuild a control from its persisted form. The engine starts
    /// detached; geometry uses `parent` until a container is attached.
    pub fn from_serialized(control: &SerializedControl, parent: Size) -> Self {
        Self {
            id: control.id,
            type_id: control.type_id.clone(),
            properties: control.properties.clone(),
            engine: PositioningEngine::with_layout(control.id, control.position, parent),
        }
    }

    pub fn to_serialized(&self) -> SerializedControl {
        SerializedControl {
            id: self.id,
            type_id: self.type_id.clone(),
            position: self.engine.bi_axis(),
            properties: self.properties.clone(),
        }
    }

    /// Rendered rectangle inside the parent, from the stored layout.
    pub fn rect(&self) -> Rect {
        self.engine.boundary().to_rect(self.engine.parent_size())
    }
}

#[derive(Debug)]
pub struct ControlSet {
    controls: Vec<DesignerControl>,
    /// Parent size for controls without a container.
    canvas: Size,
}

impl ControlSet {
    pub fn new(canvas: Size) -> Self {
        Self {
            controls: Vec::new(),
            canvas,
        }
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DesignerControl> {
        self.controls.iter()
    }

    pub fn ids(&self) -> Vec<ControlId> {
        self.controls.iter().map(|c| c.id).collect()
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.controls.iter().any(|c| c.id == id)
    }

    pub fn index_of(&self, id: ControlId) -> Result<usize> {
        self.controls
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::UnknownControl(id))
    }

    pub fn get(&self, id: ControlId) -> Result<&DesignerControl> {
        self.controls
            .iter()
            .find(|c| c.id == id)
            .ok_or(Error::UnknownControl(id))
    }

    pub fn get_mut(&mut self, id: ControlId) -> Result<&mut DesignerControl> {
        self.controls
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::UnknownControl(id))
    }

    /// Insert at `index` in paint order (`len` appends on top).
    pub fn insert(&mut self, index: usize, control: DesignerControl) -> Result<()> {
        if self.contains(control.id) {
            return Err(Error::DuplicateControl(control.id));
        }
        if index > self.controls.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.controls.len(),
            });
        }
        self.controls.insert(index, control);
        Ok(())
    }

    /// Remove a control, returning it and its former index.
    pub fn remove(&mut self, id: ControlId) -> Result<(usize, DesignerControl)> {
        let index = self.index_of(id)?;
        Ok((index, self.controls.remove(index)))
    }

    /// `(id, rect)` pairs in paint order, for hit testing.
    pub fn hit_rects(&self) -> Vec<(ControlId, Rect)> {
        self.controls.iter().map(|c| (c.id, c.rect())).collect()
    }
}
