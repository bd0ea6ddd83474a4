//! Positioning engine: owns the anchored layout of one control.
//!
//! The engine is the only writer of a control's position. Drag feedback,
//! undo commands and the property panel all go through it, so the stored
//! [`BiAxisLayout`] and what the container shows never drift apart.
//!
//! Without an attached container (a control not yet connected to the
//! canvas) the container-dependent operations quietly do nothing and
//! geometry is computed against the parent-size hint.

use crate::container::LayoutContainer;
use hmi_core::anchor::boundary_snapshots;
use hmi_core::{
    AnchorMode, AnchoredBoundary, AxisLayout, AxisSnapshot, BiAxisLayout, ControlId, Size,
    StoredPositionInfo, convert_to_anchor_layout,
};

/// Callback fired after the stored layout changed.
pub type LayoutObserver = Box<dyn FnMut(ControlId, &BiAxisLayout)>;

pub struct PositioningEngine {
    id: ControlId,
    layout: Option<BiAxisLayout>,
    container: Option<Box<dyn LayoutContainer>>,
    observers: Vec<LayoutObserver>,
    /// Parent size used while no container is attached.
    parent_hint: Size,
}

impl std::fmt::Debug for PositioningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositioningEngine")
            .field("id", &self.id)
            .field("layout", &self.layout)
            .field("attached", &self.container.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PositioningEngine {
    pub fn new(id: ControlId, parent_hint: Size) -> Self {
        Self {
            id,
            layout: None,
            container: None,
            observers: Vec::new(),
            parent_hint,
        }
    }

    pub fn with_layout(id: ControlId, layout: BiAxisLayout, parent_hint: Size) -> Self {
        Self {
            layout: Some(layout),
            ..Self::new(id, parent_hint)
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    // ─── Container ───────────────────────────────────────────────────────

    /// Connect the control to its rendered element and push the current
    /// layout to it.
    pub fn attach(&mut self, container: Box<dyn LayoutContainer>) {
        self.container = Some(container);
        self.apply_to_container();
    }

    pub fn detach(&mut self) -> Option<Box<dyn LayoutContainer>> {
        if let Some(parent) = self.container.as_ref().and_then(|c| c.parent_size()) {
            self.parent_hint = parent;
        }
        self.container.take()
    }

    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    /// Parent size from the container, or the hint when detached or when
    /// the container has no parent yet.
    pub fn parent_size(&self) -> Size {
        self.container
            .as_ref()
            .and_then(|c| c.parent_size())
            .unwrap_or(self.parent_hint)
    }

    // ─── Observers ───────────────────────────────────────────────────────

    pub fn on_layout_changed(&mut self, observer: impl FnMut(ControlId, &BiAxisLayout) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Current layout, or the default position if none was ever set.
    pub fn bi_axis(&self) -> BiAxisLayout {
        self.layout.unwrap_or_default()
    }

    pub fn anchor_horizontal(&self) -> AxisLayout {
        self.bi_axis().horizontal
    }

    pub fn anchor_vertical(&self) -> AxisLayout {
        self.bi_axis().vertical
    }

    /// Legacy-form position: `{left: 0, top: 0, width: 100, height: 20}` if
    /// nothing was ever set.
    pub fn layout(&self) -> StoredPositionInfo {
        match &self.layout {
            Some(layout) => StoredPositionInfo::from_bi_axis(layout, self.parent_size()),
            None => StoredPositionInfo::from_rect(0.0, 0.0, 100.0, 20.0),
        }
    }

    /// Store a legacy-form position as a stretch layout on both axes.
    ///
    /// The fields give the rendered rectangle; any edge they leave out is
    /// resolved against the current parent size.
    pub fn update(&mut self, info: &StoredPositionInfo) -> bool {
        let boundary = info.to_bi_axis().to_boundary(self.parent_size());
        self.set_layout(BiAxisLayout::stretch(&boundary))
    }

    /// Store `layout`, apply it to the container and notify observers.
    /// Writing the current value again does nothing and returns `false`.
    pub fn set_layout(&mut self, layout: BiAxisLayout) -> bool {
        if self.layout == Some(layout) {
            return false;
        }
        self.layout = Some(layout);
        self.apply_to_container();
        for observer in &mut self.observers {
            observer(self.id, &layout);
        }
        true
    }

    pub fn set_anchor_horizontal(&mut self, horizontal: AxisLayout) -> bool {
        let layout = BiAxisLayout {
            horizontal,
            ..self.bi_axis()
        };
        self.set_layout(layout)
    }

    pub fn set_anchor_vertical(&mut self, vertical: AxisLayout) -> bool {
        let layout = BiAxisLayout {
            vertical,
            ..self.bi_axis()
        };
        self.set_layout(layout)
    }

    // ─── Re-anchoring ────────────────────────────────────────────────────

    /// Horizontal layout in `mode` that keeps the control where it is
    /// rendered now. `None` when no container is attached.
    pub fn calculate_anchor_horizontal(&self, mode: AnchorMode) -> Option<AxisLayout> {
        let (h, _) = self.rendered_snapshots()?;
        Some(convert_to_anchor_layout(&h, mode))
    }

    /// Vertical counterpart of [`calculate_anchor_horizontal`](Self::calculate_anchor_horizontal).
    pub fn calculate_anchor_vertical(&self, mode: AnchorMode) -> Option<AxisLayout> {
        let (_, v) = self.rendered_snapshots()?;
        Some(convert_to_anchor_layout(&v, mode))
    }

    fn rendered_snapshots(&self) -> Option<(AxisSnapshot, AxisSnapshot)> {
        let container = self.container.as_ref()?;
        let parent = self.parent_size();
        let boundary = AnchoredBoundary::from_rect(container.offset_rect(), parent);
        Some(boundary_snapshots(&boundary, parent))
    }

    // ─── Boundaries ──────────────────────────────────────────────────────

    /// Absolute edges of the stored layout inside the parent.
    pub fn boundary(&self) -> AnchoredBoundary {
        self.bi_axis().to_boundary(self.parent_size())
    }

    /// Show `boundary` on the container without touching the stored layout.
    /// Used for live drag feedback.
    pub fn preview_boundary(&mut self, boundary: &AnchoredBoundary) {
        if let Some(container) = &mut self.container {
            log::trace!("preview {} -> {boundary:?}", self.id);
            container.apply_boundary(boundary);
        }
    }

    /// Store `boundary`, keeping each axis in its current anchor mode.
    pub fn commit_boundary(&mut self, boundary: &AnchoredBoundary) -> bool {
        let current = self.bi_axis();
        let layout = BiAxisLayout::from_boundary(
            boundary,
            self.parent_size(),
            current.horizontal.mode(),
            current.vertical.mode(),
        );
        if !self.set_layout(layout) {
            // The model already matches; make sure a preview is not left behind.
            self.apply_to_container();
            return false;
        }
        true
    }

    fn apply_to_container(&mut self) {
        let boundary = self.bi_axis().to_boundary(self.parent_size());
        if let Some(container) = &mut self.container {
            container.apply_boundary(&boundary);
        }
    }
}
