//! Rendering collaborator boundary.
//!
//! The editor never touches the DOM directly. Everything it needs from the
//! rendered control goes through [`LayoutContainer`]: writing the four edge
//! styles and reading back parent/client and offset geometry.

use hmi_core::{AnchoredBoundary, Rect, Size};
use std::cell::RefCell;
use std::rc::Rc;

/// The element hosting a control on the canvas.
pub trait LayoutContainer {
    /// Set the `left/top/right/bottom` styles, in pixels.
    fn apply_boundary(&mut self, boundary: &AnchoredBoundary);

    /// Client size of the parent element (`clientWidth/clientHeight`), or
    /// `None` while the element has no parent.
    fn parent_size(&self) -> Option<Size>;

    /// Rendered geometry of the control (`offsetLeft/Top/Width/Height`).
    fn offset_rect(&self) -> Rect;
}

#[derive(Debug, Default)]
struct HeadlessState {
    parent: Size,
    boundary: AnchoredBoundary,
    writes: usize,
}

/// In-memory container for native hosts and tests.
///
/// Clones share state, so a host can keep a handle after handing one to a
/// positioning engine.
#[derive(Debug, Clone, Default)]
pub struct HeadlessContainer {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessContainer {
    pub fn new(parent: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                parent,
                boundary: AnchoredBoundary::new(0.0, 0.0, parent.width, parent.height),
                writes: 0,
            })),
        }
    }

    /// Resize the parent. Edge offsets stay as they were written, like CSS.
    pub fn set_parent_size(&self, parent: Size) {
        self.state.borrow_mut().parent = parent;
    }

    /// The last boundary written by the editor.
    pub fn boundary(&self) -> AnchoredBoundary {
        self.state.borrow().boundary
    }

    /// Number of style writes so far.
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }
}

impl LayoutContainer for HeadlessContainer {
    fn apply_boundary(&mut self, boundary: &AnchoredBoundary) {
        let mut state = self.state.borrow_mut();
        state.boundary = *boundary;
        state.writes += 1;
    }

    fn parent_size(&self) -> Option<Size> {
        Some(self.state.borrow().parent)
    }

    fn offset_rect(&self) -> Rect {
        let state = self.state.borrow();
        state.boundary.to_rect(state.parent)
    }
}
