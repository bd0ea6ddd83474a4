pub mod commands;
pub mod config;
pub mod container;
pub mod controls;
pub mod designer;
pub mod drag;
pub mod edits;
pub mod hit;
pub mod input;
pub mod positioning;

pub use commands::{
    Added, CommandCreator, DateInfo, EntryId, MergeResult, UndoHandler, UndoRedoQueue,
};
pub use config::DesignerConfig;
pub use container::{HeadlessContainer, LayoutContainer};
pub use controls::{ControlSet, DesignerControl};
pub use designer::{Axis, Designer};
pub use drag::{DragAnchor, DragController};
pub use edits::MovePayload;
pub use hit::{DragTarget, hit_test};
pub use input::InputEvent;
pub use positioning::PositioningEngine;
