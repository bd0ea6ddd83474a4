pub mod anchor;
pub mod document;
pub mod error;
pub mod id;
pub mod model;
pub mod position;

pub use anchor::{
    AdjustmentMode, AnchorMode, AxisLayout, AxisSnapshot, BiAxisLayout, adjust_anchored_layout,
    calculate_snap_to, convert_to_anchor_layout,
};
pub use document::{LayoutDocument, Properties, SerializedControl, load_document};
pub use error::{DocumentError, Error, Result};
pub use id::ControlId;
pub use model::{AnchoredBoundary, Point, Rect, Size};
pub use position::StoredPositionInfo;
