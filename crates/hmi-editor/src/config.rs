//! Designer configuration.

use hmi_core::Size;
use serde::{Deserialize, Serialize};

/// Tunables for the designer. Every field has a default, so hosts can
/// pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Grid divider in pixels. `0` disables snapping. Default: **5**.
    pub grid_snap: f64,

    /// Width of the resize-handle band around a control's edges. Default: **6**.
    pub handle_size: f64,

    /// Maximum number of undo steps kept. Default: **200**.
    pub max_undo_depth: usize,

    /// An edit only merges into the previous step if that step was last
    /// modified within this many milliseconds. Default: **3000**.
    pub merge_window_ms: i64,

    /// ...and was created within this many milliseconds, so a long paused
    /// editing session does not collapse into one step. Default: **5000**.
    pub session_window_ms: i64,

    /// Pointer moves smaller than this on both axes are ignored. Default: **1**.
    pub jitter_threshold: f64,

    /// Canvas size used for headless containers. Default: **800 × 600**.
    pub canvas: Size,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            grid_snap: 5.0,
            handle_size: 6.0,
            max_undo_depth: 200,
            merge_window_ms: 3000,
            session_window_ms: 5000,
            jitter_threshold: 1.0,
            canvas: Size::new(800.0, 600.0),
        }
    }
}

impl DesignerConfig {
    /// Parse from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
