//! Anchor model: how one axis of a control is pinned to its parent.
//!
//! Each axis (horizontal or vertical) is described by an [`AxisLayout`]:
//!
//! | Mode | Pinned | Stored | Size |
//! |------|--------|--------|------|
//! | `Stretch` | both edges | `start`, `end` | `parent - start - end` |
//! | `Start` | leading edge | `start`, `size` | fixed |
//! | `End` | trailing edge | `end`, `size` | fixed |
//! | `Center` | midpoint | `center` (fraction of parent), `size` | fixed |
//!
//! Drag code works on the mode-agnostic [`AxisSnapshot`] and converts back
//! with [`convert_to_anchor_layout`] once the gesture has produced new edges.

use crate::model::{AnchoredBoundary, Size};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ─── Modes & layouts ─────────────────────────────────────────────────────

/// Tag of an [`AxisLayout`] variant.
///
/// Serialized as `"stretch"`, `"start"`, `"end"` and `"none"` (the centered
/// mode keeps its historical `none` name on disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    Stretch,
    Start,
    End,
    #[serde(rename = "none")]
    Center,
}

/// Layout of a single axis relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SerializedAxisLayout", into = "SerializedAxisLayout")]
pub enum AxisLayout {
    Stretch { start: f64, end: f64 },
    Start { start: f64, size: f64 },
    End { end: f64, size: f64 },
    /// `center` is a fraction of the parent size, so the control keeps its
    /// relative position when the parent is resized.
    Center { center: f64, size: f64 },
}

impl AxisLayout {
    pub fn mode(&self) -> AnchorMode {
        match self {
            AxisLayout::Stretch { .. } => AnchorMode::Stretch,
            AxisLayout::Start { .. } => AnchorMode::Start,
            AxisLayout::End { .. } => AnchorMode::End,
            AxisLayout::Center { .. } => AnchorMode::Center,
        }
    }

    /// Flatten into pixel edges for a parent of `parent_size` pixels.
    pub fn to_snapshot(&self, parent_size: f64) -> AxisSnapshot {
        let (start, size) = match *self {
            AxisLayout::Stretch { start, end } => (start, parent_size - start - end),
            AxisLayout::Start { start, size } => (start, size),
            AxisLayout::End { end, size } => (parent_size - end - size, size),
            AxisLayout::Center { center, size } => (center * parent_size - size / 2.0, size),
        };
        AxisSnapshot {
            start,
            end: parent_size - start - size,
            size,
            parent_size,
        }
    }
}

/// Mode-agnostic working form of an axis: both edge offsets, the size, and
/// the parent size they were computed against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub start: f64,
    pub end: f64,
    pub size: f64,
    pub parent_size: f64,
}

impl AxisSnapshot {
    /// Snapshot of an axis given its two edge offsets.
    pub fn from_edges(start: f64, end: f64, parent_size: f64) -> Self {
        Self {
            start,
            end,
            size: parent_size - start - end,
            parent_size,
        }
    }
}

/// Build the `mode` variant of an axis layout from a flattened snapshot.
pub fn convert_to_anchor_layout(snapshot: &AxisSnapshot, mode: AnchorMode) -> AxisLayout {
    match mode {
        AnchorMode::Stretch => AxisLayout::Stretch {
            start: snapshot.start,
            end: snapshot.end,
        },
        AnchorMode::Start => AxisLayout::Start {
            start: snapshot.start,
            size: snapshot.size,
        },
        AnchorMode::End => AxisLayout::End {
            end: snapshot.end,
            size: snapshot.size,
        },
        AnchorMode::Center => {
            let center = if snapshot.parent_size == 0.0 {
                0.5
            } else {
                (snapshot.start + snapshot.size / 2.0) / snapshot.parent_size
            };
            AxisLayout::Center {
                center,
                size: snapshot.size,
            }
        }
    }
}

// ─── Snapping & adjustment ───────────────────────────────────────────────

bitflags! {
    /// Which edges of an axis a drag moves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AdjustmentMode: u8 {
        const NONE  = 0b00;
        const START = 0b01;
        const END   = 0b10;
        /// Both edges: a pure translation.
        const BOTH  = Self::START.bits() | Self::END.bits();
    }
}

/// Round `value` to the nearest multiple of `divider`.
///
/// An exact tie rounds to the lower multiple. A non-positive divider
/// disables snapping.
pub fn calculate_snap_to(value: f64, divider: f64) -> f64 {
    if divider <= 0.0 {
        return value;
    }
    let previous = value - value.rem_euclid(divider);
    let next = previous + divider;
    if (next - value) * 2.0 < divider {
        next
    } else {
        previous
    }
}

/// Apply a drag of `diff` pixels to `snapshot`, snapping the moved edge(s)
/// to `grid_snap`.
///
/// - `START` moves the leading edge; the trailing edge stays put and the size
///   absorbs the difference.
/// - `END` moves the trailing edge (a positive `diff` shrinks the end offset).
/// - `BOTH` translates. The snapped delta is taken from the leading edge when
///   moving forward (`diff > 0`) and from the trailing edge otherwise, then
///   applied to both edges so the size never changes.
pub fn adjust_anchored_layout(
    snapshot: &AxisSnapshot,
    adjustment: AdjustmentMode,
    diff: f64,
    grid_snap: f64,
) -> AxisSnapshot {
    let mut result = *snapshot;
    if adjustment.contains(AdjustmentMode::BOTH) {
        let delta = if diff > 0.0 {
            calculate_snap_to(snapshot.start + diff, grid_snap) - snapshot.start
        } else {
            snapshot.end - calculate_snap_to(snapshot.end - diff, grid_snap)
        };
        result.start = snapshot.start + delta;
        result.end = snapshot.end - delta;
    } else if adjustment.contains(AdjustmentMode::START) {
        result.start = calculate_snap_to(snapshot.start + diff, grid_snap);
        result.size = snapshot.size + (snapshot.start - result.start);
    } else if adjustment.contains(AdjustmentMode::END) {
        result.end = calculate_snap_to(snapshot.end - diff, grid_snap);
        result.size = snapshot.size + (snapshot.end - result.end);
    }
    result
}

// ─── Two-axis layout ─────────────────────────────────────────────────────

/// Full position of one control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SerializedBiAxisLayout", into = "SerializedBiAxisLayout")]
pub struct BiAxisLayout {
    pub horizontal: AxisLayout,
    pub vertical: AxisLayout,
}

impl Default for BiAxisLayout {
    /// `{left: 0, top: 0, width: 100, height: 20}`.
    fn default() -> Self {
        Self {
            horizontal: AxisLayout::Start {
                start: 0.0,
                size: 100.0,
            },
            vertical: AxisLayout::Start {
                start: 0.0,
                size: 20.0,
            },
        }
    }
}

impl BiAxisLayout {
    /// Both axes stretched to the given edges.
    pub fn stretch(boundary: &AnchoredBoundary) -> Self {
        Self {
            horizontal: AxisLayout::Stretch {
                start: boundary.left,
                end: boundary.right,
            },
            vertical: AxisLayout::Stretch {
                start: boundary.top,
                end: boundary.bottom,
            },
        }
    }

    /// Rebuild a layout with the given modes from absolute edges.
    pub fn from_boundary(
        boundary: &AnchoredBoundary,
        parent: Size,
        horizontal: AnchorMode,
        vertical: AnchorMode,
    ) -> Self {
        let (h, v) = boundary_snapshots(boundary, parent);
        Self {
            horizontal: convert_to_anchor_layout(&h, horizontal),
            vertical: convert_to_anchor_layout(&v, vertical),
        }
    }

    pub fn to_boundary(&self, parent: Size) -> AnchoredBoundary {
        let h = self.horizontal.to_snapshot(parent.width);
        let v = self.vertical.to_snapshot(parent.height);
        AnchoredBoundary {
            left: h.start,
            top: v.start,
            right: h.end,
            bottom: v.end,
        }
    }
}

/// Horizontal and vertical snapshots of a boundary inside `parent`.
pub fn boundary_snapshots(boundary: &AnchoredBoundary, parent: Size) -> (AxisSnapshot, AxisSnapshot) {
    (
        AxisSnapshot::from_edges(boundary.left, boundary.right, parent.width),
        AxisSnapshot::from_edges(boundary.top, boundary.bottom, parent.height),
    )
}

// ─── Serialization ───────────────────────────────────────────────────────

/// `[mode, value1, value2]` on-disk form of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedAxisLayout(pub AnchorMode, pub f64, pub f64);

/// `[hMode, hVal1, hVal2, vMode, vVal1, vVal2]` on-disk form of a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedBiAxisLayout(
    pub AnchorMode,
    pub f64,
    pub f64,
    pub AnchorMode,
    pub f64,
    pub f64,
);

pub fn serialize_axis_layout(layout: &AxisLayout) -> SerializedAxisLayout {
    match *layout {
        AxisLayout::Stretch { start, end } => SerializedAxisLayout(AnchorMode::Stretch, start, end),
        AxisLayout::Start { start, size } => SerializedAxisLayout(AnchorMode::Start, start, size),
        AxisLayout::End { end, size } => SerializedAxisLayout(AnchorMode::End, end, size),
        AxisLayout::Center { center, size } => {
            SerializedAxisLayout(AnchorMode::Center, center, size)
        }
    }
}

pub fn deserialize_axis_layout(serialized: &SerializedAxisLayout) -> AxisLayout {
    let SerializedAxisLayout(mode, a, b) = *serialized;
    match mode {
        AnchorMode::Stretch => AxisLayout::Stretch { start: a, end: b },
        AnchorMode::Start => AxisLayout::Start { start: a, size: b },
        AnchorMode::End => AxisLayout::End { end: a, size: b },
        AnchorMode::Center => AxisLayout::Center { center: a, size: b },
    }
}

pub fn serialize_bi_axis_layout(layout: &BiAxisLayout) -> SerializedBiAxisLayout {
    let SerializedAxisLayout(hm, h1, h2) = serialize_axis_layout(&layout.horizontal);
    let SerializedAxisLayout(vm, v1, v2) = serialize_axis_layout(&layout.vertical);
    SerializedBiAxisLayout(hm, h1, h2, vm, v1, v2)
}

pub fn deserialize_bi_axis_layout(serialized: &SerializedBiAxisLayout) -> BiAxisLayout {
    let SerializedBiAxisLayout(hm, h1, h2, vm, v1, v2) = *serialized;
    BiAxisLayout {
        horizontal: deserialize_axis_layout(&SerializedAxisLayout(hm, h1, h2)),
        vertical: deserialize_axis_layout(&SerializedAxisLayout(vm, v1, v2)),
    }
}

impl From<SerializedAxisLayout> for AxisLayout {
    fn from(s: SerializedAxisLayout) -> Self {
        deserialize_axis_layout(&s)
    }
}

impl From<AxisLayout> for SerializedAxisLayout {
    fn from(layout: AxisLayout) -> Self {
        serialize_axis_layout(&layout)
    }
}

impl From<SerializedBiAxisLayout> for BiAxisLayout {
    fn from(s: SerializedBiAxisLayout) -> Self {
        deserialize_bi_axis_layout(&s)
    }
}

impl From<BiAxisLayout> for SerializedBiAxisLayout {
    fn from(layout: BiAxisLayout) -> Self {
        serialize_bi_axis_layout(&layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snap(start: f64, end: f64, size: f64, parent_size: f64) -> AxisSnapshot {
        AxisSnapshot {
            start,
            end,
            size,
            parent_size,
        }
    }

    #[test]
    fn snap_rounds_to_nearest() {
        assert_eq!(calculate_snap_to(23.0, 10.0), 20.0);
        assert_eq!(calculate_snap_to(26.0, 10.0), 30.0);
        assert_eq!(calculate_snap_to(-3.0, 10.0), 0.0);
        assert_eq!(calculate_snap_to(-7.0, 10.0), -10.0);
    }

    #[test]
    fn snap_tie_goes_to_lower_multiple() {
        assert_eq!(calculate_snap_to(25.0, 10.0), 20.0);
        assert_eq!(calculate_snap_to(-5.0, 10.0), -10.0);
        assert_eq!(calculate_snap_to(2.5, 5.0), 0.0);
    }

    #[test]
    fn snap_is_idempotent() {
        for divider in [1.0, 4.0, 5.0, 8.0, 10.0] {
            for v in -40..40 {
                let v = v as f64 * 0.75;
                let once = calculate_snap_to(v, divider);
                assert_eq!(calculate_snap_to(once, divider), once, "v={v} d={divider}");
            }
        }
    }

    #[test]
    fn non_positive_divider_disables_snapping() {
        assert_eq!(calculate_snap_to(13.37, 0.0), 13.37);
        assert_eq!(calculate_snap_to(13.37, -5.0), 13.37);
    }

    #[test]
    fn adjust_none_is_identity() {
        let s = snap(20.0, 30.0, 15.0, 100.0);
        assert_eq!(adjust_anchored_layout(&s, AdjustmentMode::NONE, 7.0, 1.0), s);
    }

    #[test]
    fn adjust_both_translates() {
        let s = snap(20.0, 30.0, 15.0, 100.0);
        assert_eq!(
            adjust_anchored_layout(&s, AdjustmentMode::BOTH, 3.0, 1.0),
            snap(23.0, 27.0, 15.0, 100.0)
        );
    }

    #[test]
    fn adjust_start_keeps_end_edge() {
        let s = snap(20.0, 30.0, 15.0, 100.0);
        assert_eq!(
            adjust_anchored_layout(&s, AdjustmentMode::START, 3.0, 1.0),
            snap(23.0, 30.0, 12.0, 100.0)
        );
    }

    #[test]
    fn adjust_end_keeps_start_edge() {
        let s = snap(20.0, 30.0, 15.0, 100.0);
        assert_eq!(
            adjust_anchored_layout(&s, AdjustmentMode::END, 3.0, 1.0),
            snap(20.0, 27.0, 18.0, 100.0)
        );
    }

    #[test]
    fn translation_snaps_in_direction_of_travel() {
        // 97px wide control in a 400px parent; the right offset is off-grid.
        let s = AxisSnapshot::from_edges(20.0, 283.0, 400.0);

        // Forward: the leading edge lands on the grid.
        let fwd = adjust_anchored_layout(&s, AdjustmentMode::BOTH, 8.0, 10.0);
        assert_eq!(fwd.start, 30.0);
        assert_eq!(fwd.end, 273.0);
        assert_eq!(fwd.size, s.size);

        // Backward: the trailing offset lands on the grid.
        let back = adjust_anchored_layout(&s, AdjustmentMode::BOTH, -8.0, 10.0);
        assert_eq!(back.end, 290.0);
        assert_eq!(back.start, 13.0);
        assert_eq!(back.size, s.size);
    }

    #[test]
    fn zero_diff_on_aligned_snapshot_is_identity() {
        let s = AxisSnapshot::from_edges(20.0, 40.0, 200.0);
        for mode in [
            AdjustmentMode::NONE,
            AdjustmentMode::START,
            AdjustmentMode::END,
            AdjustmentMode::BOTH,
        ] {
            assert_eq!(adjust_anchored_layout(&s, mode, 0.0, 10.0), s, "{mode:?}");
        }
    }

    #[test]
    fn convert_snapshot_to_each_mode() {
        let s = AxisSnapshot::from_edges(20.0, 30.0, 100.0);
        assert_eq!(
            convert_to_anchor_layout(&s, AnchorMode::Stretch),
            AxisLayout::Stretch {
                start: 20.0,
                end: 30.0
            }
        );
        assert_eq!(
            convert_to_anchor_layout(&s, AnchorMode::Start),
            AxisLayout::Start {
                start: 20.0,
                size: 50.0
            }
        );
        assert_eq!(
            convert_to_anchor_layout(&s, AnchorMode::End),
            AxisLayout::End {
                end: 30.0,
                size: 50.0
            }
        );
        assert_eq!(
            convert_to_anchor_layout(&s, AnchorMode::Center),
            AxisLayout::Center {
                center: 0.45,
                size: 50.0
            }
        );
    }

    #[test]
    fn every_mode_reproduces_the_same_edges() {
        let s = AxisSnapshot::from_edges(20.0, 30.0, 100.0);
        for mode in [
            AnchorMode::Stretch,
            AnchorMode::Start,
            AnchorMode::End,
            AnchorMode::Center,
        ] {
            let back = convert_to_anchor_layout(&s, mode).to_snapshot(100.0);
            assert_eq!(back, s, "{mode:?}");
        }
    }

    #[test]
    fn center_rescales_with_parent() {
        let layout = AxisLayout::Center {
            center: 0.5,
            size: 20.0,
        };
        assert_eq!(layout.to_snapshot(100.0).start, 40.0);
        assert_eq!(layout.to_snapshot(200.0).start, 90.0);
    }

    #[test]
    fn center_in_empty_parent_defaults_to_middle() {
        let s = AxisSnapshot::from_edges(0.0, 0.0, 0.0);
        assert_eq!(
            convert_to_anchor_layout(&s, AnchorMode::Center),
            AxisLayout::Center {
                center: 0.5,
                size: 0.0
            }
        );
    }

    #[test]
    fn axis_layout_serializes_to_tuple() {
        let layout = AxisLayout::End {
            end: 12.0,
            size: 40.0,
        };
        assert_eq!(serde_json::to_string(&layout).unwrap(), r#"["end",12.0,40.0]"#);
        let center = AxisLayout::Center {
            center: 0.25,
            size: 8.0,
        };
        assert_eq!(serde_json::to_string(&center).unwrap(), r#"["none",0.25,8.0]"#);
    }

    #[test]
    fn bi_axis_layout_serializes_to_six_tuple() {
        let layout = BiAxisLayout {
            horizontal: AxisLayout::Stretch {
                start: 10.0,
                end: 20.0,
            },
            vertical: AxisLayout::Start {
                start: 5.0,
                size: 30.0,
            },
        };
        let json = serde_json::to_string(&layout).unwrap();
        assert_eq!(json, r#"["stretch",10.0,20.0,"start",5.0,30.0]"#);
        let back: BiAxisLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn boundary_conversion_preserves_modes() {
        let parent = Size::new(400.0, 400.0);
        let boundary = AnchoredBoundary::new(40.0, 90.0, 260.0, 290.0);
        let layout =
            BiAxisLayout::from_boundary(&boundary, parent, AnchorMode::End, AnchorMode::Center);
        assert_eq!(layout.horizontal.mode(), AnchorMode::End);
        assert_eq!(layout.vertical.mode(), AnchorMode::Center);
        assert_eq!(layout.to_boundary(parent), boundary);
    }
}
