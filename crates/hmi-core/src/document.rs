//! Persisted layout document and its upgrade pipeline.
//!
//! Current format (version 2):
//!
//! ```json
//! {
//!   "version": 2,
//!   "root": { "properties": { "background": "#202020" } },
//!   "controls": [
//!     { "id": "start_btn", "typeId": "button",
//!       "position": ["start", 10, 80, "end", 12, 24],
//!       "properties": { "text": "Start" } }
//!   ],
//!   "selected": "start_btn"
//! }
//! ```
//!
//! Older documents are upgraded on load:
//! - version 0: a bare array of controls;
//! - version 1: the object form without a `version` field;
//! - any version: positions in the legacy `{left, top, width, height, ...}`
//!   object form are converted to the tuple encoding.

use crate::anchor::BiAxisLayout;
use crate::error::DocumentError;
use crate::id::ControlId;
use crate::position::StoredPositionInfo;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const CURRENT_VERSION: u64 = 2;

/// Opaque property bag. Property serialization is owned by the controls.
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub version: u64,
    #[serde(default)]
    pub root: RootInfo,
    #[serde(default)]
    pub controls: Vec<SerializedControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<ControlId>,
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            root: RootInfo::default(),
            controls: Vec::new(),
            selected: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RootInfo {
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedControl {
    pub id: ControlId,
    #[serde(rename = "typeId")]
    pub type_id: String,
    pub position: BiAxisLayout,
    #[serde(default)]
    pub properties: Properties,
}

impl LayoutDocument {
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─── Upgrade pipeline ────────────────────────────────────────────────────

/// Any position encoding found in the wild.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnyPosition {
    Tuple(BiAxisLayout),
    Legacy(StoredPositionInfo),
}

#[derive(Deserialize)]
struct AnyControl {
    id: ControlId,
    #[serde(rename = "typeId", alias = "type")]
    type_id: String,
    #[serde(default)]
    position: Option<AnyPosition>,
    #[serde(default)]
    properties: Properties,
}

#[derive(Deserialize)]
struct AnyDocument {
    #[serde(default)]
    root: RootInfo,
    #[serde(default)]
    controls: Vec<AnyControl>,
    #[serde(default)]
    selected: Option<ControlId>,
}

/// Parse a persisted layout of any known version.
pub fn load_document(json: &str) -> Result<LayoutDocument, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    upgrade_document(value)
}

/// Bring a parsed document of any known version to [`CURRENT_VERSION`].
pub fn upgrade_document(value: Value) -> Result<LayoutDocument, DocumentError> {
    let version = match &value {
        Value::Array(_) => 0,
        Value::Object(map) => match map.get("version") {
            None => 1,
            Some(v) => v.as_u64().ok_or_else(|| {
                DocumentError::InvalidShape(format!("version must be an integer, got {v}"))
            })?,
        },
        other => {
            return Err(DocumentError::InvalidShape(format!(
                "expected an object or an array of controls, got {}",
                json_kind(other)
            )));
        }
    };
    if version > CURRENT_VERSION {
        return Err(DocumentError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }

    let doc: AnyDocument = if version == 0 {
        AnyDocument {
            root: RootInfo::default(),
            controls: serde_json::from_value(value)?,
            selected: None,
        }
    } else {
        serde_json::from_value(value)?
    };

    if version < CURRENT_VERSION {
        log::debug!("upgrading layout document from version {version}");
    }

    let mut seen = HashSet::new();
    let mut controls = Vec::with_capacity(doc.controls.len());
    for control in doc.controls {
        if !seen.insert(control.id) {
            return Err(DocumentError::InvalidShape(format!(
                "duplicate control id {}",
                control.id
            )));
        }
        let position = match control.position {
            Some(AnyPosition::Tuple(layout)) => layout,
            Some(AnyPosition::Legacy(info)) => info.to_bi_axis(),
            None => {
                log::warn!("control {} has no position, using default", control.id);
                BiAxisLayout::default()
            }
        };
        controls.push(SerializedControl {
            id: control.id,
            type_id: control.type_id,
            position,
            properties: control.properties,
        });
    }

    let selected = match doc.selected {
        Some(id) if !seen.contains(&id) => {
            log::warn!("selected control {id} does not exist, clearing selection");
            None
        }
        other => other,
    };

    Ok(LayoutDocument {
        version: CURRENT_VERSION,
        root: doc.root,
        controls,
        selected,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AxisLayout;
    use pretty_assertions::assert_eq;

    #[test]
    fn current_document_loads_unchanged() {
        let json = r#"{
            "version": 2,
            "root": { "properties": { "title": "Pump 1" } },
            "controls": [
                { "id": "lbl", "typeId": "label",
                  "position": ["start", 10, 80, "start", 5, 20],
                  "properties": { "text": "Flow" } }
            ],
            "selected": "lbl"
        }"#;
        let doc = load_document(json).unwrap();
        assert_eq!(doc.version, CURRENT_VERSION);
        assert_eq!(doc.controls.len(), 1);
        assert_eq!(doc.selected, Some(ControlId::intern("lbl")));
        assert_eq!(
            doc.controls[0].position.horizontal,
            AxisLayout::Start {
                start: 10.0,
                size: 80.0
            }
        );
    }

    #[test]
    fn bare_array_is_version_zero() {
        let json = r#"[
            { "id": "a", "type": "button", "position": { "left": 1, "top": 2, "width": 3, "height": 4 } }
        ]"#;
        let doc = load_document(json).unwrap();
        assert_eq!(doc.version, CURRENT_VERSION);
        assert_eq!(doc.controls[0].type_id, "button");
        assert_eq!(
            doc.controls[0].position,
            StoredPositionInfo::from_rect(1.0, 2.0, 3.0, 4.0).to_bi_axis()
        );
    }

    #[test]
    fn newer_version_is_rejected() {
        let err = load_document(r#"{ "version": 99, "controls": [] }"#).unwrap_err();
        assert_eq!(
            err,
            DocumentError::UnsupportedVersion {
                found: 99,
                supported: CURRENT_VERSION
            }
        );
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(matches!(
            load_document("42"),
            Err(DocumentError::InvalidShape(_))
        ));
        assert!(matches!(load_document("{"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{ "version": 2, "controls": [
            { "id": "dup", "typeId": "label", "position": ["start", 0, 10, "start", 0, 10] },
            { "id": "dup", "typeId": "label", "position": ["start", 0, 10, "start", 0, 10] }
        ] }"#;
        assert!(matches!(
            load_document(json),
            Err(DocumentError::InvalidShape(_))
        ));
    }

    #[test]
    fn dangling_selection_is_cleared() {
        let json = r#"{ "version": 2, "controls": [], "selected": "ghost" }"#;
        assert_eq!(load_document(json).unwrap().selected, None);
    }

    #[test]
    fn saved_document_reloads_identically() {
        let json = r#"{ "controls": [
            { "id": "tank", "typeId": "gauge", "position": ["none", 0.5, 120, "stretch", 10, 10] }
        ] }"#;
        let doc = load_document(json).unwrap();
        let reloaded = load_document(&doc.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, doc);
    }
}
