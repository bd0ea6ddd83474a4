//! WASM bridge for the HMI designer. Exposes the designer view-model to
//! the browser page hosting the canvas.
//!
//! Compiled via `wasm-pack build --target web`. Structured values cross the
//! boundary as JSON strings; failures come back as rejected `JsValue`
//! strings.

use hmi_core::{AnchorMode, AnchoredBoundary, BiAxisLayout, ControlId, Properties, Rect, Size};
use hmi_editor::{Axis, Designer, DesignerConfig, InputEvent, LayoutContainer};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

/// The JS-facing designer.
///
/// The page creates one per canvas, attaches each control's DOM element,
/// and forwards pointer events (window-level while [`is_dragging`] is
/// true).
///
/// [`is_dragging`]: HmiDesigner::is_dragging
#[wasm_bindgen]
pub struct HmiDesigner {
    designer: Designer,
    changes: LayoutChanges,
}

#[wasm_bindgen]
impl HmiDesigner {
    /// Create a designer. `config_json` may be a partial config object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<HmiDesigner, JsValue> {
        console_error_panic_hook_setup();
        let config = match config_json.as_deref() {
            Some(json) => DesignerConfig::from_json(json).map_err(to_js)?,
            None => DesignerConfig::default(),
        };
        Ok(Self {
            designer: Designer::new(config),
            changes: LayoutChanges::default(),
        })
    }

    /// Load a persisted layout of any known version.
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        self.designer.load_document(json).map_err(to_js)
    }

    /// Current layout as a version-2 document.
    pub fn save(&self) -> Result<String, JsValue> {
        self.designer.to_json().map_err(to_js)
    }

    /// Control ids in paint order.
    pub fn control_ids(&self) -> js_sys::Array {
        self.designer
            .controls()
            .ids()
            .iter()
            .map(|id| JsValue::from_str(id.as_str()))
            .collect()
    }

    /// Controls not connected to a DOM element. Undoing a removal brings a
    /// control back detached; the page re-creates its element and calls
    /// [`attach`](Self::attach).
    pub fn detached_ids(&self) -> js_sys::Array {
        self.designer
            .controls()
            .iter()
            .filter(|c| !c.engine.is_attached())
            .map(|c| JsValue::from_str(c.id.as_str()))
            .collect()
    }

    /// Connect a control to its element. The stored layout is applied
    /// immediately.
    pub fn attach(&mut self, id: &str, element: HtmlElement) -> Result<(), JsValue> {
        let container = DomContainer { element };
        self.designer
            .attach_container(ControlId::intern(id), Box::new(container))
            .map_err(to_js)
    }

    /// Start recording layout changes of a control for
    /// [`take_layout_changes`](Self::take_layout_changes).
    pub fn watch_layout(&mut self, id: &str) -> Result<(), JsValue> {
        self.designer
            .observe_layout(ControlId::intern(id), self.changes.recorder())
            .map_err(to_js)
    }

    /// Drain the layout changes recorded since the last call, as
    /// `[id, positionTupleJson]` pairs in the order they happened.
    ///
    /// The page calls this after an edit, undo or gesture returns, so its
    /// handlers may call back into the designer freely.
    pub fn take_layout_changes(&self) -> js_sys::Array {
        self.changes
            .drain_json()
            .into_iter()
            .map(|(id, json)| {
                let pair = js_sys::Array::new();
                pair.push(&JsValue::from_str(id.as_str()));
                pair.push(&JsValue::from_str(&json));
                JsValue::from(pair)
            })
            .collect()
    }

    /// Position of a control in the legacy `{left, top, width, ...}` form,
    /// for the property panel.
    pub fn position(&self, id: &str) -> Result<String, JsValue> {
        let control = self.designer.control(ControlId::intern(id)).map_err(to_js)?;
        serde_json::to_string(&control.engine.layout()).map_err(to_js)
    }

    /// Properties of a control as a JSON object.
    pub fn properties(&self, id: &str) -> Result<String, JsValue> {
        let control = self.designer.control(ControlId::intern(id)).map_err(to_js)?;
        serde_json::to_string(&control.properties).map_err(to_js)
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Add a control. `position_json` is the 6-tuple; `properties_json` an
    /// object. Returns the generated id.
    pub fn add_control(
        &mut self,
        type_id: &str,
        position_json: &str,
        properties_json: &str,
    ) -> Result<String, JsValue> {
        let position: BiAxisLayout = serde_json::from_str(position_json).map_err(to_js)?;
        let properties: Properties = serde_json::from_str(properties_json).map_err(to_js)?;
        let id = self
            .designer
            .add_control(type_id, position, properties)
            .map_err(to_js)?;
        Ok(id.as_str().to_string())
    }

    pub fn remove_control(&mut self, id: &str) -> Result<(), JsValue> {
        self.designer
            .remove_control(ControlId::intern(id))
            .map_err(to_js)
    }

    /// Set a property from its JSON value. With `merge`, rapid edits of the
    /// same property collapse into one undo step.
    pub fn set_property(
        &mut self,
        id: &str,
        name: &str,
        value_json: &str,
        merge: bool,
    ) -> Result<(), JsValue> {
        let value: Value = serde_json::from_str(value_json).map_err(to_js)?;
        let id = ControlId::intern(id);
        let result = if merge {
            self.designer.set_property_merging(id, name, value)
        } else {
            self.designer.set_property(id, name, value)
        };
        result.map_err(to_js)
    }

    /// Re-anchor one axis (`"horizontal"`/`"vertical"`) to a mode
    /// (`"stretch"`, `"start"`, `"end"`, `"none"`) without moving the
    /// control. Returns `false` if nothing changed.
    pub fn set_anchor(&mut self, id: &str, axis: &str, mode: &str) -> Result<bool, JsValue> {
        let (axis, mode) = parse_anchor(axis, mode).map_err(to_js)?;
        self.designer
            .set_anchor_mode(ControlId::intern(id), axis, mode)
            .map_err(to_js)
    }

    /// Keyboard move by whole pixels.
    pub fn nudge(&mut self, id: &str, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.designer
            .nudge(ControlId::intern(id), dx, dy)
            .map_err(to_js)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<String> {
        self.designer.selected().map(|id| id.as_str().to_string())
    }

    pub fn select(&mut self, id: Option<String>) -> Result<(), JsValue> {
        self.designer
            .select(id.as_deref().map(ControlId::intern))
            .map_err(to_js)
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Returns the id of the control grabbed, if any.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        self.designer
            .pointer_down(hmi_core::Point::new(x, y))
            .map(|target| target.control.as_str().to_string())
    }

    /// Returns `true` if the dragged control moved on screen.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.designer.pointer_move(hmi_core::Point::new(x, y))
    }

    /// Returns `true` if the gesture was recorded as an undo step.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        let added = self
            .designer
            .pointer_up(hmi_core::Point::new(x, y))
            .map_err(to_js)?;
        Ok(added.is_some())
    }

    /// Abandon the active drag (Escape). Returns `false` if none was active.
    pub fn cancel(&mut self) -> Result<bool, JsValue> {
        let dragging = self.designer.is_dragging();
        self.designer
            .handle_input(&InputEvent::Cancel)
            .map_err(to_js)?;
        Ok(dragging)
    }

    pub fn is_dragging(&self) -> bool {
        self.designer.is_dragging()
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Returns the label of the undone step.
    pub fn undo(&mut self) -> Result<Option<String>, JsValue> {
        self.designer.undo().map_err(to_js)
    }

    pub fn redo(&mut self) -> Result<Option<String>, JsValue> {
        self.designer.redo().map_err(to_js)
    }

    pub fn can_undo(&self) -> bool {
        self.designer.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.designer.can_redo()
    }

    /// Label of the step [`undo`](Self::undo) would revert, for menu text.
    pub fn undo_label(&self) -> Option<String> {
        self.designer.undo_label()
    }

    pub fn redo_label(&self) -> Option<String> {
        self.designer.redo_label()
    }
}

// ─── Layout change log ───────────────────────────────────────────────────

/// Layout changes waiting to be picked up by the page.
///
/// Observers run while the designer is mutably borrowed by the exported
/// method, so they only record here and never call into JS.
#[derive(Debug, Clone, Default)]
struct LayoutChanges {
    pending: Rc<RefCell<Vec<(ControlId, BiAxisLayout)>>>,
}

impl LayoutChanges {
    fn recorder(&self) -> impl FnMut(ControlId, &BiAxisLayout) + 'static {
        let pending = Rc::clone(&self.pending);
        move |id, layout| pending.borrow_mut().push((id, *layout))
    }

    fn drain(&self) -> Vec<(ControlId, BiAxisLayout)> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    fn drain_json(&self) -> Vec<(ControlId, String)> {
        self.drain()
            .into_iter()
            .map(|(id, layout)| {
                let json = serde_json::to_string(&layout).unwrap_or_else(|e| {
                    log::warn!("could not encode layout of {id}: {e}");
                    "null".to_string()
                });
                (id, json)
            })
            .collect()
    }
}

// ─── DOM container ───────────────────────────────────────────────────────

/// A control's absolutely positioned element.
struct DomContainer {
    element: HtmlElement,
}

impl LayoutContainer for DomContainer {
    fn apply_boundary(&mut self, boundary: &AnchoredBoundary) {
        let style = self.element.style();
        let edges = [
            ("left", boundary.left),
            ("top", boundary.top),
            ("right", boundary.right),
            ("bottom", boundary.bottom),
        ];
        for (name, value) in edges {
            if style.set_property(name, &format!("{value}px")).is_err() {
                log::warn!("could not set {name} on control element");
            }
        }
    }

    fn parent_size(&self) -> Option<Size> {
        self.element
            .parent_element()
            .map(|parent| Size::new(parent.client_width() as f64, parent.client_height() as f64))
    }

    fn offset_rect(&self) -> Rect {
        Rect::new(
            self.element.offset_left() as f64,
            self.element.offset_top() as f64,
            self.element.offset_width() as f64,
            self.element.offset_height() as f64,
        )
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse the string names used by the page's anchor picker.
fn parse_anchor(axis: &str, mode: &str) -> Result<(Axis, AnchorMode), String> {
    let axis = serde_json::from_value(Value::String(axis.to_string()))
        .map_err(|_| format!("unknown axis \"{axis}\""))?;
    let mode = serde_json::from_value(Value::String(mode.to_string()))
        .map_err(|_| format!("unknown anchor mode \"{mode}\""))?;
    Ok((axis, mode))
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("HMI designer panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
