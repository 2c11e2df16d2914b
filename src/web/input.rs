//! DOM `<input>` behind the edit overlay.

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlInputElement, KeyboardEvent};

use crate::error::{GridError, Result};
use crate::protocol::{edit_key_action, EditInput, OverlayPlacement};
use crate::types::EditNavigation;

/// Called when the input asks to close: `(cancel, action)`.
pub(crate) type CloseRequest = Rc<dyn Fn(bool, EditNavigation)>;

fn dom_error(e: &wasm_bindgen::JsValue) -> GridError {
    GridError::Overlay(format!("{e:?}"))
}

pub struct DomInput {
    element: HtmlInputElement,
    on_key: Closure<dyn FnMut(KeyboardEvent)>,
    on_blur: Closure<dyn FnMut(Event)>,
}

impl DomInput {
    pub(crate) fn new(document: &Document, value: &str, on_close: CloseRequest) -> Result<Self> {
        let element = document
            .create_element("input")
            .map_err(|e| dom_error(&e))?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| GridError::Overlay("not an input element".into()))?;
        element.set_type("text");
        element.set_value(value);
        let style = element.style();
        for (name, v) in [("position", "absolute"), ("border", "none"), ("padding", "0px 3px")] {
            style.set_property(name, v).map_err(|e| dom_error(&e))?;
        }
        document
            .body()
            .ok_or_else(|| GridError::Overlay("document has no body".into()))?
            .append_child(&element)
            .map_err(|e| dom_error(&e))?;

        let close = Rc::clone(&on_close);
        let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if let Some((cancel, action)) = edit_key_action(&event.code(), event.shift_key()) {
                event.prevent_default();
                close(cancel, action);
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);
        let on_blur = Closure::wrap(Box::new(move |_event: Event| {
            on_close(false, EditNavigation::None);
        }) as Box<dyn FnMut(Event)>);

        element
            .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
            .map_err(|e| dom_error(&e))?;
        element
            .add_event_listener_with_callback("blur", on_blur.as_ref().unchecked_ref())
            .map_err(|e| dom_error(&e))?;
        element.focus().map_err(|e| dom_error(&e))?;

        Ok(Self {
            element,
            on_key,
            on_blur,
        })
    }
}

impl EditInput for DomInput {
    fn set_placement(&mut self, placement: &OverlayPlacement) {
        let style = self.element.style();
        let clip = format!(
            "inset({}px 0px 0px {}px)",
            placement.clip_top, placement.clip_left
        );
        for (name, value) in [
            ("top", format!("{}px", placement.top)),
            ("left", format!("{}px", placement.left)),
            ("width", format!("{}px", placement.width)),
            ("height", format!("{}px", placement.height)),
            ("clip-path", clip),
        ] {
            let _ = style.set_property(name, &value);
        }
    }

    fn value(&self) -> String {
        self.element.value()
    }

    /// Listeners go first so removing the focused element cannot fire a
    /// late blur. Every step runs; the first failure is reported.
    fn detach(&mut self) -> Result<()> {
        let key = self
            .element
            .remove_event_listener_with_callback("keydown", self.on_key.as_ref().unchecked_ref());
        let blur = self
            .element
            .remove_event_listener_with_callback("blur", self.on_blur.as_ref().unchecked_ref());
        self.element.remove();
        key.and(blur).map_err(|e| dom_error(&e))
    }
}
