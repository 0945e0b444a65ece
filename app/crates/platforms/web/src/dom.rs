//! DOM rendering of the four widgets

use controller::{StatusTone, UiState, View};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlButtonElement, HtmlElement};

const LABEL_STYLE: &[(&str, &str)] = &[
    ("font-size", "14px"),
    ("margin", "10px 0"),
    ("font-weight", "bold"),
];

const RESULT_STYLE: &[(&str, &str)] = &[
    ("font-size", "12px"),
    ("margin", "10px 0"),
    ("font-family", "monospace"),
    ("word-break", "break-all"),
    ("background-color", "#f5f5f5"),
    ("padding", "10px"),
    ("border", "1px solid #ddd"),
    ("border-radius", "4px"),
    ("max-height", "200px"),
    ("overflow-y", "auto"),
];

/// Button plus time, status and result labels appended to `<body>`
pub struct DomView {
    button: HtmlButtonElement,
    time: HtmlElement,
    status: HtmlElement,
    result: HtmlElement,
}

impl DomView {
    /// Creates the widgets in their initial state and attaches them.
    pub fn mount(document: &Document) -> Result<Self, JsValue> {
        let container = create::<HtmlElement>(document, "div", "proverDemo")?;
        style(
            &container,
            &[("padding", "20px"), ("font-family", "Arial, sans-serif")],
        )?;

        let button = create::<HtmlButtonElement>(document, "button", "proveButton")?;
        style(
            &button,
            &[
                ("padding", "10px 20px"),
                ("font-size", "16px"),
                ("margin", "10px 0"),
                ("display", "block"),
            ],
        )?;
        let time = create::<HtmlElement>(document, "div", "timeLabel")?;
        style(&time, LABEL_STYLE)?;
        let status = create::<HtmlElement>(document, "div", "statusLabel")?;
        style(&status, LABEL_STYLE)?;
        let result = create::<HtmlElement>(document, "div", "resultLabel")?;
        style(&result, RESULT_STYLE)?;

        container.append_child(&button)?;
        container.append_child(&time)?;
        container.append_child(&status)?;
        container.append_child(&result)?;
        document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?
            .append_child(&container)?;

        let mut view = Self {
            button,
            time,
            status,
            result,
        };
        view.render(&UiState::default());
        Ok(view)
    }

    /// The proof button
    pub fn button(&self) -> &HtmlButtonElement {
        &self.button
    }

    /// Applies a full snapshot.
    pub fn render(&mut self, state: &UiState) {
        self.set_button(state.button_enabled, &state.button_label);
        self.set_time(&state.time);
        self.set_status(&state.status, state.tone);
        self.set_result(&state.result);
    }
}

impl View for DomView {
    fn set_button(&mut self, enabled: bool, label: &str) {
        self.button.set_disabled(!enabled);
        self.button.set_text_content(Some(label));
    }

    fn set_time(&mut self, text: &str) {
        self.time.set_text_content(Some(text));
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        self.status.set_text_content(Some(text));
        if let Err(err) = self.status.style().set_property("color", tone.color()) {
            log::warn!("failed to set status color: {err:?}");
        }
    }

    fn set_result(&mut self, text: &str) {
        self.result.set_text_content(Some(text));
    }
}

fn create<T: JsCast>(document: &Document, tag: &str, id: &str) -> Result<T, JsValue> {
    let element = document.create_element(tag)?;
    element.set_id(id);
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> has an unexpected type")))
}

fn style(element: &HtmlElement, properties: &[(&str, &str)]) -> Result<(), JsValue> {
    let declaration = element.style();
    for (name, value) in properties {
        declaration.set_property(name, value)?;
    }
    Ok(())
}
