//! Error taxonomy for widget wiring and network calls.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal to the page. Entry points log a `WidgetError` and
//! leave the affected feature inert; the only user-visible failure path is
//! the upload error alert, which is not an error of this type.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure raised while wiring a widget or talking to the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// A required element is absent from the page.
    #[error("missing element: {0}")]
    MissingElement(&'static str),
    /// The chat container carries no conversation identifier.
    #[error("chat container has no conversation id")]
    MissingConversation,
    /// The anti-forgery hidden field is absent from the page.
    #[error("missing anti-forgery field `{0}`")]
    MissingCsrfToken(String),
    /// A DOM call threw a JavaScript exception.
    #[error("javascript error: {0}")]
    Js(String),
    /// The real-time channel could not be opened or failed mid-stream.
    #[error("channel error: {0}")]
    Channel(String),
    /// The upload request could not complete.
    #[error("upload failed: {0}")]
    Upload(String),
}

#[cfg(feature = "hydrate")]
impl From<wasm_bindgen::JsValue> for WidgetError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        use wasm_bindgen::JsCast;

        let text = value
            .as_string()
            .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
            .or_else(|| {
                js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_else(|| "unknown exception".to_owned());
        Self::Js(text)
    }
}
