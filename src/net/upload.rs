//! Attachment upload over an asynchronous multipart POST.
//!
//! The endpoint answers with `{ success, html?, error? }`. The body is read
//! as text first so that a non-JSON answer (an HTML error page, a proxy
//! message) can be logged verbatim instead of surfacing as a parse error.
//!
//! ERROR HANDLING
//! ==============
//! Only an explicit `error` field reaches the user (as an alert). Transport
//! failures, non-JSON bodies, and unrecognized payloads are logged and
//! otherwise dropped; nothing is retried.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use serde_json::Value;

#[cfg(feature = "hydrate")]
use crate::error::WidgetError;

/// Headers sent with every upload besides the anti-forgery token.
pub const UPLOAD_HEADERS: [(&str, &str); 2] =
    [("X-Requested-With", "XMLHttpRequest"), ("Accept", "application/json")];

/// Header carrying the anti-forgery token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Classified upload response.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadOutcome {
    /// Server-rendered markup to append to the message list.
    Inserted(String),
    /// Application error to show to the user.
    Rejected(String),
    /// Valid JSON of no recognized shape.
    Unexpected(Value),
    /// Body that is not JSON at all.
    NotJson(String),
}

/// Classify a raw response body.
///
/// Success wins over error when both are present; `success` and `error`
/// use JavaScript truthiness so `1`/`"yes"` count and `""`/`0` do not.
pub fn classify_upload_response(body: &str) -> UploadOutcome {
    let data: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return UploadOutcome::NotJson(body.to_owned()),
    };

    let html = data.get("html").filter(|v| is_truthy(v));
    if data.get("success").is_some_and(is_truthy) {
        if let Some(html) = html {
            return UploadOutcome::Inserted(stringify(html));
        }
    }

    if let Some(error) = data.get("error").filter(|v| is_truthy(v)) {
        return UploadOutcome::Rejected(stringify(error));
    }

    UploadOutcome::Unexpected(data)
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// POST `form` to its `action` as multipart data and return the raw body.
///
/// # Errors
///
/// Returns [`WidgetError::MissingCsrfToken`] if the page has no token
/// field, or [`WidgetError::Upload`] if the request cannot complete.
#[cfg(feature = "hydrate")]
pub async fn submit_upload(
    document: &web_sys::Document,
    form: &web_sys::HtmlFormElement,
    csrf_field: &str,
) -> Result<String, WidgetError> {
    use wasm_bindgen::JsCast;

    let token = document
        .query_selector(&format!("[name={csrf_field}]"))?
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
        .ok_or_else(|| WidgetError::MissingCsrfToken(csrf_field.to_owned()))?;

    let body = web_sys::FormData::new_with_form(form)?;
    let action = form.action();

    let mut request = gloo_net::http::Request::post(&action).header(CSRF_HEADER, &token);
    for (name, value) in UPLOAD_HEADERS {
        request = request.header(name, value);
    }

    let response = request
        .body(body)
        .map_err(|e| WidgetError::Upload(e.to_string()))?
        .send()
        .await
        .map_err(|e| WidgetError::Upload(e.to_string()))?;

    log::debug!("upload to {action} answered {}", response.status());

    response.text().await.map_err(|e| WidgetError::Upload(e.to_string()))
}
