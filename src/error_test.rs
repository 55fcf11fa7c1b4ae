use super::*;

#[test]
fn missing_element_names_the_selector() {
    let err = WidgetError::MissingElement("#messages");
    assert_eq!(err.to_string(), "missing element: #messages");
}

#[test]
fn missing_csrf_token_names_the_field() {
    let err = WidgetError::MissingCsrfToken("csrfmiddlewaretoken".to_owned());
    assert_eq!(err.to_string(), "missing anti-forgery field `csrfmiddlewaretoken`");
}

#[test]
fn upload_error_keeps_transport_message() {
    let err = WidgetError::Upload("NetworkError".to_owned());
    assert_eq!(err.to_string(), "upload failed: NetworkError");
}
