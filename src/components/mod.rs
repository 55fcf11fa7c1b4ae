//! Browser bindings for the two widgets.
//!
//! Both widgets are bound once the document has parsed; neither depends on
//! the other, and a failure in one is logged without affecting the other.

pub mod chat_widget;
pub mod submit_guard;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::config::GuardConfig;

/// Run `boot` once the DOM is parsed, immediately if it already is.
pub fn on_dom_ready(boot: fn()) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if document.ready_state() != "loading" {
        boot();
        return;
    }

    let callback = Closure::once_into_js(boot);
    if let Err(e) = document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref()) {
        log::error!("could not wait for DOMContentLoaded: {e:?}");
    }
}

/// Bind the submit guard and the chat widget to the current page.
pub fn boot() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    if let Err(e) = submit_guard::install_submit_guards(&document, &GuardConfig::default()) {
        log::error!("submit guard not installed: {e}");
    }

    match chat_widget::mount_chat_widget(&window, &document) {
        Ok(true) => {}
        Ok(false) => log::debug!("no chat container on this page"),
        Err(e) => log::error!("chat widget inactive: {e}"),
    }
}
