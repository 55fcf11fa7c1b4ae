//! Duplicate-submission guard wired onto every form on the page.
//!
//! Installed once at DOM-ready; forms inserted later are not covered. The
//! restore timer is a safety net, not a completion signal: it fires after
//! the configured timeout whatever became of the request.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlButtonElement, HtmlFormElement};

use crate::config::GuardConfig;
use crate::error::WidgetError;
use crate::state::guard::{ButtonFace, ButtonGuard};

const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";

/// Attach the guard to every form currently in `document`.
///
/// Returns the number of guarded forms.
///
/// # Errors
///
/// Propagates a DOM exception from the form query or listener registration.
pub fn install_submit_guards(document: &Document, config: &GuardConfig) -> Result<u32, WidgetError> {
    let forms = document.query_selector_all("form")?;
    let mut guarded = 0;

    for index in 0..forms.length() {
        let Some(form) = forms.item(index).and_then(|node| node.dyn_into::<HtmlFormElement>().ok()) else {
            continue;
        };
        guard_form(&form, config.clone())?;
        guarded += 1;
    }

    log::debug!("submit guard installed on {guarded} form(s)");
    Ok(guarded)
}

fn guard_form(form: &HtmlFormElement, config: GuardConfig) -> Result<(), WidgetError> {
    let guard = Rc::new(RefCell::new(ButtonGuard::default()));
    let target = form.clone();

    let on_submit = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        let Some(button) = submit_button(&target) else {
            return;
        };

        let placeholder = config.label_for(button.get_attribute("data-saving-label"));
        let face = guard.borrow_mut().engage(&button.inner_html(), &placeholder);
        apply_face(&button, &face);

        let guard = Rc::clone(&guard);
        Timeout::new(config.timeout_ms, move || {
            let restored = guard.borrow_mut().release();
            if let Some(face) = restored {
                apply_face(&button, &face);
            }
        })
        .forget();
    });

    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();
    Ok(())
}

fn submit_button(form: &HtmlFormElement) -> Option<HtmlButtonElement> {
    form.query_selector(SUBMIT_BUTTON)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
}

fn apply_face(button: &HtmlButtonElement, face: &ButtonFace) {
    button.set_disabled(face.disabled);
    button.set_inner_html(&face.label);
}
