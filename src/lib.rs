//! # campus-ui
//!
//! WASM behaviour layered on the school portal's server-rendered pages:
//! a duplicate-submission guard for every form, and the conversation chat
//! widget (real-time channel, optimistic echo, typing indicator, and
//! attachment uploads that return pre-rendered fragments).
//!
//! Everything that touches the browser lives in `components` and in the
//! `hydrate`-gated parts of `net`; the state machines, wire types, and
//! templates compile and test natively.

#[cfg(feature = "hydrate")]
pub mod components;
pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod util;

/// WASM entry point: route panics and logs to the console, then bind the
/// widgets once the document is ready.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    components::on_dom_ready(components::boot);
}
