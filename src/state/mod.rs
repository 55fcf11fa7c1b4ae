//! Client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by widget (`chat`, `guard`) and kept free of DOM types so
//! every transition can be tested natively. The browser components in
//! `crate::components` hold these values and apply their results.

pub mod chat;
pub mod guard;
