//! Networking modules for the chat channel and attachment uploads.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the channel wire schema, `channel` owns the socket
//! lifecycle, and `upload` handles the multipart request and its response.

pub mod channel;
pub mod types;
pub mod upload;
