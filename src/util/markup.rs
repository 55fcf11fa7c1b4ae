//! HTML templates for chat bubbles and the typing indicator.
//!
//! TRADE-OFFS
//! ==========
//! User-entered text (content and sender names) always goes through
//! [`escape_html`]. Server-rendered upload fragments never pass through this
//! module; they are inserted verbatim by the chat widget.

#[cfg(test)]
#[path = "markup_test.rs"]
mod markup_test;

use crate::state::chat::{MessageView, Side};

/// Display name used when a message carries no sender name.
pub const UNKNOWN_SENDER: &str = "User";

/// Escape text for insertion into element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Single upper-cased initial for the avatar, `"?"` without a usable name.
pub fn avatar_initial(sender_name: Option<&str>) -> String {
    sender_name
        .and_then(|name| name.chars().next())
        .map_or_else(|| "?".to_owned(), |c| c.to_uppercase().collect())
}

/// Class list of the outer message element.
pub fn message_class(side: Side) -> &'static str {
    match side {
        Side::Own => "chat-message self",
        Side::Other => "chat-message other",
    }
}

/// Inner markup of one message element: avatar followed by the bubble.
///
/// `time_label` is the already formatted time of day.
pub fn bubble_inner_html(view: &MessageView, time_label: &str) -> String {
    let sender = view.sender_name.as_deref().filter(|n| !n.is_empty());
    let avatar = escape_html(&avatar_initial(sender));
    let name = escape_html(sender.unwrap_or(UNKNOWN_SENDER));
    let time = escape_html(time_label);
    let text = escape_html(&view.content);

    format!(
        "<div class=\"avatar\">{avatar}</div>\
         <div class=\"bubble\">\
         <div class=\"meta\"><strong>{name}</strong><small>{time}</small></div>\
         <div class=\"text\">{text}</div>\
         </div>"
    )
}

/// Text of the typing indicator.
pub fn typing_label(username: &str) -> String {
    format!("{username} is typing...")
}
