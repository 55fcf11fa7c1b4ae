//! Widget configuration and page-supplied context.
//!
//! DESIGN
//! ======
//! Defaults carry the fixed timings and labels. The hosting page can
//! override a few of them through `data-*` attributes on the chat container
//! (or on a submit button for the guard label). Overrides are read through
//! a lookup closure so parsing stays testable without a DOM; invalid values
//! are logged and ignored.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Milliseconds before the submit guard re-enables its button.
pub const GUARD_TIMEOUT_MS: u32 = 10_000;

/// Milliseconds a typing indicator survives without a fresh signal.
pub const TYPING_LINGER_MS: u32 = 1_500;

/// Placeholder label shown on an engaged submit button.
pub const SAVING_LABEL: &str = "Saving...";

/// Hidden form field holding the anti-forgery token.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

// =============================================================================
// ECHO POLICY
// =============================================================================

/// How a broadcast of the viewer's own message is treated after its
/// optimistic echo has already been rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EchoPolicy {
    /// Render every broadcast; a server echo shows up twice.
    #[default]
    Duplicate,
    /// Never render broadcasts sent by the viewer.
    SuppressOwn,
    /// Match own broadcasts against pending local echoes and confirm them.
    Reconcile,
}

impl EchoPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::SuppressOwn => "suppress-own",
            Self::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for EchoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EchoPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duplicate" => Ok(Self::Duplicate),
            "suppress-own" => Ok(Self::SuppressOwn),
            "reconcile" => Ok(Self::Reconcile),
            other => Err(format!("unknown echo policy: {other}")),
        }
    }
}

// =============================================================================
// CHAT CONFIG
// =============================================================================

/// Tunables for the chat widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatConfig {
    pub typing_linger_ms: u32,
    pub echo_policy: EchoPolicy,
    /// Display name used for the viewer's optimistic echoes.
    pub self_label: String,
    /// Drop typing signals whose `user_id` is the viewer's own.
    pub ignore_own_typing: bool,
    /// Path prefix of the real-time endpoint; the conversation id follows.
    pub channel_path: String,
    pub csrf_field: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_linger_ms: TYPING_LINGER_MS,
            echo_policy: EchoPolicy::default(),
            self_label: "You".to_owned(),
            ignore_own_typing: false,
            channel_path: "/ws/chat/".to_owned(),
            csrf_field: CSRF_FIELD.to_owned(),
        }
    }
}

impl ChatConfig {
    /// Apply `data-*` overrides found on the chat container.
    ///
    /// `lookup` receives the dataset key in camel case, the way
    /// `HTMLElement.dataset` exposes it.
    pub fn from_dataset(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("typingLingerMs") {
            match raw.trim().parse::<u32>() {
                Ok(ms) if ms > 0 => config.typing_linger_ms = ms,
                _ => log::warn!("ignoring invalid data-typing-linger-ms: {raw:?}"),
            }
        }

        if let Some(raw) = lookup("echoPolicy") {
            match raw.parse::<EchoPolicy>() {
                Ok(policy) => config.echo_policy = policy,
                Err(e) => log::warn!("ignoring data-echo-policy: {e}"),
            }
        }

        if let Some(raw) = lookup("ignoreOwnTyping") {
            match parse_flag(&raw) {
                Some(flag) => config.ignore_own_typing = flag,
                None => log::warn!("ignoring invalid data-ignore-own-typing: {raw:?}"),
            }
        }

        if let Some(label) = lookup("selfLabel").filter(|l| !l.trim().is_empty()) {
            config.self_label = label;
        }

        config
    }

    /// Real-time endpoint URL for `conversation_id` on the page's host.
    pub fn channel_url(&self, page_protocol: &str, host: &str, conversation_id: &str) -> String {
        let scheme = if page_protocol == "https:" { "wss" } else { "ws" };
        let prefix = self.channel_path.trim_end_matches('/');
        format!("{scheme}://{host}{prefix}/{conversation_id}/")
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// =============================================================================
// GUARD CONFIG
// =============================================================================

/// Tunables for the submit guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    pub timeout_ms: u32,
    pub saving_label: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { timeout_ms: GUARD_TIMEOUT_MS, saving_label: SAVING_LABEL.to_owned() }
    }
}

impl GuardConfig {
    /// Placeholder for one button, honouring its `data-saving-label`.
    pub fn label_for(&self, button_override: Option<String>) -> String {
        button_override
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.saving_label.clone())
    }
}

// =============================================================================
// PAGE CONTEXT
// =============================================================================

/// Conversation and viewer identity supplied by the hosting page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatContext {
    pub conversation_id: String,
    /// `None` when the page gives no parseable identity; such a viewer never
    /// matches a broadcast sender.
    pub viewer_id: Option<i64>,
}

impl ChatContext {
    /// Build the context from the container's `data-conversation-id` and
    /// `data-user-id`, falling back to the page-global user id.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingConversation`] if no conversation id is
    /// present.
    pub fn resolve(
        conversation_attr: Option<String>,
        user_attr: Option<String>,
        global_user: Option<String>,
    ) -> Result<Self, WidgetError> {
        let conversation_id = conversation_attr
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .ok_or(WidgetError::MissingConversation)?;

        let raw_user = user_attr.filter(|u| !u.is_empty()).or(global_user);
        let viewer_id = raw_user.as_deref().and_then(parse_user_id);

        Ok(Self { conversation_id, viewer_id })
    }
}

/// Parse a leading integer the way `parseInt` does: surrounding whitespace
/// and any trailing garbage after the digits are ignored.
pub fn parse_user_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
