//! Conversation state for the chat widget.
//!
//! DESIGN
//! ======
//! `ChatState` never touches the DOM. Every operation returns an ordered
//! list of [`ChatEffect`]s that the widget applies as-is, so ordering
//! guarantees (render before transmit before clear, cancel before re-arm)
//! live here and are covered by native tests.
//!
//! Messages are not stored: once rendered they exist only as DOM nodes. The
//! state keeps the typing indicator, the channel lifecycle, and, under
//! [`EchoPolicy::Reconcile`], a short queue of unconfirmed local echoes.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::VecDeque;

use uuid::Uuid;

use crate::config::{ChatConfig, EchoPolicy};
use crate::net::channel::{ChannelEvent, ChannelLifecycle};
use crate::net::types::{BroadcastMessage, ClientEvent, ServerEvent};
use crate::net::upload::UploadOutcome;
use crate::util::markup::typing_label;

/// Upper bound on unconfirmed local echoes kept for reconciliation.
pub const MAX_PENDING_ECHOES: usize = 64;

/// Display name for a typing signal that carries no username.
pub const UNKNOWN_TYPIST: &str = "Someone";

// =============================================================================
// VIEW TYPES
// =============================================================================

/// Which side of the conversation a bubble is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Own,
    Other,
}

/// Everything needed to draw one message bubble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageView {
    /// Set on optimistic echoes so a later server broadcast can confirm them.
    pub local_id: Option<Uuid>,
    pub sender_name: Option<String>,
    pub content: String,
    /// ISO-8601 creation time, formatted to a local time of day on render.
    pub created_at: Option<String>,
    pub side: Side,
}

/// Identifies one arming of the typing-indicator timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypingTicket(u64);

/// A single DOM or channel action, applied in list order.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEffect {
    /// Append an escaped message bubble to the list.
    Render(MessageView),
    /// Mark the optimistic bubble with this local id as confirmed.
    Confirm(Uuid),
    /// Send a frame over the channel without waiting for acknowledgment.
    Transmit(ClientEvent),
    ClearInput,
    ScrollToBottom,
    /// Drop any pending typing-indicator timer.
    CancelTypingTimer,
    /// Create the indicator if absent, then set its text.
    ShowTyping(String),
    /// Schedule [`ChatState::expire_typing`] with `ticket` after `delay_ms`.
    ArmTypingTimer { ticket: TypingTicket, delay_ms: u32 },
    RemoveTyping,
    /// Append server-rendered markup verbatim.
    AppendFragment(String),
    ResetUploadForm,
    /// Show a blocking alert.
    Alert(String),
}

/// What a key press in the message input means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyIntent {
    /// Enter without Shift: suppress the newline and send.
    Send,
    /// Any other key: notify the channel that the viewer is typing.
    Typing,
}

/// Classify a `keypress` by its `key` value and Shift state.
pub fn classify_keypress(key: &str, shift: bool) -> KeyIntent {
    if key == "Enter" && !shift { KeyIntent::Send } else { KeyIntent::Typing }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TypingIndicator {
    username: String,
    ticket: TypingTicket,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingEcho {
    local_id: Uuid,
    content: String,
}

// =============================================================================
// STATE
// =============================================================================

/// Client-side state of one conversation view.
#[derive(Clone, Debug)]
pub struct ChatState {
    viewer_id: Option<i64>,
    config: ChatConfig,
    channel: ChannelLifecycle,
    typing: Option<TypingIndicator>,
    next_ticket: u64,
    pending: VecDeque<PendingEcho>,
}

impl ChatState {
    pub fn new(viewer_id: Option<i64>, config: ChatConfig) -> Self {
        Self {
            viewer_id,
            config,
            channel: ChannelLifecycle::default(),
            typing: None,
            next_ticket: 0,
            pending: VecDeque::new(),
        }
    }

    fn is_viewer(&self, sender_id: Option<i64>) -> bool {
        self.viewer_id.is_some() && sender_id == self.viewer_id
    }

    /// `Transmit` for `event`, or nothing once the channel has closed.
    fn transmit(&self, event: ClientEvent) -> Option<ChatEffect> {
        if self.channel.is_live() {
            Some(ChatEffect::Transmit(event))
        } else {
            log::debug!("chat channel closed, not sending {event:?}");
            None
        }
    }

    // -------------------------------------------------------------------------
    // OUTGOING
    // -------------------------------------------------------------------------

    /// Send the input field's text: optimistic render, transmit, clear.
    ///
    /// `now` is the current wall-clock time as an ISO-8601 string.
    /// Whitespace-only input produces no effects.
    pub fn compose(&mut self, raw: &str, now: &str) -> Vec<ChatEffect> {
        let text = raw.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let local_id = Uuid::new_v4();
        if self.config.echo_policy == EchoPolicy::Reconcile {
            if self.pending.len() == MAX_PENDING_ECHOES {
                self.pending.pop_front();
            }
            self.pending.push_back(PendingEcho { local_id, content: text.to_owned() });
        }

        let view = MessageView {
            local_id: Some(local_id),
            sender_name: Some(self.config.self_label.clone()),
            content: text.to_owned(),
            created_at: Some(now.to_owned()),
            side: Side::Own,
        };

        let mut effects = vec![ChatEffect::Render(view), ChatEffect::ScrollToBottom];
        effects.extend(self.transmit(ClientEvent::MessageSend { text: text.to_owned() }));
        effects.push(ChatEffect::ClearInput);
        effects
    }

    /// Keystroke notification; sent on every qualifying key, unthrottled.
    pub fn typing_signal(&self) -> Vec<ChatEffect> {
        self.transmit(ClientEvent::Typing).into_iter().collect()
    }

    // -------------------------------------------------------------------------
    // INCOMING
    // -------------------------------------------------------------------------

    /// Handle one raw text frame from the channel.
    ///
    /// Malformed frames are logged and yield no effects; later frames are
    /// processed normally.
    pub fn receive(&mut self, raw: &str) -> Vec<ChatEffect> {
        match ServerEvent::decode(raw) {
            Ok(event) => self.apply_event(event),
            Err(e) => {
                log::error!("chat frame parse error: {e}");
                Vec::new()
            }
        }
    }

    /// Handle one decoded frame.
    pub fn apply_event(&mut self, event: ServerEvent) -> Vec<ChatEffect> {
        match event {
            ServerEvent::MessageBroadcast { message } => self.accept_broadcast(message),
            ServerEvent::Typing { username, user_id } => {
                if self.config.ignore_own_typing && user_id.is_some() && self.is_viewer(user_id) {
                    return Vec::new();
                }
                let name = username
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_TYPIST.to_owned());
                self.show_typing(&name)
            }
            ServerEvent::Unknown => Vec::new(),
        }
    }

    fn accept_broadcast(&mut self, message: BroadcastMessage) -> Vec<ChatEffect> {
        let own = self.is_viewer(message.sender_id);

        if own {
            match self.config.echo_policy {
                EchoPolicy::Duplicate => {}
                EchoPolicy::SuppressOwn => return Vec::new(),
                EchoPolicy::Reconcile => {
                    let content = message.content.as_deref().unwrap_or_default();
                    if let Some(pos) = self.pending.iter().position(|p| p.content == content) {
                        if let Some(echo) = self.pending.remove(pos) {
                            return vec![ChatEffect::Confirm(echo.local_id)];
                        }
                    }
                }
            }
        }

        let view = MessageView {
            local_id: None,
            sender_name: message.sender_username,
            content: message.content.unwrap_or_default(),
            created_at: message.created_at,
            side: if own { Side::Own } else { Side::Other },
        };

        vec![ChatEffect::Render(view), ChatEffect::ScrollToBottom]
    }

    /// Show (or refresh) the single conversation-wide typing indicator.
    pub fn show_typing(&mut self, username: &str) -> Vec<ChatEffect> {
        let ticket = TypingTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.typing = Some(TypingIndicator { username: username.to_owned(), ticket });

        vec![
            ChatEffect::CancelTypingTimer,
            ChatEffect::ShowTyping(typing_label(username)),
            ChatEffect::ScrollToBottom,
            ChatEffect::ArmTypingTimer { ticket, delay_ms: self.config.typing_linger_ms },
        ]
    }

    /// Timer callback: remove the indicator only if `ticket` is the latest.
    pub fn expire_typing(&mut self, ticket: TypingTicket) -> Vec<ChatEffect> {
        match &self.typing {
            Some(current) if current.ticket == ticket => {
                self.typing = None;
                vec![ChatEffect::RemoveTyping]
            }
            _ => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // CHANNEL + UPLOAD
    // -------------------------------------------------------------------------

    /// Record a channel lifecycle event.
    pub fn channel_event(&mut self, event: &ChannelEvent) -> bool {
        self.channel.apply(event)
    }

    /// Effects of a finished upload request.
    pub fn upload_settled(&mut self, outcome: UploadOutcome) -> Vec<ChatEffect> {
        match outcome {
            UploadOutcome::Inserted(html) => vec![
                ChatEffect::AppendFragment(html),
                ChatEffect::ScrollToBottom,
                ChatEffect::ResetUploadForm,
                ChatEffect::ClearInput,
            ],
            UploadOutcome::Rejected(message) => vec![ChatEffect::Alert(message)],
            UploadOutcome::Unexpected(data) => {
                log::warn!("unexpected upload response: {data}");
                Vec::new()
            }
            UploadOutcome::NotJson(text) => {
                log::error!("upload response not JSON: {text}");
                Vec::new()
            }
        }
    }
}
