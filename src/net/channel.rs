//! Real-time channel lifecycle and the browser socket loop.
//!
//! DESIGN
//! ======
//! The lifecycle is `Connecting -> Open -> Closed`. Errors are counted but
//! never change the phase by themselves; the transport decides whether a
//! close follows. `Closed` is terminal: there is no reconnect, so once the
//! socket goes away the widget stays inert for real-time events until the
//! page reloads.
//!
//! The socket loop follows the frame client shape: an unbounded queue feeds
//! a writer task, a reader task forwards text frames, and whichever task
//! finishes first ends the connection.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

#[cfg(feature = "hydrate")]
use crate::error::WidgetError;
#[cfg(feature = "hydrate")]
use crate::net::types::ClientEvent;

/// Phase of the real-time channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelStatus {
    #[default]
    Connecting,
    Open,
    Closed,
}

/// Transport notification fed into [`ChannelLifecycle::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Errored(String),
    Closed { code: u16, reason: String },
}

/// Phase plus error bookkeeping for one channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelLifecycle {
    status: ChannelStatus,
    errors: u32,
}

impl ChannelLifecycle {
    /// Whether outgoing frames can still reach the server.
    pub fn is_live(&self) -> bool {
        self.status != ChannelStatus::Closed
    }

    /// Apply a transport event and log it. Returns `true` if the phase
    /// changed.
    pub fn apply(&mut self, event: &ChannelEvent) -> bool {
        if self.status == ChannelStatus::Closed {
            log::debug!("channel already closed, ignoring {event:?}");
            return false;
        }

        let next = match event {
            ChannelEvent::Opened => {
                log::info!("chat channel connected");
                ChannelStatus::Open
            }
            ChannelEvent::Errored(reason) => {
                self.errors = self.errors.saturating_add(1);
                log::error!("chat channel error #{}: {reason}", self.errors);
                self.status
            }
            ChannelEvent::Closed { code, reason } => {
                log::warn!("chat channel disconnected (code {code}): {reason}; real-time updates stop until reload");
                ChannelStatus::Closed
            }
        };

        let changed = next != self.status;
        self.status = next;
        changed
    }
}

/// Browser `readyState` of a socket, as seen once its sink reports ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Open,
    Closing,
    Closed,
}

#[cfg(feature = "hydrate")]
impl From<gloo_net::websocket::State> for SocketState {
    fn from(state: gloo_net::websocket::State) -> Self {
        use gloo_net::websocket::State;

        match state {
            State::Connecting => Self::Connecting,
            State::Open => Self::Open,
            State::Closing => Self::Closing,
            State::Closed => Self::Closed,
        }
    }
}

/// Lifecycle event for a socket whose sink just became ready.
///
/// The sink also wakes when a handshake fails, so readiness alone does not
/// mean the socket opened; only `Open` does.
pub fn open_outcome(state: SocketState) -> Option<ChannelEvent> {
    match state {
        SocketState::Open => Some(ChannelEvent::Opened),
        other => {
            log::debug!("chat channel ready in state {other:?}, not opened");
            None
        }
    }
}

/// Queue one event for the socket writer.
///
/// Returns `false` if the event could not be queued because the channel
/// has shut down; the frame is dropped, matching a send on a closed socket.
#[cfg(feature = "hydrate")]
pub fn send_event(tx: &futures::channel::mpsc::UnboundedSender<String>, event: &ClientEvent) -> bool {
    match event.encode() {
        Ok(json) => {
            let queued = tx.unbounded_send(json).is_ok();
            if !queued {
                log::debug!("chat channel closed, dropping outgoing frame");
            }
            queued
        }
        Err(e) => {
            log::error!("failed to encode outgoing frame: {e}");
            false
        }
    }
}

/// Open the socket at `url` and run it as a local task.
///
/// `outbound` is the receiving end of the widget's frame queue; frames
/// queued before the socket opens are flushed once it does. `on_event`
/// receives lifecycle events and `on_frame` every inbound text frame.
///
/// # Errors
///
/// Returns [`WidgetError::Channel`] if the browser refuses to create the
/// socket (for example a malformed URL).
#[cfg(feature = "hydrate")]
pub fn spawn_channel<E, F>(
    url: &str,
    outbound: futures::channel::mpsc::UnboundedReceiver<String>,
    on_event: E,
    on_frame: F,
) -> Result<(), WidgetError>
where
    E: Fn(ChannelEvent) + 'static,
    F: Fn(&str) + 'static,
{
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| WidgetError::Channel(e.to_string()))?;

    log::debug!("opening chat channel {url}");
    wasm_bindgen_futures::spawn_local(run_channel(ws, outbound, on_event, on_frame));

    Ok(())
}

/// Drive one socket until the server side goes away.
#[cfg(feature = "hydrate")]
async fn run_channel<E, F>(
    mut ws: gloo_net::websocket::futures::WebSocket,
    mut rx: futures::channel::mpsc::UnboundedReceiver<String>,
    on_event: E,
    on_frame: F,
) where
    E: Fn(ChannelEvent),
    F: Fn(&str),
{
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::{Message, WebSocketError};

    // Wait for the handshake on the whole socket; inbound frames buffer
    // inside it until the reader starts.
    let ready = futures::future::poll_fn(|cx| ws.poll_ready_unpin(cx)).await.is_ok();
    let opened = if ready { open_outcome(ws.state().into()) } else { None };
    let mut writable = opened.is_some();
    if let Some(event) = opened {
        on_event(event);
    }

    let (mut ws_write, mut ws_read) = ws.split();

    // Writer: forward queued frames.
    let send_task = async {
        while let Some(text) = rx.next().await {
            if !writable {
                log::debug!("chat channel not writable, dropping outgoing frame");
                continue;
            }
            if let Err(e) = ws_write.send(Message::Text(text)).await {
                log::warn!("chat channel send failed: {e}");
                writable = false;
            }
        }
    };

    // Reader: forward text frames until close.
    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => on_frame(&text),
                Ok(Message::Bytes(bytes)) => {
                    log::debug!("ignoring {} byte binary frame", bytes.len());
                }
                Err(WebSocketError::ConnectionClose(close)) => {
                    on_event(ChannelEvent::Closed { code: close.code, reason: close.reason });
                    return;
                }
                Err(e) => on_event(ChannelEvent::Errored(e.to_string())),
            }
        }
        on_event(ChannelEvent::Closed { code: 1000, reason: "stream ended".to_owned() });
    };

    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;
}
