//! Chat widget bound to the server-rendered conversation page.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page renders `.chat-container` with the message list, the input, the
//! send button, and the upload form. This module looks those up once,
//! opens the real-time channel, and routes every DOM, channel, and timer
//! event through `ChatState`, applying the returned effects in order.
//!
//! TRADE-OFFS
//! ==========
//! Chat text is rendered through the escaping templates in
//! `crate::util::markup`; upload fragments come from the server already
//! rendered and are inserted verbatim. The typing timer is a single stored
//! `Timeout`; replacing it drops, and so cancels, the previous one.

use futures::channel::mpsc::{self, UnboundedSender};
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement, Window};

use crate::config::{ChatConfig, ChatContext};
use crate::error::WidgetError;
use crate::net::channel::{send_event, spawn_channel};
use crate::net::upload::{classify_upload_response, submit_upload};
use crate::state::chat::{ChatEffect, ChatState, KeyIntent, MessageView, classify_keypress};
use crate::util::clock::{format_time_of_day, offset_at};
use crate::util::markup::{bubble_inner_html, message_class};

const CONTAINER: &str = ".chat-container";
const MESSAGES_ID: &str = "messages";
const INPUT_ID: &str = "messageInput";
const SEND_BUTTON_ID: &str = "sendBtn";
const UPLOAD_FORM_ID: &str = "uploadForm";
const TYPING_INDICATOR_ID: &str = "typingIndicator";

// =============================================================================
// DOM HANDLES
// =============================================================================

/// The message input is an `<input>` or a `<textarea>` depending on the page.
#[derive(Clone)]
enum MessageInput {
    Line(HtmlInputElement),
    Area(HtmlTextAreaElement),
}

impl MessageInput {
    fn from_element(el: Element) -> Option<Self> {
        match el.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => Some(Self::Area(area)),
            Err(el) => el.dyn_into::<HtmlInputElement>().ok().map(Self::Line),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Line(input) => input.value(),
            Self::Area(area) => area.value(),
        }
    }

    fn clear(&self) {
        match self {
            Self::Line(input) => input.set_value(""),
            Self::Area(area) => area.set_value(""),
        }
    }

    fn element(&self) -> &HtmlElement {
        match self {
            Self::Line(input) => input,
            Self::Area(area) => area,
        }
    }
}

#[derive(Clone)]
struct ChatDom {
    window: Window,
    document: Document,
    messages: Element,
    input: MessageInput,
    send_button: Element,
    upload_form: HtmlFormElement,
}

impl ChatDom {
    fn locate(window: Window, document: Document) -> Result<Self, WidgetError> {
        let by_id = |id: &'static str| document.get_element_by_id(id).ok_or(WidgetError::MissingElement(id));

        let messages = by_id(MESSAGES_ID)?;
        let input = MessageInput::from_element(by_id(INPUT_ID)?).ok_or(WidgetError::MissingElement(INPUT_ID))?;
        let send_button = by_id(SEND_BUTTON_ID)?;
        let upload_form = by_id(UPLOAD_FORM_ID)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| WidgetError::MissingElement(UPLOAD_FORM_ID))?;

        Ok(Self { window, document, messages, input, send_button, upload_form })
    }

    fn scroll_to_bottom(&self) {
        self.messages.set_scroll_top(self.messages.scroll_height());
    }

    fn render_message(&self, view: &MessageView) -> Result<(), WidgetError> {
        let offset = offset_at(
            view.created_at.as_deref(),
            |at| js_sys::Date::new(&JsValue::from_str(at)).get_timezone_offset(),
            js_sys::Date::new_0().get_timezone_offset(),
        );
        let time_label = format_time_of_day(view.created_at.as_deref(), offset);

        let el = self.document.create_element("div")?;
        el.set_class_name(message_class(view.side));
        if let Some(local_id) = view.local_id {
            el.set_attribute("data-local-id", &local_id.to_string())?;
        }
        el.set_inner_html(&bubble_inner_html(view, &time_label));
        self.messages.append_child(&el)?;
        Ok(())
    }

    fn confirm_message(&self, local_id: uuid::Uuid) -> Result<(), WidgetError> {
        let selector = format!("[data-local-id=\"{local_id}\"]");
        if let Some(el) = self.messages.query_selector(&selector)? {
            el.set_attribute("data-confirmed", "true")?;
        }
        Ok(())
    }

    fn show_typing(&self, label: &str) -> Result<(), WidgetError> {
        let indicator = match self.document.get_element_by_id(TYPING_INDICATOR_ID) {
            Some(existing) => existing,
            None => {
                let el = self.document.create_element("div")?;
                el.set_id(TYPING_INDICATOR_ID);
                el.set_class_name("typing-indicator");
                self.messages.append_child(&el)?;
                el
            }
        };
        indicator.set_text_content(Some(label));
        Ok(())
    }

    fn remove_typing(&self) {
        if let Some(indicator) = self.document.get_element_by_id(TYPING_INDICATOR_ID) {
            indicator.remove();
        }
    }
}

// =============================================================================
// WIDGET
// =============================================================================

#[derive(Clone)]
struct ChatWidget {
    dom: ChatDom,
    chat: RwSignal<ChatState>,
    typing_timer: StoredValue<Option<Timeout>, LocalStorage>,
    outbound: UnboundedSender<String>,
    csrf_field: String,
}

impl ChatWidget {
    fn apply(&self, effects: Vec<ChatEffect>) {
        for effect in effects {
            if let Err(e) = self.apply_one(effect) {
                log::error!("chat view update failed: {e}");
            }
        }
    }

    fn apply_one(&self, effect: ChatEffect) -> Result<(), WidgetError> {
        match effect {
            ChatEffect::Render(view) => self.dom.render_message(&view)?,
            ChatEffect::Confirm(local_id) => self.dom.confirm_message(local_id)?,
            ChatEffect::Transmit(event) => {
                send_event(&self.outbound, &event);
            }
            ChatEffect::ClearInput => self.dom.input.clear(),
            ChatEffect::ScrollToBottom => self.dom.scroll_to_bottom(),
            ChatEffect::CancelTypingTimer => self.typing_timer.set_value(None),
            ChatEffect::ShowTyping(label) => self.dom.show_typing(&label)?,
            ChatEffect::ArmTypingTimer { ticket, delay_ms } => {
                let widget = self.clone();
                let timeout = Timeout::new(delay_ms, move || {
                    let effects = widget.chat.try_update(|c| c.expire_typing(ticket)).unwrap_or_default();
                    widget.apply(effects);
                });
                self.typing_timer.set_value(Some(timeout));
            }
            ChatEffect::RemoveTyping => self.dom.remove_typing(),
            ChatEffect::AppendFragment(html) => self.dom.messages.insert_adjacent_html("beforeend", &html)?,
            ChatEffect::ResetUploadForm => self.dom.upload_form.reset(),
            ChatEffect::Alert(message) => self.dom.window.alert_with_message(&message)?,
        }
        Ok(())
    }

    fn send_text(&self) {
        let text = self.dom.input.value();
        let now = String::from(js_sys::Date::new_0().to_iso_string());
        let effects = self.chat.try_update(|c| c.compose(&text, &now)).unwrap_or_default();
        self.apply(effects);
    }

    fn on_frame(&self, raw: &str) {
        let effects = self.chat.try_update(|c| c.receive(raw)).unwrap_or_default();
        self.apply(effects);
    }

    fn upload(&self) {
        let widget = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match submit_upload(&widget.dom.document, &widget.dom.upload_form, &widget.csrf_field).await {
                Ok(body) => {
                    let outcome = classify_upload_response(&body);
                    let effects = widget.chat.try_update(|c| c.upload_settled(outcome)).unwrap_or_default();
                    widget.apply(effects);
                }
                Err(e) => log::error!("{e}"),
            }
        });
    }
}

// =============================================================================
// MOUNT
// =============================================================================

/// Bind the chat widget if the page has a chat container.
///
/// Returns `Ok(false)` when there is no container on this page.
///
/// # Errors
///
/// Returns an error if the container lacks a conversation id, a required
/// element is missing, or the channel cannot be opened.
pub fn mount_chat_widget(window: &Window, document: &Document) -> Result<bool, WidgetError> {
    let Some(container) = document
        .query_selector(CONTAINER)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(false);
    };

    let dataset = container.dataset();
    let context = ChatContext::resolve(dataset.get("conversationId"), dataset.get("userId"), global_user_id(window))?;
    let config = ChatConfig::from_dataset(|key| dataset.get(key));
    let dom = ChatDom::locate(window.clone(), document.clone())?;

    let location = window.location();
    let url = config.channel_url(&location.protocol()?, &location.host()?, &context.conversation_id);

    let (outbound, outbound_rx) = mpsc::unbounded::<String>();
    let widget = ChatWidget {
        dom,
        csrf_field: config.csrf_field.clone(),
        chat: RwSignal::new(ChatState::new(context.viewer_id, config)),
        typing_timer: StoredValue::new_local(None),
        outbound,
    };

    let chat = widget.chat;
    let frame_widget = widget.clone();
    spawn_channel(
        &url,
        outbound_rx,
        move |event| {
            chat.update(|c| {
                c.channel_event(&event);
            });
        },
        move |raw| frame_widget.on_frame(raw),
    )?;

    bind_events(&widget)?;

    log::info!(
        "chat widget bound to conversation {} (viewer {:?})",
        context.conversation_id,
        context.viewer_id
    );
    Ok(true)
}

fn bind_events(widget: &ChatWidget) -> Result<(), WidgetError> {
    let on_click = {
        let widget = widget.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| widget.send_text())
    };
    widget
        .dom
        .send_button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let on_keypress = {
        let widget = widget.clone();
        Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
            match classify_keypress(&ev.key(), ev.shift_key()) {
                KeyIntent::Send => {
                    ev.prevent_default();
                    widget.send_text();
                }
                KeyIntent::Typing => {
                    let effects = widget.chat.with_untracked(ChatState::typing_signal);
                    widget.apply(effects);
                }
            }
        })
    };
    widget
        .dom
        .input
        .element()
        .add_event_listener_with_callback("keypress", on_keypress.as_ref().unchecked_ref())?;
    on_keypress.forget();

    let on_upload = {
        let widget = widget.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
            ev.prevent_default();
            widget.upload();
        })
    };
    widget
        .dom
        .upload_form
        .add_event_listener_with_callback("submit", on_upload.as_ref().unchecked_ref())?;
    on_upload.forget();

    Ok(())
}

/// Page-global `window.userId`, as a string, if the page defines one.
fn global_user_id(window: &Window) -> Option<String> {
    let value = js_sys::Reflect::get(window, &JsValue::from_str("userId")).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    value.as_string().or_else(|| value.as_f64().map(|n| n.to_string()))
}
