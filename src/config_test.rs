use std::collections::HashMap;

use super::*;

fn dataset(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

// =============================================================
// EchoPolicy
// =============================================================

#[test]
fn echo_policy_parses_kebab_case_names() {
    assert_eq!("duplicate".parse::<EchoPolicy>(), Ok(EchoPolicy::Duplicate));
    assert_eq!("Suppress-Own".parse::<EchoPolicy>(), Ok(EchoPolicy::SuppressOwn));
    assert_eq!(" reconcile ".parse::<EchoPolicy>(), Ok(EchoPolicy::Reconcile));
    assert!("dedupe".parse::<EchoPolicy>().is_err());
}

#[test]
fn echo_policy_serde_uses_same_names_as_display() {
    let json = serde_json::to_string(&EchoPolicy::SuppressOwn).unwrap();
    assert_eq!(json, "\"suppress-own\"");
    assert_eq!(EchoPolicy::SuppressOwn.to_string(), "suppress-own");
}

// =============================================================
// ChatConfig
// =============================================================

#[test]
fn chat_config_defaults_match_fixed_constants() {
    let config = ChatConfig::default();
    assert_eq!(config.typing_linger_ms, 1_500);
    assert_eq!(config.echo_policy, EchoPolicy::Duplicate);
    assert_eq!(config.self_label, "You");
    assert!(!config.ignore_own_typing);
    assert_eq!(config.csrf_field, "csrfmiddlewaretoken");
}

#[test]
fn chat_config_applies_valid_overrides() {
    let config = ChatConfig::from_dataset(dataset(&[
        ("typingLingerMs", "2500"),
        ("echoPolicy", "reconcile"),
        ("ignoreOwnTyping", ""),
        ("selfLabel", "Me"),
    ]));
    assert_eq!(config.typing_linger_ms, 2_500);
    assert_eq!(config.echo_policy, EchoPolicy::Reconcile);
    assert!(config.ignore_own_typing);
    assert_eq!(config.self_label, "Me");
}

#[test]
fn chat_config_ignores_invalid_overrides() {
    let config = ChatConfig::from_dataset(dataset(&[
        ("typingLingerMs", "soon"),
        ("echoPolicy", "maybe"),
        ("ignoreOwnTyping", "perhaps"),
        ("selfLabel", "   "),
    ]));
    assert_eq!(config, ChatConfig::default());
}

#[test]
fn chat_config_rejects_zero_linger() {
    let config = ChatConfig::from_dataset(dataset(&[("typingLingerMs", "0")]));
    assert_eq!(config.typing_linger_ms, TYPING_LINGER_MS);
}

#[test]
fn channel_url_follows_page_scheme() {
    let config = ChatConfig::default();
    assert_eq!(config.channel_url("https:", "school.example", "42"), "wss://school.example/ws/chat/42/");
    assert_eq!(config.channel_url("http:", "localhost:8000", "7"), "ws://localhost:8000/ws/chat/7/");
}

// =============================================================
// GuardConfig
// =============================================================

#[test]
fn guard_config_defaults() {
    let config = GuardConfig::default();
    assert_eq!(config.timeout_ms, 10_000);
    assert_eq!(config.saving_label, "Saving...");
}

#[test]
fn guard_label_prefers_non_blank_button_override() {
    let config = GuardConfig::default();
    assert_eq!(config.label_for(Some("Uploading...".to_owned())), "Uploading...");
    assert_eq!(config.label_for(Some(" ".to_owned())), "Saving...");
    assert_eq!(config.label_for(None), "Saving...");
}

// =============================================================
// ChatContext
// =============================================================

#[test]
fn context_requires_conversation_id() {
    let err = ChatContext::resolve(None, Some("3".to_owned()), None).unwrap_err();
    assert_eq!(err, WidgetError::MissingConversation);

    let err = ChatContext::resolve(Some("  ".to_owned()), None, None).unwrap_err();
    assert_eq!(err, WidgetError::MissingConversation);
}

#[test]
fn context_prefers_attribute_then_global_user() {
    let ctx = ChatContext::resolve(Some("9".to_owned()), Some("12".to_owned()), Some("99".to_owned())).unwrap();
    assert_eq!(ctx.conversation_id, "9");
    assert_eq!(ctx.viewer_id, Some(12));

    let ctx = ChatContext::resolve(Some("9".to_owned()), Some(String::new()), Some("99".to_owned())).unwrap();
    assert_eq!(ctx.viewer_id, Some(99));
}

#[test]
fn context_without_parseable_identity_has_no_viewer() {
    let ctx = ChatContext::resolve(Some("9".to_owned()), Some("anon".to_owned()), None).unwrap();
    assert_eq!(ctx.viewer_id, None);
}

#[test]
fn parse_user_id_behaves_like_parse_int() {
    assert_eq!(parse_user_id("42"), Some(42));
    assert_eq!(parse_user_id("  17px"), Some(17));
    assert_eq!(parse_user_id("-3"), Some(-3));
    assert_eq!(parse_user_id("x1"), None);
    assert_eq!(parse_user_id(""), None);
}
