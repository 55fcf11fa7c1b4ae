use super::*;

fn closed(code: u16) -> ChannelEvent {
    ChannelEvent::Closed { code, reason: "bye".to_owned() }
}

#[test]
fn lifecycle_starts_connecting_and_live() {
    let lifecycle = ChannelLifecycle::default();
    assert_eq!(lifecycle.status, ChannelStatus::Connecting);
    assert!(lifecycle.is_live());
    assert_eq!(lifecycle.errors, 0);
}

#[test]
fn open_then_close() {
    let mut lifecycle = ChannelLifecycle::default();
    assert!(lifecycle.apply(&ChannelEvent::Opened));
    assert_eq!(lifecycle.status, ChannelStatus::Open);
    assert!(lifecycle.apply(&closed(1000)));
    assert_eq!(lifecycle.status, ChannelStatus::Closed);
    assert!(!lifecycle.is_live());
}

#[test]
fn error_does_not_change_phase() {
    let mut lifecycle = ChannelLifecycle::default();
    assert!(!lifecycle.apply(&ChannelEvent::Errored("handshake".to_owned())));
    assert_eq!(lifecycle.status, ChannelStatus::Connecting);

    lifecycle.apply(&ChannelEvent::Opened);
    assert!(!lifecycle.apply(&ChannelEvent::Errored("reset".to_owned())));
    assert_eq!(lifecycle.status, ChannelStatus::Open);
    assert_eq!(lifecycle.errors, 2);
}

#[test]
fn close_is_terminal() {
    let mut lifecycle = ChannelLifecycle::default();
    lifecycle.apply(&closed(1006));

    assert!(!lifecycle.apply(&ChannelEvent::Opened));
    assert!(!lifecycle.apply(&ChannelEvent::Errored("late".to_owned())));
    assert_eq!(lifecycle.status, ChannelStatus::Closed);
    assert_eq!(lifecycle.errors, 0);
}

#[test]
fn connection_refused_closes_without_opening() {
    let mut lifecycle = ChannelLifecycle::default();
    lifecycle.apply(&ChannelEvent::Errored("refused".to_owned()));
    lifecycle.apply(&closed(1006));
    assert_eq!(lifecycle.status, ChannelStatus::Closed);
    assert_eq!(lifecycle.errors, 1);
}

#[test]
fn ready_socket_opens_only_in_open_state() {
    assert_eq!(open_outcome(SocketState::Open), Some(ChannelEvent::Opened));
    assert_eq!(open_outcome(SocketState::Connecting), None);
    assert_eq!(open_outcome(SocketState::Closing), None);
}

#[test]
fn failed_handshake_goes_from_connecting_to_closed() {
    // A refused socket wakes its sink in the closed state.
    let mut lifecycle = ChannelLifecycle::default();
    if let Some(event) = open_outcome(SocketState::Closed) {
        lifecycle.apply(&event);
    }
    assert_eq!(lifecycle.status, ChannelStatus::Connecting);

    lifecycle.apply(&ChannelEvent::Errored("refused".to_owned()));
    lifecycle.apply(&closed(1006));
    assert_eq!(lifecycle.status, ChannelStatus::Closed);
    assert_eq!(lifecycle.errors, 1);
}
