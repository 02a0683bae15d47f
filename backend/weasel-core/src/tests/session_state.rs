use crate::server::session_state::{SessionLifecycle, SessionState};

#[test]
fn given_new_lifecycle_when_run_normally_then_visits_every_state_in_order() {
    let mut lifecycle = SessionLifecycle::new();
    assert_eq!(lifecycle.state(), SessionState::Registering);

    assert!(lifecycle.activate());
    assert_eq!(lifecycle.state(), SessionState::Active);

    assert!(lifecycle.begin_close());
    assert_eq!(lifecycle.state(), SessionState::Closing);

    assert!(lifecycle.finish());
    assert_eq!(lifecycle.state(), SessionState::Closed);
}

/// **VALUE**: Verifies a session that never registered can still be torn down.
#[test]
fn given_unregistered_session_when_closed_then_skips_active() {
    let mut lifecycle = SessionLifecycle::new();

    assert!(lifecycle.begin_close());
    assert!(lifecycle.finish());
    assert_eq!(lifecycle.state(), SessionState::Closed);
}

/// **VALUE**: Verifies the lifecycle never moves backwards.
///
/// **BUG THIS CATCHES**: Would catch a closed session being reactivated and read from
/// after it was removed from the registry.
#[test]
fn given_closed_session_when_transitions_attempted_then_rejected() {
    let mut lifecycle = SessionLifecycle::new();
    lifecycle.activate();
    lifecycle.begin_close();
    lifecycle.finish();

    assert!(!lifecycle.activate());
    assert!(!lifecycle.begin_close());
    assert!(!lifecycle.finish());
    assert_eq!(lifecycle.state(), SessionState::Closed);
}

#[test]
fn given_active_session_when_finished_without_closing_then_rejected() {
    let mut lifecycle = SessionLifecycle::new();
    lifecycle.activate();

    assert!(!lifecycle.finish());
    assert!(!lifecycle.activate());
    assert_eq!(lifecycle.state(), SessionState::Active);
}
