use crate::server::registry::{ConnectionId, ConnectionRegistry};

use std::collections::HashSet;

#[test]
fn given_new_ids_when_generated_then_are_unique() {
    let ids: HashSet<ConnectionId> = (0..100).map(|_| ConnectionId::new()).collect();

    assert_eq!(ids.len(), 100);
}

/// **VALUE**: Verifies that a connection id prints as a hyphenated v4 UUID.
///
/// **WHY THIS MATTERS**: Display is the only way an id leaves the registry, and
/// session log lines are correlated by it.
#[test]
fn given_connection_id_when_displayed_then_is_hyphenated_uuid() {
    let shown = ConnectionId::new().to_string();

    assert_eq!(shown.len(), 36, "{shown}");
    assert_eq!(shown.matches('-').count(), 4, "{shown}");
    assert_eq!(shown.as_bytes()[14], b'4', "{shown}");
}

#[test]
fn given_registry_when_created_outside_runtime_then_does_not_panic() {
    let registry = ConnectionRegistry::new();
    let _clone = registry.clone();
}

/// **VALUE**: Verifies that register/unregister are visible to readers once they return.
///
/// **WHY THIS MATTERS**: Sessions unregister and then report themselves closed. If the
/// write were still queued in the actor, observers could see a closed session that is
/// still a member.
#[tokio::test]
async fn given_registered_connection_when_unregistered_then_membership_updates() {
    // GIVEN: An empty registry
    let registry = ConnectionRegistry::new();
    let id = ConnectionId::new();
    assert!(registry.is_empty().await);

    // WHEN: Registering
    assert!(registry.register(id).await.unwrap());

    // THEN: The connection is a member immediately
    assert!(registry.contains(id).await);
    assert_eq!(registry.len().await, 1);

    // WHEN: Unregistering
    assert!(registry.unregister(id).await.unwrap());

    // THEN: It is gone immediately
    assert!(!registry.contains(id).await);
    assert!(registry.is_empty().await);
}

/// **VALUE**: Verifies unregister is idempotent.
///
/// **BUG THIS CATCHES**: Would catch a registry that errors or panics when a
/// connection is removed twice (read error and close racing in cleanup).
#[tokio::test]
async fn given_unknown_connection_when_unregistered_then_is_noop() {
    let registry = ConnectionRegistry::new();
    let id = ConnectionId::new();

    assert!(!registry.unregister(id).await.unwrap());

    registry.register(id).await.unwrap();
    assert!(registry.unregister(id).await.unwrap());
    assert!(!registry.unregister(id).await.unwrap());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn given_duplicate_register_when_applied_then_reports_no_change() {
    let registry = ConnectionRegistry::new();
    let id = ConnectionId::new();

    assert!(registry.register(id).await.unwrap());
    assert!(!registry.register(id).await.unwrap());
    assert_eq!(registry.len().await, 1);
}

/// **VALUE**: Verifies clones share one member set.
#[tokio::test]
async fn given_cloned_registry_when_mutated_then_all_clones_observe_change() {
    let registry = ConnectionRegistry::new();
    let observer = registry.clone();
    let id = ConnectionId::new();

    registry.register(id).await.unwrap();

    assert!(observer.contains(id).await);
    assert_eq!(observer.snapshot().await, vec![id]);
}

/// **VALUE**: Verifies concurrent mutation from many tasks loses no updates.
///
/// **WHY THIS MATTERS**: Every session task registers and unregisters independently.
/// A lost update leaves a ghost member or drops a live one.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_sessions_when_registering_then_no_updates_lost() {
    let registry = ConnectionRegistry::new();
    let ids: Vec<ConnectionId> = (0..50).map(|_| ConnectionId::new()).collect();

    let mut tasks = Vec::new();
    for id in ids.iter().copied() {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            registry.register(id).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(registry.len().await, 50);
    let snapshot: HashSet<ConnectionId> = registry.snapshot().await.into_iter().collect();
    assert_eq!(snapshot, ids.iter().copied().collect());

    let mut tasks = Vec::new();
    for id in ids.iter().copied().take(25) {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            registry.unregister(id).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(registry.len().await, 25);
    assert!(!registry.contains(ids[0]).await);
    assert!(registry.contains(ids[49]).await);
}
