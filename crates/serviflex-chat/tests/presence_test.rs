//! Integration tests for presence tracking.

mod common;

use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use tokio::sync::mpsc;

use serviflex_core::types::UserId;

#[tokio::test]
async fn test_start_publishes_online_and_stop_publishes_offline() {
    let app = common::TestApp::new();
    let tracker = app.presence_tracker();
    let user = UserId::new();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = tracker.subscribe_to_user(
        user,
        Arc::new(move |view| {
            let _ = tx.send(view);
        }),
    );

    tracker.start(user).await;
    let view = common::recv_until(&mut rx, |v| v.online).await;
    assert_eq!(view.user_id, user);
    assert!(view.last_seen.is_some());

    tracker.stop().await;
    let view = common::recv_until(&mut rx, |v| !v.online).await;
    // The offline write still stamps last_seen.
    assert!(view.last_seen.is_some());
}

#[tokio::test]
async fn test_start_is_idempotent_for_same_user() {
    let app = common::TestApp::new();
    let tracker = app.presence_tracker();
    let user = UserId::new();

    tracker.start(user).await;
    tracker.start(user).await;
    assert_eq!(tracker.active_user().await, Some(user));
    assert!(tracker.is_user_online(user).await.unwrap());
}

#[tokio::test]
async fn test_switching_user_stops_previous_session() {
    let app = common::TestApp::new();
    let tracker = app.presence_tracker();
    let first = UserId::new();
    let second = UserId::new();

    tracker.start(first).await;
    tracker.start(second).await;

    assert_eq!(tracker.active_user().await, Some(second));
    assert!(!tracker.is_user_online(first).await.unwrap());
    assert!(tracker.is_user_online(second).await.unwrap());
}

#[tokio::test]
async fn test_stale_heartbeat_reads_as_offline() {
    let app = common::TestApp::new();
    let tracker = app.presence_tracker();
    let user = UserId::new();

    // A session that died without an offline write: the record still
    // claims online but its heartbeat stopped two minutes ago.
    let stale_seen = app.store.server_time() - Duration::seconds(120);
    app.store
        .set_merge(
            "presence",
            &user.to_string(),
            json!({ "userId": user, "online": true, "lastSeen": stale_seen }),
        )
        .await
        .unwrap();

    assert!(!tracker.is_user_online(user).await.unwrap());
    let view = tracker.user_presence(user).await.unwrap();
    assert!(!view.online);
    assert_eq!(view.last_seen, Some(stale_seen));
}

#[tokio::test]
async fn test_unknown_user_reads_as_offline() {
    let app = common::TestApp::new();
    let tracker = app.presence_tracker();
    let user = UserId::new();

    assert!(!tracker.is_user_online(user).await.unwrap());
    let view = tracker.user_presence(user).await.unwrap();
    assert!(view.last_seen.is_none());
}

#[tokio::test]
async fn test_subscribe_to_many_starts_all_offline() {
    let app = common::TestApp::new();
    let tracker = app.presence_tracker();
    let users = [UserId::new(), UserId::new(), UserId::new()];

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = tracker.subscribe_to_many(
        &users,
        Arc::new(move |views| {
            let _ = tx.send(views);
        }),
    );

    // The first delivery happens synchronously inside the registration,
    // before any store read, with every watched user offline.
    let initial = rx.try_recv().expect("initial delivery must be synchronous");
    assert_eq!(initial.len(), users.len());
    assert!(initial.values().all(|view| !view.online));

    tracker.start(users[1]).await;
    let merged = common::recv_until(&mut rx, |views| views[&users[1]].online).await;
    assert!(!merged[&users[0]].online);
    assert!(!merged[&users[2]].online);
}
