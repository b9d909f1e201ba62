//! Integration tests for the conversation directory.

mod common;

use std::sync::Arc;

use tokio::sync::mpsc;

use serviflex_core::types::UserId;

#[tokio::test]
async fn test_user_chats_orders_pinned_first_then_recency() {
    let app = common::TestApp::new();
    let user = UserId::new();
    let peer_one = UserId::new();
    let peer_two = UserId::new();

    let older = app
        .chat
        .get_or_create(user, common::info("Ana"), peer_one, common::info("Bruno"))
        .await
        .unwrap();
    let newer = app
        .chat
        .get_or_create(user, common::info("Ana"), peer_two, common::info("Clara"))
        .await
        .unwrap();

    app.chat
        .send_message(&older.id, &common::author(user, "Ana"), "primeiro")
        .await
        .unwrap();
    app.chat
        .send_message(&newer.id, &common::author(user, "Ana"), "segundo")
        .await
        .unwrap();

    // Recency alone puts `newer` first.
    let chats = app.directory.user_chats(user).await.unwrap();
    assert_eq!(chats[0].id, newer.id);

    // Pinning the older conversation overrides recency.
    app.chat.set_pinned(&older.id, user, true).await.unwrap();
    let chats = app.directory.user_chats(user).await.unwrap();
    assert_eq!(chats[0].id, older.id);
    assert_eq!(chats[1].id, newer.id);
}

#[tokio::test]
async fn test_user_chats_only_lists_own_conversations() {
    let app = common::TestApp::new();
    let user = UserId::new();
    let peer = UserId::new();
    let stranger_one = UserId::new();
    let stranger_two = UserId::new();

    app.chat
        .get_or_create(user, common::info("Ana"), peer, common::info("Bruno"))
        .await
        .unwrap();
    app.chat
        .get_or_create(
            stranger_one,
            common::info("X"),
            stranger_two,
            common::info("Y"),
        )
        .await
        .unwrap();

    let chats = app.directory.user_chats(user).await.unwrap();
    assert_eq!(chats.len(), 1);
    assert!(chats[0].participants.contains(&user));
}

#[tokio::test]
async fn test_flags_are_independent_per_user() {
    let app = common::TestApp::new();
    let a = UserId::new();
    let b = UserId::new();
    let conversation = app
        .chat
        .get_or_create(a, common::info("Ana"), b, common::info("Bruno"))
        .await
        .unwrap();

    app.chat.set_archived(&conversation.id, a, true).await.unwrap();
    app.chat.set_muted(&conversation.id, b, true).await.unwrap();

    let updated = app.chat.conversation(&conversation.id).await.unwrap();
    assert!(updated.is_archived_by(a));
    assert!(!updated.is_archived_by(b));
    assert!(updated.muted.get(&b).copied().unwrap_or(false));
    assert!(!updated.muted.get(&a).copied().unwrap_or(false));
}

#[tokio::test]
async fn test_delete_is_soft_and_one_sided() {
    let app = common::TestApp::new();
    let a = UserId::new();
    let b = UserId::new();
    let conversation = app
        .chat
        .get_or_create(a, common::info("Ana"), b, common::info("Bruno"))
        .await
        .unwrap();
    app.chat
        .send_message(&conversation.id, &common::author(b, "Bruno"), "oi")
        .await
        .unwrap();

    app.chat.delete_conversation(&conversation.id, a).await.unwrap();

    // The document and its messages survive; only a's flags flip.
    let updated = app.chat.conversation(&conversation.id).await.unwrap();
    assert!(updated.is_deleted_by(a));
    assert!(updated.is_archived_by(a));
    assert!(!updated.is_deleted_by(b));
    assert_eq!(app.chat.messages(&conversation.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_subscribe_to_user_chats_delivers_live() {
    let app = common::TestApp::new();
    let user = UserId::new();
    let peer = UserId::new();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = app.directory.subscribe_to_user_chats(
        user,
        Arc::new(move |chats| {
            let _ = tx.send(chats);
        }),
    );
    let initial = common::recv_until(&mut rx, |_| true).await;
    assert!(initial.is_empty());

    app.chat
        .get_or_create(user, common::info("Ana"), peer, common::info("Bruno"))
        .await
        .unwrap();
    let chats = common::recv_until(&mut rx, |chats| !chats.is_empty()).await;
    assert!(chats[0].participants.contains(&user));
}
