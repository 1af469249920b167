//! Integration tests for [`context_store::ContextStore`] over the in-memory
//! backend.
//!
//! Covers the append/read/trim/clear protocol, chronological read order,
//! malformed-record tolerance, scope isolation, and participant enumeration.

use std::sync::Arc;
use std::time::Duration;

use cbot_core::ChatMessage;
use context_store::{ContextStore, ListBackend, MemoryBackend, USER_KEY_PREFIX};

fn store_with_backend() -> (ContextStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (ContextStore::new(backend.clone()), backend)
}

fn message(author_id: i64, body: &str, sequence_id: i64) -> ChatMessage {
    ChatMessage::new(author_id, Some(format!("user{}", author_id)), body, sequence_id)
}

/// **Test: Reads return chronological order (oldest first) regardless of
/// newest-first internal storage.**
///
/// **Setup:** Append three messages in order.
/// **Action:** `chat_history(chat, 50)`.
/// **Expected:** Bodies come back in append order.
#[tokio::test]
async fn test_chat_history_chronological_order() {
    let (store, _) = store_with_backend();

    for (i, body) in ["first", "second", "third"].iter().enumerate() {
        store
            .add_message(7, &message(1, body, i as i64 + 1))
            .await
            .expect("append");
    }

    let history = store.chat_history(7, 50).await.expect("read");
    let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
}

/// **Test: The read limit keeps the most recent messages, not the oldest.**
#[tokio::test]
async fn test_chat_history_limit_keeps_most_recent() {
    let (store, _) = store_with_backend();

    for i in 0..10 {
        store
            .add_message(7, &message(1, &format!("msg {}", i), i))
            .await
            .expect("append");
    }

    let history = store.chat_history(7, 3).await.expect("read");
    let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["msg 7", "msg 8", "msg 9"]);
}

/// **Test: After `trim_chat(chat, N)` the scope holds at most N messages.**
#[tokio::test]
async fn test_trim_bounds_size() {
    let (store, _) = store_with_backend();

    for i in 0..25 {
        store
            .add_message(3, &message(1, &format!("m{}", i), i))
            .await
            .expect("append");
    }
    store.trim_chat(3, 10).await.expect("trim");

    assert_eq!(store.chat_len(3).await.expect("len"), 10);

    // The survivors are the 10 most recently appended.
    let history = store.chat_history(3, 50).await.expect("read");
    assert_eq!(history.first().expect("non-empty").body, "m15");
    assert_eq!(history.last().expect("non-empty").body, "m24");
}

/// **Test: A message round-trips through the stored record format intact.**
#[tokio::test]
async fn test_record_round_trip() {
    let (store, _) = store_with_backend();

    let original = ChatMessage::new(42, None, "привет, бот", 1001);
    store.add_message(1, &original).await.expect("append");

    let history = store.chat_history(1, 1).await.expect("read");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], original);
}

/// **Test: Two messages appended back-to-back (same wall-clock millisecond)
/// keep their append order on read.**
#[tokio::test]
async fn test_same_instant_appends_keep_insertion_order() {
    let (store, _) = store_with_backend();

    let first = message(1, "one", 1);
    let mut second = message(2, "two", 2);
    second.created_at = first.created_at;

    store.add_message(5, &first).await.expect("append");
    store.add_message(5, &second).await.expect("append");

    let history = store.chat_history(5, 10).await.expect("read");
    assert_eq!(history[0].body, "one");
    assert_eq!(history[1].body, "two");
}

/// **Test: A corrupt record in the middle of the list is skipped; the rest of
/// the read succeeds.**
///
/// **Setup:** Valid record, raw garbage pushed straight to the backend, valid
/// record.
/// **Expected:** Read returns the two valid messages in order.
#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let (store, backend) = store_with_backend();

    store.add_message(9, &message(1, "ok-1", 1)).await.expect("append");
    backend
        .push_front("chat_context:9", "{not json".to_string())
        .await
        .expect("raw push");
    store.add_message(9, &message(1, "ok-2", 2)).await.expect("append");

    let history = store.chat_history(9, 50).await.expect("read");
    let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["ok-1", "ok-2"]);
}

/// **Test: `clear_chat` empties the chat scope and is idempotent.**
#[tokio::test]
async fn test_clear_chat() {
    let (store, _) = store_with_backend();

    store.add_message(4, &message(1, "hello", 1)).await.expect("append");
    assert_eq!(store.chat_len(4).await.expect("len"), 1);

    store.clear_chat(4).await.expect("clear");
    assert_eq!(store.chat_len(4).await.expect("len"), 0);

    store.clear_chat(4).await.expect("clear twice");
    assert_eq!(store.chat_len(4).await.expect("len"), 0);
}

/// **Test: Chat scope and participant scope are disjoint; clearing the chat
/// leaves participant history untouched.**
#[tokio::test]
async fn test_scopes_are_independent() {
    let (store, _) = store_with_backend();

    store.add_message(2, &message(10, "to chat", 1)).await.expect("append");
    store
        .add_user_message(2, 10, &message(10, "to user", 1))
        .await
        .expect("append user");

    let chat = store.chat_history(2, 10).await.expect("read");
    let user = store.user_history(2, 10, 10).await.expect("read user");
    assert_eq!(chat.len(), 1);
    assert_eq!(user.len(), 1);
    assert_eq!(chat[0].body, "to chat");
    assert_eq!(user[0].body, "to user");

    store.clear_chat(2).await.expect("clear");
    assert_eq!(store.chat_len(2).await.expect("len"), 0);
    let user = store.user_history(2, 10, 10).await.expect("read user");
    assert_eq!(user.len(), 1);
}

/// **Test: `trim_user` bounds a participant scope independently of the chat
/// window.**
#[tokio::test]
async fn test_trim_user_scope() {
    let (store, _) = store_with_backend();

    for i in 0..30 {
        store
            .add_user_message(1, 5, &message(5, &format!("u{}", i), i))
            .await
            .expect("append user");
    }
    store.trim_user(1, 5, 20).await.expect("trim user");

    let history = store.user_history(1, 5, 50).await.expect("read user");
    assert_eq!(history.len(), 20);
    assert_eq!(history.first().expect("non-empty").body, "u10");
}

/// **Test: `participants` lists every user with a live scope in the chat,
/// skips malformed keys, and ignores other chats.**
#[tokio::test]
async fn test_participants_enumeration() {
    let (store, backend) = store_with_backend();

    store
        .add_user_message(11, 100, &message(100, "a", 1))
        .await
        .expect("append");
    store
        .add_user_message(11, 200, &message(200, "b", 2))
        .await
        .expect("append");
    store
        .add_user_message(12, 300, &message(300, "other chat", 3))
        .await
        .expect("append");
    backend
        .push_front(&format!("{}:11:not_a_number", USER_KEY_PREFIX), "x".into())
        .await
        .expect("raw push");

    let mut users = store.participants(11).await.expect("participants");
    users.sort_unstable();
    assert_eq!(users, vec![100, 200]);
}

/// **Test: A zero read limit returns an empty history without touching the
/// backend range.**
#[tokio::test]
async fn test_zero_limit_reads_empty() {
    let (store, _) = store_with_backend();
    store.add_message(1, &message(1, "x", 1)).await.expect("append");
    assert!(store.chat_history(1, 0).await.expect("read").is_empty());
}

/// **Test: Expiry drops the whole scope at once (time-based, not
/// per-message).**
#[tokio::test]
async fn test_expired_scope_disappears() {
    let (store, backend) = store_with_backend();

    store.add_message(6, &message(1, "old", 1)).await.expect("append");
    // Shorten the TTL behind the store's back; the store refreshed it to 24h
    // on append.
    backend
        .set_expiry("chat_context:6", Duration::from_millis(10))
        .await
        .expect("expire");
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(store.chat_len(6).await.expect("len"), 0);
    assert!(store.chat_history(6, 10).await.expect("read").is_empty());
}
