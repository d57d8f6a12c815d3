// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the reply path.
//!
//! Each test creates an isolated TestHarness with a temp SQLite database, a
//! mock generation provider and a running change listener.

use std::time::Duration;

use aura_agent::REPLY_FALLBACK;
use aura_core::{MemoryStore, MessageStore, NewMessage, Sender, StorageAdapter};
use aura_storage::SqliteStorage;
use aura_test_utils::TestHarness;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn user_message_gets_one_reply() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Hello from Aura!".to_string()])
        .build()
        .await
        .unwrap();

    harness.send_user_message("Hi there").await.unwrap();
    let replies = harness.wait_for_ai_messages(1, WAIT).await.unwrap();
    assert_eq!(replies[0].text, "Hello from Aura!");

    let conversation = harness.conversation().await.unwrap();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[0].sender, Sender::User);
    assert_eq!(conversation[1].sender, Sender::Ai);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn reply_sees_full_conversation() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["first".to_string(), "second".to_string()])
        .build()
        .await
        .unwrap();

    harness.send_user_message("one").await.unwrap();
    harness.wait_for_ai_messages(1, WAIT).await.unwrap();
    harness.send_user_message("two").await.unwrap();
    let replies = harness.wait_for_ai_messages(2, WAIT).await.unwrap();
    assert_eq!(replies[1].text, "second");

    let requests = harness.mock_provider.requests().await;
    let last = requests.last().unwrap();
    let texts: Vec<&str> = last.turns.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "first", "two"]);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn generation_failure_persists_fallback() {
    let harness = TestHarness::builder()
        .with_failing_provider()
        .build()
        .await
        .unwrap();

    harness.send_user_message("are you there?").await.unwrap();
    let replies = harness.wait_for_ai_messages(1, WAIT).await.unwrap();
    assert_eq!(replies[0].text, REPLY_FALLBACK);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn ai_messages_do_not_trigger_replies() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness
        .storage
        .append_message(&harness.user, NewMessage::ai("Good morning!"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(harness.mock_provider.call_count().await, 0);
    assert_eq!(harness.conversation().await.unwrap().len(), 1);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn memory_is_consolidated_at_threshold() {
    let harness = TestHarness::builder()
        .with_summary_threshold(2)
        .with_mock_responses(vec![
            "reply one".to_string(),
            "reply two".to_string(),
            "User is planning a trip to Lisbon.".to_string(),
        ])
        .build()
        .await
        .unwrap();

    harness.send_user_message("I'm going on a trip").await.unwrap();
    harness.wait_for_ai_messages(1, WAIT).await.unwrap();
    assert_eq!(harness.storage.load_summary(&harness.user).await.unwrap(), None);

    harness.send_user_message("To Lisbon!").await.unwrap();
    harness.wait_for_ai_messages(2, WAIT).await.unwrap();

    // The summary is written after the reply; give the listener a moment.
    let mut summary = None;
    for _ in 0..100 {
        summary = harness.storage.load_summary(&harness.user).await.unwrap();
        if summary.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(summary.as_deref(), Some("User is planning a trip to Lisbon."));

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn messages_written_by_another_process_are_picked_up() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["seen it".to_string()])
        .build()
        .await
        .unwrap();

    // A second handle on the same file stands in for the chat frontend.
    let frontend = SqliteStorage::new(harness.config.storage.clone());
    frontend.initialize().await.unwrap();
    frontend
        .append_message(&harness.user, NewMessage::user("hello from the web"))
        .await
        .unwrap();

    let replies = harness.wait_for_ai_messages(1, WAIT).await.unwrap();
    assert_eq!(replies[0].text, "seen it");

    frontend.close().await.unwrap();
    harness.shutdown().await.unwrap();
}
