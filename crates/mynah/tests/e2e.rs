// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Mynah pipeline.
//!
//! Each test assembles an isolated TestHarness (mock transport, generator,
//! and extractor around a real admission pipeline). Tests are independent
//! and order-insensitive.

use std::sync::Arc;

use mynah_agent::AgentLoop;
use mynah_config::MynahConfig;
use mynah_core::{GeneratorOutcome, MediaRef, Readiness, TransportEvent};
use mynah_test_utils::events::{inbound_media, inbound_text};
use mynah_test_utils::{
    MockExtractor, MockGenerator, MockTransport, SentMessage, TestHarness,
};
use tokio_util::sync::CancellationToken;

// ---- Test 1: Message-to-response pipeline ----

#[tokio::test]
async fn message_pipeline_returns_mock_response() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["Hello from Mynah!".to_string()])
        .with_pre_approved(&["94771234567@c.us"])
        .build();

    harness.go_ready().await;
    harness
        .deliver_text("94771234567@c.us", "Hi there")
        .await
        .unwrap();

    assert_eq!(harness.sent_texts().await, ["Hello from Mynah!"]);
}

#[tokio::test]
async fn first_contact_is_welcomed_before_the_reply() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["nice to meet you".to_string()])
        .build();

    harness.go_ready().await;
    harness
        .deliver_text("94771234567@c.us", "hello")
        .await
        .unwrap();

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("your personal AI assistant"));
    assert_eq!(sent[1], "nice to meet you");
}

// ---- Test 2: Conversation memory across turns ----

#[tokio::test]
async fn second_turn_carries_the_first_exchange_as_context() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![
            "Nice to meet you, Amal!".to_string(),
            "Your name is Amal.".to_string(),
        ])
        .with_pre_approved(&["94771234567@c.us"])
        .build();

    harness.go_ready().await;
    harness
        .deliver_text("94771234567@c.us", "My name is Amal")
        .await
        .unwrap();
    harness
        .deliver_text("94771234567@c.us", "What is my name?")
        .await
        .unwrap();

    let requests = harness.generator.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].context, "");
    assert!(requests[1].context.contains("Previous conversation context:"));
    assert!(
        requests[1]
            .context
            .contains("User: My name is Amal\nAI: Nice to meet you, Amal!\n")
    );
}

#[tokio::test]
async fn clear_command_resets_context_for_later_turns() {
    let mut harness = TestHarness::builder()
        .with_pre_approved(&["94771234567@c.us"])
        .build();
    harness.go_ready().await;

    harness.generator.push_text("noted").await;
    harness
        .deliver_text("94771234567@c.us", "remember the number 7")
        .await
        .unwrap();

    harness
        .generator
        .push_outcome(GeneratorOutcome::ClearConversation {
            confirmation: "🧹 Chat memory cleared!".to_string(),
        })
        .await;
    harness
        .deliver_text("94771234567@c.us", "/clear")
        .await
        .unwrap();

    harness.generator.push_text("no idea").await;
    harness
        .deliver_text("94771234567@c.us", "what number?")
        .await
        .unwrap();

    let requests = harness.generator.requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[2].context, "",
        "context should be empty after /clear"
    );
    let sent = harness.sent_texts().await;
    assert!(sent.iter().any(|s| s.contains("Chat memory cleared!")));
}

// ---- Test 3: Offline buffering and drain ----

#[tokio::test]
async fn offline_backlog_collapses_to_notice_plus_single_reply() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["answering the last one".to_string()])
        .with_pre_approved(&["94771234567@c.us"])
        .build();

    for text in ["are you there?", "hello??", "please answer"] {
        harness
            .deliver_text("94771234567@c.us", text)
            .await
            .unwrap();
    }
    assert!(harness.sent_texts().await.is_empty());

    harness.go_ready().await;

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("Processing your 3 messages now!"));
    assert_eq!(sent[1], "answering the last one");

    // Only the most recent buffered payload reaches the generator.
    let requests = harness.generator.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "please answer");
}

#[tokio::test]
async fn each_buffered_sender_gets_their_own_notice() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["reply one".to_string(), "reply two".to_string()])
        .with_pre_approved(&["94771111111@c.us", "94772222222@c.us"])
        .build();

    harness
        .deliver_text("94771111111@c.us", "ping")
        .await
        .unwrap();
    harness
        .deliver_text("94772222222@c.us", "pong")
        .await
        .unwrap();

    harness.go_ready().await;

    // Two singular notices and two replies; sender order is not fixed.
    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 4);
    assert_eq!(
        sent.iter()
            .filter(|s| s.contains("Processing your message now!"))
            .count(),
        2
    );
    assert_eq!(harness.generator.requests().await.len(), 2);
}

// ---- Test 4: Offline burst throttling ----

#[tokio::test(start_paused = true)]
async fn rapid_offline_sender_is_warned_after_the_backlog_drains() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["caught up".to_string()])
        .with_pre_approved(&["94771234567@c.us"])
        .build();

    // Three arrivals during the first offline episode...
    for i in 0..3 {
        harness
            .deliver_text("94771234567@c.us", &format!("msg {i}"))
            .await
            .unwrap();
    }
    harness.go_ready().await;
    harness.go_offline().await;
    harness.transport.clear_sent().await;

    // ...and a fourth, still inside the burst window, crosses the threshold.
    harness
        .deliver_text("94771234567@c.us", "one more")
        .await
        .unwrap();

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("I'm currently offline"));
}

// ---- Test 5: Document summaries ----

#[tokio::test]
async fn pdf_document_comes_back_as_truncated_summary() {
    let mut harness = TestHarness::builder()
        .with_pre_approved(&["94771234567@c.us"])
        .with_extracted_text(&"report text ".repeat(100))
        .build();
    harness
        .transport
        .add_media("media-9", b"%PDF-1.7 bytes".to_vec())
        .await;

    harness.go_ready().await;
    let media = MediaRef {
        id: "media-9".to_string(),
        mime_type: "application/pdf".to_string(),
        filename: Some("report.pdf".to_string()),
    };
    harness
        .deliver(inbound_media("94771234567@c.us", media))
        .await
        .unwrap();

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("I've analyzed your PDF:"));
    assert!(sent[0].ends_with("..."));
    // Document messages never reach the generator.
    assert!(harness.generator.requests().await.is_empty());
}

// ---- Test 6: Failure handling ----

#[tokio::test]
async fn generation_failure_apologizes_and_records_nothing() {
    let mut harness = TestHarness::builder()
        .with_pre_approved(&["94771234567@c.us"])
        .build();
    harness.go_ready().await;

    harness.generator.push_failure("backend down").await;
    harness
        .deliver_text("94771234567@c.us", "first question")
        .await
        .unwrap();

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Sorry, I encountered an error"));

    // The failed turn never entered conversation memory.
    harness.generator.push_text("recovered").await;
    harness
        .deliver_text("94771234567@c.us", "second question")
        .await
        .unwrap();
    let requests = harness.generator.requests().await;
    assert_eq!(requests[1].context, "");
}

// ---- Test 7: Default response when no queued responses ----

#[tokio::test]
async fn default_mock_response_when_nothing_is_queued() {
    let mut harness = TestHarness::builder()
        .with_pre_approved(&["94771234567@c.us"])
        .build();

    harness.go_ready().await;
    harness
        .deliver_text("94771234567@c.us", "anything")
        .await
        .unwrap();

    assert_eq!(harness.sent_texts().await, ["mock response"]);
}

// ---- Test 8: Full agent loop over the transport ----

#[tokio::test]
async fn agent_loop_replays_backlog_after_the_session_comes_up() {
    let transport = Arc::new(MockTransport::new());
    let generator = Arc::new(MockGenerator::new());
    let extractor = Arc::new(MockExtractor::with_text(""));

    // The message arrives before the session is up; then the session
    // connects and the transport eventually closes.
    transport
        .push_event(TransportEvent::Inbound(inbound_text("U1", "anyone home?")))
        .await;
    transport
        .push_event(TransportEvent::ReadinessChanged(Readiness::Ready))
        .await;
    transport.close().await;
    generator.push_text("home now").await;

    let mut config = MynahConfig::default();
    config.allowlist.pre_approved_users = vec!["U1".to_string()];
    let (mut agent, readiness_rx) = AgentLoop::new(
        transport.clone(),
        generator,
        extractor,
        &config,
    );
    agent.run(CancellationToken::new()).await.unwrap();

    let sent: Vec<String> = transport
        .sent_messages()
        .await
        .into_iter()
        .filter_map(|m| match m {
            SentMessage::Text { text, .. } => Some(text),
            SentMessage::Media { .. } => None,
        })
        .collect();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("Processing your message now!"));
    assert_eq!(sent[1], "home now");

    assert_eq!(*readiness_rx.borrow(), Readiness::Ready);
    assert!(transport.is_shut_down());
}

// ---- Test 9: Independent test isolation ----

#[tokio::test]
async fn harnesses_are_completely_independent() {
    let mut h1 = TestHarness::builder()
        .with_mock_responses(vec!["h1-response".to_string()])
        .with_pre_approved(&["94771111111@c.us"])
        .build();
    let mut h2 = TestHarness::builder()
        .with_mock_responses(vec!["h2-response".to_string()])
        .with_pre_approved(&["94771111111@c.us"])
        .build();

    h1.go_ready().await;
    h2.go_ready().await;
    h1.deliver_text("94771111111@c.us", "msg").await.unwrap();
    h2.deliver_text("94771111111@c.us", "msg").await.unwrap();

    assert_eq!(h1.sent_texts().await, ["h1-response"]);
    assert_eq!(h2.sent_texts().await, ["h2-response"]);
}
