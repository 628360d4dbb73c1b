//! Conversation flow tests using the mock completion client.
//!
//! These tests verify the pipeline end to end without network access:
//! - Crisis intercepts never reach the completion client
//! - Sentiment prefixes are merged into stored replies
//! - Filtered and failed completions leave the transcript in the right shape
//! - History sent to the client never contains the in-flight message
//!
//! Run with: `cargo test -p companion-core --test session_flow`

use companion_core::prefix::{HEAVY_PREFIX, STRUGGLING_PREFIX};
use companion_core::testing::{
    assert_completion_not_called, assert_last_assistant, assert_roles, TestHarness,
};
use companion_core::{
    crisis_response, CompletionError, HistoryEntry, HistoryRole, ReplyKind, Role, SessionError,
    REFUSAL_RESPONSE,
};

// =============================================================================
// SAFETY INTERCEPT
// =============================================================================

#[tokio::test]
async fn test_crisis_message_is_intercepted() {
    let mut harness = TestHarness::with_sentiment(0.0);
    harness.expect_generated("this must never be used");

    let reply = harness.input("I feel like hurting myself").await.unwrap();

    assert_eq!(reply.kind, ReplyKind::SafetyIntercept);
    assert_eq!(reply.content, crisis_response());
    assert_roles(&harness, &[Role::User, Role::Assistant]);
    assert_last_assistant(&harness, crisis_response());
    assert_completion_not_called(&harness);
}

#[tokio::test]
async fn test_crisis_ignores_case_and_sentiment() {
    let mut harness = TestHarness::with_sentiment(0.9);

    let reply = harness.input("Lately I keep thinking about SUICIDE").await.unwrap();

    assert_eq!(reply.kind, ReplyKind::SafetyIntercept);
    assert!(!reply.content.starts_with(STRUGGLING_PREFIX));
    assert_completion_not_called(&harness);
}

#[tokio::test]
async fn test_repeated_crisis_input_is_idempotent() {
    let mut harness = TestHarness::new();

    let first = harness.input("I want to end my life").await.unwrap();
    let second = harness.input("I want to end my life").await.unwrap();

    assert_eq!(first, second);
    assert_roles(
        &harness,
        &[Role::User, Role::Assistant, Role::User, Role::Assistant],
    );
    assert_completion_not_called(&harness);
}

// =============================================================================
// GENERATED REPLIES
// =============================================================================

#[tokio::test]
async fn test_positive_message_has_no_prefix() {
    let mut harness = TestHarness::with_sentiment(0.4);
    harness.expect_generated("Glad to hear it!");

    let reply = harness.input("Everything is fine today").await.unwrap();

    assert_eq!(reply.kind, ReplyKind::Generated);
    assert_eq!(reply.content, "Glad to hear it!");
    assert_last_assistant(&harness, "Glad to hear it!");

    let call = harness.completion.last_call().unwrap();
    assert!(call.history.is_empty());
    assert_eq!(call.message, "Everything is fine today");
}

#[tokio::test]
async fn test_strongly_negative_message_gets_struggling_prefix() {
    let mut harness = TestHarness::with_sentiment(-0.7);
    harness.expect_generated("That sounds tough.");

    let reply = harness.input("Everything is falling apart").await.unwrap();

    assert_eq!(
        reply.content,
        "I can hear how much you're struggling right now. That sounds tough."
    );
}

#[tokio::test]
async fn test_threshold_boundary_uses_heavy_prefix() {
    let mut harness = TestHarness::with_sentiment(-0.6);
    harness.expect_generated("I'm listening.");

    let reply = harness.input("Not a good week").await.unwrap();

    assert_eq!(reply.content, format!("{HEAVY_PREFIX}I'm listening."));
}

#[tokio::test]
async fn test_lexicon_scorer_drives_prefix() {
    let mut harness = TestHarness::new();
    harness.expect_generated("That sounds really hard.");

    let reply = harness
        .input("Everything feels hopeless and terrible")
        .await
        .unwrap();

    assert!(reply.content.starts_with(STRUGGLING_PREFIX));
    assert!(reply.content.ends_with("That sounds really hard."));
}

#[tokio::test]
async fn test_history_excludes_in_flight_message() {
    let mut harness = TestHarness::with_sentiment(0.0);
    harness
        .expect_generated("Hello! How are you?")
        .expect_generated("Tell me more.");

    harness.input("hi").await.unwrap();
    harness.input("I failed my exam").await.unwrap();

    let call = harness.completion.last_call().unwrap();
    assert_eq!(
        call.history,
        vec![
            HistoryEntry::new(HistoryRole::User, "hi"),
            HistoryEntry::new(HistoryRole::Model, "Hello! How are you?"),
        ]
    );
    assert_eq!(call.message, "I failed my exam");
}

#[tokio::test]
async fn test_crisis_turns_appear_in_later_history() {
    let mut harness = TestHarness::with_sentiment(0.0);
    harness.expect_generated("I'm glad you're still here.");

    harness.input("I don't want to live").await.unwrap();
    harness.input("thanks, I called them").await.unwrap();

    let call = harness.completion.last_call().unwrap();
    assert_eq!(call.history.len(), 2);
    assert_eq!(call.history[1].role, HistoryRole::Model);
    assert_eq!(call.history[1].parts, vec![crisis_response().to_string()]);
}

// =============================================================================
// FILTERED AND FAILED COMPLETIONS
// =============================================================================

#[tokio::test]
async fn test_filtered_completion_stores_refusal() {
    let mut harness = TestHarness::with_sentiment(-0.7);
    harness.expect_filtered();

    let reply = harness.input("tell me something awful").await.unwrap();

    assert_eq!(reply.kind, ReplyKind::ContentFiltered);
    assert_eq!(reply.content, REFUSAL_RESPONSE);
    assert_roles(&harness, &[Role::User, Role::Assistant]);
    assert_last_assistant(&harness, REFUSAL_RESPONSE);
}

#[tokio::test]
async fn test_failed_completion_keeps_only_user_turn() {
    let mut harness = TestHarness::with_sentiment(0.0);
    harness.expect_error(CompletionError::Timeout);

    let result = harness.input("hello?").await;

    assert!(matches!(
        result,
        Err(SessionError::Completion(CompletionError::Timeout))
    ));
    assert_roles(&harness, &[Role::User]);
    assert_eq!(harness.transcript().turns()[0].content(), "hello?");
}

#[tokio::test]
async fn test_session_continues_after_failure() {
    let mut harness = TestHarness::with_sentiment(0.0);
    harness
        .expect_error(CompletionError::Transport("connection reset".into()))
        .expect_generated("Sorry about that, I'm here now.");

    assert!(harness.input("are you there").await.is_err());
    let reply = harness.input("hello again").await.unwrap();

    assert_eq!(reply.content, "Sorry about that, I'm here now.");
    assert_roles(&harness, &[Role::User, Role::User, Role::Assistant]);

    let call = harness.completion.last_call().unwrap();
    assert_eq!(
        call.history,
        vec![HistoryEntry::new(HistoryRole::User, "are you there")]
    );
}

#[tokio::test]
async fn test_reset_starts_fresh_history() {
    let mut harness = TestHarness::with_sentiment(0.0);
    harness.expect_generated("Hi!").expect_generated("Hi again!");

    harness.input("hello").await.unwrap();
    harness.session.reset();
    harness.input("hello").await.unwrap();

    assert!(harness.completion.last_call().unwrap().history.is_empty());
    assert_eq!(harness.transcript().len(), 2);
}
