//! E2E tests for the orchestration paths: short-circuit, escalation,
//! degraded model, and pattern-only mode.

mod helpers;

use std::time::Duration;

use bl_classifier::EngineConfig;
use bl_llm::MockBackend;
use bl_protocol::{EntityKind, HypothesisSource, IntentId, PathTaken};
use bl_rules::RulePack;

use helpers::{pattern_only, reply, TestHarness};

/// A clear cancellation clears the short-circuit threshold: the model is
/// never consulted and the result carries the extracted date.
#[tokio::test]
async fn e2e_clear_cancellation_short_circuits() {
    let h = TestHarness::with_model(MockBackend::new());

    let result = h.classify("I need to cancel my booking for Friday").await;

    assert_eq!(h.model.calls(), 0, "short-circuit must skip the model");
    assert_eq!(result.report.path, PathTaken::ShortCircuit);
    assert_eq!(result.primary_intent, Some(IntentId::BookingManagement));
    assert!((result.intents[0].confidence - 0.9).abs() < f64::EPSILON);
    assert!(!result.requires_clarification);
    assert!(
        result.intents[0]
            .entities
            .iter()
            .any(|e| e.kind == EntityKind::DateTime && e.text.eq_ignore_ascii_case("friday")),
        "weekday should be extracted alongside the intent"
    );
}

/// A message carrying two goals yields both intents from the pattern path
/// alone when the stronger one short-circuits.
#[tokio::test]
async fn e2e_mixed_request_yields_both_intents() {
    let h = TestHarness::with_model(MockBackend::new());

    let result = h.classify("Cancel my booking and give me a refund").await;

    assert_eq!(h.model.calls(), 0);
    assert_eq!(result.report.path, PathTaken::ShortCircuit);
    let order: Vec<IntentId> = result.intents.iter().map(|h| h.intent).collect();
    assert_eq!(
        order,
        vec![IntentId::BookingManagement, IntentId::RefundRequest],
        "cancellation outranks the refund side of the message"
    );
    assert!(result.intents.iter().all(|h| h.source == HypothesisSource::Pattern));
    assert!(!result.requires_clarification);
}

/// Weak pattern evidence escalates; a confident model answer replaces it.
#[tokio::test]
async fn e2e_ambiguous_text_escalates_to_model() {
    let mock = MockBackend::new().with_reply(reply(&[("booking_management", 0.75)]));
    let h = TestHarness::with_model(mock);

    let result = h.classify("Can you help me with my booking?").await;

    assert_eq!(h.model.calls(), 1);
    assert_eq!(result.report.path, PathTaken::Escalated);
    assert_eq!(result.report.pattern_hypotheses, 1);
    assert_eq!(result.report.model_hypotheses, 1);
    assert_eq!(result.primary_intent, Some(IntentId::BookingManagement));
    assert!((result.intents[0].confidence - 0.75).abs() < f64::EPSILON);
    assert_eq!(
        result.intents[0].source,
        HypothesisSource::Model,
        "the stronger model hypothesis wins the merge"
    );
    assert!(!result.requires_clarification);
}

/// A model that overruns its deadline degrades the request to the pattern
/// result instead of failing it.
#[tokio::test]
async fn e2e_model_timeout_degrades_gracefully() {
    let mut config = EngineConfig::default();
    config.model.timeout_secs = 0;
    let mock = MockBackend::new().with_delay(Duration::from_millis(50));
    let h = TestHarness::build(config, RulePack::builtin(), mock);

    let result = h.classify("I want my money back").await;

    assert_eq!(h.model.calls(), 1, "the call was made, then cut off");
    assert_eq!(result.report.path, PathTaken::ModelFailed);
    let error = result.report.model_error.as_ref().expect("recorded error");
    assert!(error.contains("timed out"), "unexpected error: {error}");
    assert_eq!(result.primary_intent, Some(IntentId::RefundRequest));
    assert!((result.intents[0].confidence - 0.85).abs() < f64::EPSILON);
    assert_eq!(result.intents[0].source, HypothesisSource::Pattern);
    assert!(!result.requires_clarification);
}

/// With no model backend wired at all, escalation-eligible requests come
/// back pattern-only, entities included.
#[tokio::test]
async fn e2e_disabled_model_runs_pattern_only() {
    let classifier = pattern_only();

    let result = classifier.classify("tell me about your cleaning services").await;

    assert_eq!(result.report.path, PathTaken::PatternOnly);
    assert_eq!(result.report.model_hypotheses, 0);
    assert!(result.report.model_error.is_none());
    assert_eq!(result.primary_intent, Some(IntentId::ServiceInquiry));
    assert!(
        result.intents[0]
            .entities
            .iter()
            .any(|e| e.kind == EntityKind::Category && e.text == "cleaning"),
        "category extraction still runs without a model"
    );
    assert!(!result.requires_clarification);
}

/// A TOML rule pack loaded at runtime drives the engine exactly like the
/// builtin table, exact-phrase boost included.
#[tokio::test]
async fn e2e_custom_rule_pack_drives_short_circuit() {
    let pack = RulePack::from_toml_str(
        r#"
        name = "concierge"

        [[rules]]
        name = "vip.phrase"
        intent = "booking_management"
        weight = 0.9
        matcher = { phrase = { phrase = "talk to my concierge" } }

        [[rules]]
        name = "vip.keywords"
        intent = "service_inquiry"
        weight = 0.6
        matcher = { any_of = { terms = ["membership", "concierge"] } }
        "#,
    )
    .unwrap();
    let h = TestHarness::build(EngineConfig::default(), pack, MockBackend::new());

    let result = h.classify("talk to my concierge").await;

    assert_eq!(h.model.calls(), 0);
    assert_eq!(result.report.path, PathTaken::ShortCircuit);
    assert_eq!(result.primary_intent, Some(IntentId::BookingManagement));
    // 0.9 plus the exact-utterance boost.
    assert!((result.intents[0].confidence - 0.95).abs() < f64::EPSILON);
    assert_eq!(result.intents.len(), 2);
    assert_eq!(result.intents[1].intent, IntentId::ServiceInquiry);
}
