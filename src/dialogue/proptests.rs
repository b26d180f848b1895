//! Property-based tests for the dialogue rules
//!
//! These tests verify key invariants hold across all possible inputs.

use super::intent::{classify, Intent};
use super::replies::{self, FixedGreeting, GREETINGS};
use super::rules::{decide, Decision, Message, Rule};
use super::topics::ISLAMIC_TOPICS;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Idle),
        Just(ConvState::AwaitingIslamicTopic),
        Just(ConvState::AwaitingReligionConfirm),
    ]
}

fn arb_greeting_keyword() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("hello"), Just("hi"), Just("hey")]
}

fn arb_topic() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop::sample::select(ISLAMIC_TOPICS.entries().collect::<Vec<_>>())
}

/// Free text, including mixed case and the menu digits
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 /?]{0,40}",
        Just(String::new()),
        Just("2".to_string()),
        Just("yes".to_string()),
        Just("religion".to_string()),
        Just("/help".to_string()),
    ]
}

fn decide_text(state: ConvState, text: &str, pick: usize) -> Decision {
    let lowered = text.to_lowercase();
    decide(state, &Message::new(&lowered), &FixedGreeting(pick))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: every input gets a non-empty reply
    #[test]
    fn prop_reply_never_empty(state in arb_state(), text in arb_text(), pick in 0usize..8) {
        let decision = decide_text(state, &text, pick);
        prop_assert!(!decision.reply.is_empty());
    }

    // Invariant 2: only the three stateful rules change state
    #[test]
    fn prop_state_changes_only_through_stateful_rules(state in arb_state(), text in arb_text()) {
        let decision = decide_text(state, &text, 0);
        if decision.resolve(state) != state {
            prop_assert!(
                matches!(
                    decision.rule,
                    Rule::MenuIslamicTopics | Rule::ReligionPrompt | Rule::ReligionConfirm
                ),
                "{:?} changed {:?} -> {:?}",
                decision.rule,
                state,
                decision.resolve(state)
            );
        }
    }

    // Invariant 3: greeting keyword anywhere wins and keeps state
    #[test]
    fn prop_greeting_keeps_state(
        state in arb_state(),
        prefix in "[a-z ]{0,10}",
        keyword in arb_greeting_keyword(),
        suffix in "[a-z ]{0,10}",
        pick in 0usize..3,
    ) {
        let text = format!("{prefix}{keyword}{suffix}");
        let engine = DialogueEngine::new(MemoryStateStore::new(), FixedGreeting(pick));
        engine.store().set("p", state);

        let reply = engine.handle("p", &text);
        prop_assert_eq!(reply.as_str(), GREETINGS[pick]);
        prop_assert_eq!(engine.store().get("p"), state);
    }

    // Invariant 4: topic re-query is idempotent while in the topic menu
    #[test]
    fn prop_topic_requery_stays_in_topic_menu(
        (trigger, answer) in arb_topic(),
        filler in "[0-9 ]{0,4}",
        repeats in 1usize..4,
    ) {
        let engine = DialogueEngine::new(MemoryStateStore::new(), FixedGreeting(0));
        engine.store().set("p", ConvState::AwaitingIslamicTopic);
        let text = format!("{filler}{}", trigger.to_uppercase());

        for _ in 0..repeats {
            let reply = engine.handle("p", &text);
            prop_assert_eq!(reply.as_str(), answer);
            prop_assert_eq!(engine.store().get("p"), ConvState::AwaitingIslamicTopic);
        }
    }

    // Invariant 5: help intent returns the menu from any state
    #[test]
    fn prop_help_intent_shows_menu(state in arb_state(), text in "[a-z]{0,6}menu[a-z]{0,6}") {
        prop_assume!(classify(&text) == Some(Intent::Help));
        let decision = decide_text(state, &text, 0);
        prop_assert_eq!(decision.reply, replies::MAIN_MENU);
        prop_assert_eq!(decision.resolve(state), state);
    }

    // Invariant 6: classification ignores state
    #[test]
    fn prop_classify_is_deterministic(text in "[a-z ]{0,30}") {
        prop_assert_eq!(classify(&text), classify(&text));
        prop_assert_eq!(Message::new(&text).intent, classify(&text));
    }

    // Invariant 7: religion confirmation is consumed by any non-command answer
    #[test]
    fn prop_confirmation_resets_to_idle(answer in "[j-z]{1,8}") {
        prop_assume!(classify(&answer).is_none());
        prop_assume!(!answer.contains("religion"));
        let decision = decide_text(ConvState::AwaitingReligionConfirm, &answer, 0);
        prop_assert_eq!(decision.rule, Rule::ReligionConfirm);
        prop_assert_eq!(decision.resolve(ConvState::AwaitingReligionConfirm), ConvState::Idle);
    }
}
