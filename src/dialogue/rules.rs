//! Pure reply decision
//!
//! Rules are evaluated in `RULES` order and the first one that applies
//! decides the reply and the next state. Global commands come before
//! state-scoped rules so a sender can always get back to the menu.

use super::intent::{classify, Intent};
use super::replies::{self, GreetingPicker};
use super::topics::{ISLAMIC_TOPICS, LANGUAGE_FAQ};
use super::ConvState;

/// Message prepared for rule evaluation
#[derive(Debug, Clone)]
pub struct Message<'a> {
    /// Lowercased text, used for substring matching
    pub text: &'a str,
    /// Lowercased and trimmed, used for literal comparisons
    pub trimmed: &'a str,
    pub intent: Option<Intent>,
}

impl<'a> Message<'a> {
    /// `lowered` must already be lowercased
    pub fn new(lowered: &'a str) -> Self {
        Self {
            text: lowered,
            trimmed: lowered.trim(),
            intent: classify(lowered),
        }
    }

    fn contains_islamic_greeting(&self) -> bool {
        replies::ISLAMIC_GREETINGS
            .iter()
            .any(|spelling| self.text.contains(spelling))
    }
}

/// One entry of the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Greeting,
    IslamicGreeting,
    Menu,
    MenuLanguageHelp,
    MenuIslamicTopics,
    MenuAbout,
    IslamicTopic,
    LanguageFaq,
    ReligionPrompt,
    ReligionConfirm,
    Farewell,
    Fallback,
}

/// Evaluation order
pub const RULES: [Rule; 12] = [
    Rule::Greeting,
    Rule::IslamicGreeting,
    Rule::Menu,
    Rule::MenuLanguageHelp,
    Rule::MenuIslamicTopics,
    Rule::MenuAbout,
    Rule::IslamicTopic,
    Rule::LanguageFaq,
    Rule::ReligionPrompt,
    Rule::ReligionConfirm,
    Rule::Farewell,
    Rule::Fallback,
];

/// Outcome of a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    pub reply: &'static str,
    /// `None` leaves the current state in place
    pub next_state: Option<ConvState>,
}

impl Decision {
    fn keep(rule: Rule, reply: &'static str) -> Self {
        Self {
            rule,
            reply,
            next_state: None,
        }
    }

    fn enter(rule: Rule, reply: &'static str, state: ConvState) -> Self {
        Self {
            rule,
            reply,
            next_state: Some(state),
        }
    }

    /// State after applying this decision to `current`
    pub fn resolve(&self, current: ConvState) -> ConvState {
        self.next_state.unwrap_or(current)
    }
}

impl Rule {
    /// Decision for this rule, or `None` if it does not apply
    pub fn apply(
        self,
        message: &Message<'_>,
        state: ConvState,
        greeter: &dyn GreetingPicker,
    ) -> Option<Decision> {
        match self {
            Rule::Greeting => (message.intent == Some(Intent::Greeting))
                .then(|| Decision::keep(self, replies::greeting(greeter))),

            Rule::IslamicGreeting => message
                .contains_islamic_greeting()
                .then(|| Decision::keep(self, replies::ISLAMIC_GREETING_REPLY)),

            Rule::Menu => (message.intent == Some(Intent::Help)
                || message.trimmed.starts_with("/help"))
            .then(|| Decision::keep(self, replies::MAIN_MENU)),

            Rule::MenuLanguageHelp => {
                (message.trimmed == "1").then(|| Decision::keep(self, replies::LANGUAGE_HELP))
            }

            Rule::MenuIslamicTopics => (message.trimmed == "2").then(|| {
                Decision::enter(
                    self,
                    replies::ISLAMIC_TOPICS_PROMPT,
                    ConvState::AwaitingIslamicTopic,
                )
            }),

            Rule::MenuAbout => {
                (message.trimmed == "3").then(|| Decision::keep(self, replies::ABOUT_BOT))
            }

            // stays in the topic menu so the sender can ask about another topic
            Rule::IslamicTopic => (state == ConvState::AwaitingIslamicTopic).then(|| {
                let reply = ISLAMIC_TOPICS
                    .lookup(message.text)
                    .unwrap_or(replies::ISLAMIC_TOPICS_PROMPT);
                Decision::keep(self, reply)
            }),

            Rule::LanguageFaq => LANGUAGE_FAQ
                .lookup(message.text)
                .map(|answer| Decision::keep(self, answer)),

            Rule::ReligionPrompt => message.text.contains("religion").then(|| {
                Decision::enter(
                    self,
                    replies::RELIGION_PROMPT,
                    ConvState::AwaitingReligionConfirm,
                )
            }),

            // single shot: any answer consumes the prompt
            Rule::ReligionConfirm => (state == ConvState::AwaitingReligionConfirm).then(|| {
                let reply = if matches!(message.trimmed, "yes" | "y") {
                    replies::RELIGION_ACCEPTED
                } else {
                    replies::RELIGION_DECLINED
                };
                Decision::enter(self, reply, ConvState::Idle)
            }),

            Rule::Farewell => (message.intent == Some(Intent::Bye))
                .then(|| Decision::keep(self, replies::FAREWELL)),

            Rule::Fallback => Some(Decision::keep(self, replies::FALLBACK)),
        }
    }
}

/// Decide the reply for `message` given the sender's current `state`.
///
/// Pure: the same inputs and greeting pick always give the same decision.
pub fn decide(state: ConvState, message: &Message<'_>, greeter: &dyn GreetingPicker) -> Decision {
    RULES
        .iter()
        .find_map(|rule| rule.apply(message, state, greeter))
        .unwrap_or_else(|| Decision::keep(Rule::Fallback, replies::FALLBACK))
}
