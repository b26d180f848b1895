//! Dialogue engine: the single entry point from the gateway into the core

use super::replies::GreetingPicker;
use super::rules::{decide, Decision, Message};
use super::store::{MemoryStateStore, StateStore};
use super::ConvState;

/// Turns `(sender, text)` into a reply, keeping per-sender state in `S`
pub struct DialogueEngine<S: StateStore = MemoryStateStore> {
    store: S,
    greeter: Box<dyn GreetingPicker>,
}

#[cfg(test)]
impl DialogueEngine<MemoryStateStore> {
    /// Fresh in-memory store and random greetings
    pub fn in_memory() -> Self {
        Self::new(MemoryStateStore::new(), super::replies::RandomGreeting)
    }
}

impl<S: StateStore> DialogueEngine<S> {
    pub fn new(store: S, greeter: impl GreetingPicker + 'static) -> Self {
        Self {
            store,
            greeter: Box::new(greeter),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reply to `raw_text` from `sender`.
    ///
    /// Never fails and never returns an empty reply. The state read, rule
    /// evaluation and state write happen as one atomic step per sender.
    pub fn handle(&self, sender: &str, raw_text: &str) -> String {
        let lowered = raw_text.to_lowercase();
        let message = Message::new(&lowered);

        let mut outcome: Option<(ConvState, Decision)> = None;
        let new_state = self.store.update(sender, &mut |current: ConvState| {
            let decision = decide(current, &message, self.greeter.as_ref());
            let next = decision.resolve(current);
            outcome = Some((current, decision));
            next
        });

        match outcome {
            Some((previous, decision)) => {
                tracing::debug!(
                    sender = %sender,
                    rule = ?decision.rule,
                    intent = ?message.intent,
                    from = %previous,
                    to = %new_state,
                    "Dialogue rule applied"
                );
                decision.reply.to_string()
            }
            // update() always runs the closure; this arm only guards a broken store
            None => {
                tracing::warn!(sender = %sender, "State store skipped the update");
                decide(new_state, &message, self.greeter.as_ref())
                    .reply
                    .to_string()
            }
        }
    }
}
