//! Conversation state machine and intent resolution
//!
//! Rule evaluation is pure; the engine wraps it in a per-sender atomic
//! read-modify-write against an injectable state store.

mod engine;
pub mod intent;
pub mod replies;
pub mod rules;
mod state;
mod store;
pub mod topics;

#[cfg(test)]
mod proptests;

pub use engine::DialogueEngine;
pub use replies::RandomGreeting;
pub use state::ConvState;
pub use store::{MemoryStateStore, StateStore};
