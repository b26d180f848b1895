//! Conversation state storage
//!
//! The engine is the only writer. Read-modify-write for one sender happens
//! under that sender's entry lock; senders in other shards proceed in
//! parallel.

use super::ConvState;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Storage for per-sender conversation state
pub trait StateStore: Send + Sync {
    /// Current state, `Idle` for unknown senders
    fn get(&self, sender: &str) -> ConvState;

    /// Overwrite the state unconditionally
    fn set(&self, sender: &str, state: ConvState);

    /// Atomically replace the state with `f(current)` and return the new state.
    ///
    /// `f` runs while the sender's entry is locked and must not call back
    /// into the store.
    fn update(&self, sender: &str, f: &mut dyn FnMut(ConvState) -> ConvState) -> ConvState;
}

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn get(&self, sender: &str) -> ConvState {
        (**self).get(sender)
    }

    fn set(&self, sender: &str, state: ConvState) {
        (**self).set(sender, state);
    }

    fn update(&self, sender: &str, f: &mut dyn FnMut(ConvState) -> ConvState) -> ConvState {
        (**self).update(sender, f)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: ConvState,
    touched: Instant,
}

impl Entry {
    fn new(state: ConvState) -> Self {
        Self {
            state,
            touched: Instant::now(),
        }
    }
}

/// In-memory store, volatile for the process lifetime
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of senders with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop senders not touched for longer than `max_idle`; returns how many
    /// entries were removed
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.touched.elapsed() <= max_idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, sender: &str) -> ConvState {
        self.entries
            .get(sender)
            .map_or(ConvState::Idle, |entry| entry.state)
    }

    fn set(&self, sender: &str, state: ConvState) {
        self.entries.insert(sender.to_string(), Entry::new(state));
    }

    fn update(&self, sender: &str, f: &mut dyn FnMut(ConvState) -> ConvState) -> ConvState {
        // the RefMut holds the shard write lock until it drops
        let mut entry = self
            .entries
            .entry(sender.to_string())
            .or_insert_with(|| Entry::new(ConvState::Idle));
        entry.state = f(entry.state);
        entry.touched = Instant::now();
        entry.state
    }
}
