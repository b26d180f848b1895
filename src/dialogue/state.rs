//! Conversation state types

use serde::{Deserialize, Serialize};

/// Per-sender conversation mode
///
/// A sender that has never written (or whose entry was evicted) is `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvState {
    /// No pending question
    #[default]
    Idle,

    /// Picked "Islamic Info" from the menu; follow-up texts are looked up
    /// in the religious topic table
    AwaitingIslamicTopic,

    /// Asked about religion; the next text answers the yes/no prompt
    AwaitingReligionConfirm,
}

impl ConvState {
    /// Stable name for logs
    pub fn as_str(self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::AwaitingIslamicTopic => "awaiting_islamic_topic",
            ConvState::AwaitingReligionConfirm => "awaiting_religion_confirm",
        }
    }
}

impl std::fmt::Display for ConvState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
