//! WhatsApp Cloud API webhook payload
//!
//! Only the fields the responder reads are modelled; everything else in the
//! notification is ignored.

use serde::Deserialize;

/// Top-level webhook notification
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    /// Absent on notifications the responder ignores
    #[serde(default)]
    pub entry: Option<Vec<Entry>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    /// Status updates carry no messages
    #[serde(default)]
    pub messages: Option<Vec<InboundMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: String,
}

/// A `(sender, text)` pair ready for the dialogue engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub sender: String,
    /// Empty for non-text messages
    pub text: String,
}

impl InboundMessage {
    fn text_body(&self) -> &str {
        self.text.as_ref().map_or("", |t| t.body.as_str())
    }
}

impl WebhookPayload {
    /// Whether the notification carries entries at all
    pub fn has_entries(&self) -> bool {
        self.entry.is_some()
    }

    /// Extract one `(sender, text)` pair per change: the first message of
    /// each change. Messages without a sender are dropped.
    pub fn incoming(&self) -> Vec<Incoming> {
        let Some(entries) = &self.entry else {
            return Vec::new();
        };

        entries
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .filter_map(|change| change.value.messages.as_ref()?.first())
            .filter_map(|message| match &message.from {
                Some(sender) => Some(Incoming {
                    sender: sender.clone(),
                    text: message.text_body().to_string(),
                }),
                None => {
                    tracing::warn!(
                        message_id = ?message.id,
                        kind = ?message.kind,
                        "Inbound message without sender, skipping"
                    );
                    None
                }
            })
            .collect()
    }
}
