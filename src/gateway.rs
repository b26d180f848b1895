//! Messaging platform boundary
//!
//! Inbound payload parsing, webhook verification and outbound delivery.
//! Nothing here touches conversation state.

mod error;
pub mod payload;
pub mod verify;
mod whatsapp;

#[cfg(test)]
pub mod testing;

pub use payload::{Incoming, WebhookPayload};
pub use whatsapp::{MessageSender, WhatsAppSender};
