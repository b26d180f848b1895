//! HTTP API: webhook endpoints and health checks

mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::GatewayConfig;
use crate::dialogue::{DialogueEngine, MemoryStateStore};
use crate::gateway::MessageSender;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine<Arc<MemoryStateStore>>>,
    pub sender: Arc<dyn MessageSender>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(
        engine: DialogueEngine<Arc<MemoryStateStore>>,
        sender: Arc<dyn MessageSender>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            sender,
            config: Arc::new(config),
        }
    }
}
