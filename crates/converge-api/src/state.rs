use std::sync::Arc;

use converge_engine::Orchestrator;
use converge_graph::GraphStore;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// All resources are wrapped in Arc for efficient sharing across async tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<GraphStore>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<GraphStore>, orchestrator: Orchestrator) -> Self {
        Self {
            config: Arc::new(config),
            store,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
