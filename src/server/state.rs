use axum::extract::FromRef;

use crate::catalog_store::ComponentStore;
use crate::matching::MatchRequestHandler;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedComponentStore = Arc<dyn ComponentStore>;
pub type GuardedMatchingHandler = Arc<MatchRequestHandler>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub component_store: GuardedComponentStore,
    pub matching_handler: GuardedMatchingHandler,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedComponentStore {
    fn from_ref(input: &ServerState) -> Self {
        input.component_store.clone()
    }
}

impl FromRef<ServerState> for GuardedMatchingHandler {
    fn from_ref(input: &ServerState) -> Self {
        input.matching_handler.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
