use axum::extract::FromRef;

use crate::services::{MutationService, QueryService};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedQueryService = Arc<QueryService>;
pub type GuardedMutationService = Arc<MutationService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub query: GuardedQueryService,
    pub mutation: GuardedMutationService,
}

impl ServerState {
    pub fn new(config: ServerConfig, query: QueryService, mutation: MutationService) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            query: Arc::new(query),
            mutation: Arc::new(mutation),
        }
    }
}

impl FromRef<ServerState> for GuardedQueryService {
    fn from_ref(input: &ServerState) -> Self {
        input.query.clone()
    }
}

impl FromRef<ServerState> for GuardedMutationService {
    fn from_ref(input: &ServerState) -> Self {
        input.mutation.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
