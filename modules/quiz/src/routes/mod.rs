pub mod answers;
pub mod stats;

use sqlx::PgPool;
use std::sync::Arc;

use crate::saga::SagaCoordinator;

/// Shared state injected into route handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub saga: Arc<SagaCoordinator>,
}
