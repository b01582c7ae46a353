// Application state shared across all modules

use std::sync::Arc;

use crate::auth::{AuthOrchestrator, TokenService};
use crate::common::dev_mode::RuntimeEnv;

/// Explicitly constructed services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthOrchestrator>,
    pub tokens: Arc<TokenService>,
    pub runtime_env: RuntimeEnv,
}
