use std::fmt;
use std::sync::Arc;

use gatehouse_core::AuthService;

use crate::infra::config::Config;

/// Shared state handed to every handler and middleware layer.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, config: Config) -> Self {
        Self {
            auth,
            config: Arc::new(config),
        }
    }
}
