use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::config::AppConfig;
use crate::database::DrinkStore;

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DrinkStore>,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DrinkStore>, validator: Arc<TokenValidator>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            validator,
        }
    }
}
