use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::AccountService;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.security));
        let passwords = PasswordHasher::new(config.security.bcrypt_cost);
        let accounts = AccountService::new(
            store.clone(),
            tokens.clone(),
            passwords,
            config.security.password_min_length,
        );

        Self {
            config: Arc::new(config),
            store,
            tokens,
            accounts,
        }
    }
}
