//! Shared application state.
//!
//! The state is built once in `main` and cloned into every handler by
//! axum - repositories and services get their dependencies handed to them
//! explicitly instead of reaching for globals, which is what makes the
//! integration tests able to run against an in-memory database.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use shopfront_db::Database;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));

        AppState {
            db,
            jwt,
            config: Arc::new(config),
        }
    }
}
