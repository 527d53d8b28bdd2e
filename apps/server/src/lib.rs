//! # Shopfront Server
//!
//! REST API for Shopfront POS.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Request Lifecycle                                │
//! │                                                                         │
//! │  Client ───► axum Router ───► CurrentUser extractor (JWT)              │
//! │                   │                    │                                │
//! │                   │                    ▼                                │
//! │                   │           Role capability check                     │
//! │                   ▼                    │                                │
//! │             Route handler ◄────────────┘                                │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │        shopfront-core (math) + shopfront-db (queries, transactions)    │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │        {"success": true, "data": ...} / typed error → HTTP status      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
