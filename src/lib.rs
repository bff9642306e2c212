pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod id;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use config::Config;
use gateway::broadcast::GatewayBroadcast;
use gateway::limiter::RateLimiter;
use gateway::registry::SessionRegistry;
use store::Store;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionRegistry>,
    pub broadcast: Arc<GatewayBroadcast>,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<Config>,
}
