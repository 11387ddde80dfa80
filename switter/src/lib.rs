pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod session;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::{AuthService, FeedService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub feed_service: Arc<FeedService>,
}
