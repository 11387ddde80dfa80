pub mod auth;
pub mod feed;

pub use auth::AuthService;
pub use feed::FeedService;
