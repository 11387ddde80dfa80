pub mod feed;
pub mod post;
pub mod user;

pub use feed::FeedPage;
pub use post::Post;
pub use user::{NewUser, User};
