pub mod graph;

pub use graph::GraphRepository;

use async_trait::async_trait;
use switter_graph::Graphid;

use crate::{
    error::AppResult,
    models::{NewUser, Post, User},
};

/// Vertex label of accounts
pub const USER: &str = "User";
/// Vertex label of posts
pub const POST: &str = "Post";
/// `(:User)-[:FOLLOWS]->(:User)`
pub const FOLLOWS: &str = "FOLLOWS";
/// `(:User)-[:POSTED]->(:Post)`
pub const POSTED: &str = "POSTED";
/// `(:User)-[:LIKES]->(:Post)`
pub const LIKES: &str = "LIKES";

/// Data access for users, posts, follows and likes
///
/// Every method is one fixed graph pattern. A pattern that matches nothing is
/// not an error: writes report `false`/`None` and reads come back empty.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialRepository: Send + Sync {
    /// `CREATE (:User {username, email, password})`, storing a bcrypt hash
    async fn register_user(&self, user: NewUser) -> AppResult<User>;

    /// `MATCH (u:User {username}) RETURN u.password`, then compare hashes
    ///
    /// `None` for an unknown user or a wrong password.
    async fn authenticate_user(&self, username: &str, password: &str) -> AppResult<Option<User>>;

    /// `MATCH (u:User {username}) CREATE (u)-[:POSTED]->(:Post {body})`
    async fn create_post(&self, author: &str, body: &str) -> AppResult<Option<Post>>;

    /// `MATCH (u:User {username}), (p:Post) WHERE id(p) = $id CREATE (u)-[:LIKES]->(p)`
    async fn like_post(&self, username: &str, post_id: Graphid) -> AppResult<bool>;

    /// `MATCH (n:User {username}), (m:User {username: $target}) CREATE (n)-[:FOLLOWS]->(m)`
    async fn follow_user(&self, username: &str, target: &str) -> AppResult<bool>;

    /// `MATCH (:User {username})-[:FOLLOWS]->(f:User)-[:POSTED]->(p) RETURN f, p`
    async fn list_feed(&self, username: &str) -> AppResult<Vec<Post>>;

    /// `MATCH (:User {username})-[:POSTED]->(p) RETURN p`
    async fn list_user_posts(&self, username: &str) -> AppResult<Vec<Post>>;

    /// Every user the viewer does not follow, the viewer excluded
    async fn list_suggested_users(&self, username: &str) -> AppResult<Vec<String>>;

    /// `MATCH ()-[:LIKES]->(p) WHERE id(p) = $id RETURN count(*)`
    async fn count_likes(&self, post_id: Graphid) -> AppResult<usize>;
}
