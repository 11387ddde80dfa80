use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use switter_graph::{Graphid, SharedStorage, Vertex};

use super::{SocialRepository, FOLLOWS, LIKES, POST, POSTED, USER};
use crate::{
    error::{AppError, AppResult},
    models::{NewUser, Post, User},
};

/// [`SocialRepository`] over the embedded graph store
pub struct GraphRepository {
    storage: SharedStorage,
    bcrypt_cost: u32,
}

impl GraphRepository {
    /// Wrap `storage`, declaring the username index the lookups rely on
    pub async fn new(storage: SharedStorage, bcrypt_cost: u32) -> AppResult<Self> {
        storage.ensure_unique_index(USER, "username").await?;
        Ok(Self {
            storage,
            bcrypt_cost,
        })
    }

    /// `(u:User {username})`
    async fn find_user(&self, username: &str) -> AppResult<Option<Vertex>> {
        Ok(self.storage.find_vertex(USER, "username", username).await?)
    }

    /// `(p:Post) WHERE id(p) = $id`
    async fn find_post(&self, post_id: Graphid) -> AppResult<Option<Vertex>> {
        let vertex = self.storage.get_vertex(post_id).await?;
        Ok(vertex.filter(|v| v.label == POST))
    }

    /// `(author)-[:POSTED]->(p)`, each post with its like count
    async fn posts_by(&self, author: &Vertex) -> AppResult<Vec<Post>> {
        let username = author.str_property("username").unwrap_or_default();

        let mut posts = Vec::new();
        for edge in self.storage.outgoing_edges(author.id, POSTED).await? {
            let Some(vertex) = self.storage.get_vertex(edge.end).await? else {
                continue;
            };
            let likes = self.count_likes(vertex.id).await?;
            posts.push(Post::from_vertex(&vertex, username, likes)?);
        }

        Ok(posts)
    }
}

/// Newest first; ids break ties within the same second
fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[async_trait]
impl SocialRepository for GraphRepository {
    async fn register_user(&self, user: NewUser) -> AppResult<User> {
        let password = hash_password(user.password, self.bcrypt_cost).await?;

        let properties = json!({
            "username": user.username,
            "email": user.email,
            "password": password,
            "created_at": Utc::now().timestamp(),
        });

        let vertex = self.storage.create_vertex(USER, properties).await?;
        tracing::info!(username = %user.username, id = %vertex.id, "registered user");

        Ok(User::from_vertex(&vertex)?)
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(vertex) = self.find_user(username).await? else {
            return Ok(None);
        };

        let hash = vertex
            .str_property("password")
            .ok_or_else(|| AppError::Internal(format!("User '{}' has no password hash", username)))?
            .to_string();

        if !verify_password(password.to_string(), hash).await? {
            return Ok(None);
        }

        Ok(Some(User::from_vertex(&vertex)?))
    }

    async fn create_post(&self, author: &str, body: &str) -> AppResult<Option<Post>> {
        let Some(user) = self.find_user(author).await? else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        let post = self
            .storage
            .create_vertex(POST, json!({ "body": body, "created_at": now }))
            .await?;
        self.storage
            .create_edge(POSTED, user.id, post.id, json!({ "posted_at": now }))
            .await?;

        Ok(Some(Post::from_vertex(&post, author, 0)?))
    }

    async fn like_post(&self, username: &str, post_id: Graphid) -> AppResult<bool> {
        let (Some(user), Some(post)) = (self.find_user(username).await?, self.find_post(post_id).await?)
        else {
            return Ok(false);
        };

        self.storage
            .create_edge(LIKES, user.id, post.id, json!({ "liked_at": Utc::now().timestamp() }))
            .await?;

        Ok(true)
    }

    async fn follow_user(&self, username: &str, target: &str) -> AppResult<bool> {
        let (Some(follower), Some(followee)) =
            (self.find_user(username).await?, self.find_user(target).await?)
        else {
            return Ok(false);
        };

        self.storage
            .create_edge(
                FOLLOWS,
                follower.id,
                followee.id,
                json!({ "followed_at": Utc::now().timestamp() }),
            )
            .await?;

        Ok(true)
    }

    async fn list_feed(&self, username: &str) -> AppResult<Vec<Post>> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(Vec::new());
        };

        let mut feed = Vec::new();
        for edge in self.storage.outgoing_edges(user.id, FOLLOWS).await? {
            if let Some(followee) = self.storage.get_vertex(edge.end).await? {
                feed.extend(self.posts_by(&followee).await?);
            }
        }

        newest_first(&mut feed);
        Ok(feed)
    }

    async fn list_user_posts(&self, username: &str) -> AppResult<Vec<Post>> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(Vec::new());
        };

        let mut posts = self.posts_by(&user).await?;
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn list_suggested_users(&self, username: &str) -> AppResult<Vec<String>> {
        let followed: HashSet<Graphid> = match self.find_user(username).await? {
            Some(user) => self
                .storage
                .outgoing_edges(user.id, FOLLOWS)
                .await?
                .into_iter()
                .map(|e| e.end)
                .collect(),
            None => HashSet::new(),
        };

        let others = self
            .storage
            .scan_vertices(USER)
            .await?
            .into_iter()
            .filter(|v| !followed.contains(&v.id))
            .filter_map(|v| v.str_property("username").map(str::to_string))
            .filter(|name| name != username)
            .collect();

        Ok(others)
    }

    async fn count_likes(&self, post_id: Graphid) -> AppResult<usize> {
        Ok(self.storage.incoming_edges(post_id, LIKES).await?.len())
    }
}
