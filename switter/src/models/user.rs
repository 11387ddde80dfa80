use chrono::{DateTime, Utc};
use serde::Deserialize;
use switter_graph::{Graphid, Vertex};

/// A registered account, as stored on a `User` vertex
///
/// The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Graphid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Convert from a `User` vertex
    pub fn from_vertex(vertex: &Vertex) -> anyhow::Result<Self> {
        Ok(Self {
            id: vertex.id,
            username: vertex
                .str_property("username")
                .ok_or_else(|| anyhow::anyhow!("Missing username"))?
                .to_string(),
            email: vertex.str_property("email").unwrap_or_default().to_string(),
            created_at: DateTime::from_timestamp(vertex.i64_property("created_at").unwrap_or(0), 0)
                .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?,
        })
    }
}

/// Registration form
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
