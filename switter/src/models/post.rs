use chrono::{DateTime, Utc};
use switter_graph::{Graphid, Vertex};

/// A post as shown in a feed: the `Post` vertex plus its author and like count
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Graphid,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub likes: usize,
}

impl Post {
    /// Convert from a `Post` vertex
    pub fn from_vertex(vertex: &Vertex, author: impl Into<String>, likes: usize) -> anyhow::Result<Self> {
        Ok(Self {
            id: vertex.id,
            author: author.into(),
            body: vertex
                .str_property("body")
                .ok_or_else(|| anyhow::anyhow!("Missing body"))?
                .to_string(),
            created_at: DateTime::from_timestamp(
                vertex
                    .i64_property("created_at")
                    .ok_or_else(|| anyhow::anyhow!("Missing created_at"))?,
                0,
            )
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?,
            likes,
        })
    }
}
