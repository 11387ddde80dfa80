use std::sync::Arc;

use switter_graph::Graphid;

use crate::{
    error::{AppError, AppResult},
    models::FeedPage,
    repository::SocialRepository,
};

pub struct FeedService {
    repo: Arc<dyn SocialRepository>,
}

impl FeedService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    /// Posts of everyone the viewer follows
    pub async fn feed_page(&self, viewer: &str) -> AppResult<FeedPage> {
        Ok(FeedPage {
            you: viewer.to_string(),
            owner: None,
            others: self.repo.list_suggested_users(viewer).await?,
            posts: self.repo.list_feed(viewer).await?,
        })
    }

    /// Posts of a single user, as seen by the viewer
    pub async fn user_page(&self, viewer: &str, username: &str) -> AppResult<FeedPage> {
        Ok(FeedPage {
            you: viewer.to_string(),
            owner: Some(username.to_string()),
            others: self.repo.list_suggested_users(viewer).await?,
            posts: self.repo.list_user_posts(username).await?,
        })
    }

    /// Publish a post as `author`
    pub async fn publish(&self, author: &str, body: &str) -> AppResult<()> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::BadRequest("Post body cannot be empty".to_string()));
        }

        match self.repo.create_post(author, body).await? {
            Some(post) => tracing::info!(author, post = %post.id, "published post"),
            None => tracing::warn!(author, "post author not found"),
        }
        Ok(())
    }

    /// Like the post whose id is given in its textual form
    pub async fn like(&self, viewer: &str, post_id: &str) -> AppResult<()> {
        let id: Graphid = post_id
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid post ID: {}", e)))?;

        if !self.repo.like_post(viewer, id).await? {
            tracing::warn!(viewer, post = %id, "like matched nothing");
        }
        Ok(())
    }

    /// Follow `target` as the viewer
    pub async fn follow(&self, viewer: &str, target: &str) -> AppResult<()> {
        if !self.repo.follow_user(viewer, target).await? {
            tracing::warn!(viewer, target, "follow matched nothing");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;
    use crate::repository::MockSocialRepository;
    use chrono::Utc;

    fn post(author: &str, body: &str, likes: usize) -> Post {
        Post {
            id: Graphid::new(2, 1).unwrap(),
            author: author.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
            likes,
        }
    }

    #[tokio::test]
    async fn test_feed_page_combines_posts_and_suggestions() {
        let mut repo = MockSocialRepository::new();
        repo.expect_list_feed()
            .withf(|viewer| viewer == "alice")
            .returning(|_| Ok(vec![post("bob", "hi", 2)]));
        repo.expect_list_suggested_users()
            .withf(|viewer| viewer == "alice")
            .returning(|_| Ok(vec!["carol".to_string()]));

        let page = FeedService::new(Arc::new(repo)).feed_page("alice").await.unwrap();
        assert_eq!(page.you, "alice");
        assert_eq!(page.owner, None);
        assert_eq!(page.others, vec!["carol".to_string()]);
        assert_eq!(page.posts, vec![post("bob", "hi", 2)]);
    }

    #[tokio::test]
    async fn test_user_page_lists_that_users_posts() {
        let mut repo = MockSocialRepository::new();
        repo.expect_list_user_posts()
            .withf(|username| username == "bob")
            .returning(|_| Ok(vec![post("bob", "mine", 0)]));
        repo.expect_list_suggested_users().returning(|_| Ok(vec![]));

        let page = FeedService::new(Arc::new(repo))
            .user_page("alice", "bob")
            .await
            .unwrap();
        assert_eq!(page.you, "alice");
        assert_eq!(page.owner.as_deref(), Some("bob"));
        assert_eq!(page.posts.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_rejects_blank_body() {
        let service = FeedService::new(Arc::new(MockSocialRepository::new()));
        let result = service.publish("alice", "   ").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_publish_trims_body() {
        let mut repo = MockSocialRepository::new();
        repo.expect_create_post()
            .withf(|author, body| author == "alice" && body == "hello")
            .times(1)
            .returning(|author, body| Ok(Some(post(author, body, 0))));

        let service = FeedService::new(Arc::new(repo));
        service.publish("alice", "  hello\n").await.unwrap();
    }

    #[tokio::test]
    async fn test_like_parses_post_id() {
        let mut repo = MockSocialRepository::new();
        repo.expect_like_post()
            .withf(|viewer, id| viewer == "alice" && *id == Graphid::new(2, 7).unwrap())
            .times(1)
            .returning(|_, _| Ok(true));

        let service = FeedService::new(Arc::new(repo));
        service.like("alice", "2.7").await.unwrap();

        let result = service.like("alice", "seven").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unmatched_follow_is_not_an_error() {
        let mut repo = MockSocialRepository::new();
        repo.expect_follow_user()
            .withf(|viewer, target| viewer == "alice" && target == "nobody")
            .returning(|_, _| Ok(false));

        let service = FeedService::new(Arc::new(repo));
        service.follow("alice", "nobody").await.unwrap();
    }
}
