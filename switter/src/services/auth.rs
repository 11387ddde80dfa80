use std::sync::Arc;

use chrono::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{NewUser, User},
    repository::SocialRepository,
    session::SessionKey,
};

/// Path segments under `/auth` that a username would shadow
const RESERVED_USERNAMES: [&str; 4] = ["feed", "new_post", "id", "logout"];

pub struct AuthService {
    repo: Arc<dyn SocialRepository>,
    keys: SessionKey,
}

impl AuthService {
    pub fn new(repo: Arc<dyn SocialRepository>, keys: SessionKey) -> Self {
        Self { repo, keys }
    }

    /// Register a new user
    pub async fn register(&self, user: NewUser) -> AppResult<User> {
        // Validation
        if user.username.is_empty() || user.email.is_empty() || user.password.is_empty() {
            return Err(AppError::BadRequest(
                "Username, email and password are required".to_string(),
            ));
        }
        // Usernames go into link paths unencoded
        if !user
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::BadRequest(format!(
                "'{}' is not a valid username",
                user.username
            )));
        }
        if RESERVED_USERNAMES.contains(&user.username.as_str()) {
            return Err(AppError::AlreadyExists(format!(
                "'{}' is already taken",
                user.username
            )));
        }

        self.repo.register_user(user).await
    }

    /// Check credentials and mint a session token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let user = self
            .repo
            .authenticate_user(username, password)
            .await?
            .ok_or(AppError::Unauthorized)?;

        tracing::info!(username = %user.username, "user logged in");

        Ok(self.keys.mint(&user.username)?)
    }

    /// The username a session token was minted for
    pub fn verify_session(&self, token: &str) -> AppResult<String> {
        Ok(self.keys.verify(token)?)
    }

    pub fn session_ttl(&self) -> Duration {
        self.keys.ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockSocialRepository;
    use chrono::Utc;
    use switter_graph::Graphid;

    fn keys() -> SessionKey {
        SessionKey::new(b"test-secret", "switter", Duration::hours(24)).unwrap()
    }

    fn new_user(username: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_requires_every_field() {
        // The repository must not be reached
        let service = AuthService::new(Arc::new(MockSocialRepository::new()), keys());

        for user in [
            new_user("", "a@example.com", "pw"),
            new_user("alice", "", "pw"),
            new_user("alice", "a@example.com", ""),
        ] {
            let result = service.register(user).await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_register_rejects_route_names() {
        let service = AuthService::new(Arc::new(MockSocialRepository::new()), keys());

        let result = service.register(new_user("feed", "f@example.com", "pw")).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));

        let result = service.register(new_user("a/b", "f@example.com", "pw")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_names_that_change_in_urls() {
        let service = AuthService::new(Arc::new(MockSocialRepository::new()), keys());

        for username in ["%61lice", "..", ".", "a\\b", "al ice", "<b>", "al?ce", "ali#e", "élodie"] {
            let result = service.register(new_user(username, "x@example.com", "pw")).await;
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "{} should be rejected",
                username
            );
        }
    }

    #[tokio::test]
    async fn test_register_accepts_url_safe_names() {
        let mut repo = MockSocialRepository::new();
        repo.expect_register_user().times(3).returning(|user| {
            Ok(User {
                id: Graphid::new(1, 1).unwrap(),
                username: user.username,
                email: user.email,
                created_at: Utc::now(),
            })
        });

        let service = AuthService::new(Arc::new(repo), keys());
        for username in ["alice", "bob_2", "Carol-X"] {
            let user = service
                .register(new_user(username, "x@example.com", "pw"))
                .await
                .unwrap();
            assert_eq!(user.username, username);
        }
    }

    #[tokio::test]
    async fn test_register_forwards_valid_user() {
        let mut repo = MockSocialRepository::new();
        repo.expect_register_user()
            .withf(|user| user.username == "alice" && user.password == "pw")
            .times(1)
            .returning(|user| {
                Ok(User {
                    id: Graphid::new(1, 1).unwrap(),
                    username: user.username,
                    email: user.email,
                    created_at: Utc::now(),
                })
            });

        let service = AuthService::new(Arc::new(repo), keys());
        let user = service
            .register(new_user("alice", "a@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_login_mints_verifiable_token() {
        let mut repo = MockSocialRepository::new();
        repo.expect_authenticate_user()
            .withf(|username, password| username == "alice" && password == "pw")
            .returning(|username, _| {
                Ok(Some(User {
                    id: Graphid::new(1, 1).unwrap(),
                    username: username.to_string(),
                    email: "a@example.com".to_string(),
                    created_at: Utc::now(),
                }))
            });

        let service = AuthService::new(Arc::new(repo), keys());
        let token = service.login("alice", "pw").await.unwrap();
        assert_eq!(service.verify_session(&token).unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials_is_unauthorized() {
        let mut repo = MockSocialRepository::new();
        repo.expect_authenticate_user().returning(|_, _| Ok(None));

        let service = AuthService::new(Arc::new(repo), keys());
        let result = service.login("alice", "nope").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_session_rejects_garbage() {
        let service = AuthService::new(Arc::new(MockSocialRepository::new()), keys());
        assert!(matches!(
            service.verify_session("alice"),
            Err(AppError::Unauthorized)
        ));
    }
}
