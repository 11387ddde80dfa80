//! Session tokens & cookies
//!
//! A logged-in browser carries the `jwt_token` cookie: an HS512-signed [JWT] whose subject is
//! the username. Nothing is kept server-side; the signature, issuer and expiry are checked on
//! every authenticated request.
//!
//! [JWT]: https://www.rfc-editor.org/rfc/rfc7519.html

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use thiserror::Error;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "jwt_token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to sign session token: {0}")]
    Signing(String),

    #[error("Invalid session token: {0}")]
    Invalid(#[from] jwt::Error),

    #[error("Session token was issued by '{0}'")]
    WrongIssuer(String),

    #[error("Session token expired at {0}")]
    Expired(DateTime<Utc>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    #[serde(rename = "sub")]
    pub username: String,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires: i64,
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionKey {
    key: Hmac<Sha512>,
    issuer: String,
    ttl: Duration,
}

impl SessionKey {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Result<Self, SessionError> {
        let key = Hmac::<Sha512>::new_from_slice(secret)
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        Ok(Self {
            key,
            issuer: issuer.into(),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `username`, valid for the configured lifetime
    pub fn mint(&self, username: &str) -> Result<String, SessionError> {
        self.mint_at(username, Utc::now())
    }

    fn mint_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionClaims {
            username: username.to_string(),
            issuer: self.issuer.clone(),
            issued_at: now.timestamp(),
            expires: (now + self.ttl).timestamp(),
        };
        claims
            .sign_with_key(&self.key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verify a token and return the username it was minted for
    pub fn verify(&self, token: &str) -> Result<String, SessionError> {
        let claims: SessionClaims = token.verify_with_key(&self.key)?;

        if claims.issuer != self.issuer {
            return Err(SessionError::WrongIssuer(claims.issuer));
        }

        let expires = DateTime::from_timestamp(claims.expires, 0).unwrap_or_default();
        if Utc::now() >= expires {
            return Err(SessionError::Expired(expires));
        }

        Ok(claims.username)
    }
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    let expires = Utc::now() + ttl;
    format!(
        "{}={}; Path=/; Expires={}; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token,
        expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        ttl.num_seconds()
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE
    )
}

/// Read a cookie by name from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn key() -> SessionKey {
        SessionKey::new(b"test-secret", "switter", Duration::hours(24)).unwrap()
    }

    #[test]
    fn test_mint_then_verify() {
        let key = key();
        let token = key.mint("alice").unwrap();
        assert_eq!(key.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let other = SessionKey::new(b"another-secret", "switter", Duration::hours(24)).unwrap();
        let token = other.mint("alice").unwrap();
        assert!(matches!(key().verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_rejects_wrong_issuer() {
        let other = SessionKey::new(b"test-secret", "elsewhere", Duration::hours(24)).unwrap();
        let token = other.mint("alice").unwrap();
        assert!(matches!(key().verify(&token), Err(SessionError::WrongIssuer(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let key = key();
        let token = key.mint_at("alice", Utc::now() - Duration::hours(25)).unwrap();
        assert!(matches!(key.verify(&token), Err(SessionError::Expired(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(key().verify("alice").is_err());
        assert!(key().verify("").is_err());
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; jwt_token=abc.def"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "other").as_deref(), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", Duration::hours(24));
        assert!(cookie.starts_with("jwt_token=tok; Path=/; Expires="));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
    }
}
