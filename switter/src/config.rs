use std::env;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    pub namespace: String,
}

#[derive(Clone)]
pub struct SessionConfig {
    pub jwt_key: String,
    pub issuer: String,
    pub ttl: Duration,
    pub bcrypt_cost: u32,
}

// Keep the signing key out of the startup log
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("jwt_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `JWT_KEY` is required; everything else has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_key = lookup("JWT_KEY").ok_or_else(|| anyhow::anyhow!("JWT_KEY not set"))?;
        if jwt_key.is_empty() {
            anyhow::bail!("JWT_KEY must not be empty");
        }

        let ttl_hours: i64 = var("SESSION_TTL_HOURS", "24").parse()?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive, got {}", ttl_hours);
        }
        let ttl = Duration::try_hours(ttl_hours)
            .ok_or_else(|| anyhow::anyhow!("SESSION_TTL_HOURS {} is too large", ttl_hours))?;

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(cost) => cost.parse()?,
            None => bcrypt::DEFAULT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            anyhow::bail!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost);
        }

        let config = Self {
            server: ServerConfig {
                host: var("SERVER_HOST", "0.0.0.0"),
                port: var("SERVER_PORT", "3000").parse()?,
            },
            database: DatabaseConfig {
                path: var("DB_PATH", "./data/switter"),
                namespace: var("DB_NAMESPACE", "switter"),
            },
            session: SessionConfig {
                jwt_key,
                issuer: var("JWT_ISSUER", "switter"),
                ttl,
                bcrypt_cost,
            },
            logging: LoggingConfig {
                level: var("LOG_LEVEL", "info"),
                format: var("LOG_FORMAT", "pretty"),
            },
        };

        Ok(config)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
