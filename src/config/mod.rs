use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;

/// Errors that abort startup. None of these are recoverable at request time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET_KEY environment variable is required")]
    MissingSecret,

    #[error("access token lifetime ({access}s) must be shorter than refresh token lifetime ({refresh}s)")]
    TokenLifetimes { access: i64, refresh: i64 },

    #[error("BCRYPT_COST must be between 4 and 31, got {0}")]
    BcryptCost(u32),

    #[error("DATABASE_URL is not a valid URL")]
    InvalidDatabaseUrl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub password_min_length: usize,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

// Keep the secret out of Debug output so config dumps are safe to log.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("password_min_length", &self.password_min_length)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Tests use this to avoid
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup);

        config.validate()
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("INVENTORY_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_ACCESS_TTL_SECS") {
            self.security.access_token_ttl_secs = v.parse().unwrap_or(self.security.access_token_ttl_secs);
        }
        if let Some(v) = lookup("JWT_REFRESH_TTL_SECS") {
            self.security.refresh_token_ttl_secs = v.parse().unwrap_or(self.security.refresh_token_ttl_secs);
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Some(v) = lookup("PASSWORD_MIN_LENGTH") {
            self.security.password_min_length = v.parse().unwrap_or(self.security.password_min_length);
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let access = self.security.access_token_ttl_secs;
        let refresh = self.security.refresh_token_ttl_secs;
        if access <= 0 || access >= refresh {
            return Err(ConfigError::TokenLifetimes { access, refresh });
        }

        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::BcryptCost(self.security.bcrypt_cost));
        }

        if let Some(url) = &self.database.url {
            url::Url::parse(url).map_err(|_| ConfigError::InvalidDatabaseUrl)?;
        }

        Ok(self)
    }

    /// Database URL with the password stripped, for log lines.
    pub fn redacted_database_url(&self) -> Option<String> {
        let raw = self.database.url.as_ref()?;
        let mut url = url::Url::parse(raw).ok()?;
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        Some(url.to_string())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_ttl_secs: 60 * 60,
                refresh_token_ttl_secs: 7 * 24 * 60 * 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                password_min_length: 6,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_ttl_secs: 60 * 60,
                refresh_token_ttl_secs: 7 * 24 * 60 * 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                password_min_length: 8,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_ttl_secs: 15 * 60,
                refresh_token_ttl_secs: 7 * 24 * 60 * 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                password_min_length: 8,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Development preset with a fixed secret and the cheapest bcrypt cost. Test helper.
    pub fn for_tests(secret: &str) -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = secret.to_string();
        config.security.bcrypt_cost = 4;
        config.server.enable_request_logging = false;
        config
    }
}
