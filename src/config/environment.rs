// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Environment-based configuration management
//!
//! Every setting has an environment variable and a default. A `.env` file in
//! the working directory is loaded first when present. Legacy variable names
//! (`BIZ_DB_CONNECTION`, `SECRET_KEY`, `ALGORITHM`, `ALLOWED_ORIGINS`) are
//! accepted as aliases.

use super::cache::CacheSettings;
use crate::constants::{service_names, tokens, wechat};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        })
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse a `sqlite:` URL or a bare file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/daily_cost.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// HMAC algorithm used to sign JWTs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum JwtAlgorithm {
    /// HMAC SHA-256 (default)
    #[default]
    HS256,
    /// HMAC SHA-384
    HS384,
    /// HMAC SHA-512
    HS512,
}

impl JwtAlgorithm {
    /// Parse an algorithm name
    ///
    /// # Errors
    ///
    /// Returns a configuration error for anything other than HS256/HS384/HS512
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(AppError::config(format!(
                "Unsupported JWT algorithm '{other}', expected HS256, HS384 or HS512"
            ))),
        }
    }
}

/// Application identity shown by the info endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfoConfig {
    /// Application name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Version string
    pub version: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Pool size for file databases
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Signing algorithm
    pub jwt_algorithm: JwtAlgorithm,
    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,
    /// Refresh token lifetime in minutes
    pub refresh_token_expire_minutes: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field(
                "refresh_token_expire_minutes",
                &self.refresh_token_expire_minutes,
            )
            .finish()
    }
}

/// WeChat open platform application
#[derive(Clone, Serialize, Deserialize)]
pub struct WechatConfig {
    /// App id issued by the open platform
    pub app_id: String,
    /// App secret
    #[serde(skip_serializing)]
    pub app_secret: String,
    /// Redirect URI registered for QR login
    pub redirect_uri: String,
    /// API host (overridable for tests)
    pub api_base_url: String,
    /// Open platform host serving the QR page
    pub open_base_url: String,
    /// Login session lifetime in seconds
    pub session_ttl_secs: u64,
}

impl fmt::Debug for WechatConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WechatConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_base_url", &self.api_base_url)
            .field("open_base_url", &self.open_base_url)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

impl WechatConfig {
    /// Whether app credentials are present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.app_id.is_empty() && !self.app_secret.is_empty()
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Exposes internal error details and diagnostics routes
    pub debug_mode: bool,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Application identity
    pub app: AppInfoConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache configuration
    pub cache: CacheSettings,
    /// JWT configuration
    pub auth: AuthConfig,
    /// WeChat configuration
    pub wechat: WechatConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable is malformed, the JWT
    /// algorithm is unsupported, or [`Self::validate`] fails
    pub fn from_env() -> AppResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {e}");
        }

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let config = Self {
            host: env_var_or("HOST", "0.0.0.0"),
            http_port: parse_env("HTTP_PORT", "8000")?,
            debug_mode: parse_bool(&env_var_or("DEBUG_MODE", "false")),
            environment,
            log_level: LogLevel::from_str_or_default(&env_var_any(&["LOG_LEVEL", "LOG"], "info")),
            app: AppInfoConfig {
                name: env_var_or("APP_NAME", service_names::DAILY_COST_SERVER),
                description: env_var_or("APP_DESCRIPTION", service_names::DEFAULT_DESCRIPTION),
                version: env_var_or("APP_VERSION", env!("CARGO_PKG_VERSION")),
            },
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_any(
                    &["DATABASE_URL", "BIZ_DB_CONNECTION"],
                    "sqlite:./data/daily_cost.db",
                )),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "5")?,
            },
            cache: CacheSettings::from_env(),
            auth: AuthConfig {
                jwt_secret: Self::jwt_secret_from_env(environment),
                jwt_algorithm: JwtAlgorithm::parse(&env_var_any(
                    &["JWT_ALGORITHM", "ALGORITHM"],
                    "HS256",
                ))?,
                access_token_expire_minutes: parse_env(
                    "ACCESS_TOKEN_EXPIRE_MINUTES",
                    &tokens::DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES.to_string(),
                )?,
                refresh_token_expire_minutes: parse_env(
                    "REFRESH_TOKEN_EXPIRE_MINUTES",
                    &tokens::DEFAULT_REFRESH_TOKEN_EXPIRE_MINUTES.to_string(),
                )?,
            },
            wechat: WechatConfig {
                app_id: env_var_or("WX_APPID", ""),
                app_secret: env_var_or("WX_APPSECRET", ""),
                redirect_uri: env_var_or("WX_REDIRECT_URI", ""),
                api_base_url: env_var_or("WX_API_BASE_URL", wechat::DEFAULT_API_BASE_URL),
                open_base_url: env_var_or("WX_OPEN_BASE_URL", wechat::DEFAULT_OPEN_BASE_URL),
                session_ttl_secs: parse_env(
                    "WX_LOGIN_SESSION_TTL_SECS",
                    &wechat::LOGIN_SESSION_TTL_SECS.to_string(),
                )?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_any(&["CORS_ALLOWED_ORIGINS", "ALLOWED_ORIGINS"], "*"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Read the JWT secret, generating an ephemeral one outside production
    fn jwt_secret_from_env(environment: Environment) -> String {
        let secret = env_var_any(&["JWT_SECRET", "SECRET_KEY"], "");
        if secret.is_empty() && !environment.is_production() {
            warn!("JWT_SECRET not set; using an ephemeral secret, tokens will not survive restarts");
            return format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        }
        secret
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns a configuration error if token lifetimes are not positive, the
    /// session TTL is zero, or production runs with a weak secret or without
    /// WeChat credentials
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::config("JWT_SECRET must be set"));
        }
        if self.auth.access_token_expire_minutes <= 0 || self.auth.refresh_token_expire_minutes <= 0
        {
            return Err(AppError::config("Token lifetimes must be positive"));
        }
        if self.wechat.session_ttl_secs == 0 {
            return Err(AppError::config("WX_LOGIN_SESSION_TTL_SECS must be positive"));
        }
        if self.environment.is_production() {
            if self.auth.jwt_secret.len() < tokens::MIN_JWT_SECRET_BYTES {
                return Err(AppError::config(format!(
                    "JWT_SECRET must be at least {} bytes in production",
                    tokens::MIN_JWT_SECRET_BYTES
                )));
            }
            if !self.wechat.is_configured() {
                return Err(AppError::config(
                    "WX_APPID and WX_APPSECRET must be set in production",
                ));
            }
        }
        Ok(())
    }

    /// Redacted multi-line summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Daily Cost Server Configuration:\n\
             - App: {} v{}\n\
             - Environment: {}\n\
             - Debug Mode: {}\n\
             - Listen: {}:{}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Cache: {}\n\
             - JWT: {:?}, access {}m, refresh {}m\n\
             - WeChat App: {}\n\
             - CORS Origins: {}",
            self.app.name,
            self.app.version,
            self.environment,
            self.debug_mode,
            self.host,
            self.http_port,
            self.log_level,
            self.database.url,
            if self.cache.redis_url.is_some() {
                "redis"
            } else {
                "in-memory"
            },
            self.auth.jwt_algorithm,
            self.auth.access_token_expire_minutes,
            self.auth.refresh_token_expire_minutes,
            if self.wechat.is_configured() {
                self.wechat.app_id.as_str()
            } else {
                "not configured"
            },
            self.cors.allowed_origins,
        )
    }

    /// Configuration for tests: in-memory database and cache, fixed secret
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            http_port: 0,
            debug_mode: true,
            environment: Environment::Testing,
            log_level: LogLevel::Warn,
            app: AppInfoConfig {
                name: service_names::DAILY_COST_SERVER.to_owned(),
                description: service_names::DEFAULT_DESCRIPTION.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
                max_connections: 1,
            },
            cache: CacheSettings::default(),
            auth: AuthConfig {
                jwt_secret: "test-secret-with-enough-bytes-for-hmac-signing".to_owned(),
                jwt_algorithm: JwtAlgorithm::HS256,
                access_token_expire_minutes: tokens::DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
                refresh_token_expire_minutes: tokens::DEFAULT_REFRESH_TOKEN_EXPIRE_MINUTES,
            },
            wechat: WechatConfig {
                app_id: "wx_test_app".to_owned(),
                app_secret: "wx_test_secret".to_owned(),
                redirect_uri: "https://example.com/api/auth/wechat/callback".to_owned(),
                api_base_url: wechat::DEFAULT_API_BASE_URL.to_owned(),
                open_base_url: wechat::DEFAULT_OPEN_BASE_URL.to_owned(),
                session_ttl_secs: wechat::LOGIN_SESSION_TTL_SECS,
            },
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
        }
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// First set variable among `keys`, or the default
fn env_var_any(keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| default.to_owned())
}

/// Parse an environment variable, reporting the variable name on failure
fn parse_env<T>(key: &str, default: &str) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    let raw = env_var_or(key, default);
    raw.trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}")))
}

/// Lenient boolean parsing: `1`, `true`, `yes`, `on` are true
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("invalid"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("whatever"),
            Environment::Development
        );
    }

    #[test]
    fn test_database_url_parsing() {
        let file = DatabaseUrl::parse_url("sqlite:./data/app.db");
        assert_eq!(file.to_connection_string(), "sqlite:./data/app.db");
        assert!(!file.is_memory());

        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        assert_eq!(
            DatabaseUrl::parse_url("sqlite://var/app.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("var/app.db")
            }
        );
        assert_eq!(
            DatabaseUrl::parse_url("./plain.db").to_connection_string(),
            "sqlite:./plain.db"
        );
    }

    #[test]
    fn test_jwt_algorithm_parsing() {
        assert_eq!(JwtAlgorithm::parse("hs256").unwrap(), JwtAlgorithm::HS256);
        assert_eq!(JwtAlgorithm::parse("HS512").unwrap(), JwtAlgorithm::HS512);
        assert!(JwtAlgorithm::parse("RS256").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" 1 "));
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_validate_rejects_weak_production_config() {
        let mut config = ServerConfig::for_testing();
        assert!(config.validate().is_ok());

        config.environment = Environment::Production;
        config.auth.jwt_secret = "short".to_owned();
        assert!(config.validate().is_err());

        config.auth.jwt_secret = "x".repeat(tokens::MIN_JWT_SECRET_BYTES);
        assert!(config.validate().is_ok());

        config.wechat.app_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_lifetimes() {
        let mut config = ServerConfig::for_testing();
        config.auth.access_token_expire_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_redacts_secrets() {
        let config = ServerConfig::for_testing();
        let summary = config.summary();
        assert!(summary.contains("wx_test_app"));
        assert!(!summary.contains(&config.auth.jwt_secret));
        assert!(!summary.contains("wx_test_secret"));
        assert!(!format!("{config:?}").contains("wx_test_secret"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_aliases() {
        env::set_var("BIZ_DB_CONNECTION", "sqlite::memory:");
        env::set_var("SECRET_KEY", "alias-secret-value");
        env::set_var("ALLOWED_ORIGINS", "https://a.example,https://b.example");
        env::set_var("HTTP_PORT", "9100");
        env::remove_var("DATABASE_URL");
        env::remove_var("JWT_SECRET");
        env::remove_var("CORS_ALLOWED_ORIGINS");
        env::remove_var("ENVIRONMENT");

        let config = ServerConfig::from_env().unwrap();
        assert!(config.database.url.is_memory());
        assert_eq!(config.auth.jwt_secret, "alias-secret-value");
        assert_eq!(
            config.cors.allowed_origins,
            "https://a.example,https://b.example"
        );
        assert_eq!(config.http_port, 9100);

        env::remove_var("BIZ_DB_CONNECTION");
        env::remove_var("SECRET_KEY");
        env::remove_var("ALLOWED_ORIGINS");
        env::remove_var("HTTP_PORT");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_port() {
        env::set_var("HTTP_PORT", "not-a-port");
        let result = ServerConfig::from_env();
        env::remove_var("HTTP_PORT");
        assert!(result.is_err());
    }
}
