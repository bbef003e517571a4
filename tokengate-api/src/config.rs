/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `TOKEN_TYPE`: `paseto` (default) or `jwt`
/// - `TOKEN_SYMMETRIC_KEY`: Token key (required; exactly 32 bytes for PASETO,
///   at least 32 for JWT)
/// - `ACCESS_TOKEN_DURATION_SECS`: Access token lifetime (default: 900)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use tokengate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::{env, fmt};

use chrono::Duration;
use tokengate_shared::token::TokenKind;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Token configuration
    pub token: TokenConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` for any)
    pub cors_origins: Vec<String>,
}

/// Token configuration
#[derive(Clone)]
pub struct TokenConfig {
    /// Which token engine to use
    pub kind: TokenKind,

    /// Symmetric key material
    ///
    /// IMPORTANT: This must be kept secret.
    /// Generate with: `openssl rand -hex 16` (32 characters)
    pub symmetric_key: String,

    /// Validity of access tokens issued at login
    pub access_token_duration: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("kind", &self.kind)
            .field("symmetric_key", &"[REDACTED]")
            .field("access_token_duration", &self.access_token_duration)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Key length is not checked here; it is enforced when the token maker
    /// is built in `AppState::new`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `TOKEN_SYMMETRIC_KEY` is missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let kind = env::var("TOKEN_TYPE")
            .unwrap_or_else(|_| "paseto".to_string())
            .parse::<TokenKind>()
            .map_err(|e| anyhow::anyhow!("TOKEN_TYPE: {}", e))?;

        let symmetric_key = env::var("TOKEN_SYMMETRIC_KEY")
            .map_err(|_| anyhow::anyhow!("TOKEN_SYMMETRIC_KEY environment variable is required"))?;

        let duration_secs = env::var("ACCESS_TOKEN_DURATION_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<i64>()?;
        let access_token_duration = Duration::try_seconds(duration_secs)
            .ok_or_else(|| anyhow::anyhow!("ACCESS_TOKEN_DURATION_SECS is out of range"))?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            token: TokenConfig {
                kind,
                symmetric_key,
                access_token_duration,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            token: TokenConfig {
                kind: TokenKind::Paseto,
                symmetric_key: "12345678901234567890123456789012".to_string(),
                access_token_duration: Duration::minutes(15),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("12345678901234567890123456789012"));
        assert!(rendered.contains("REDACTED"));
    }
}
