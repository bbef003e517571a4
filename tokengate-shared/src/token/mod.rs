/// Token issuance and verification
///
/// This module defines the [`TokenMaker`] contract and its two engines:
///
/// - [`jwt::JwtMaker`]: HS256-signed JSON Web Tokens. Claims are readable by
///   anyone holding the token, only integrity is protected.
/// - [`paseto::PasetoMaker`]: PASETO v4.local tokens. Claims are encrypted and
///   authenticated, unreadable without the key.
///
/// Callers hold an `Arc<dyn TokenMaker>` and never look inside a token string.
/// Both engines report failures with the same [`TokenError`] kinds.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tokengate_shared::token::{new_token_maker, TokenKind};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let maker = new_token_maker(TokenKind::Paseto, "12345678901234567890123456789012")?;
///
/// let token = maker.create_token("alice", Duration::minutes(15))?;
/// let payload = maker.verify_token(&token)?;
/// assert_eq!(payload.username, "alice");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod paseto;
pub mod payload;

use std::{fmt, str::FromStr, sync::Arc};

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub use jwt::JwtMaker;
pub use paseto::PasetoMaker;
pub use payload::Payload;

/// Error type for token operations
///
/// Verification failures are normalized to [`TokenError::Invalid`] or
/// [`TokenError::Expired`]; no library error detail leaves a maker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Maker was given unusable key material
    #[error("invalid key size: {0}")]
    Configuration(String),

    /// Bad signature, forbidden algorithm, failed decryption or malformed token
    #[error("token is invalid")]
    Invalid,

    /// Token is authentic but outside its validity window
    #[error("token has expired")]
    Expired,

    /// The OS random source could not be read
    #[error("secure randomness unavailable: {0}")]
    Entropy(String),

    /// Token could not be serialized, signed or encrypted
    #[error("failed to issue token: {0}")]
    Issue(String),
}

impl TokenError {
    /// Whether the error describes a bad credential rather than a server fault
    pub fn is_credential_error(&self) -> bool {
        matches!(self, TokenError::Invalid | TokenError::Expired)
    }
}

/// Token issuance and verification contract
///
/// Implementations are immutable after construction and safe to share
/// across request tasks.
pub trait TokenMaker: Send + Sync {
    /// Creates a token for `username` valid for `duration`
    ///
    /// A negative duration yields an already-expired token.
    fn create_token(&self, username: &str, duration: Duration) -> Result<String, TokenError> {
        self.issue_token(username, duration).map(|(token, _)| token)
    }

    /// Creates a token and returns it with the payload it carries
    ///
    /// Callers that report the expiry time read it from the payload rather
    /// than recomputing it.
    fn issue_token(&self, username: &str, duration: Duration) -> Result<(String, Payload), TokenError>;

    /// Authenticates `token` and returns its payload
    ///
    /// Returns [`TokenError::Expired`] for authentic tokens outside their
    /// window and [`TokenError::Invalid`] for everything else that fails.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

/// Token engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Signed JWT (HS256)
    Jwt,

    /// Encrypted PASETO (v4.local)
    Paseto,
}

impl TokenKind {
    /// Gets token kind as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Jwt => "jwt",
            TokenKind::Paseto => "paseto",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jwt" => Ok(TokenKind::Jwt),
            "paseto" => Ok(TokenKind::Paseto),
            other => Err(format!("unknown token type '{}', expected 'jwt' or 'paseto'", other)),
        }
    }
}

/// Builds a shareable maker of the requested kind
///
/// # Errors
///
/// Returns `TokenError::Configuration` if `key` does not satisfy the
/// engine's key-size requirement.
pub fn new_token_maker(kind: TokenKind, key: &str) -> Result<Arc<dyn TokenMaker>, TokenError> {
    let maker: Arc<dyn TokenMaker> = match kind {
        TokenKind::Jwt => Arc::new(JwtMaker::new(key)?),
        TokenKind::Paseto => Arc::new(PasetoMaker::new(key)?),
    };

    tracing::debug!(token_type = %kind, "token maker initialized");

    Ok(maker)
}
