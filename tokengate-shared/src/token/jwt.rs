/// JWT token maker
///
/// Produces compact `header.claims.signature` tokens signed with HS256.
/// The claim set is the [`Payload`] itself.
///
/// # Security
///
/// - **Algorithm**: HS256 only. The header algorithm is checked against an
///   allow-list before any signature work, so `none` tokens and tokens signed
///   with another algorithm (HS384, HS512, RS256, ...) are rejected as invalid.
/// - **Secret**: at least 32 bytes (256 bits)
/// - **Expiry**: judged by [`Payload::valid`], not by registered JWT claims
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tokengate_shared::token::{JwtMaker, TokenMaker};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let maker = JwtMaker::new("your-secret-key-at-least-32-bytes-long")?;
///
/// let token = maker.create_token("alice", Duration::hours(1))?;
/// let payload = maker.verify_token(&token)?;
/// assert_eq!(payload.username, "alice");
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::Duration;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{Payload, TokenError, TokenMaker};

/// Minimum secret length in bytes
pub const MIN_SECRET_KEY_SIZE: usize = 32;

/// The only algorithm this maker signs with or accepts
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// HS256 JSON Web Token maker
pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtMaker {
    /// Creates a maker signing with `secret`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Configuration` if `secret` is shorter than
    /// [`MIN_SECRET_KEY_SIZE`] bytes.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::Configuration(format!(
                "JWT secret must be at least {} characters",
                MIN_SECRET_KEY_SIZE
            )));
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is judged by Payload::valid; the claim set has no exp/nbf.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl fmt::Debug for JwtMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtMaker")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenMaker for JwtMaker {
    fn issue_token(&self, username: &str, duration: Duration) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, duration)?;

        let token = encode(&Header::new(SIGNING_ALGORITHM), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Issue(format!("JWT encoding failed: {}", e)))?;

        Ok((token, payload))
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        // Unknown algorithms, including "none", fail header parsing.
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "rejecting JWT with unreadable header");
            TokenError::Invalid
        })?;

        if header.alg != SIGNING_ALGORITHM {
            tracing::debug!(alg = ?header.alg, "rejecting JWT with disallowed algorithm");
            return Err(TokenError::Invalid);
        }

        let token_data = decode::<Payload>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejecting JWT that failed verification");
            TokenError::Invalid
        })?;

        let payload = token_data.claims;
        payload.valid()?;

        Ok(payload)
    }
}
