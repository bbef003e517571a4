/// PASETO token maker
///
/// Produces `v4.local.` PASETO tokens: the claim set is encrypted with
/// XChaCha20 and authenticated with BLAKE2b under a 32-byte symmetric key.
/// There is no algorithm field to negotiate; anything that fails
/// authenticated decryption is invalid.
///
/// # Claim set
///
/// ```json
/// {
///   "iat": "2024-01-01T00:00:00Z",
///   "exp": "2024-01-01T00:15:00Z",
///   "payload": { "id": "...", "username": "...", "issued_at": "...", "expires_at": "..." }
/// }
/// ```
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tokengate_shared::token::{PasetoMaker, TokenMaker};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let maker = PasetoMaker::new("12345678901234567890123456789012")?;
///
/// let token = maker.create_token("alice", Duration::hours(1))?;
/// assert!(token.starts_with("v4.local."));
///
/// let payload = maker.verify_token(&token)?;
/// assert_eq!(payload.username, "alice");
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use rusty_paseto::core::{
    Key, Local, Paseto, PasetoNonce, PasetoSymmetricKey, Payload as PasetoPayload, V4,
};
use serde::{Deserialize, Serialize};

use super::{Payload, TokenError, TokenMaker};

/// Required key length in bytes (XChaCha20 key size)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

const HEADER: &str = "v4.local.";

/// Unpadded base64url length of a 32-byte nonce plus a 32-byte tag
const MIN_BODY_LEN: usize = 86;

/// Registered claims plus the embedded payload
#[derive(Debug, Serialize, Deserialize)]
struct PasetoClaims {
    iat: DateTime<Utc>,
    exp: DateTime<Utc>,
    payload: Payload,
}

/// PASETO v4.local token maker
pub struct PasetoMaker {
    symmetric_key: [u8; SYMMETRIC_KEY_SIZE],
}

impl PasetoMaker {
    /// Creates a maker encrypting with `symmetric_key`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Configuration` unless the key is exactly
    /// [`SYMMETRIC_KEY_SIZE`] bytes.
    pub fn new(symmetric_key: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let symmetric_key: [u8; SYMMETRIC_KEY_SIZE] =
            symmetric_key.as_ref().try_into().map_err(|_| {
                TokenError::Configuration(format!(
                    "PASETO key must be exactly {} bytes",
                    SYMMETRIC_KEY_SIZE
                ))
            })?;

        Ok(Self { symmetric_key })
    }

    /// Creates a maker with a freshly generated random key
    ///
    /// Tokens from this maker can only be verified by the same instance.
    pub fn generate() -> Result<Self, TokenError> {
        let mut symmetric_key = [0u8; SYMMETRIC_KEY_SIZE];
        fill_random(&mut symmetric_key)?;
        Ok(Self { symmetric_key })
    }

    fn key(&self) -> PasetoSymmetricKey<V4, Local> {
        PasetoSymmetricKey::<V4, Local>::from(Key::<32>::from(self.symmetric_key))
    }
}

impl fmt::Debug for PasetoMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasetoMaker")
            .field("version", &"v4.local")
            .finish_non_exhaustive()
    }
}

impl TokenMaker for PasetoMaker {
    fn issue_token(&self, username: &str, duration: Duration) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, duration)?;
        let claims = PasetoClaims {
            iat: payload.issued_at,
            exp: payload.expires_at,
            payload: payload.clone(),
        };
        let json = serde_json::to_string(&claims)
            .map_err(|e| TokenError::Issue(format!("claim serialization failed: {}", e)))?;

        let mut nonce_bytes = [0u8; 32];
        fill_random(&mut nonce_bytes)?;
        let nonce = Key::<32>::from(nonce_bytes);
        let nonce = PasetoNonce::<V4, Local>::from(&nonce);

        let token = Paseto::<V4, Local>::builder()
            .set_payload(PasetoPayload::from(json.as_str()))
            .try_encrypt(&self.key(), &nonce)
            .map_err(|e| TokenError::Issue(format!("PASETO encryption failed: {}", e)))?;

        Ok((token, payload))
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let body = token.strip_prefix(HEADER).ok_or(TokenError::Invalid)?;
        if body.len() < MIN_BODY_LEN {
            tracing::debug!(len = body.len(), "rejecting truncated PASETO");
            return Err(TokenError::Invalid);
        }

        let decrypted = Paseto::<V4, Local>::try_decrypt(token, &self.key(), None, None).map_err(|e| {
            tracing::debug!(error = %e, "rejecting PASETO that failed decryption");
            TokenError::Invalid
        })?;

        let claims: PasetoClaims = serde_json::from_str(&decrypted).map_err(|e| {
            tracing::debug!(error = %e, "rejecting PASETO with unreadable claims");
            TokenError::Invalid
        })?;

        let payload = claims.payload;
        payload.valid()?;

        Ok(payload)
    }
}

fn fill_random(buf: &mut [u8]) -> Result<(), TokenError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| TokenError::Entropy(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "12345678901234567890123456789012";

    fn tamper(token: &str) -> String {
        let (prefix, body) = token.split_at(HEADER.len());
        let mut chars: Vec<char> = body.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        format!("{}{}", prefix, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_create_and_verify_token() {
        let maker = PasetoMaker::new(KEY).unwrap();
        let duration = Duration::minutes(1);

        let issued_at = Utc::now();
        let token = maker.create_token("alice", duration).expect("Should create token");
        assert!(token.starts_with(HEADER));

        let payload = maker.verify_token(&token).expect("Should verify token");
        assert_eq!(payload.username, "alice");
        assert!(!payload.id.is_nil());
        assert!((payload.issued_at - issued_at).num_milliseconds().abs() <= 1);
        assert_eq!(payload.expires_at - payload.issued_at, duration);
    }

    #[test]
    fn test_expired_token() {
        let maker = PasetoMaker::new(KEY).unwrap();
        let token = maker.create_token("alice", Duration::seconds(-1)).unwrap();

        assert_eq!(maker.verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_key_size_must_be_exact() {
        assert!(matches!(PasetoMaker::new("too-short"), Err(TokenError::Configuration(_))));
        assert!(matches!(
            PasetoMaker::new("123456789012345678901234567890123"),
            Err(TokenError::Configuration(_))
        ));
        assert!(PasetoMaker::new([7u8; SYMMETRIC_KEY_SIZE]).is_ok());
    }

    #[test]
    fn test_supplied_key_is_used() {
        // Two makers built from the same key must interoperate.
        let issuer = PasetoMaker::new(KEY).unwrap();
        let verifier = PasetoMaker::new(KEY).unwrap();

        let token = issuer.create_token("alice", Duration::minutes(1)).unwrap();
        assert_eq!(verifier.verify_token(&token).unwrap().username, "alice");
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let issuer = PasetoMaker::new(KEY).unwrap();
        let verifier = PasetoMaker::new("abcdefghijklmnopqrstuvwxyz012345").unwrap();

        let token = issuer.create_token("alice", Duration::minutes(1)).unwrap();
        assert_eq!(verifier.verify_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_generated_makers_do_not_share_keys() {
        let a = PasetoMaker::generate().unwrap();
        let b = PasetoMaker::generate().unwrap();

        let token = a.create_token("alice", Duration::minutes(1)).unwrap();
        assert!(a.verify_token(&token).is_ok());
        assert_eq!(b.verify_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let maker = PasetoMaker::new(KEY).unwrap();
        let token = maker.create_token("alice", Duration::minutes(1)).unwrap();

        assert_eq!(maker.verify_token(&tamper(&token)), Err(TokenError::Invalid));
    }

    #[test]
    fn test_truncated_token_rejected() {
        let maker = PasetoMaker::new(KEY).unwrap();
        let token = maker.create_token("alice", Duration::minutes(1)).unwrap();

        let truncated = &token[..token.len() - 10];
        assert_eq!(maker.verify_token(truncated), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_rejected() {
        let maker = PasetoMaker::new(KEY).unwrap();

        for token in ["", "v4.local.", "v4.local.AAAA", "v2.local.AAAA", "not-a-token"] {
            assert_eq!(maker.verify_token(token), Err(TokenError::Invalid));
        }
    }

    #[test]
    fn test_claims_are_not_readable() {
        let maker = PasetoMaker::new(KEY).unwrap();
        let token = maker.create_token("alice-the-user", Duration::minutes(1)).unwrap();

        assert!(!token.contains("alice"));
    }

    #[test]
    fn test_tokens_are_unique() {
        let maker = PasetoMaker::new(KEY).unwrap();
        let a = maker.create_token("alice", Duration::minutes(1)).unwrap();
        let b = maker.create_token("alice", Duration::minutes(1)).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_hides_key() {
        let maker = PasetoMaker::new(KEY).unwrap();
        assert!(!format!("{:?}", maker).contains(KEY));
    }
}
