/// Token payload
///
/// The identity claim set embedded in every token, whichever engine produced it.
/// `expires_at` is stored explicitly so verification never recomputes it.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TokenError;

/// Payload data carried by a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Unique token ID (random UUID v4)
    pub id: Uuid,

    /// Authenticated subject
    pub username: String,

    /// When the token was issued
    pub issued_at: DateTime<Utc>,

    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// Creates a payload for `username` valid for `duration` from now
    ///
    /// `duration` may be negative.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Entropy` if the OS random source fails.
    pub fn new(username: &str, duration: Duration) -> Result<Self, TokenError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::Entropy(e.to_string()))?;

        let issued_at = Utc::now();

        Ok(Self {
            id: uuid::Builder::from_random_bytes(bytes).into_uuid(),
            username: username.to_string(),
            issued_at,
            expires_at: issued_at + duration,
        })
    }

    /// Checks the payload against the current time
    pub fn valid(&self) -> Result<(), TokenError> {
        self.valid_at(Utc::now())
    }

    /// Checks the payload against `now`
    ///
    /// An `issued_at` in the future is treated as tampering or clock skew
    /// and reported as `Invalid`.
    pub fn valid_at(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        if self.id.is_nil() {
            return Err(TokenError::Invalid);
        }

        if now > self.expires_at {
            return Err(TokenError::Expired);
        }

        if now < self.issued_at {
            return Err(TokenError::Invalid);
        }

        Ok(())
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let remaining = self.expires_at - Utc::now();
        if remaining > Duration::zero() {
            Some(remaining)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_payload() {
        let before = Utc::now();
        let payload = Payload::new("alice", Duration::minutes(1)).unwrap();

        assert_eq!(payload.username, "alice");
        assert!(!payload.id.is_nil());
        assert_eq!(payload.id.get_version_num(), 4);
        assert!(payload.issued_at >= before);
        assert_eq!(payload.expires_at - payload.issued_at, Duration::minutes(1));
        assert!(payload.valid().is_ok());
    }

    #[test]
    fn test_payload_ids_are_unique() {
        let a = Payload::new("alice", Duration::minutes(1)).unwrap();
        let b = Payload::new("alice", Duration::minutes(1)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_negative_duration_is_expired() {
        let payload = Payload::new("alice", Duration::seconds(-1)).unwrap();

        assert!(payload.expires_at < payload.issued_at);
        assert_eq!(payload.valid(), Err(TokenError::Expired));
        assert!(payload.time_until_expiration().is_none());
    }

    #[test]
    fn test_issued_in_future_is_invalid() {
        let payload = Payload::new("alice", Duration::hours(1)).unwrap();
        let before_issue = payload.issued_at - Duration::seconds(30);

        assert_eq!(payload.valid_at(before_issue), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let payload = Payload::new("alice", Duration::minutes(5)).unwrap();

        assert!(payload.valid_at(payload.expires_at).is_ok());
        assert_eq!(
            payload.valid_at(payload.expires_at + Duration::nanoseconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_nil_id_is_invalid() {
        let mut payload = Payload::new("alice", Duration::minutes(5)).unwrap();
        payload.id = Uuid::nil();

        assert_eq!(payload.valid(), Err(TokenError::Invalid));
    }

    #[test]
    fn test_valid_is_idempotent() {
        let payload = Payload::new("alice", Duration::minutes(5)).unwrap();
        let snapshot = payload.clone();

        for _ in 0..3 {
            assert!(payload.valid().is_ok());
        }
        assert_eq!(payload, snapshot);
    }

    #[test]
    fn test_time_until_expiration() {
        let payload = Payload::new("alice", Duration::hours(1)).unwrap();
        let left = payload.time_until_expiration().unwrap();

        assert!(left.num_seconds() > 3500);
        assert!(left.num_seconds() <= 3600);
    }
}
