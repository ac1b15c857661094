//! Anti-forgery tokens.
//!
//! A token is `hex(HMAC-SHA256(secret, "{action}|{tick}"))` where the tick is
//! the current time divided into half-lifetime windows. Tokens from the
//! current and the previous tick verify, so a token lives between half and
//! all of the configured lifetime.

use std::time::Duration;

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// The action a token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceAction {
    /// Public chart fetch and single-cut save.
    BeefChart,
    /// Admin bulk edit.
    BulkUpdate,
    /// Admin reset.
    Reset,
}

impl NonceAction {
    /// Action name mixed into the signature.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeefChart => "beef_chart",
            Self::BulkUpdate => "bulk_update",
            Self::Reset => "reset",
        }
    }
}

/// Issues and verifies anti-forgery tokens.
#[derive(Clone)]
pub struct NonceIssuer {
    secret: String,
    tick_seconds: i64,
}

impl NonceIssuer {
    /// Create an issuer. Lifetimes under two seconds are raised to two.
    #[must_use]
    pub fn new(secret: impl Into<String>, lifetime: Duration) -> Self {
        let half = (lifetime.as_secs() / 2).max(1);
        Self {
            secret: secret.into(),
            tick_seconds: i64::try_from(half).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for the action, valid from now.
    pub fn issue(&self, action: NonceAction) -> Result<String, ApiError> {
        self.issue_at(action, now())
    }

    /// Whether the token was issued for this action and has not expired.
    #[must_use]
    pub fn verify(&self, action: NonceAction, token: &str) -> bool {
        self.verify_at(action, token, now())
    }

    fn tick(&self, unix_seconds: i64) -> i64 {
        unix_seconds.div_euclid(self.tick_seconds)
    }

    fn issue_at(&self, action: NonceAction, unix_seconds: i64) -> Result<String, ApiError> {
        self.sign(action, self.tick(unix_seconds))
            .ok_or_else(|| ApiError::Internal("failed to sign token".into()))
    }

    fn verify_at(&self, action: NonceAction, token: &str, unix_seconds: i64) -> bool {
        if token.is_empty() {
            return false;
        }
        let tick = self.tick(unix_seconds);
        [tick, tick - 1].into_iter().any(|t| {
            self.sign(action, t)
                .is_some_and(|expected| constant_time_eq(&expected, token))
        })
    }

    fn sign(&self, action: NonceAction, tick: i64) -> Option<String> {
        hmac_sha256_hex(&self.secret, &format!("{}|{tick}", action.as_str()))
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Compute HMAC-SHA256 and return the hex-encoded result.
fn hmac_sha256_hex(secret: &str, message: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
