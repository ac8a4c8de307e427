use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Claim names owned by [`Claims`] itself or registered by RFC 7519;
/// `extra` may not reuse them.
const RESERVED_CLAIMS: [&str; 8] =
    ["username", "exp", "iat", "nbf", "iss", "sub", "aud", "jti"];

/// Session token payload.
///
/// Fixed fields for the subject and expiry, plus `extra` as the extension
/// point for service-specific claims. Built through validating constructors;
/// never mutated after a token is issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject identity
    username: String,

    /// Expiration time (Unix timestamp)
    exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims with explicit timestamps.
    ///
    /// # Errors
    /// * `InvalidClaims` - Empty subject, or expiry before issuance
    pub fn new(
        subject: impl Into<String>,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Self, TokenError> {
        let claims = Self {
            username: subject.into(),
            exp: expires_at,
            iat: Some(issued_at),
            extra: HashMap::new(),
        };
        claims.validate()?;
        Ok(claims)
    }

    /// Create claims issued now and expiring after `lifetime`.
    pub fn for_subject(
        subject: impl Into<String>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let now = Utc::now();
        let expiration = now + lifetime;

        Self::new(subject, now.timestamp(), expiration.timestamp())
    }

    /// Add a custom field.
    ///
    /// # Errors
    /// * `InvalidClaims` - `key` is a reserved claim name or `value` cannot be serialized
    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Serialize,
    ) -> Result<Self, TokenError> {
        let key = key.into();
        if RESERVED_CLAIMS.contains(&key.as_str()) {
            return Err(TokenError::InvalidClaims(format!(
                "'{}' is a reserved claim",
                key
            )));
        }
        let value =
            serde_json::to_value(value).map_err(|e| TokenError::InvalidClaims(e.to_string()))?;
        self.extra.insert(key, value);
        Ok(self)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.iat
    }

    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    pub(crate) fn validate(&self) -> Result<(), TokenError> {
        if self.username.is_empty() {
            return Err(TokenError::InvalidClaims(
                "username must not be empty".to_string(),
            ));
        }
        if let Some(iat) = self.iat {
            if self.exp < iat {
                return Err(TokenError::InvalidClaims(
                    "expiration precedes issuance".to_string(),
                ));
            }
        }
        Ok(())
    }
}
