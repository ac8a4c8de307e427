use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::claims::Claims;
use super::errors::TokenError;
use crate::secret::SecretKey;

/// Lifetime of tokens issued through [`JwtHandler::issue`] unless overridden.
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// The only signing algorithm tokens may declare.
const EXPECTED_ALGORITHM: &str = "HS256";

/// Issue a token for `subject`, valid for 24 hours.
///
/// # Errors
/// * `SigningFailure` - `secret` is empty or signing failed
/// * `InvalidClaims` - `subject` is empty
pub fn issue(subject: &str, secret: &[u8]) -> Result<String, TokenError> {
    JwtHandler::new(SecretKey::new(secret)?).issue(subject)
}

/// Validate a token and return its claims.
///
/// # Errors
/// See [`JwtHandler::validate`].
pub fn validate(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    JwtHandler::new(SecretKey::new(secret)?).validate(token)
}

/// HS256 token handler for issuing and validating session tokens.
///
/// Stateless: validity depends only on the signature and the `exp` claim.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: SecretKey) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        }
    }

    /// Override the lifetime of issued tokens.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject` expiring after the configured lifetime.
    ///
    /// # Errors
    /// * `InvalidClaims` - `subject` is empty
    /// * `SigningFailure` - Token encoding failed
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let claims = Claims::for_subject(subject, self.lifetime)?;
        self.encode(&claims)
    }

    /// Sign prebuilt claims.
    ///
    /// # Errors
    /// * `InvalidClaims` - Claims fail validation
    /// * `SigningFailure` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        claims.validate()?;

        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailure(e.to_string()))
    }

    /// Decode and validate a token.
    ///
    /// Checks run in order: structure, declared algorithm, signature, expiry.
    ///
    /// # Errors
    /// * `MalformedToken` - Not three base64url segments, bad header or payload
    /// * `UnsupportedAlgorithm` - Header declares anything other than HS256
    /// * `SignatureInvalid` - HMAC does not match
    /// * `TokenExpired` - `exp` is in the past
    /// * `InvalidClaims` - Payload decodes but fails claim validation
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        check_header(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        token_data.claims.validate()?;

        Ok(token_data.claims)
    }

    /// Decode token without validation (for inspection only).
    ///
    /// # Security Warning
    /// This does NOT check the signature or expiry. Never trust claims from
    /// this method for authorization decisions.
    pub fn decode_unverified(&self, token: &str) -> Result<Claims, TokenError> {
        check_header(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// Structure and algorithm checks that run before any signature work.
///
/// Done here rather than left to `jsonwebtoken` so that headers naming
/// algorithms it cannot parse (such as `none`) still report as unsupported.
fn check_header(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(TokenError::MalformedToken(
            "expected three non-empty segments".to_string(),
        ));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| TokenError::MalformedToken(format!("invalid header encoding: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| TokenError::MalformedToken(format!("invalid header: {}", e)))?;

    if header.alg != EXPECTED_ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    Ok(())
}
