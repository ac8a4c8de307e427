use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Error type for token issuance and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Failed to sign token: {0}")]
    SigningFailure(String),

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl TokenError {
    /// Short stable name of the failure, for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::MalformedToken(_) => "malformed_token",
            TokenError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::TokenExpired => "token_expired",
            TokenError::SigningFailure(_) => "signing_failure",
            TokenError::InvalidClaims(_) => "invalid_claims",
        }
    }
}

/// Classify a decoding failure by kind rather than by message text.
impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm(err.to_string())
            }
            ErrorKind::InvalidKeyFormat => TokenError::SigningFailure(err.to_string()),
            _ => TokenError::MalformedToken(err.to_string()),
        }
    }
}
