use thiserror::Error;

/// Error type for credential hashing and verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Malformed credential encoding: {0}")]
    MalformedEncoding(String),

    #[error("Unsupported argon2 version: expected {expected}, found {found}")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("Failed to parse argon2 parameters: {0}")]
    ParameterParseError(String),

    #[error("Invalid argon2 parameters: {0}")]
    InvalidParameters(String),

    #[error("Random source failed: {0}")]
    RngFailure(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),
}

impl CredentialError {
    /// Short stable name of the failure, for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialError::MalformedEncoding(_) => "malformed_encoding",
            CredentialError::UnsupportedVersion { .. } => "unsupported_version",
            CredentialError::ParameterParseError(_) => "parameter_parse_error",
            CredentialError::InvalidParameters(_) => "invalid_parameters",
            CredentialError::RngFailure(_) => "rng_failure",
            CredentialError::DerivationFailed(_) => "derivation_failed",
        }
    }
}
