use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Version;

use super::encoding::EncodedCredential;
use super::errors::CredentialError;
use super::params::ParameterSet;

/// Hash a secret with a fresh random salt.
///
/// # Arguments
/// * `secret` - Plaintext secret
/// * `params` - Cost and sizing knobs to hash with
///
/// # Returns
/// Encoded credential; its `Display` form is the canonical PHC-style string
///
/// # Errors
/// * `RngFailure` - The OS random source could not supply entropy
/// * `InvalidParameters` / `DerivationFailed` - Argon2 rejected the inputs
pub fn hash(secret: &[u8], params: &ParameterSet) -> Result<EncodedCredential, CredentialError> {
    let mut salt = vec![0u8; params.salt_length() as usize];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CredentialError::RngFailure(e.to_string()))?;

    hash_with_salt(secret, salt, params)
}

/// Hash a secret with a caller-supplied salt.
///
/// Deterministic: equal secret, salt and parameters give equal output.
/// The salt length overrides `params.salt_length()`.
pub fn hash_with_salt(
    secret: &[u8],
    salt: Vec<u8>,
    params: &ParameterSet,
) -> Result<EncodedCredential, CredentialError> {
    let salt_length = u32::try_from(salt.len())
        .map_err(|_| CredentialError::InvalidParameters("salt too long".to_string()))?;
    let params = params.with_lengths(salt_length, params.key_length())?;
    let key = derive_key(secret, &salt, &params)?;

    Ok(EncodedCredential::new(params, salt, key))
}

/// Verify a candidate secret against an encoded credential.
///
/// All parameters, including salt and key lengths, are taken from `encoded`.
/// Salts shorter than [`MIN_SALT_LENGTH`](super::params::MIN_SALT_LENGTH)
/// bytes (Argon2's own minimum) are rejected, so credentials produced by
/// implementations that accept shorter salts cannot be verified here.
///
/// # Returns
/// True if the candidate matches, false otherwise
///
/// # Errors
/// * `MalformedEncoding` / `UnsupportedVersion` / `ParameterParseError` -
///   `encoded` cannot be parsed
/// * `ParameterParseError` - The salt is shorter than 8 bytes
/// * `DerivationFailed` - Argon2 failed while re-deriving
pub fn verify(encoded: &str, candidate: &[u8]) -> Result<bool, CredentialError> {
    let credential = EncodedCredential::parse(encoded)?;
    verify_parsed(&credential, candidate)
}

/// Verify a candidate secret against an already parsed credential.
pub fn verify_parsed(
    credential: &EncodedCredential,
    candidate: &[u8],
) -> Result<bool, CredentialError> {
    let derived = derive_key(candidate, credential.salt(), credential.params())?;
    Ok(constant_time_eq(&derived, credential.key()))
}

/// Whether a stored credential was hashed with parameters other than `current`.
///
/// Lets callers re-hash on the next successful login after the configured
/// parameters change.
pub fn needs_rehash(encoded: &str, current: &ParameterSet) -> Result<bool, CredentialError> {
    let credential = EncodedCredential::parse(encoded)?;
    Ok(credential.params() != current)
}

fn derive_key(
    secret: &[u8],
    salt: &[u8],
    params: &ParameterSet,
) -> Result<Vec<u8>, CredentialError> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.argon2_params()?);

    let mut key = vec![0u8; params.key_length() as usize];
    argon2
        .hash_password_into(secret, salt, &mut key)
        .map_err(|e| CredentialError::DerivationFailed(e.to_string()))?;

    Ok(key)
}

/// Byte comparison whose duration does not depend on where the inputs differ.
///
/// Lengths are public scheme parameters, so a length mismatch returns early.
/// Every byte pair is visited; differences are folded into one accumulator.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    diff == 0
}

/// Hasher bound to one parameter set.
///
/// Provides cryptographic password hashing (Argon2id) for services that hold
/// their parameters as configuration.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: ParameterSet,
}

impl PasswordHasher {
    /// Create a hasher using the given parameters.
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Hash a plaintext password into its canonical encoded string.
    ///
    /// # Errors
    /// * `RngFailure` - Salt generation failed
    /// * `DerivationFailed` - Argon2 failed
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        hash(password.as_bytes(), &self.params).map(|encoded| encoded.to_string())
    }

    /// Verify a password against a stored encoded string.
    ///
    /// Works for credentials hashed under any earlier parameter set.
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool, CredentialError> {
        verify(encoded, password.as_bytes())
    }

    /// Whether `encoded` should be re-hashed with this hasher's parameters.
    pub fn needs_rehash(&self, encoded: &str) -> Result<bool, CredentialError> {
        needs_rehash(encoded, &self.params)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(ParameterSet::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD_NO_PAD;
    use base64::Engine;

    use super::*;

    fn fast_params() -> ParameterSet {
        ParameterSet::new(64, 1, 1, 16, 32).expect("valid test parameters")
    }

    #[test]
    fn test_hash_and_verify() {
        let params = fast_params();
        let encoded = hash(b"my_secure_password", &params)
            .expect("Failed to hash password")
            .to_string();

        assert!(encoded.starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
        assert!(verify(&encoded, b"my_secure_password").expect("Failed to verify password"));
        assert!(!verify(&encoded, b"wrong_password").expect("Failed to verify password"));
    }

    #[test]
    fn test_default_params_scenario() {
        let encoded = hash(b"correct horse battery staple", &ParameterSet::DEFAULT)
            .expect("Failed to hash password")
            .to_string();

        assert!(verify(&encoded, b"correct horse battery staple").unwrap());
        assert!(!verify(&encoded, b"wrong password").unwrap());
    }

    #[test]
    fn test_salts_are_random() {
        let params = fast_params();
        let first = hash(b"password", &params).unwrap();
        let second = hash(b"password", &params).unwrap();

        assert_ne!(first.salt(), second.salt());
        assert_ne!(first.key(), second.key());
    }

    #[test]
    fn test_deterministic_with_fixed_salt() {
        let params = fast_params();
        let salt = b"fixed-salt-bytes".to_vec();

        let first = hash_with_salt(b"password", salt.clone(), &params).unwrap();
        let second = hash_with_salt(b"password", salt, &params).unwrap();

        assert_eq!(first.key(), second.key());
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_encoded_lengths_follow_params() {
        let params = ParameterSet::new(64, 1, 1, 24, 48).unwrap();
        let credential = hash(b"password", &params).unwrap();

        assert_eq!(credential.salt().len(), 24);
        assert_eq!(credential.key().len(), 48);
        assert_eq!(EncodedCredential::parse(&credential.to_string()).unwrap(), credential);
    }

    #[test]
    fn test_flipped_key_byte_fails() {
        let credential = hash(b"password", &fast_params()).unwrap();
        let encoded = credential.to_string();
        let prefix_end = encoded.rfind('$').unwrap();

        for index in 0..credential.key().len() {
            let mut key = credential.key().to_vec();
            key[index] ^= 0x01;
            let tampered = format!("{}${}", &encoded[..prefix_end], STANDARD_NO_PAD.encode(&key));

            assert!(!verify(&tampered, b"password").unwrap(), "byte {} not detected", index);
        }
    }

    #[test]
    fn test_verify_malformed() {
        let result = verify("$argon2id$v=19$m=64,t=1,p=1", b"password");
        assert!(matches!(result, Err(CredentialError::MalformedEncoding(_))));

        let result = verify("invalid_hash", b"password");
        assert!(matches!(result, Err(CredentialError::MalformedEncoding(_))));
    }

    #[test]
    fn test_verify_wrong_version() {
        let encoded = hash(b"password", &fast_params()).unwrap().to_string();
        let result = verify(&encoded.replace("v=19", "v=16"), b"password");

        assert!(matches!(result, Err(CredentialError::UnsupportedVersion { .. })));
    }

    #[test]
    fn test_verify_survives_parameter_rotation() {
        let old = hash(b"password", &fast_params()).unwrap().to_string();
        let rotated = ParameterSet::new(128, 2, 1, 32, 64).unwrap();
        let new = hash(b"password", &rotated).unwrap().to_string();

        assert!(verify(&old, b"password").unwrap());
        assert!(verify(&new, b"password").unwrap());
    }

    #[test]
    fn test_needs_rehash() {
        let params = fast_params();
        let encoded = hash(b"password", &params).unwrap().to_string();

        assert!(!needs_rehash(&encoded, &params).unwrap());
        let rotated = ParameterSet::new(128, 1, 1, 16, 32).unwrap();
        assert!(needs_rehash(&encoded, &rotated).unwrap());
    }

    #[test]
    fn test_verify_rejects_short_salt() {
        // 4-byte salt, 4-byte key
        let result = verify("$argon2id$v=19$m=64,t=1,p=1$AAAAAA$AAAAAA", b"x");

        assert!(matches!(result, Err(CredentialError::ParameterParseError(_))));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"abcdef", b"xbcdef"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn test_password_hasher() {
        let hasher = PasswordHasher::new(fast_params());
        let hash = hasher.hash("my_password").expect("Failed to hash password");

        assert!(hasher.verify("my_password", &hash).unwrap());
        assert!(!hasher.verify("other", &hash).unwrap());
        assert!(!hasher.needs_rehash(&hash).unwrap());
        assert!(hasher.verify("my_password", "invalid_hash").is_err());
    }
}
