use std::fmt;

use zeroize::Zeroize;

use crate::jwt::TokenError;

/// Server-held HMAC signing secret.
///
/// Never printed: `Debug` is redacted and there is no `Display`. The bytes
/// are wiped when the key is dropped.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap secret bytes, rejecting an empty secret.
    ///
    /// # Errors
    /// * `SigningFailure` - The secret is empty
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::SigningFailure(
                "secret key must not be empty".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([redacted])")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SecretKey::new(Vec::<u8>::new()),
            Err(TokenError::SigningFailure(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SecretKey::new("super-secret-value").unwrap();
        let printed = format!("{:?}", key);

        assert!(!printed.contains("super-secret-value"));
        assert_eq!(key.as_bytes(), b"super-secret-value");
    }
}
