use argon2::Params;

use super::errors::CredentialError;

/// Shortest salt Argon2 accepts.
pub const MIN_SALT_LENGTH: u32 = 8;

/// Shortest derived key Argon2 produces.
pub const MIN_KEY_LENGTH: u32 = 4;

/// Argon2id cost and sizing knobs.
///
/// Immutable once built. `ParameterSet::DEFAULT` is the recommended profile;
/// callers pass whichever set they want explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSet {
    memory_cost_kib: u32,
    iterations: u32,
    parallelism: u8,
    salt_length: u32,
    key_length: u32,
}

impl ParameterSet {
    /// 64 MiB, 3 passes, 2 lanes, 16-byte salt, 32-byte key.
    pub const DEFAULT: ParameterSet = ParameterSet {
        memory_cost_kib: 64 * 1024,
        iterations: 3,
        parallelism: 2,
        salt_length: 16,
        key_length: 32,
    };

    /// Build a validated parameter set.
    ///
    /// # Errors
    /// * `InvalidParameters` - A field is zero, below Argon2's minimums, or
    ///   rejected by the Argon2 parameter check (e.g. memory below 8 KiB per lane)
    pub fn new(
        memory_cost_kib: u32,
        iterations: u32,
        parallelism: u8,
        salt_length: u32,
        key_length: u32,
    ) -> Result<Self, CredentialError> {
        let params = Self {
            memory_cost_kib,
            iterations,
            parallelism,
            salt_length,
            key_length,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_kib
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn parallelism(&self) -> u8 {
        self.parallelism
    }

    pub fn salt_length(&self) -> u32 {
        self.salt_length
    }

    pub fn key_length(&self) -> u32 {
        self.key_length
    }

    /// Same cost knobs with different output sizing.
    ///
    /// Used by verification, which takes salt and key lengths from the
    /// decoded credential rather than from configuration.
    pub(crate) fn with_lengths(
        &self,
        salt_length: u32,
        key_length: u32,
    ) -> Result<Self, CredentialError> {
        Self::new(
            self.memory_cost_kib,
            self.iterations,
            self.parallelism,
            salt_length,
            key_length,
        )
    }

    /// Argon2 parameters for the cost knobs and key length.
    pub(crate) fn argon2_params(&self) -> Result<Params, CredentialError> {
        Params::new(
            self.memory_cost_kib,
            self.iterations,
            u32::from(self.parallelism),
            Some(self.key_length as usize),
        )
        .map_err(|e| CredentialError::InvalidParameters(e.to_string()))
    }

    fn validate(&self) -> Result<(), CredentialError> {
        if self.memory_cost_kib == 0 || self.iterations == 0 || self.parallelism == 0 {
            return Err(CredentialError::InvalidParameters(
                "memory cost, iterations and parallelism must be non-zero".to_string(),
            ));
        }
        if self.salt_length < MIN_SALT_LENGTH {
            return Err(CredentialError::InvalidParameters(format!(
                "salt length must be at least {} bytes, got {}",
                MIN_SALT_LENGTH, self.salt_length
            )));
        }
        if self.key_length < MIN_KEY_LENGTH {
            return Err(CredentialError::InvalidParameters(format!(
                "key length must be at least {} bytes, got {}",
                MIN_KEY_LENGTH, self.key_length
            )));
        }
        self.argon2_params().map(|_| ())
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}
