use std::env;
use std::fmt;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use serde::Deserialize;
use thiserror::Error;

use crate::jwt::JwtHandler;
use crate::jwt::TokenError;
use crate::jwt::DEFAULT_TOKEN_LIFETIME_HOURS;
use crate::password::CredentialError;
use crate::password::ParameterSet;
use crate::secret::SecretKey;

/// Error for configuration loading and conversion.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid argon2 configuration: {0}")]
    Argon2(#[from] CredentialError),

    #[error("Invalid jwt configuration: {0}")]
    Jwt(#[from] TokenError),

    #[error("Token lifetime must be positive, got {0} hours")]
    InvalidLifetime(i64),
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub jwt: JwtConfig,
    #[serde(default)]
    pub argon2: Argon2Config,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Argon2Config {
    pub memory_cost_kib: u32,
    pub iterations: u32,
    pub parallelism: u8,
    pub salt_length: u32,
    pub key_length: u32,
}

fn default_expiration_hours() -> i64 {
    DEFAULT_TOKEN_LIFETIME_HOURS
}

impl Default for Argon2Config {
    fn default() -> Self {
        let params = ParameterSet::DEFAULT;
        Self {
            memory_cost_kib: params.memory_cost_kib(),
            iterations: params.iterations(),
            parallelism: params.parallelism(),
            salt_length: params.salt_length(),
            key_length: params.key_length(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jwt", &self.jwt)
            .field("argon2", &self.argon2)
            .finish()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, ARGON2__MEMORY_COST_KIB, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigurationError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        Ok(configuration.try_deserialize()?)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigurationError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        Ok(configuration.try_deserialize()?)
    }

    /// Validated hashing parameters.
    pub fn parameter_set(&self) -> Result<ParameterSet, ConfigurationError> {
        let argon2 = &self.argon2;
        Ok(ParameterSet::new(
            argon2.memory_cost_kib,
            argon2.iterations,
            argon2.parallelism,
            argon2.salt_length,
            argon2.key_length,
        )?)
    }

    /// Validated signing key.
    pub fn secret_key(&self) -> Result<SecretKey, ConfigurationError> {
        Ok(SecretKey::new(self.jwt.secret.as_bytes())?)
    }

    pub fn token_lifetime(&self) -> Result<Duration, ConfigurationError> {
        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigurationError::InvalidLifetime(self.jwt.expiration_hours));
        }
        Ok(Duration::hours(self.jwt.expiration_hours))
    }

    /// Token handler with the configured secret and lifetime.
    pub fn jwt_handler(&self) -> Result<JwtHandler, ConfigurationError> {
        Ok(JwtHandler::new(self.secret_key()?).with_lifetime(self.token_lifetime()?))
    }
}
