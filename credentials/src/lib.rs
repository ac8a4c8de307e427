//! Credential hashing and session token library
//!
//! Provides the two credentials a user-facing service hands out:
//! - Password credentials: Argon2id hashes in a self-describing
//!   `$argon2id$v=19$m=..,t=..,p=..$<salt>$<key>` encoding
//! - Session tokens: stateless HS256 JWTs carrying a `username` and `exp`
//!
//! Parameters and secrets are always passed in explicitly; nothing is read
//! from global state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use credentials::password::{self, ParameterSet};
//!
//! let params = ParameterSet::new(1024, 1, 1, 16, 32).unwrap();
//! let encoded = password::hash(b"correct horse battery staple", &params).unwrap().to_string();
//! assert!(password::verify(&encoded, b"correct horse battery staple").unwrap());
//! assert!(!password::verify(&encoded, b"wrong password").unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use credentials::jwt;
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let token = jwt::issue("alice", secret).unwrap();
//! let claims = jwt::validate(&token, secret).unwrap();
//! assert_eq!(claims.username(), "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::sync::Arc;
//!
//! use credentials::{Authenticator, InMemoryCredentialStore, JwtHandler, ParameterSet, SecretKey};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let params = ParameterSet::new(1024, 1, 1, 16, 32).unwrap();
//! let handler = JwtHandler::new(SecretKey::new("secret_key_at_least_32_bytes_long!").unwrap());
//! let auth = Authenticator::new(Arc::new(InMemoryCredentialStore::new()), params, handler).unwrap();
//!
//! // Register: hash and store password
//! auth.register("alice", "password123").await.unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.login("alice", "password123").await.unwrap();
//!
//! // Validate token as presented by the client
//! let claims = auth.authorize(&format!("Bearer {}", result.access_token)).unwrap();
//! assert_eq!(claims.username(), "alice");
//! # }
//! ```

pub mod authenticator;
pub mod config;
pub mod jwt;
pub mod password;
pub mod secret;
pub mod store;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use self::config::Config;
pub use self::config::ConfigurationError;
pub use jwt::Claims;
pub use jwt::JwtHandler;
pub use jwt::TokenError;
pub use password::CredentialError;
pub use password::EncodedCredential;
pub use password::ParameterSet;
pub use password::PasswordHasher;
pub use secret::SecretKey;
pub use store::CredentialStore;
pub use store::InMemoryCredentialStore;
pub use store::StoreError;
