use std::sync::Arc;
use std::time::Duration;

use zeroize::Zeroize;

use crate::jwt::extract_bearer;
use crate::jwt::Claims;
use crate::jwt::JwtHandler;
use crate::jwt::TokenError;
use crate::password::hash;
use crate::password::needs_rehash;
use crate::password::verify;
use crate::password::CredentialError;
use crate::password::ParameterSet;
use crate::store::CredentialStore;
use crate::store::StoreError;

/// Secret hashed once at construction so that logins for unknown users
/// still pay for a full verification.
const DUMMY_SECRET: &[u8] = b"credentials-dummy-verification";

/// Authentication coordinator combining credential storage, password
/// verification and token issuance.
///
/// Argon2 work runs on tokio's blocking pool so request handlers are not
/// starved while a hash is being derived.
pub struct Authenticator<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    params: ParameterSet,
    jwt_handler: JwtHandler,
    dummy_credential: String,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password verification exceeded its deadline")]
    DeadlineExceeded,

    #[error("Hashing task failed: {0}")]
    TaskFailed(String),
}

impl AuthenticationError {
    /// Message safe to return to an external caller.
    ///
    /// Never reveals which step failed; the specific error belongs in logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthenticationError::Token(_) => "token invalid",
            _ => "credential verification failed",
        }
    }
}

impl<S> Authenticator<S>
where
    S: CredentialStore,
{
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `params` - Parameters new credentials are hashed with
    /// * `jwt_handler` - Token issuer and validator
    ///
    /// # Errors
    /// * `Credential` - Hashing the dummy credential failed
    pub fn new(
        store: Arc<S>,
        params: ParameterSet,
        jwt_handler: JwtHandler,
    ) -> Result<Self, AuthenticationError> {
        let dummy_credential = hash(DUMMY_SECRET, &params)?.to_string();

        Ok(Self {
            store,
            params,
            jwt_handler,
            dummy_credential,
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Hash a password for storage, off the async scheduler.
    ///
    /// # Errors
    /// * `Credential` - Hashing failed
    /// * `TaskFailed` - The blocking task panicked or was cancelled
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthenticationError> {
        let params = self.params;
        let mut password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let result = hash(password.as_bytes(), &params);
            password.zeroize();
            result.map(|encoded| encoded.to_string())
        })
        .await
        .map_err(|e| AuthenticationError::TaskFailed(e.to_string()))?
        .map_err(AuthenticationError::from)
    }

    /// Verify a password against an encoded credential, off the async scheduler.
    ///
    /// # Errors
    /// * `Credential` - `encoded` is malformed or derivation failed
    /// * `TaskFailed` - The blocking task panicked or was cancelled
    pub async fn verify_password(
        &self,
        password: &str,
        encoded: &str,
    ) -> Result<bool, AuthenticationError> {
        let mut password = password.to_owned();
        let encoded = encoded.to_owned();

        tokio::task::spawn_blocking(move || {
            let result = verify(&encoded, password.as_bytes());
            password.zeroize();
            result
        })
        .await
        .map_err(|e| AuthenticationError::TaskFailed(e.to_string()))?
        .map_err(AuthenticationError::from)
    }

    /// Like [`Self::verify_password`], bounded by `deadline`.
    ///
    /// A derivation that misses the deadline keeps running on the blocking
    /// pool; its result is discarded.
    ///
    /// # Errors
    /// * `DeadlineExceeded` - Verification did not finish in time
    pub async fn verify_password_within(
        &self,
        password: &str,
        encoded: &str,
        deadline: Duration,
    ) -> Result<bool, AuthenticationError> {
        tokio::time::timeout(deadline, self.verify_password(password, encoded))
            .await
            .map_err(|_| AuthenticationError::DeadlineExceeded)?
    }

    /// Hash and store the credential of a new user.
    ///
    /// # Errors
    /// * `Store` - The user already has a credential or storage failed
    /// * `Credential` - Hashing failed
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), AuthenticationError> {
        let encoded = self.hash_password(password).await?;
        self.store.insert(username, encoded).await?;

        tracing::info!(username = %username, "Credential registered");
        Ok(())
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown users are verified against a dummy credential so they take as
    /// long as a wrong password. Credentials hashed under older parameters
    /// are re-hashed on success.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or wrong password
    /// * `Credential` - Stored credential is malformed
    /// * `Store` - Storage failed
    /// * `Token` - Token issuance failed
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let stored = match self.store.get(username).await {
            Ok(stored) => Some(stored),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let encoded = stored.as_deref().unwrap_or(&self.dummy_credential);
        let is_valid = self.verify_password(password, encoded).await.map_err(|e| {
            tracing::warn!(username = %username, error = %e, "Credential verification errored");
            e
        })?;

        let Some(stored) = stored.filter(|_| is_valid) else {
            tracing::warn!(username = %username, "Invalid credentials");
            return Err(AuthenticationError::InvalidCredentials);
        };

        self.rehash_if_outdated(username, password, &stored).await;

        let access_token = self.jwt_handler.issue(username)?;
        tracing::debug!(username = %username, "Session token issued");

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token without password verification.
    ///
    /// Useful for refresh flows where the caller already authenticated.
    pub fn issue_token(&self, subject: &str) -> Result<String, AuthenticationError> {
        Ok(self.jwt_handler.issue(subject)?)
    }

    /// Validate a raw token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthenticationError> {
        self.jwt_handler.validate(token).map_err(|e| {
            tracing::warn!(kind = e.kind(), "Token validation failed");
            e.into()
        })
    }

    /// Validate the token carried in an `Authorization: Bearer` header value.
    pub fn authorize(&self, authorization: &str) -> Result<Claims, AuthenticationError> {
        let token = extract_bearer(authorization).map_err(|e| {
            tracing::warn!(kind = e.kind(), "Authorization header rejected");
            e
        })?;
        self.validate_token(token)
    }

    async fn rehash_if_outdated(&self, username: &str, password: &str, stored: &str) {
        match needs_rehash(stored, &self.params) {
            Ok(false) => {}
            Ok(true) => match self.rehash(username, password).await {
                Ok(()) => tracing::info!(username = %username, "Credential re-hashed"),
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "Failed to re-hash credential")
                }
            },
            Err(e) => {
                tracing::warn!(username = %username, kind = e.kind(), "Stored credential unreadable")
            }
        }
    }

    async fn rehash(&self, username: &str, password: &str) -> Result<(), AuthenticationError> {
        let encoded = self.hash_password(password).await?;
        self.store.replace(username, encoded).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::secret::SecretKey;
    use crate::store::InMemoryCredentialStore;

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn get(&self, username: &str) -> Result<String, StoreError>;
            async fn insert(&self, username: &str, encoded: String) -> Result<(), StoreError>;
            async fn replace(&self, username: &str, encoded: String) -> Result<(), StoreError>;
        }
    }

    fn fast_params() -> ParameterSet {
        ParameterSet::new(64, 1, 1, 16, 32).expect("valid test parameters")
    }

    fn jwt_handler() -> JwtHandler {
        JwtHandler::new(SecretKey::new("test_secret_key_at_least_32_bytes!").unwrap())
    }

    fn authenticator<S: CredentialStore>(store: S) -> Authenticator<S> {
        Authenticator::new(Arc::new(store), fast_params(), jwt_handler())
            .expect("Failed to create authenticator")
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let authenticator = authenticator(InMemoryCredentialStore::new());

        authenticator.register("alice", "my_password").await.unwrap();
        let result = authenticator
            .login("alice", "my_password")
            .await
            .expect("Authentication failed");

        let claims = authenticator
            .authorize(&format!("Bearer {}", result.access_token))
            .expect("Token validation failed");
        assert_eq!(claims.username(), "alice");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let authenticator = authenticator(InMemoryCredentialStore::new());
        authenticator.register("alice", "my_password").await.unwrap();

        let result = authenticator.login("alice", "wrong_password").await;
        assert!(matches!(result, Err(AuthenticationError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_get()
            .with(eq("nobody"))
            .times(1)
            .returning(|username| Err(StoreError::NotFound(username.to_string())));
        store.expect_replace().times(0);

        let result = authenticator(store).login("nobody", "password").await;
        assert!(matches!(result, Err(AuthenticationError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user_with_dummy_password() {
        let authenticator = authenticator(InMemoryCredentialStore::new());

        let result = authenticator
            .login("nobody", std::str::from_utf8(DUMMY_SECRET).unwrap())
            .await;
        assert!(matches!(result, Err(AuthenticationError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_store_failure() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Err(StoreError::Backend("connection refused".to_string())));

        let result = authenticator(store).login("alice", "password").await;
        assert!(matches!(
            result,
            Err(AuthenticationError::Store(StoreError::Backend(_)))
        ));
    }

    #[tokio::test]
    async fn test_login_malformed_stored_credential() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok("$argon2id$v=19$broken".to_string()));

        let result = authenticator(store).login("alice", "password").await;
        assert!(matches!(
            result,
            Err(AuthenticationError::Credential(CredentialError::MalformedEncoding(_)))
        ));
    }

    #[tokio::test]
    async fn test_login_rehashes_outdated_credential() {
        let old_params = ParameterSet::new(32, 1, 1, 16, 32).unwrap();
        let stored = hash(b"my_password", &old_params).unwrap().to_string();

        let mut store = MockTestCredentialStore::new();
        store
            .expect_get()
            .times(1)
            .returning(move |_| Ok(stored.clone()));
        store
            .expect_replace()
            .withf(|username, encoded| {
                username == "alice" && encoded.starts_with("$argon2id$v=19$m=64,t=1,p=1$")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let result = authenticator(store).login("alice", "my_password").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let authenticator = authenticator(InMemoryCredentialStore::new());
        authenticator.register("alice", "first").await.unwrap();

        let result = authenticator.register("alice", "second").await;
        assert!(matches!(
            result,
            Err(AuthenticationError::Store(StoreError::AlreadyExists(_)))
        ));
    }

    #[tokio::test]
    async fn test_verify_password_within_deadline() {
        let authenticator = authenticator(InMemoryCredentialStore::new());
        let encoded = authenticator.hash_password("my_password").await.unwrap();

        let valid = authenticator
            .verify_password_within("my_password", &encoded, Duration::from_secs(30))
            .await
            .unwrap();
        assert!(valid);
    }

    #[tokio::test]
    async fn test_verify_password_deadline_exceeded() {
        let authenticator = authenticator(InMemoryCredentialStore::new());
        let slow = "$argon2id$v=19$m=65536,t=4,p=1$c29tZXNhbHRzb21lc2FsdA$qL9cEK+4RtKKvAMz6fJ+9y7dkeyjbDCs7mdTkxLZFqU";

        let result = authenticator
            .verify_password_within("my_password", slow, Duration::from_millis(1))
            .await;
        assert!(matches!(result, Err(AuthenticationError::DeadlineExceeded)));
    }

    #[test]
    fn test_authorize_rejects_bad_header() {
        let authenticator = authenticator(InMemoryCredentialStore::new());

        let result = authenticator.authorize("Basic dXNlcjpwYXNz");
        assert!(matches!(
            result,
            Err(AuthenticationError::Token(TokenError::MalformedToken(_)))
        ));
    }

    #[test]
    fn test_public_messages_hide_detail() {
        assert_eq!(
            AuthenticationError::InvalidCredentials.public_message(),
            "credential verification failed"
        );
        assert_eq!(
            AuthenticationError::Credential(CredentialError::UnsupportedVersion {
                expected: 19,
                found: 16
            })
            .public_message(),
            "credential verification failed"
        );
        assert_eq!(
            AuthenticationError::Token(TokenError::TokenExpired).public_message(),
            "token invalid"
        );
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator(InMemoryCredentialStore::new());
        let token = authenticator.issue_token("alice").unwrap();

        assert_eq!(authenticator.validate_token(&token).unwrap().username(), "alice");
        assert!(authenticator.validate_token("invalid.token.here").is_err());
    }
}
