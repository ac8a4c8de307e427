pub mod argon2;
pub mod encoding;
pub mod errors;
pub mod params;

pub use self::argon2::constant_time_eq;
pub use self::argon2::hash;
pub use self::argon2::hash_with_salt;
pub use self::argon2::needs_rehash;
pub use self::argon2::verify;
pub use self::argon2::PasswordHasher;
pub use encoding::EncodedCredential;
pub use errors::CredentialError;
pub use params::ParameterSet;
