pub mod bearer;
pub mod claims;
pub mod errors;
pub mod handler;

pub use bearer::extract_bearer;
pub use claims::Claims;
pub use errors::TokenError;
pub use handler::issue;
pub use handler::validate;
pub use handler::JwtHandler;
pub use handler::DEFAULT_TOKEN_LIFETIME_HOURS;
