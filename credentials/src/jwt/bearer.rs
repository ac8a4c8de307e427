use super::errors::TokenError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization` header value.
///
/// Only the `Bearer <token>` scheme is accepted. The returned slice still
/// has to go through [`super::JwtHandler::validate`].
///
/// # Errors
/// * `MalformedToken` - Wrong scheme or empty token
pub fn extract_bearer(header_value: &str) -> Result<&str, TokenError> {
    let token = header_value.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
        TokenError::MalformedToken(
            "invalid Authorization header format, expected: Bearer <token>".to_string(),
        )
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::MalformedToken("empty bearer token".to_string()));
    }

    Ok(token)
}
