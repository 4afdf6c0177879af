//! Credential checking and bearer-token validation.

pub mod token;

use tracing::debug;

use crate::config::{Credential, Secrets};
use crate::constants::TOKEN_TTL;
use crate::error::PicstashError;

use self::token::TokenCodec;

/// Identity confirmed by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Token minted for a successful login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub username: String,
}

/// Check a submitted credential pair against the configured secrets and
/// mint a bearer token stamped with `now_millis`.
///
/// Exact string equality on both fields — no hashing and no constant-time
/// comparison, which the single-admin trust model accepts.
pub fn authenticate(
    credential: &Credential,
    secrets: &Secrets,
    codec: &dyn TokenCodec,
    now_millis: i64,
) -> Result<IssuedToken, PicstashError> {
    if credential.username == secrets.admin_user
        && credential.password == secrets.admin_password
    {
        let token = codec.encode(&credential.username, now_millis);
        debug!(username = %credential.username, "Credentials accepted");
        return Ok(IssuedToken {
            token,
            username: credential.username.clone(),
        });
    }

    debug!(username = %credential.username, "Credential mismatch");
    Err(PicstashError::InvalidCredentials)
}

/// Validate an `Authorization` header value against the freshness window.
///
/// Pure and total: absence of a result is the sole failure signal. Accepts
/// only the literal `Bearer ` scheme, a token that decodes into two
/// non-empty fields, and an age of at most [`TOKEN_TTL`].
pub fn validate_token(
    auth_header: Option<&str>,
    codec: &dyn TokenCodec,
    now_millis: i64,
) -> Option<AuthenticatedUser> {
    let raw = auth_header?.strip_prefix("Bearer ")?;
    let claims = codec.decode(raw)?;

    if now_millis - claims.issued_at_millis > TOKEN_TTL.num_milliseconds() {
        debug!(username = %claims.username, issued_at = claims.issued_at_millis, "Token expired");
        return None;
    }

    debug!(username = %claims.username, "Token accepted");
    Some(AuthenticatedUser {
        username: claims.username,
    })
}
