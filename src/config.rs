//! Injected configuration for the request handlers.

use serde::Deserialize;

/// Credential pair submitted to the login endpoint. Parsed from the request
/// body, checked once, never persisted.
#[derive(Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Admin credentials bound at process start.
///
/// Passed into handlers as an explicit dependency rather than read from
/// ambient environment state, so tests can supply their own pair.
#[derive(Clone)]
pub struct Secrets {
    pub admin_user: String,
    pub admin_password: String,
}

impl Secrets {
    pub fn new(admin_user: String, admin_password: String) -> Self {
        Self {
            admin_user,
            admin_password,
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"<redacted>")
            .finish()
    }
}
