//! Opaque bearer-token encoding.

/// Separator between the identity and issuance-time fields. Must never
/// appear in a valid username.
const SEPARATOR: char = ':';

/// Fields recovered from a structurally valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub username: String,
    pub issued_at_millis: i64,
}

/// Encode/decode seam for the session token.
///
/// The token is opaque to callers; a signed implementation can replace
/// [`PlainTokenCodec`] without touching the validation call sites.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, username: &str, issued_at_millis: i64) -> String;

    /// Decode a raw token string. `None` for anything that does not split
    /// into exactly two non-empty fields with a numeric timestamp.
    fn decode(&self, raw: &str) -> Option<TokenClaims>;
}

/// Unsigned `<username>:<issuedAtMillis>` encoding.
///
/// Possession of a syntactically valid, fresh token is the entire trust
/// boundary here; there is no signature and no server-side registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTokenCodec;

impl TokenCodec for PlainTokenCodec {
    fn encode(&self, username: &str, issued_at_millis: i64) -> String {
        format!("{username}{SEPARATOR}{issued_at_millis}")
    }

    fn decode(&self, raw: &str) -> Option<TokenClaims> {
        let (username, timestamp) = raw.split_once(SEPARATOR)?;
        if username.is_empty() || timestamp.is_empty() {
            return None;
        }
        let issued_at_millis = timestamp.parse::<i64>().ok()?;
        Some(TokenClaims {
            username: username.to_string(),
            issued_at_millis,
        })
    }
}
