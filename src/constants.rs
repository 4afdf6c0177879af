use std::sync::LazyLock;

use chrono::Duration;

/// Tokens older than this are no longer accepted by the upload gate.
pub static TOKEN_TTL: LazyLock<Duration> = LazyLock::new(|| Duration::hours(24));

/// Extension used when an uploaded filename carries none.
pub(crate) const DEFAULT_EXTENSION: &str = "dat";

/// Length of the random alphanumeric suffix in generated storage keys.
pub(crate) const STORAGE_KEY_SUFFIX_LEN: usize = 7;

/// Multipart form field that carries the uploaded file.
pub(crate) const UPLOAD_FIELD: &str = "file";
