//! JSON response envelope and the CORS contract shared by every endpoint.
//!
//! The frontend calls these endpoints cross-origin, so every response —
//! errors and the preflight answer included — carries the same three CORS
//! headers.

use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;
use serde::Serialize;

/// Headers the browser contract requires on every response.
const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

#[derive(Serialize, Debug)]
pub struct UserInfo {
    pub username: String,
}

/// Body of a successful login.
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserInfo,
}

/// Body of a successful upload.
#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Serialize `body` into a JSON response with the CORS headers attached.
pub fn json_response(status: StatusCode, body: &impl Serialize) -> Response<Full<Bytes>> {
    let payload = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json");
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }

    builder
        .body(Full::new(Bytes::from(payload)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// JSON `{"error": ...}` envelope with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    json_response(
        status,
        &ErrorResponse {
            error: message.into(),
        },
    )
}

/// 204 answer to a CORS preflight.
pub fn preflight_response() -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(StatusCode::NO_CONTENT);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
