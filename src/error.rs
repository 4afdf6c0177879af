//! Centralized error types for the picstash upload service.

use std::net::AddrParseError;

use http::{Response, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;

use crate::json_responses::error_response;

#[derive(Debug)]
pub enum PicstashError {
    /// Login body could not be parsed into a credential pair
    MalformedRequest,
    /// Submitted credentials do not match the configured secrets
    InvalidCredentials,
    /// Missing, malformed or expired bearer token
    Unauthorized,
    /// No object store bound; a deployment fault, not a client fault
    StorageUnavailable,
    /// Upload form carried no file field
    NoFileProvided,
    /// Object store rejected the write
    StorageWriteFailed(String),
    /// Upload body was not decodable multipart form data
    MultipartDecode(String),
    Configuration(String),
    Hyper(String),
    HttpResponse(String),
    Io(std::io::Error),
    SerdeJson(serde_json::Error),
    Other(String),
}

impl std::fmt::Display for PicstashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PicstashError::MalformedRequest => f.write_str("Request body could not be parsed"),
            PicstashError::InvalidCredentials => f.write_str("Username or password mismatch"),
            PicstashError::Unauthorized => {
                f.write_str("Missing, invalid or expired bearer token")
            }
            PicstashError::StorageUnavailable => f.write_str("Object store is not bound"),
            PicstashError::NoFileProvided => f.write_str("No file field in upload body"),
            PicstashError::StorageWriteFailed(msg) => {
                write!(f, "Storage write failed: {}", msg)
            }
            PicstashError::MultipartDecode(msg) => {
                write!(f, "Multipart decode failed: {}", msg)
            }
            PicstashError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
            PicstashError::Hyper(msg) => write!(f, "Hyper HTTP Error: {}", msg),
            PicstashError::HttpResponse(msg) => write!(f, "HTTP Response Error: {}", msg),
            PicstashError::Io(e) => write!(f, "IO Error: {:?}", e),
            PicstashError::SerdeJson(e) => write!(f, "Serde-JSON Error: {}", e),
            PicstashError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl PicstashError {
    pub fn other(error: &impl ToString) -> Self {
        PicstashError::Other(error.to_string())
    }

    /// HTTP status this error maps to on the wire.
    pub fn status(&self) -> StatusCode {
        match self {
            PicstashError::MalformedRequest | PicstashError::NoFileProvided => {
                StatusCode::BAD_REQUEST
            }
            PicstashError::InvalidCredentials | PicstashError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message for the JSON error envelope.
    ///
    /// These strings are part of the wire contract and must not drift; only
    /// the upload-processing failures carry a parameterized detail.
    pub fn client_message(&self) -> String {
        match self {
            PicstashError::MalformedRequest => "请求格式错误".to_string(),
            PicstashError::InvalidCredentials => "用户名或密码错误".to_string(),
            PicstashError::Unauthorized => "未经授权，请先登录".to_string(),
            PicstashError::StorageUnavailable => "R2 存储桶未绑定".to_string(),
            PicstashError::NoFileProvided => "未找到文件".to_string(),
            PicstashError::StorageWriteFailed(detail) => format!("上传处理失败: {}", detail),
            PicstashError::MultipartDecode(detail) => format!("上传处理失败: {}", detail),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for PicstashError {
    fn from(err: std::io::Error) -> Self {
        PicstashError::Io(err)
    }
}

impl From<serde_json::Error> for PicstashError {
    fn from(err: serde_json::Error) -> Self {
        PicstashError::SerdeJson(err)
    }
}

impl From<hyper::Error> for PicstashError {
    fn from(err: hyper::Error) -> Self {
        PicstashError::Hyper(err.to_string())
    }
}

impl From<http::Error> for PicstashError {
    fn from(err: http::Error) -> Self {
        PicstashError::HttpResponse(err.to_string())
    }
}

impl From<AddrParseError> for PicstashError {
    fn from(err: AddrParseError) -> Self {
        PicstashError::Other(err.to_string())
    }
}

impl From<PicstashError> for Box<dyn std::error::Error + Send + Sync> {
    fn from(val: PicstashError) -> Self {
        Box::new(std::io::Error::other(val.to_string()))
    }
}

impl From<PicstashError> for Response<Full<Bytes>> {
    fn from(err: PicstashError) -> Response<Full<Bytes>> {
        error_response(err.status(), err.client_message())
    }
}
