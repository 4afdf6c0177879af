//! API handlers for the login and upload endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use mime_guess::MimeGuess;
use tracing::{debug, info, warn};

use crate::auth;
use crate::auth::token::{PlainTokenCodec, TokenCodec};
use crate::config::{Credential, Secrets};
use crate::error::PicstashError;
use crate::json_responses::{
    LoginResponse, UploadResponse, UserInfo, error_response, json_response, preflight_response,
};
use crate::multipart;
use crate::storage::{ObjectStore, generate_storage_key};

/// Handler for the JSON API.
///
/// Every request is served in isolation; the fields are read-only shared
/// dependencies. An unbound store is a deployment fault the upload gate
/// reports per request rather than a startup failure.
pub struct ApiHandler {
    secrets: Arc<Secrets>,
    store: Option<Arc<dyn ObjectStore>>,
    codec: Arc<dyn TokenCodec>,
}

impl ApiHandler {
    pub fn new(secrets: Arc<Secrets>, store: Option<Arc<dyn ObjectStore>>) -> Self {
        Self {
            secrets,
            store,
            codec: Arc::new(PlainTokenCodec),
        }
    }

    /// Main request handler - routes to the appropriate endpoint
    pub async fn handle_request(
        &self,
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let result = match (method.as_str(), path.as_str()) {
            ("OPTIONS", _) => Ok(preflight_response()),
            ("POST", "/api/login") => self.handle_login(req).await,
            ("POST", "/api/upload") => self.handle_upload(req).await,
            _ => {
                debug!(method = %method, path = %path, "No route matched");
                Ok(error_response(StatusCode::NOT_FOUND, "Not Found"))
            }
        };

        match result {
            Ok(resp) => Ok(resp),
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, "Request failed");
                Ok(Response::from(e))
            }
        }
    }

    /// POST /api/login - check credentials and mint a bearer token
    async fn handle_login(
        &self,
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Full<Bytes>>, PicstashError> {
        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!(error = %e, "Failed to read login request body");
                return Err(PicstashError::MalformedRequest);
            }
        };

        let credential: Credential = match serde_json::from_slice(&body) {
            Ok(credential) => credential,
            Err(e) => {
                debug!(error = %e, "Login body is not a credential document");
                return Err(PicstashError::MalformedRequest);
            }
        };

        let now_millis = Utc::now().timestamp_millis();
        let issued = auth::authenticate(&credential, &self.secrets, self.codec.as_ref(), now_millis)?;

        info!(username = %issued.username, "Login successful");
        Ok(json_response(
            StatusCode::OK,
            &LoginResponse {
                message: "Login successful",
                token: issued.token,
                user: UserInfo {
                    username: issued.username,
                },
            },
        ))
    }

    /// POST /api/upload - gate on the bearer token, then write the file
    async fn handle_upload(
        &self,
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Full<Bytes>>, PicstashError> {
        let (parts, body) = req.into_parts();
        let now_millis = Utc::now().timestamp_millis();

        // Token gate first: nothing else is inspected for an unauthorized
        // caller.
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let user = auth::validate_token(auth_header, self.codec.as_ref(), now_millis)
            .ok_or(PicstashError::Unauthorized)?;

        let store = self
            .store
            .as_ref()
            .ok_or(PicstashError::StorageUnavailable)?;

        let form_content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                PicstashError::MultipartDecode("missing content type".to_string())
            })?
            .to_string();

        let body = body
            .collect()
            .await
            .map_err(|e| PicstashError::MultipartDecode(format!("body read failed: {}", e)))?
            .to_bytes();

        let file = multipart::extract_file(&form_content_type, &body)?
            .ok_or(PicstashError::NoFileProvided)?;

        let storage_key = generate_storage_key(&file.file_name, now_millis);

        let content_type = file.content_type.clone().unwrap_or_else(|| {
            MimeGuess::from_path(&file.file_name)
                .first_or_octet_stream()
                .to_string()
        });

        info!(
            username = %user.username,
            file_name = %file.file_name,
            storage_key = %storage_key,
            size = file.bytes.len(),
            content_type = %content_type,
            "Storing upload"
        );

        // Store faults propagate with their detail; the write is never
        // retried here.
        store.put(&storage_key, file.bytes, &content_type).await?;

        Ok(json_response(
            StatusCode::OK,
            &UploadResponse {
                message: "文件上传成功!",
                file_name: storage_key,
            },
        ))
    }
}
