use chrono::Utc;
use reqwest::multipart::{Form, Part};
use tempfile::TempDir;
use tokio::fs;

use crate::logging::setup_test_logging;
use crate::tests::{TEST_ADMIN_USER, login_token, start_test_server};

// binary payload with CRLF and NUL bytes to catch lossy decoding
const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01, 0x02, 0x03,
];

fn login_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/api/login")
}

fn upload_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/api/upload")
}

fn png_form() -> Form {
    let part = Part::bytes(PNG_BYTES.to_vec())
        .file_name("photo.png")
        .mime_str("image/png")
        .expect("static mime type should parse");
    Form::new().part("file", part)
}

#[tokio::test]
async fn test_login_success() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(login_url(port))
        .json(&serde_json::json!({"username": "admin", "password": "secret"}))
        .send()
        .await
        .expect("Login request failed");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Login response was not JSON");
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], TEST_ADMIN_USER);

    let token = body["token"].as_str().expect("Login response missing token");
    let (username, timestamp) = token
        .split_once(':')
        .expect("Token should carry two fields");
    assert_eq!(username, TEST_ADMIN_USER);
    timestamp
        .parse::<i64>()
        .expect("Token timestamp field should be numeric");

    handle.abort();
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(login_url(port))
        .json(&serde_json::json!({"username": "admin", "password": "nope"}))
        .send()
        .await
        .expect("Login request failed");

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.expect("Error response was not JSON");
    assert_eq!(body["error"], "用户名或密码错误");

    handle.abort();
}

#[tokio::test]
async fn test_login_rejects_malformed_body() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(login_url(port))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("not json at all")
        .send()
        .await
        .expect("Login request failed");

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.expect("Error response was not JSON");
    assert_eq!(body["error"], "请求格式错误");

    handle.abort();
}

#[tokio::test]
async fn test_preflight_cors_contract() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    for url in [login_url(port), upload_url(port)] {
        let resp = client
            .request(reqwest::Method::OPTIONS, url)
            .send()
            .await
            .expect("Preflight request failed");

        assert_eq!(resp.status(), 204);
        let headers = resp.headers();
        assert_eq!(
            headers
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(
            headers
                .get("access-control-allow-methods")
                .and_then(|v| v.to_str().ok()),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            headers
                .get("access-control-allow-headers")
                .and_then(|v| v.to_str().ok()),
            Some("Content-Type, Authorization")
        );
    }

    handle.abort();
}

#[tokio::test]
async fn test_upload_requires_token() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    // no Authorization header at all, file content notwithstanding
    let client = reqwest::Client::new();
    let resp = client
        .post(upload_url(port))
        .multipart(png_form())
        .send()
        .await
        .expect("Upload request failed");

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.expect("Error response was not JSON");
    assert_eq!(body["error"], "未经授权，请先登录");

    handle.abort();
}

#[tokio::test]
async fn test_upload_rejects_wrong_scheme() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let token = login_token(port).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(upload_url(port))
        .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
        .multipart(png_form())
        .send()
        .await
        .expect("Upload request failed");

    assert_eq!(resp.status(), 401);

    handle.abort();
}

#[tokio::test]
async fn test_upload_rejects_stale_token() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    // hand-built token issued 25 hours ago; the codec is unsigned so this
    // is exactly what an expired client session presents
    let stale = Utc::now().timestamp_millis() - 25 * 3_600_000;
    let client = reqwest::Client::new();
    let resp = client
        .post(upload_url(port))
        .bearer_auth(format!("{TEST_ADMIN_USER}:{stale}"))
        .multipart(png_form())
        .send()
        .await
        .expect("Upload request failed");

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.expect("Error response was not JSON");
    assert_eq!(body["error"], "未经授权，请先登录");

    handle.abort();
}

#[tokio::test]
async fn test_upload_without_file_field() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let token = login_token(port).await;

    // `file` as a plain text field is not a file
    let client = reqwest::Client::new();
    let resp = client
        .post(upload_url(port))
        .bearer_auth(&token)
        .multipart(Form::new().text("file", "not a file"))
        .send()
        .await
        .expect("Upload request failed");

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.expect("Error response was not JSON");
    assert_eq!(body["error"], "未找到文件");

    handle.abort();
}

#[tokio::test]
async fn test_upload_round_trip() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let token = login_token(port).await;
    let client = reqwest::Client::new();

    let mut file_names = Vec::new();
    for _ in 0..2 {
        let resp = client
            .post(upload_url(port))
            .bearer_auth(&token)
            .multipart(png_form())
            .send()
            .await
            .expect("Upload request failed");

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.expect("Upload response was not JSON");
        assert_eq!(body["message"], "文件上传成功!");

        let file_name = body["fileName"]
            .as_str()
            .expect("Upload response missing fileName")
            .to_string();
        assert!(file_name.ends_with(".png"));

        let (prefix, _) = file_name
            .split_once('-')
            .expect("Storage key should carry a timestamp prefix");
        assert!(!prefix.is_empty());
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));

        file_names.push(file_name);
    }

    // keys are distinct across sequential uploads of the same file
    assert_ne!(file_names[0], file_names[1]);

    // and the bytes landed in the store unchanged
    for file_name in &file_names {
        let stored = fs::read(temp_dir.path().join(file_name))
            .await
            .expect("Uploaded file should exist in the storage root");
        assert_eq!(stored, PNG_BYTES);
    }

    handle.abort();
}

#[tokio::test]
async fn test_upload_filename_without_extension() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let token = login_token(port).await;
    let part = Part::bytes(b"plain contents".to_vec()).file_name("notes");
    let client = reqwest::Client::new();
    let resp = client
        .post(upload_url(port))
        .bearer_auth(&token)
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .expect("Upload request failed");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Upload response was not JSON");
    let file_name = body["fileName"]
        .as_str()
        .expect("Upload response missing fileName");
    assert!(file_name.ends_with(".dat"));

    handle.abort();
}

#[tokio::test]
async fn test_upload_with_unbound_storage() {
    setup_test_logging();
    // point the storage root at a regular file so the store cannot bind
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blocker = temp_dir.path().join("not-a-directory");
    fs::write(&blocker, b"occupied").await.expect("Failed to write blocker file");

    let (handle, port) = start_test_server(blocker).await;

    let token = login_token(port).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(upload_url(port))
        .bearer_auth(&token)
        .multipart(png_form())
        .send()
        .await
        .expect("Upload request failed");

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.expect("Error response was not JSON");
    assert_eq!(body["error"], "R2 存储桶未绑定");

    handle.abort();
}

#[tokio::test]
async fn test_unknown_route() {
    setup_test_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, port) = start_test_server(temp_dir.path().to_path_buf()).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://127.0.0.1:{port}/api/gallery"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 404);

    handle.abort();
}
