pub(crate) mod server_tests;

use std::path::PathBuf;

use tokio::time::{Duration, sleep};

use crate::config::Secrets;
use crate::server::Server;

pub(crate) const TEST_ADMIN_USER: &str = "admin";
pub(crate) const TEST_ADMIN_PASSWORD: &str = "secret";

pub(crate) fn test_secrets() -> Secrets {
    Secrets::new(TEST_ADMIN_USER.to_string(), TEST_ADMIN_PASSWORD.to_string())
}

/// Spawn a server on a random port, storing uploads under `root_dir`.
pub(crate) async fn start_test_server(root_dir: PathBuf) -> (tokio::task::JoinHandle<()>, u16) {
    let (server, port) = Server::test_mode(root_dir, test_secrets())
        .await
        .expect("Failed to create test server");

    let handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            eprintln!("Server error: {}", e);
        }
    });

    // Give the server time to start
    sleep(Duration::from_millis(100)).await;

    (handle, port)
}

/// Log in with the test credentials and return the issued token.
pub(crate) async fn login_token(port: u16) -> String {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{port}/api/login"))
        .json(&serde_json::json!({
            "username": TEST_ADMIN_USER,
            "password": TEST_ADMIN_PASSWORD,
        }))
        .send()
        .await
        .expect("Login request failed");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Login response was not JSON");
    body["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string()
}
