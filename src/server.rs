//! HTTP server setup and lifecycle management.
//!
//! Binds the listener, wires the handler's dependencies together and serves
//! each connection on its own task.

use std::net::SocketAddr;
use std::num::NonZeroU16;
use std::path::PathBuf;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::cli::Cli;
use crate::config::Secrets;
use crate::error::PicstashError;
use crate::storage::{FilesystemStore, ObjectStore};
use crate::web_handlers::ApiHandler;

/// Main server struct holding configuration and state
pub struct Server {
    bind_address: String,
    port: NonZeroU16,
    root_dir: PathBuf,
    secrets: Secrets,
}

impl Server {
    pub fn new(cli: Cli) -> Self {
        Self {
            bind_address: cli.host,
            port: cli.port,
            root_dir: cli.root_dir,
            secrets: Secrets::new(cli.admin_user, cli.admin_password),
        }
    }

    #[cfg(test)]
    /// Create a server instance for testing that binds to a random available port
    pub(crate) async fn test_mode(
        root_dir: PathBuf,
        secrets: Secrets,
    ) -> Result<(Self, u16), PicstashError> {
        let host = "127.0.0.1".to_string();
        let addr = format!("{host}:0");
        if let Ok(listener) = TcpListener::bind(&addr).await {
            let port = listener.local_addr()?.port();
            let server = Server {
                bind_address: host,
                port: NonZeroU16::try_from(port).map_err(|_| {
                    PicstashError::Other(format!("Failed to convert port '{port}' to NonZeroU16"))
                })?,
                root_dir,
                secrets,
            };
            return Ok((server, port));
        }

        Err(PicstashError::Other(
            "Could not find an available port for testing".to_string(),
        ))
    }

    pub async fn run(self) -> Result<(), PicstashError> {
        let addr = format!("{}:{}", self.bind_address, self.port);
        let addr: SocketAddr = addr.parse().map_err(|err| {
            PicstashError::Configuration(format!("Failed to parse address '{addr}': {err}"))
        })?;

        // Bind the object store. A root that cannot be prepared leaves
        // uploads answering with a storage fault instead of taking the
        // process down.
        let store: Option<Arc<dyn ObjectStore>> =
            match FilesystemStore::new(self.root_dir.clone()) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    error!(
                        root_dir = ?self.root_dir,
                        error = %e,
                        "Object store is not available, uploads will fail"
                    );
                    None
                }
            };

        let handler = Arc::new(ApiHandler::new(Arc::new(self.secrets), store));

        info!(
            root_dir = ?self.root_dir,
            address = %addr,
            "Starting picstash..."
        );

        let listener = TcpListener::bind(addr).await?;

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            debug!(remote_addr = %remote_addr, "Accepted new connection");

            let io = TokioIo::new(stream);
            let handler = handler.clone();

            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .serve_connection(
                        io,
                        service_fn(move |req| {
                            let handler = Arc::clone(&handler);
                            async move { handler.handle_request(req).await }
                        }),
                    )
                    .await
                {
                    debug!(error = %err, remote_addr = %remote_addr, "Error serving connection");
                }
            });
        }
    }
}
