// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::sync::Arc;

use lambda_web_core::config::Config;
use lambda_web_core::server::WebServer;
use lambda_web_core::storage::StorageVerifier;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Boots the real server on an ephemeral port and waits for it to accept.
pub async fn start_server(
    config: Config,
    storage: Arc<dyn StorageVerifier + Send + Sync>,
) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let server = WebServer {
        config: Arc::new(config),
        storage,
    };
    let handle = tokio::spawn(async move {
        if let Err(e) = server.serve(listener).await {
            eprintln!("test server error: {e}");
        }
    });

    // Give the server time to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (addr, handle)
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}
