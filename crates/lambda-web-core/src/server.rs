// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::{body::Incoming, http, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error};

use crate::config::Config;
use crate::env::LambdaEnv;
use crate::handlers;
use crate::http_utils::HttpResponse;
use crate::storage::StorageVerifier;
use crate::tagger;

const WELCOME_PATH: &str = "/";
const ENV_INFO_PATH: &str = "/env-info";
const SERVERLESS_TEST_PATH: &str = "/serverless-test";
const AWS_TEST_PATH: &str = "/aws-test";
const HEALTH_PATH: &str = "/api/health";
const LAMBDA_TEST_PATH: &str = "/api/lambda-test";

pub struct WebServer {
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageVerifier + Send + Sync>,
}

impl WebServer {
    /// Binds the configured port and serves until the process is torn down.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let now = Instant::now();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(&addr).await?;
        debug!("Web server started: listening on port {}", self.config.http_port);
        debug!(
            "Time taken to start the web server: {} ms",
            now.elapsed().as_millis()
        );
        self.serve(listener).await
    }

    /// Accept loop over an already-bound listener (tests bind port 0 and pass
    /// the listener in). Transient accept errors are skipped; a panicking
    /// connection task is logged without killing the server.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let config = Arc::clone(&self.config);
        let storage = Arc::clone(&self.storage);
        let service = service_fn(move |req| {
            // called for each http request
            let config = Arc::clone(&config);
            let storage = Arc::clone(&storage);
            WebServer::request_handler(config, storage, req)
        });

        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();

        loop {
            let conn = tokio::select! {
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e.into());
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        // Don't kill server on panic - log and continue
                        error!("Connection handler panicked: {e:?}");
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
            };
            let conn = TokioIo::new(conn);
            let server = server.clone();
            let service = service.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }
    }

    /// Wraps routing with the tagger: invocation metadata is copied onto the
    /// request on the way in, response markers stamped on the way out. The
    /// snapshot is taken per request so a warm process tags with the current
    /// invocation's values.
    async fn request_handler(
        config: Arc<Config>,
        storage: Arc<dyn StorageVerifier + Send + Sync>,
        mut req: Request<Incoming>,
    ) -> http::Result<HttpResponse> {
        let lambda = LambdaEnv::from_env();
        tagger::tag_request(req.headers_mut(), &lambda);

        let mut response = WebServer::route(&config, storage.as_ref(), &req).await?;

        tagger::tag_response(response.headers_mut(), &lambda);
        Ok(response)
    }

    async fn route(
        config: &Config,
        storage: &(dyn StorageVerifier + Send + Sync),
        req: &Request<Incoming>,
    ) -> http::Result<HttpResponse> {
        match (req.method(), req.uri().path()) {
            (&Method::GET, WELCOME_PATH) => handlers::welcome(config),
            (&Method::GET, ENV_INFO_PATH) => handlers::env_info(config),
            (&Method::GET, SERVERLESS_TEST_PATH) => handlers::serverless_test(config),
            (&Method::GET, AWS_TEST_PATH) => handlers::aws_test(config, storage).await,
            (&Method::GET, HEALTH_PATH) => handlers::health(config),
            (&Method::GET, LAMBDA_TEST_PATH) => handlers::lambda_test(config, req),
            _ => {
                let mut not_found = Response::new(Full::new(Bytes::new()));
                *not_found.status_mut() = StatusCode::NOT_FOUND;
                Ok(not_found)
            }
        }
    }
}
