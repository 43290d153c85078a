//! The HTTP host.
//!
//! [`Server`] accepts HTTP/1.1 connections with hyper, buffers each request
//! body up to a size limit, and hands the request to a [`Service`]. Shutdown
//! stops the accept loop and then waits, up to a timeout, for open
//! connections to finish.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::Instrument;

use sluice_config::SluiceConfig;
use sluice_core::Request;
use sluice_pipeline::Service;
use sluice_telemetry::{fields, request_span};

use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Default bind address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Default request body limit in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default time to wait for connections to drain.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Serves a [`Service`] over HTTP/1.1.
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use sluice_server::Server;
///
/// let server = Server::new(Arc::new(service)).http_addr("127.0.0.1:3000");
/// server.run().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Server {
    service: Arc<Service>,
    http_addr: String,
    max_body_bytes: usize,
    shutdown_timeout: Duration,
    default_accept: Option<HeaderValue>,
}

impl Server {
    /// A server with default settings.
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            http_addr: DEFAULT_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            default_accept: None,
        }
    }

    /// A server configured from the `[server]` and `[negotiation]` sections.
    #[must_use]
    pub fn from_config(service: Arc<Service>, config: &SluiceConfig) -> Self {
        Self::new(service)
            .http_addr(config.server.http_addr.clone())
            .max_body_bytes(config.server.max_body_bytes)
            .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
            .default_accept(&config.negotiation.default_accept)
    }

    /// Sets the bind address.
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the request body limit.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Sets how long shutdown waits for connections.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the `Accept` value used for requests that send none.
    ///
    /// `*/*` leaves requests untouched. An unusable header value is ignored.
    pub fn default_accept(mut self, accept: &str) -> Self {
        self.default_accept = match accept.trim() {
            "" | "*/*" => None,
            value => HeaderValue::from_str(value).ok(),
        };
        self
    }

    /// The served service.
    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Binds and serves until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds and serves until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .http_addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.http_addr.clone()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local = listener.local_addr()?;
        tracing::info!(
            service = self.service.name(),
            addr = %local,
            endpoints = self.service.endpoints().count(),
            "server listening"
        );

        let tracker = ConnectionTracker::new();
        let host = Arc::new(self);

        loop {
            tokio::select! {
                () = shutdown.recv() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };
                    let guard = tracker.acquire();
                    let host = Arc::clone(&host);
                    tokio::spawn(async move {
                        host.handle_connection(stream, peer).await;
                        drop(guard);
                    });
                }
            }
        }

        let active = tracker.active_connections();
        if active > 0 {
            tracing::info!(active, "waiting for connections to close");
            if tokio::time::timeout(host.shutdown_timeout, tracker.drained())
                .await
                .is_err()
            {
                tracing::warn!(
                    remaining = tracker.active_connections(),
                    "shutdown timeout reached, dropping connections"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(self: Arc<Self>, stream: tokio::net::TcpStream, peer: SocketAddr) {
        let io = TokioIo::new(stream);
        let service = service_fn(move |request: http::Request<Incoming>| {
            let host = Arc::clone(&self);
            async move { Ok::<_, Infallible>(host.respond(request).await) }
        });

        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
            tracing::debug!(%peer, error = %e, "connection ended with error");
        }
    }

    async fn respond(&self, request: http::Request<Incoming>) -> http::Response<Full<Bytes>> {
        let (mut parts, body) = request.into_parts();
        if let Some(accept) = &self.default_accept {
            if !parts.headers.contains_key(ACCEPT) {
                parts.headers.insert(ACCEPT, accept.clone());
            }
        }

        let body = match Limited::new(body, self.max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::debug!(
                    path = parts.uri.path(),
                    limit = self.max_body_bytes,
                    "body too large"
                );
                return plain_error(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
            }
            Err(e) => {
                tracing::debug!(path = parts.uri.path(), error = %e, "failed to read body");
                return plain_error(StatusCode::BAD_REQUEST, "failed to read request body");
            }
        };

        let request = Request::from(http::Request::from_parts(parts, body));
        let span = request_span(request.method(), request.path(), &request.id());

        async {
            let response = self.service.dispatch(request);
            tracing::Span::current().record(fields::STATUS, response.status().as_u16());
            tracing::debug!("request completed");
            response.into_http().map(Full::new)
        }
        .instrument(span)
        .await
    }
}

fn plain_error(status: StatusCode, message: &str) -> http::Response<Full<Bytes>> {
    let body = serde_json::json!({ "message": message }).to_string();
    let mut response = http::Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Arc<Service> {
        Arc::new(Service::builder("empty").build().unwrap())
    }

    #[test]
    fn test_builder_settings() {
        let server = Server::new(service())
            .http_addr("127.0.0.1:9000")
            .max_body_bytes(10)
            .shutdown_timeout(Duration::from_secs(1))
            .default_accept("application/json");

        assert_eq!(server.http_addr, "127.0.0.1:9000");
        assert_eq!(server.max_body_bytes, 10);
        assert_eq!(server.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(
            server.default_accept,
            Some(HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn test_wildcard_default_accept_is_ignored() {
        let server = Server::new(service()).default_accept("*/*");
        assert!(server.default_accept.is_none());
    }

    #[test]
    fn test_from_config() {
        let mut config = SluiceConfig::development();
        config.server.http_addr = "127.0.0.1:7000".to_string();
        config.server.max_body_bytes = 42;
        config.server.shutdown_timeout_secs = 3;

        let server = Server::from_config(service(), &config);
        assert_eq!(server.http_addr, "127.0.0.1:7000");
        assert_eq!(server.max_body_bytes, 42);
        assert_eq!(server.shutdown_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let err = Server::new(service())
            .http_addr("not an address")
            .run_with_shutdown(ShutdownSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress(_)));
    }

    #[test]
    fn test_plain_error() {
        let response = plain_error(StatusCode::PAYLOAD_TOO_LARGE, "too big");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
