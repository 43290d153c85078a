//! Serving a service over a real socket.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sluice_core::schema::{Schema, Type};
use sluice_core::Exchange;
use sluice_pipeline::{Endpoint, Service};
use sluice_server::{Server, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn service() -> Arc<Service> {
    let service = Service::builder("echo")
        .endpoint(
            Endpoint::get("/greet/:name")
                .step_fn("greet", |ex: Exchange| {
                    let greeting = format!(
                        "hello {}",
                        ex.request().path_params().get("name").unwrap_or("?")
                    );
                    ex.with_param("greeting", greeting).proceed()
                })
                .build()
                .unwrap(),
        )
        .endpoint(
            Endpoint::post("/items")
                .payload_schema(Schema::new().field("title", Type::string()))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    Arc::new(service)
}

async fn start(server: Server) -> (std::net::SocketAddr, ShutdownSignal, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.serve(listener, signal).await.unwrap();
    });
    (addr, shutdown, handle)
}

async fn send(addr: std::net::SocketAddr, raw: String) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();

    let text = String::from_utf8(buf).unwrap();
    let status = text[9..12].parse().unwrap();
    let body = text
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

fn post(path: &str, content_type: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn test_get_routes_to_endpoint() {
    let (addr, shutdown, handle) = start(Server::new(service())).await;

    let (status, body) = send(
        addr,
        "GET /greet/ada HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
    )
    .await;
    assert_eq!(status, 200);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["params"]["greeting"], "hello ada");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_payload_validation_over_the_wire() {
    let (addr, shutdown, _handle) = start(Server::new(service())).await;

    let (status, body) = send(addr, post("/items", "application/json", r#"{"title":"x"}"#)).await;
    assert_eq!(status, 200);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["params"]["title"], "x");

    let (status, body) = send(addr, post("/items", "application/json", r#"{"title":"#)).await;
    assert_eq!(status, 400);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["http"]["status"], 400);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (addr, shutdown, _handle) = start(Server::new(service()).max_body_bytes(8)).await;

    let (status, body) = send(
        addr,
        post("/items", "application/json", r#"{"title":"far too long"}"#),
    )
    .await;
    assert_eq!(status, 413);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["message"], "request body too large");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (addr, shutdown, _handle) = start(Server::new(service())).await;

    let (status, _) = send(
        addr,
        "GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
    )
    .await;
    assert_eq!(status, 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (addr, shutdown, handle) = start(Server::new(service())).await;

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
