//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use horus::{Horus, HorusConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Build a request with an empty body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

/// A body fed chunk by chunk; it ends when the sender is dropped.
#[allow(dead_code)]
pub fn streaming_body() -> (mpsc::Sender<Result<Bytes, std::io::Error>>, Body) {
    let (tx, rx) = mpsc::channel(8);
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    });
    (tx, Body::from_stream(stream))
}

/// Collect a response body as text.
#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Start a server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server<H, Fut>(handler: H) -> (SocketAddr, Shutdown)
where
    H: Fn(Horus<'static>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = horus::Result<Response>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(HorusConfig::default(), handler);
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
