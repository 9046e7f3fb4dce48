//! Integration tests for `HttpProbe` against a throwaway local HTTP server.

use std::time::Duration;
use tglinks_core::{ExistenceProbe, ProbeError};
use tglinks_providers::{HttpProbe, ProbeConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve the given raw responses, one per accepted connection, and return
/// the base URL of the server.
async fn serve(responses: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

fn status_response(status: &str, extra_headers: &str) -> String {
    format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n{extra_headers}\r\n")
}

fn probe(timeout_ms: u64) -> HttpProbe {
    HttpProbe::new(&ProbeConfig {
        probe_timeout_ms: timeout_ms,
        ..ProbeConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_ok_status_is_live() {
    let base = serve(vec![status_response("200 OK", "")]).await;
    let result = probe(2000).check(&format!("{base}/example")).await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_not_found_is_reported_with_status() {
    let base = serve(vec![status_response("404 Not Found", "")]).await;
    let result = probe(2000).check(&format!("{base}/invalid_user")).await;
    assert_eq!(result, Err(ProbeError::Status(404)));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let base = serve(vec![
        status_response("302 Found", "location: /final\r\n"),
        status_response("200 OK", ""),
    ])
    .await;
    let result = probe(2000).check(&format!("{base}/example")).await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((_socket, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    });

    let result = probe(100).check(&format!("http://{addr}/example")).await;
    assert_eq!(result, Err(ProbeError::Timeout));
    assert_eq!(
        ProbeError::Timeout.to_string(),
        "Request timed out",
        "timeout reason must stay human readable"
    );
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = probe(2000).check(&format!("http://{addr}/example")).await;
    match result {
        Err(ProbeError::Transport(msg)) => assert!(!msg.is_empty()),
        other => panic!("expected transport error, got {other:?}"),
    }
}
