use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use subhunter::discover::{CertSource, CrtShFetcher, CtTransport, HttpTransport};
use subhunter::http_client::{create_ct_client, BROWSER_USER_AGENT};
use subhunter::output::NullSink;
use subhunter::FetchError;

/// Accept one connection, hand back the raw request head, then answer with
/// `response` after `delay`.
async fn serve_once(response: String, delay: Duration) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

        tokio::time::sleep(delay).await;
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    (base_url, rx)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn get_sends_wildcard_query_and_browser_agent() {
    let body = r#"[{"name_value":"www.example.com"}]"#;
    let (base_url, head_rx) = serve_once(http_response("200 OK", body), Duration::ZERO).await;

    let transport = HttpTransport::new(create_ct_client(5).unwrap(), base_url);
    let resp = transport.get("example.com").await.unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, body);

    let head = head_rx.await.unwrap();
    assert!(head.starts_with("GET /?q=%25.example.com&output=json HTTP/1.1\r\n"), "{head}");
    let ua_line = format!("user-agent: {}", BROWSER_USER_AGENT).to_lowercase();
    assert!(head.to_lowercase().contains(&ua_line), "{head}");
}

#[tokio::test]
async fn error_status_is_classified() {
    let (base_url, _head) = serve_once(http_response("503 Service Unavailable", "busy"), Duration::ZERO).await;

    let transport = HttpTransport::new(create_ct_client(5).unwrap(), base_url);
    let fetcher = CrtShFetcher::new(transport, 1, Duration::from_millis(1), Arc::new(NullSink));

    let err = fetcher.fetch("example.com").await.unwrap_err();
    assert!(matches!(err.root(), FetchError::Status(503)), "{err:?}");
}

#[tokio::test]
async fn slow_server_times_out_as_transport_error() {
    let (base_url, _head) = serve_once(http_response("200 OK", "[]"), Duration::from_secs(5)).await;

    let transport = HttpTransport::new(create_ct_client(1).unwrap(), base_url);
    let err = transport.get("example.com").await.unwrap_err();

    match err {
        FetchError::Transport(message) => assert!(message.contains("timed out"), "{message}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}
