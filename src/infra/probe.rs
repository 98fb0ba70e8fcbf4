//! Usage: HTTP latency probe for the analysis service (HEAD with GET fallback).

use std::time::{Duration, Instant};

pub(crate) async fn probe_backend_ms(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<u64, String> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err("PROBE_INVALID_URL: base_url is required".to_string());
    }

    let url = reqwest::Url::parse(base_url)
        .map_err(|e| format!("PROBE_INVALID_URL: invalid base_url={base_url}: {e}"))?;

    let started = Instant::now();

    // Some servers reject HEAD; fall back to GET before reporting failure.
    let head_result = client.head(url.clone()).timeout(timeout).send().await;
    if head_result.is_ok() {
        return Ok(started.elapsed().as_millis() as u64);
    }

    client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| format!("PROBE_ERROR: {e}"))?;

    Ok(started.elapsed().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    const STUB_RESPONSE: &str =
        "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

    // Minimal one-shot HTTP stub; serves up to two requests so the GET
    // fallback after a failed HEAD is also covered.
    fn spawn_http_stub() -> std::net::SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener addr");
        std::thread::spawn(move || {
            for _ in 0..2 {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(STUB_RESPONSE.as_bytes());
            }
        });
        addr
    }

    fn unused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
        listener.local_addr().expect("probe port addr").port()
    }

    #[tokio::test]
    async fn probe_returns_latency_for_reachable_server() {
        let addr = spawn_http_stub();
        let client = reqwest::Client::new();

        let out = probe_backend_ms(&client, &format!("http://{addr}"), Duration::from_secs(3))
            .await
            .expect("probe reachable stub");
        assert!(out < 3_000, "latency out of range: {out}ms");
    }

    #[tokio::test]
    async fn probe_reports_transport_error_for_closed_port() {
        let port = unused_port();
        let client = reqwest::Client::new();

        let err = probe_backend_ms(
            &client,
            &format!("http://127.0.0.1:{port}"),
            Duration::from_secs(3),
        )
        .await
        .expect_err("closed port must fail");
        assert!(err.starts_with("PROBE_ERROR:"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn probe_rejects_empty_base_url() {
        let client = reqwest::Client::new();
        let err = probe_backend_ms(&client, "   ", Duration::from_secs(3))
            .await
            .expect_err("empty base_url must fail");
        assert!(
            err.starts_with("PROBE_INVALID_URL:"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn probe_rejects_unparseable_base_url() {
        let client = reqwest::Client::new();
        let err = probe_backend_ms(&client, "not a url", Duration::from_secs(3))
            .await
            .expect_err("malformed base_url must fail");
        assert!(
            err.starts_with("PROBE_INVALID_URL:"),
            "unexpected error: {err}"
        );
    }
}
