//! Downloading PDFs from a URL

use std::io::Read;
use std::time::Duration;
use tracing::debug;
use crate::error::{Error, Result};

/// Limits applied to a download
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Largest response body accepted
    pub max_bytes: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Download a PDF over HTTP(S)
///
/// Fails fast on a non-success status, on timeout, and as soon as the body
/// grows past `options.max_bytes`.
pub fn fetch_pdf(url: &str, options: &FetchOptions) -> Result<Vec<u8>> {
    let fetch_error = |reason: String| Error::Fetch {
        url: url.to_string(),
        reason,
    };

    let parsed = url::Url::parse(url).map_err(|e| fetch_error(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(fetch_error(format!("unsupported scheme {:?}", parsed.scheme())));
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .user_agent(concat!("pdf-readability/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| fetch_error(e.to_string()))?;

    let response = client
        .get(parsed)
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("HTTP status {}", response.status())));
    }

    // Check Content-Length header for early rejection
    if let Some(length) = response.content_length() {
        if length > options.max_bytes {
            return Err(fetch_error(too_large(length, options.max_bytes)));
        }
    }

    // Read one byte past the limit so an oversized body is detectable
    let mut data = Vec::new();
    response
        .take(options.max_bytes.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(|e| fetch_error(e.to_string()))?;

    if data.len() as u64 > options.max_bytes {
        return Err(fetch_error(too_large(data.len() as u64, options.max_bytes)));
    }

    debug!(url, bytes = data.len(), "downloaded PDF");
    Ok(data)
}

fn too_large(size: u64, max_bytes: u64) -> String {
    format!("response is {} bytes, limit is {}", size, max_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Instant;

    /// Read the request head so the client is not reset mid-send
    fn read_request(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
    }

    /// Serve one canned HTTP response on a local port; returns the URL to hit
    fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                let _ = stream.write_all(&response);
                let _ = stream.flush();
            }
        });
        format!("http://{}/paper.pdf", addr)
    }

    fn small_limits() -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(5),
            max_bytes: 16,
        }
    }

    fn fetch_reason(result: Result<Vec<u8>>) -> String {
        match result {
            Err(Error::Fetch { reason, .. }) => reason,
            other => panic!("expected fetch error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_fetch_success() {
        let body = b"%PDF-1.4 tiny";
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);

        let url = serve_once(response);
        assert_eq!(fetch_pdf(&url, &small_limits()).unwrap(), body);
    }

    #[test]
    fn test_fetch_not_found_status() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
        );

        let reason = fetch_reason(fetch_pdf(&url, &small_limits()));
        assert!(reason.contains("404"), "unexpected reason: {}", reason);
    }

    #[test]
    fn test_fetch_content_length_over_limit() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n%PDF".to_vec(),
        );

        let reason = fetch_reason(fetch_pdf(&url, &small_limits()));
        assert!(reason.contains("1000 bytes"), "unexpected reason: {}", reason);
    }

    #[test]
    fn test_fetch_body_over_limit_without_length() {
        let mut response = b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n".to_vec();
        response.extend_from_slice(&[b'x'; 64]);
        let url = serve_once(response);

        let reason = fetch_reason(fetch_pdf(&url, &small_limits()));
        assert!(reason.contains("limit is 16"), "unexpected reason: {}", reason);
    }

    #[test]
    fn test_fetch_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/slow.pdf", listener.local_addr().unwrap());
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(5));
                drop(stream);
            }
        });

        let options = FetchOptions {
            timeout: Duration::from_secs(1),
            ..FetchOptions::default()
        };
        let started = Instant::now();
        let result = fetch_pdf(&url, &options);

        assert!(matches!(result, Err(Error::Fetch { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_fetch_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/gone.pdf", port);

        let result = fetch_pdf(&url, &small_limits());
        match result {
            Err(Error::Fetch { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("expected fetch error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let result = fetch_pdf("not a url", &FetchOptions::default());
        match result {
            Err(Error::Fetch { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = fetch_pdf("file:///etc/passwd", &FetchOptions::default());
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_default_limits() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.max_bytes, 100 * 1024 * 1024);
    }
}
