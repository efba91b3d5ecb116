//! Storefront metadata clients.
//!
//! [`SteamStore`] queries the Steam store `appdetails` endpoint and
//! [`EpicStore`] the Epic GraphQL catalog. Both read through a
//! [`JsonCache`] so repeated lookups never touch the network, and both
//! implement [`MetadataProvider`](dlcpwn_model::MetadataProvider).

pub mod cache;
pub mod epic;
pub mod steam;

pub use cache::JsonCache;
pub use epic::EpicStore;
pub use steam::SteamStore;

/// Errors from storefront queries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}")]
    Api { status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no store data for {0}")]
    NotFound(String),
}

/// Builds the shared HTTP client with a request deadline.
pub fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, StoreError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dlcpwn/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[cfg(test)]
pub(crate) mod testutil {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Starts a one-shot HTTP server answering with `status` and `body`.
    pub async fn mock_server(status: u16, body: &str) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                read_request(&mut stream).await;

                let resp = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, handle)
    }

    /// Consumes the request headers and body so closing never resets the peer.
    async fn read_request(stream: &mut tokio::net::TcpStream) {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let Ok(n) = stream.read(&mut buf).await else {
                return;
            };
            if n == 0 {
                return;
            }
            data.extend_from_slice(&buf[..n]);

            let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return;
            }
        }
    }
}
