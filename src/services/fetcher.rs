// src/services/fetcher.rs

//! Remote document retrieval.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;
use crate::utils::http::create_async_client;

/// Source of raw sitemap documents.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    ///
    /// Transport failures, timeouts and non-2xx responses are all
    /// [`AppError::Fetch`].
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher with a fixed timeout and browser-like User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single HTTP response on a local port and return its URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/sitemap.xml")
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetcherConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let url = serve_once("200 OK", "<urlset></urlset>").await;
        assert_eq!(fetcher().fetch(&url).await.unwrap(), "<urlset></urlset>");
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let url = serve_once("503 Service Unavailable", "down").await;
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(err.is_fetch());
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains(&url));
    }

    #[tokio::test]
    async fn test_fetch_maps_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher()
            .fetch(&format!("http://{addr}/sitemap.xml"))
            .await
            .unwrap_err();
        assert!(err.is_fetch());
    }
}
