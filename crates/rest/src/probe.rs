//! Reachability prober
//!
//! Issues a single GET with a bounded timeout and folds every outcome into a
//! `Reachability` value. Used for public object URLs and the service endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sdiag_core::{Error, Reachability, ReachabilityProbe, Result};

/// Probe timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP reachability prober
pub struct HttpProber {
    http_client: Client,
    timeout: Duration,
}

impl HttpProber {
    /// Create a prober that gives up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("sdiag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            timeout,
        })
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProber {
    async fn probe(&self, url: &str) -> Reachability {
        let request = self.http_client.get(url).send();
        let result = match tokio::time::timeout(self.timeout, request).await {
            Err(_) => Reachability::unreachable("Timeout"),
            Ok(Err(e)) if e.is_timeout() => Reachability::unreachable("Timeout"),
            Ok(Err(e)) => Reachability::unreachable(e.to_string()),
            Ok(Ok(response)) => Reachability::from_status(response.status().as_u16()),
        };

        tracing::debug!(
            url,
            status = result.status_code,
            accessible = result.accessible,
            "probe finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_ok() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/public/file.txt")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;
        let prober = HttpProber::new(DEFAULT_TIMEOUT).unwrap();

        let result = prober.probe(&format!("{}/public/file.txt", server.url())).await;
        mock.assert_async().await;
        assert!(result.accessible);
        assert_eq!(result.status_code, 200);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_probe_redirect_status_is_accessible() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(304)
            .create_async()
            .await;
        let prober = HttpProber::new(DEFAULT_TIMEOUT).unwrap();

        let result = prober.probe(&server.url()).await;
        assert!(result.accessible);
        assert_eq!(result.status_code, 304);
    }

    #[tokio::test]
    async fn test_probe_not_found_is_not_accessible() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(404)
            .create_async()
            .await;
        let prober = HttpProber::new(DEFAULT_TIMEOUT).unwrap();

        let result = prober.probe(&server.url()).await;
        assert!(!result.accessible);
        assert_eq!(result.status_code, 404);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let prober = HttpProber::new(Duration::from_millis(200)).unwrap();
        let result = prober.probe(&format!("http://{addr}/")).await;
        assert!(!result.accessible);
        assert_eq!(result.status_code, 0);
        assert_eq!(result.error.as_deref(), Some("Timeout"));

        hold.abort();
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new(DEFAULT_TIMEOUT).unwrap();
        let result = prober.probe(&format!("http://{addr}/")).await;
        assert!(!result.accessible);
        assert_eq!(result.status_code, 0);
        assert!(result.error.is_some());
    }
}
