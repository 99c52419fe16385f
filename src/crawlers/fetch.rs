use crate::config::CrawlerConfig;
use crate::error::{CrawlError, Result};
use crate::utils::{jittered_delay, pick_user_agent};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A successful response from the listing site
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub url: Url,
    pub status: u16,
    pub body: String,
}

/// Retrieves listing pages for the crawl controller.
///
/// Implementations own transport concerns such as headers, pacing and
/// retries. A non-success response must be returned as an error.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse>;
}

/// Plain HTTP fetcher with user-agent rotation and a random pre-request delay
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agents: Vec<String>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl HttpFetcher {
    pub fn new(user_agents: Vec<String>, min_delay_ms: u64, max_delay_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CrawlError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agents,
            min_delay_ms,
            max_delay_ms,
        })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Self::new(
            config.user_agents.clone(),
            config.min_delay_ms,
            config.max_delay_ms,
        )
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse> {
        let delay = jittered_delay(self.min_delay_ms, self.max_delay_ms);
        let user_agent = pick_user_agent(&self.user_agents).map(|s| s.to_string());

        ::log::debug!("Waiting {}ms before requesting {}", delay.as_millis(), url);
        tokio::time::sleep(delay).await;

        let mut request = self
            .client
            .get(url.clone())
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-NZ,en;q=0.9");
        if let Some(user_agent) = &user_agent {
            ::log::debug!("Using user agent: {}", user_agent);
            request = request.header(USER_AGENT, user_agent.as_str());
        }

        let response = request.send().await.map_err(|e| {
            ::log::error!("Request to {} failed: {}", url, e);
            CrawlError::Transport {
                url: url.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| CrawlError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        ::log::debug!(
            "Fetched {} ({} bytes, HTTP {})",
            final_url,
            body.len(),
            status.as_u16()
        );

        Ok(FetchResponse {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one request with a canned response, returning the raw request
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_lowercase()
        });

        let url = Url::parse(&format!("http://{}/jobs?page=1", addr)).unwrap();
        (url, handle)
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(vec!["TestAgent/1.0".to_string()], 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_headers() {
        let (url, server) = serve_once("200 OK", "<html><body>jobs</body></html>").await;

        let response = fetcher().fetch(&url).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<html><body>jobs</body></html>");
        assert_eq!(response.url, url);

        let request = server.await.unwrap();
        assert!(request.starts_with("get /jobs?page=1 http/1.1"));
        assert!(request.contains("user-agent: testagent/1.0"));
        assert!(request.contains("accept: text/html"));
        assert!(request.contains("accept-language: en-nz"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_status_error() {
        let (url, server) = serve_once("404 Not Found", "gone").await;

        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, CrawlError::Status { status: 404, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/jobs", addr)).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, CrawlError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_fetch_without_user_agents() {
        let (url, server) = serve_once("200 OK", "ok").await;

        let fetcher = HttpFetcher::new(Vec::new(), 0, 0).unwrap();
        assert!(fetcher.fetch(&url).await.is_ok());
        let request = server.await.unwrap();
        assert!(!request.contains("testagent"));
    }
}
