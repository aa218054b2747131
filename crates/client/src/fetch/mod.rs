//! HTTP fetch layer behind the cache manager.
//!
//! The [`Network`] trait is the seam between strategy code and the real
//! network: production wires in [`HttpClient`] (reqwest), tests wire in a
//! scripted fake. Strategies treat every error uniformly as
//! "network-unreachable" and fall back to cache or a synthetic response.
//!
//! ### Limits
//! - Request timeout (default: 10s) applied on the client builder
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, same_origin};

use precache_core::Error;

/// HTTP methods the cache manager deals with. Interception covers
/// GET-equivalent reads; the other verbs exist for queued submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Parse an uppercase method name, as stored in cache entries.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intercepted (or replayed) request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    /// Body for non-GET submissions; GET reads carry none.
    pub body: Option<Bytes>,
}

impl Request {
    /// A GET read for the given URL.
    pub fn get(url: Url) -> Self {
        Self { method: Method::Get, url, body: None }
    }

    /// A POST submission with the given body.
    pub fn post(url: Url, body: Bytes) -> Self {
        Self { method: Method::Post, url, body: Some(body) }
    }
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "precache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "precache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(10000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code (always 2xx; other statuses are errors)
    pub status: u16,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers as name/value pairs
    pub headers: Vec<(String, String)>,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Seam between strategy code and the network.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request, returning the response bytes and metadata.
    ///
    /// # Errors
    ///
    /// Any failure mode (connect error, timeout, oversized body, non-2xx
    /// status) is an error; callers decide how to degrade.
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error>;
}

/// Real HTTP client backed by reqwest.
pub struct HttpClient {
    http: Client,
    config: FetchConfig,
}

impl HttpClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for HttpClient {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = request.url.clone();

        let mut builder = match request.method {
            Method::Get => self.http.get(url.as_str()),
            Method::Post => self.http.post(url.as_str()),
            Method::Put => self.http.put(url.as_str()),
            Method::Delete => self.http.delete(url.as_str()),
        };
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{} {}", request.method, url))
            } else {
                Error::Network(format!("{}", e))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let content_length = response.content_length();
        if let Some(len) = content_length
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            url,
            final_url,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url, final_url, status: status.as_u16(), content_type, bytes, headers, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "precache/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(10000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_method_roundtrip() {
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            assert_eq!(Method::parse(method.as_str()), Some(method));
        }
        assert_eq!(Method::parse("PATCH"), None);
    }

    #[test]
    fn test_request_constructors() {
        let url = Url::parse("https://example.com/form").unwrap();
        let get = Request::get(url.clone());
        assert_eq!(get.method, Method::Get);
        assert!(get.body.is_none());

        let post = Request::post(url, Bytes::from_static(b"name=x"));
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.body.as_deref(), Some(b"name=x".as_slice()));
    }

    #[tokio::test]
    async fn test_http_client_new() {
        let client = HttpClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }
}
