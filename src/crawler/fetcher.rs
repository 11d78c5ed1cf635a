//! HTTP fetcher implementation
//!
//! This module is the single leaf every crawl stage goes through:
//! - Building the HTTP client with the crawler's user agent and timeouts
//! - GET requests returning the page markup
//! - Outcome classification (transient vs permanent)
//! - Bounded retry for transient failures

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FringeError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page markup
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Whether retrying may help (5xx, 429)
        transient: bool,
    },

    /// The request never produced a response (timeout, connection failure, ...)
    NetworkError {
        /// Error description
        error: String,
        /// Whether retrying may help (timeouts and connection failures)
        transient: bool,
    },
}

impl FetchResult {
    /// Returns true if another attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Success { .. } => false,
            Self::HttpError { transient, .. } | Self::NetworkError { transient, .. } => *transient,
        }
    }

    /// Returns the page body, or the failure as an error for `url`
    ///
    /// A redirect is logged with the URL that finally answered.
    pub fn into_body(self, url: &str) -> Result<String, FringeError> {
        match self {
            Self::Success { final_url, body } => {
                if final_url != url {
                    tracing::debug!("{} redirected to {}", url, final_url);
                }
                Ok(body)
            }
            Self::HttpError { status_code, .. } => Err(FringeError::HttpStatus {
                url: url.to_string(),
                status: status_code,
            }),
            Self::NetworkError { error, .. } => Err(FringeError::Network {
                url: url.to_string(),
                message: error,
            }),
        }
    }
}

/// How often and how patiently to retry transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,
    /// Pause before each additional attempt
    pub delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Formats the user agent: `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// Every request is bounded by the navigation timeout; an expired timeout
/// abandons that page rather than the run.
///
/// # Example
///
/// ```no_run
/// use fringe_sift::config::{CrawlerConfig, UserAgentConfig};
/// use fringe_sift::crawler::build_http_client;
///
/// let agent = UserAgentConfig {
///     crawler_name: "FringeSift".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&agent, &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_millis(crawler.navigation_timeout_ms))
        .connect_timeout(Duration::from_millis(crawler.connect_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and classifies the outcome
///
/// | Condition | Outcome | Transient |
/// |-----------|---------|-----------|
/// | HTTP 2xx | Success | - |
/// | HTTP 429, 5xx | HttpError | yes |
/// | Other HTTP status | HttpError | no |
/// | Timeout, connection failure | NetworkError | yes |
/// | Other request or body errors | NetworkError | no |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_request_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            transient: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
        };
    }

    match response.text().await {
        Ok(body) => {
            tracing::trace!("GET {} -> {} ({} bytes)", url, status, body.len());
            FetchResult::Success { final_url, body }
        }
        Err(e) => classify_request_error(&e),
    }
}

/// Fetches a URL, retrying transient failures according to `policy`
pub async fn fetch_with_retry(client: &Client, url: &str, policy: RetryPolicy) -> FetchResult {
    let mut attempt = 0;
    loop {
        let result = fetch_url(client, url).await;
        if !result.is_transient() || attempt >= policy.max_retries {
            return result;
        }

        attempt += 1;
        tracing::debug!(
            "Transient failure for {} ({:?}), retry {}/{}",
            url,
            result,
            attempt,
            policy.max_retries
        );
        tokio::time::sleep(policy.delay).await;
    }
}

fn classify_request_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            transient: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            transient: true,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            transient: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_agent() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn client() -> Client {
        build_http_client(&create_test_agent(), &CrawlerConfig::default()).unwrap()
    }

    #[test]
    fn test_user_agent_format() {
        assert_eq!(
            user_agent_string(&create_test_agent()),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/event/1/", server.uri());
        match fetch_url(&client(), &url).await {
            FetchResult::Success { final_url, body } => {
                assert_eq!(final_url, url);
                assert_eq!(body, "<html>ok</html>");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redirect_reports_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/e/42"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/event/42/", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/event/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>moved</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/e/42", server.uri());
        let result = fetch_url(&client(), &url).await;

        match &result {
            FetchResult::Success { final_url, .. } => {
                assert_eq!(final_url, &format!("{}/event/42/", server.uri()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(result.into_body(&url).unwrap(), "<html>moved</html>");
    }

    #[tokio::test]
    async fn test_not_found_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(1),
        };
        let url = format!("{}/missing", server.uri());
        let result = fetch_with_retry(&client(), &url, policy).await;

        assert!(matches!(
            result,
            FetchResult::HttpError {
                status_code: 404,
                transient: false
            }
        ));
        assert!(matches!(
            result.into_body(&url),
            Err(FringeError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            max_retries: 2,
            delay: Duration::from_millis(1),
        };
        let result = fetch_with_retry(&client(), &format!("{}/busy", server.uri()), policy).await;
        assert!(result.is_transient());
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let policy = RetryPolicy::from_config(&CrawlerConfig::default());
        let _ = fetch_with_retry(&client(), &format!("{}/busy", server.uri()), policy).await;
    }
}
