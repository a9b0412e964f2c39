//! HTTP content probe.
//!
//! Fetches a plain HTTP URL once and checks that the response is a 200
//! whose body is byte-for-byte the expected content.

#![allow(clippy::missing_errors_doc)]

use std::time::Duration;

use crate::error::{Error, Result};

/// Default timeout for the whole request, body included, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// HTTP content prober.
///
/// # Example
///
/// ```ignore
/// let probe = HttpProbe::new(Duration::from_secs(10))?;
/// probe.test("http://www.msftncsi.com/ncsi.txt", "Microsoft NCSI").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Create a prober with the given request timeout.
    ///
    /// Proxies configured in the environment are ignored and redirects are
    /// not followed, so a 3xx reply is reported as its own status.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| Error::config(format!("Unable to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Probe `url` and compare its body with `expected`.
    ///
    /// # Errors
    ///
    /// - `UnreachableEndpoint` if no response is received
    /// - `UnexpectedStatus` if the status is not 200
    /// - `ReadFailure` if the body cannot be read
    /// - `ContentMismatch` if the body differs from `expected`
    pub async fn test(&self, url: &str, expected: &str) -> Result<()> {
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::unreachable(url, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::ReadFailure(e.to_string()))?;

        if body.as_ref() != expected.as_bytes() {
            return Err(Error::mismatch(String::from_utf8_lossy(&body), expected));
        }

        tracing::debug!("{url} returned the expected content");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn ncsi_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ncsi.txt"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    fn probe() -> HttpProbe {
        HttpProbe::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_matching_content_passes() {
        let server = ncsi_server(200, "WindowsSpyBlocker").await;
        let url = format!("{}/ncsi.txt", server.uri());
        probe().test(&url, "WindowsSpyBlocker").await.unwrap();
    }

    #[tokio::test]
    async fn test_other_content_mismatches() {
        let server = ncsi_server(200, "WindowsSpyBlocker").await;
        let url = format!("{}/ncsi.txt", server.uri());
        let err = probe().test(&url, "other").await.unwrap_err();
        match err {
            Error::ContentMismatch { actual, expected } => {
                assert_eq!(actual, "WindowsSpyBlocker");
                assert_eq!(expected, "other");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_trimming() {
        let server = ncsi_server(200, "Microsoft NCSI\n").await;
        let url = format!("{}/ncsi.txt", server.uri());
        let err = probe().test(&url, "Microsoft NCSI").await.unwrap_err();
        assert_eq!(err.kind(), "content_mismatch");
    }

    #[tokio::test]
    async fn test_not_found_is_unexpected_status() {
        let server = ncsi_server(404, "").await;
        let url = format!("{}/ncsi.txt", server.uri());
        let err = probe().test(&url, "WindowsSpyBlocker").await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus { status: 404 }));
    }

    #[tokio::test]
    async fn test_redirect_is_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ncsi.txt"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", "https://raw.githubusercontent.com/ncsi.txt"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/ncsi.txt", server.uri());
        let err = probe().test(&url, "WindowsSpyBlocker").await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus { status: 301 }));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        // Nothing listens on port 1.
        let err = probe()
            .test("http://127.0.0.1:1/ncsi.txt", "WindowsSpyBlocker")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unreachable_endpoint");
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("WindowsSpyBlocker")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let probe = HttpProbe::new(Duration::from_millis(200)).unwrap();
        let url = format!("{}/ncsi.txt", server.uri());
        let err = probe.test(&url, "WindowsSpyBlocker").await.unwrap_err();
        assert_eq!(err.kind(), "unreachable_endpoint");
    }
}
