//! Shared HTTP plumbing for the platform clients.
//!
//! Wraps a `reqwest::Client` with default authentication headers and a
//! retry loop for transient failures: rate limiting, server errors and
//! connection problems. Other failures return immediately.

use crate::config::{HttpConfig, RetryConfig};
use crate::error::{is_retryable_status, ClientError, ClientResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A JSON API client bound to one platform.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    platform: &'static str,
    base_url: String,
    client: reqwest::Client,
    retry: RetryConfig,
}

impl ApiClient {
    /// Creates a client that sends `auth_header: auth_value` on every request.
    pub(crate) fn new(
        platform: &'static str,
        base_url: &str,
        auth_header: HeaderName,
        auth_value: &str,
        http: &HttpConfig,
    ) -> ClientResult<Self> {
        let mut secret = HeaderValue::from_str(auth_value).map_err(|_| {
            ClientError::InvalidConfig(format!(
                "{platform} credential contains invalid header characters"
            ))
        })?;
        secret.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(auth_header, secret);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(http.timeout)
            .build()
            .map_err(|e| {
                ClientError::InvalidConfig(format!("failed to build {platform} HTTP client: {e}"))
            })?;

        Ok(Self {
            platform,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: http.retry.clone(),
        })
    }

    /// Returns the platform name.
    pub(crate) fn platform(&self) -> &'static str {
        self.platform
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GETs `path` with `query` and decodes the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.url(path);
        let response = self
            .send("GET", &url, || self.client.get(&url).query(query))
            .await?;
        self.decode(response).await
    }

    /// PATCHes `body` as JSON to `path` and decodes the JSON response.
    pub(crate) async fn patch_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .send("PATCH", &url, || self.client.patch(&url).json(body))
            .await?;
        self.decode(response).await
    }

    async fn send<F>(&self, method: &str, url: &str, build: F) -> ClientResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(platform = self.platform, method, url, attempt, "Sending request");

            let can_retry = attempt < self.retry.max_attempts;

            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(platform = self.platform, url, %status, attempt, "Received response");

                    if status.is_success() {
                        return Ok(response);
                    }

                    if can_retry && is_retryable_status(status) {
                        let wait = self.wait_for(&response, attempt);
                        warn!(
                            platform = self.platform,
                            url,
                            %status,
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            "Transient API error, retrying"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    return Err(self.status_error(status, response).await);
                }
                Err(source) => {
                    let error = ClientError::Request {
                        platform: self.platform,
                        source,
                    };
                    if can_retry && error.is_retryable() {
                        let wait = self.retry.delay_for_attempt(attempt);
                        warn!(
                            platform = self.platform,
                            url,
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            error = %error,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Backoff for `attempt`, overridden by a Retry-After header on 429.
    fn wait_for(&self, response: &Response, attempt: u32) -> Duration {
        let retry_after = (response.status() == StatusCode::TOO_MANY_REQUESTS)
            .then(|| response.headers().get(RETRY_AFTER))
            .flatten()
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);

        match retry_after {
            Some(wait) => wait.min(self.retry.max_delay),
            None => self.retry.delay_for_attempt(attempt),
        }
    }

    async fn status_error(&self, status: StatusCode, response: Response) -> ClientError {
        let body = response.text().await.unwrap_or_default();
        ClientError::Status {
            platform: self.platform,
            status,
            body,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await.map_err(|source| ClientError::Request {
            platform: self.platform,
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            platform: self.platform,
            message: e.to_string(),
        })
    }
}

/// Parses a Retry-After header given in delay-seconds.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> HttpConfig {
        HttpConfig::default().with_retry(
            RetryConfig::new(3)
                .with_initial_delay(Duration::from_millis(10))
                .with_jitter(false),
        )
    }

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new("Test", &server.uri(), AUTHORIZATION, "Token abc", &http()).unwrap()
    }

    #[test]
    fn parses_retry_after_seconds() {
        assert_eq!(parse_retry_after("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(" 0 "), Some(Duration::ZERO));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn rejects_invalid_credentials() {
        let err = ApiClient::new(
            "Test",
            "http://localhost",
            AUTHORIZATION,
            "Token bad\nvalue",
            &http(),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn trims_trailing_slash() {
        let client = ApiClient::new(
            "Test",
            "http://localhost:8080/",
            AUTHORIZATION,
            "Token abc",
            &http(),
        )
        .unwrap();
        assert_eq!(client.url("/v2/devices"), "http://localhost:8080/v2/devices");
    }

    #[tokio::test]
    async fn sends_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Token abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let body: Value = client(&server).get_json("/ping", &[]).await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let body: Value = client(&server).get_json("/flaky", &[]).await.unwrap();
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn honours_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let result: ClientResult<Value> = client(&server).get_json("/limited", &[]).await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server)
            .get_json::<Value>("/down", &[])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.to_string(), "Test API error: 500 Internal Server Error - boom");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/item"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .patch_json::<_, Value>("/item", &json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_json::<Value>("/garbage", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { platform: "Test", .. }));
    }
}
