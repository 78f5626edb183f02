//! The async half of host-does-IO: executing core `HttpRequest`s.

use std::future::Future;
use std::time::Duration;

use watchlist_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};

/// Executes a described request and returns the response as data.
///
/// Implementations must report every non-2xx status as an `Ok` response;
/// only a round-trip that did not complete is an `Err`, and it is always
/// `ApiError::NetworkFailure`.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// reqwest-backed transport with a fixed per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    fn network_failure(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::NetworkFailure(format!("timed out after {:?}", self.timeout))
        } else {
            ApiError::NetworkFailure(err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let mut builder = self.http.request(method, &request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.network_failure(e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(|e| self.network_failure(e))?;

        tracing::debug!(status, path = %request.path, "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
