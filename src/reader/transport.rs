use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Transport-level failure: the request never produced an HTTP response.
/// HTTP error statuses are not transport errors; they come back as
/// [`Response`] data for the caller to interpret per endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the protocol client and the HTTP stack. The `auth`
/// parameter, when present, is attached as `Authorization: GoogleLogin
/// auth=<token>`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: Url, auth: Option<&str>) -> Result<Response, TransportError>;

    async fn post_form(
        &self,
        url: Url,
        form: &[(String, String)],
        auth: Option<&str>,
    ) -> Result<Response, TransportError>;
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    fn classify(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }

    fn auth_header(token: &str) -> String {
        format!("GoogleLogin auth={token}")
    }

    async fn read(response: reqwest::Response) -> Result<Response, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::classify)?;
        Ok(Response { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url, auth: Option<&str>) -> Result<Response, TransportError> {
        debug!(%url, "HTTP GET");
        let mut request = self.client.get(url.clone());
        if let Some(token) = auth {
            request = request.header(AUTHORIZATION, Self::auth_header(token));
        }

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "HTTP GET failed");
            Self::classify(e)
        })?;

        Self::read(response).await
    }

    async fn post_form(
        &self,
        url: Url,
        form: &[(String, String)],
        auth: Option<&str>,
    ) -> Result<Response, TransportError> {
        debug!(%url, "HTTP POST");
        let mut request = self.client.post(url.clone()).form(&form);
        if let Some(token) = auth {
            request = request.header(AUTHORIZATION, Self::auth_header(token));
        }

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "HTTP POST failed");
            Self::classify(e)
        })?;

        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_bounds() {
        assert!(Response { status: 200, body: String::new() }.is_success());
        assert!(Response { status: 299, body: String::new() }.is_success());
        assert!(!Response { status: 199, body: String::new() }.is_success());
        assert!(!Response { status: 301, body: String::new() }.is_success());
        assert!(!Response { status: 404, body: String::new() }.is_success());
    }

    #[test]
    fn test_auth_header_format() {
        assert_eq!(
            HttpTransport::auth_header("tok123"),
            "GoogleLogin auth=tok123"
        );
    }
}
