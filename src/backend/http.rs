use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::{Backend, BackendOutcome, BackendRequest};
use crate::config::{Credentials, TransportConfig};
use crate::Result;

/// Backend adapter speaking HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let config = config.clone().bounded();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Some(config.pool_idle_timeout))
            .user_agent(concat!("voice-tool-dispatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client. The caller is responsible for its timeout.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint_url(base_url: &str, path: &str) -> std::result::Result<Url, url::ParseError> {
        // A trailing slash keeps any base path segment (e.g. a reverse-proxy prefix).
        let base = Url::parse(&format!("{}/", base_url.trim().trim_end_matches('/')))?;
        base.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn call(&self, credentials: &Credentials, request: &BackendRequest) -> BackendOutcome {
        let url = match Self::endpoint_url(&credentials.base_url, request.path()) {
            Ok(url) => url,
            Err(e) => return BackendOutcome::TransportError(format!("invalid backend URL: {e}")),
        };

        let builder = match request {
            BackendRequest::Read { query, .. } => self.client.get(url).query(query),
            BackendRequest::Procedure { body, .. } => self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .json(body),
        };

        let response = match builder
            .header("apikey", &credentials.api_key)
            .bearer_auth(&credentials.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return BackendOutcome::TransportError(describe(&e)),
        };

        let status = response.status();
        // Error bodies may be plain text or HTML: read once, keep as text.
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => return BackendOutcome::TransportError(describe(&e)),
            Err(_) => String::new(),
        };

        if !status.is_success() {
            return BackendOutcome::HttpError {
                status: status.as_u16(),
                body,
            };
        }

        if body.trim().is_empty() {
            return BackendOutcome::Ok(serde_json::Value::Null);
        }

        match serde_json::from_str(&body) {
            Ok(value) => BackendOutcome::Ok(value),
            Err(e) => BackendOutcome::TransportError(format!("invalid JSON in response body: {e}")),
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
