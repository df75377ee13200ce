use crate::utils::error::{Result, ScoutError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// How the API key travels with each request.
#[derive(Debug, Clone)]
pub enum ApiAuth {
    Header(&'static str, String),
    Query(&'static str, String),
}

/// JSON-over-HTTP client shared by the platform clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: ApiAuth,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: ApiAuth, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the body as JSON.
    ///
    /// Non-2xx answers become `HttpStatus` carrying the API's own error text
    /// when it sent one. A 2xx body that is not JSON becomes `MalformedPayload`.
    pub async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params);

        request = match &self.auth {
            ApiAuth::Header(name, key) => request.header(*name, key),
            ApiAuth::Query(name, key) => request.query(&[(*name, key)]),
        };

        tracing::debug!(%url, ?params, "Making API request");
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%url, %status, "API response");

        let body = response.text().await?;

        if !status.is_success() {
            return Err(ScoutError::HttpStatus {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        serde_json::from_str(&body).map_err(|e| ScoutError::MalformedPayload {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| json.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null => None,
            other if !other.is_string() => Some(other.to_string()),
            _ => None,
        })
}
