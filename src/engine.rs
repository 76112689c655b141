//! Search engine HTTP client / 搜索引擎客户端
//!
//! Thin wrapper over one pooled `reqwest::Client` talking to an
//! Elasticsearch-compatible endpoint with basic auth. The client is cheap to
//! clone and safe to share between requests; connection reuse is left to
//! reqwest.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::search::EngineQuery;

/// Engine connection settings, passed explicitly to whoever needs a client.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub address: String,
    pub username: String,
    pub password: String,
    pub index: String,
    pub request_timeout: Duration,
    pub idle_timeout: Duration,
    pub tls_insecure: bool,
    pub verify_on_startup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            address: "https://localhost:9200".to_string(),
            username: String::new(),
            password: String::new(),
            index: "products".to_string(),
            request_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(90),
            tls_insecure: false,
            verify_on_startup: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine address '{0}': {1}")]
    InvalidAddress(String, String),

    #[error("invalid engine credentials: {0}")]
    InvalidCredentials(String),

    #[error("engine request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("engine returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("engine returned an unreadable body: {0}")]
    InvalidBody(String),

    #[error("bulk indexing reported errors: {0}")]
    Bulk(String),
}

impl EngineError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Request(e) if e.is_timeout())
    }
}

/// Client bound to one engine address and one index.
#[derive(Clone)]
pub struct EngineClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
    index: String,
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .field("index", &self.index)
            .finish()
    }
}

impl EngineClient {
    /// Validate the config and build the HTTP client. Does not touch the network.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let base = parse_address(&config.address)?;
        check_credentials(&config.username, &config.password)?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .pool_idle_timeout(config.idle_timeout)
            .danger_accept_invalid_certs(config.tls_insecure)
            .build()?;

        Ok(Self {
            http,
            base,
            username: config.username.clone(),
            password: config.password.clone(),
            index: config.index.clone(),
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// `GET /` - cheap reachability and credentials check.
    pub async fn ping(&self) -> Result<(), EngineError> {
        let resp = self.request(Method::GET, &[]).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// `POST /{index}/_search` and return the decoded envelope.
    pub async fn search(&self, query: &EngineQuery) -> Result<Value, EngineError> {
        let resp = self
            .request(Method::POST, &[self.index.as_str(), "_search"])
            .json(query)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        resp.json::<Value>()
            .await
            .map_err(|e| EngineError::InvalidBody(e.to_string()))
    }

    pub async fn index_exists(&self) -> Result<bool, EngineError> {
        let resp = self.request(Method::HEAD, &[self.index.as_str()]).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => check_status(resp).await.map(|_| true),
        }
    }

    /// `PUT /{index}` with mappings/settings.
    pub async fn create_index(&self, definition: &Value) -> Result<(), EngineError> {
        let resp = self
            .request(Method::PUT, &[self.index.as_str()])
            .json(definition)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    /// `DELETE /{index}`. A missing index counts as deleted.
    pub async fn delete_index(&self) -> Result<(), EngineError> {
        let resp = self.request(Method::DELETE, &[self.index.as_str()]).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Index {} already absent", self.index);
            return Ok(());
        }
        check_status(resp).await?;
        Ok(())
    }

    /// Index documents through the bulk API, refreshing before returning.
    pub async fn bulk_index(&self, documents: &[Value]) -> Result<usize, EngineError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let mut body = String::new();
        for doc in documents {
            body.push_str(r#"{"index":{}}"#);
            body.push('\n');
            body.push_str(&doc.to_string());
            body.push('\n');
        }

        let resp = self
            .request(Method::POST, &[self.index.as_str(), "_bulk"])
            .query(&[("refresh", "true")])
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let summary: Value = resp
            .json()
            .await
            .map_err(|e| EngineError::InvalidBody(e.to_string()))?;

        if summary.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            let first = summary
                .get("items")
                .and_then(Value::as_array)
                .and_then(|items| {
                    items.iter().find_map(|item| item.get("index").and_then(|i| i.get("error")))
                })
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(EngineError::Bulk(first));
        }

        Ok(documents.len())
    }

    /// Remove every document but keep the index and its mappings.
    pub async fn delete_all_documents(&self) -> Result<u64, EngineError> {
        let resp = self
            .request(Method::POST, &[self.index.as_str(), "_delete_by_query"])
            .query(&[("refresh", "true")])
            .json(&serde_json::json!({ "query": { "match_all": {} } }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let summary: Value = resp
            .json()
            .await
            .map_err(|e| EngineError::InvalidBody(e.to_string()))?;
        Ok(summary.get("deleted").and_then(Value::as_u64).unwrap_or(0))
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        let builder = self.http.request(method, url);
        if self.username.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.username, Some(&self.password))
        }
    }
}

fn parse_address(address: &str) -> Result<Url, EngineError> {
    let url = Url::parse(address.trim())
        .map_err(|e| EngineError::InvalidAddress(address.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(EngineError::InvalidAddress(
                address.to_string(),
                format!("unsupported scheme '{}'", other),
            ))
        }
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(EngineError::InvalidAddress(address.to_string(), "missing host".to_string()));
    }

    Ok(url)
}

fn check_credentials(username: &str, password: &str) -> Result<(), EngineError> {
    if username.contains(':') {
        return Err(EngineError::InvalidCredentials(
            "username must not contain ':'".to_string(),
        ));
    }
    if username.is_empty() && !password.is_empty() {
        return Err(EngineError::InvalidCredentials(
            "password given without a username".to_string(),
        ));
    }
    Ok(())
}

async fn check_status(resp: Response) -> Result<Response, EngineError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(EngineError::Status { status, body })
}
