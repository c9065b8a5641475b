//! HTTP transport for the Kraken REST API
//!
//! Public operations are plain `GET` requests with query parameters;
//! everything else goes to the private endpoints as a form-encoded `POST`
//! carrying the API key. Producing the `API-Sign` header is delegated to an
//! optional [`RequestSigner`].

use super::types::{Credentials, Transport, TransportError, EREQUEST, REQUEST_ERROR};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// REST API version segment
const API_VERSION: &str = "0";

/// Operations served by the public (unauthenticated) endpoints
pub const PUBLIC_OPERATIONS: &[&str] = &[
    "Time",
    "SystemStatus",
    "Assets",
    "AssetPairs",
    "Ticker",
    "OHLC",
    "Depth",
    "Trades",
    "Spread",
];

/// Produces the signature header for private calls
pub trait RequestSigner: Send + Sync {
    /// Sign a private request given its URL path, nonce and encoded body
    fn sign(&self, credentials: &Credentials, path: &str, nonce: &str, body: &str) -> String;
}

/// Response envelope returned by every Kraken endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Option<Value>,
}

/// reqwest-based [`Transport`] talking to the Kraken REST API
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    credentials: Credentials,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl HttpTransport {
    /// Create a transport for the given base URL
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("kraken-safe/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_value(
                "baseUrl",
                format!("'{base_url}' cannot carry an endpoint path"),
            ));
        }

        Ok(Self {
            client,
            base_url,
            credentials,
            signer: None,
        })
    }

    /// Attach a signer for private calls
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Check if an operation is served by the public endpoints
    pub fn is_public(operation: &str) -> bool {
        PUBLIC_OPERATIONS.contains(&operation)
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn visibility(operation: &str) -> &'static str {
        if Self::is_public(operation) {
            "public"
        } else {
            "private"
        }
    }

    /// Build the endpoint path for an operation
    pub fn endpoint_path(operation: &str) -> String {
        format!("/{API_VERSION}/{}/{operation}", Self::visibility(operation))
    }

    /// Endpoint URL for an operation, appended to any path the base URL carries
    pub fn endpoint_url(&self, operation: &str) -> std::result::Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TransportError::request(
                    REQUEST_ERROR,
                    EREQUEST,
                    format!("base URL '{}' cannot carry an endpoint path", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend([API_VERSION, Self::visibility(operation), operation]);
        Ok(url)
    }

    async fn call_public(
        &self,
        url: Url,
        params: Vec<(String, String)>,
    ) -> std::result::Result<Value, TransportError> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(&params).send().await?;
        parse_response(response).await
    }

    async fn call_private(
        &self,
        url: Url,
        path: &str,
        params: Vec<(String, String)>,
    ) -> std::result::Result<Value, TransportError> {
        let nonce = Utc::now().timestamp_micros().to_string();
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("nonce", &nonce)
            .extend_pairs(params.iter())
            .finish();

        debug!("POST {}", url);
        let mut req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("API-Key", self.credentials.key());

        if let Some(ref signer) = self.signer {
            req = req.header(
                "API-Sign",
                signer.sign(&self.credentials, path, &nonce, &body),
            );
        }

        let response = req.body(body).send().await?;
        parse_response(response).await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        operation: &str,
        args: &[Value],
    ) -> std::result::Result<Value, TransportError> {
        let url = self.endpoint_url(operation)?;
        let params = flatten_params(args.first());

        if Self::is_public(operation) {
            self.call_public(url, params).await
        } else {
            self.call_private(url, &Self::endpoint_path(operation), params).await
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

/// Turn the first call argument into key/value parameters
fn flatten_params(params: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = params else {
        return Vec::new();
    };
    flatten_object(map)
}

fn flatten_object(map: &Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Map an HTTP response onto the call result
async fn parse_response(response: Response) -> std::result::Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::status(status.as_u16(), body));
    }

    let envelope: Envelope = response.json().await?;
    if !envelope.error.is_empty() {
        return Err(TransportError::api(envelope.error));
    }

    Ok(envelope.result.unwrap_or(Value::Null))
}
