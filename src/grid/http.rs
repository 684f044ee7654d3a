//! HTTP utilities for grid REST calls

use super::error::{GridError, Result};
use reqwest::{Client, Method};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Status codes the grid answers with on success. Anything else is an error.
pub const ACCEPTED_STATUSES: [u16; 2] = [200, 201];

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Decoded JSON returned by the grid
///
/// The shape is not validated beyond the status check performed by the
/// dispatcher. The grid usually answers with `{"status": .., "data": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// `status` field of the envelope, if present and numeric
    pub fn status(&self) -> Option<u64> {
        self.0.get("status").and_then(|v| v.as_u64())
    }

    /// `data` field of the envelope, `Value::Null` when absent
    pub fn data(&self) -> &Value {
        self.0.get("data").unwrap_or(&Value::Null)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Envelope> for Value {
    fn from(envelope: Envelope) -> Self {
        envelope.0
    }
}

/// HTTP client wrapper performing exactly one round trip per call
#[derive(Clone, Debug)]
pub struct GridHttpClient {
    client: Client,
}

impl GridHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("synergos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GridError::Client)?;

        Ok(Self { client })
    }

    /// Send `method` to `url` with an optional JSON body and decode the reply
    pub async fn execute(&self, method: Method, url: &str, payload: Option<&Value>) -> Result<Envelope> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|source| GridError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| GridError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !ACCEPTED_STATUSES.contains(&status) {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("Grid error: {} - {}", status, sanitize_for_log(&body));
            return Err(GridError::UnexpectedStatus {
                status,
                url: url.to_string(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map(Envelope::new)
            .map_err(|source| GridError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Make a GET request to the grid
    pub async fn get(&self, url: &str) -> Result<Envelope> {
        self.execute(Method::GET, url, None).await
    }

    /// Make a POST request to the grid
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Envelope> {
        self.execute(Method::POST, url, body).await
    }

    /// Make a PUT request to the grid
    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Envelope> {
        self.execute(Method::PUT, url, body).await
    }

    /// Make a DELETE request to the grid
    pub async fn delete(&self, url: &str) -> Result<Envelope> {
        self.execute(Method::DELETE, url, None).await
    }
}

/// Format a grid error for display
/// Security: Avoids echoing raw response bodies back to the terminal
pub fn format_grid_error(error: &GridError) -> String {
    match error {
        GridError::Scope { .. } | GridError::Capability { .. } | GridError::EmptyCache => {
            error.to_string()
        },
        GridError::UnknownNode(_) | GridError::InvalidAddress { .. } => error.to_string(),
        GridError::Transport { .. } => {
            "Could not reach the grid. Check the host, port and TLS settings.".to_string()
        },
        GridError::UnexpectedStatus { status, .. } => match status {
            400 => "Invalid request. Check your parameters.".to_string(),
            404 => "Resource not found.".to_string(),
            409 => "Resource conflict. The resource may already exist.".to_string(),
            500 | 503 => "Grid temporarily unavailable. Please try again.".to_string(),
            other => format!("Grid rejected the request with status {}.", other),
        },
        GridError::Decode { .. } => "Grid returned a malformed response.".to_string(),
        GridError::Payload(_) => "Request payload could not be encoded.".to_string(),
        GridError::InvalidTable(_) | GridError::Client(_) => {
            let message = error.to_string();
            let sanitized = message
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect::<String>();
            if sanitized.len() < message.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        },
    }
}
