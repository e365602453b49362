//! Endpoint probing.
//!
//! The [`Prober`] sends one request per endpoint definition and records
//! everything it observes into an [`EndpointResult`]. It never returns an
//! error: timeouts, refused connections, unreadable bodies, and schema
//! violations all land in the result fields so a batch always produces one
//! result per definition.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::models::{EndpointDefinition, EndpointResult, SchemaValidity};
use crate::report::stats::round2;
use crate::schema;

/// Response headers that indicate cache configuration.
const CACHE_HEADERS: [&str; 3] = ["cache-control", "etag", "expires"];

/// Response headers that indicate security hardening.
const SECURITY_HEADERS: [&str; 4] = [
    "x-frame-options",
    "x-content-type-options",
    "x-xss-protection",
    "strict-transport-security",
];

/// Responses slower than this are failures even with a 2xx status.
const MAX_ACCEPTABLE_RESPONSE_MS: f64 = 10_000.0;

/// Failure classes for a probe request that never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    /// The request exceeded the configured timeout.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// Any other client-side request failure.
    Request,
}

impl ProbeErrorKind {
    fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            ProbeErrorKind::Timeout
        } else if error.is_connect() {
            ProbeErrorKind::Connect
        } else {
            ProbeErrorKind::Request
        }
    }

    fn describe(self, error: &reqwest::Error) -> String {
        match self {
            ProbeErrorKind::Timeout => "Request timed out".to_string(),
            ProbeErrorKind::Connect => format!("Connection failed: {error}"),
            ProbeErrorKind::Request => format!("Request failed: {error}"),
        }
    }
}

/// Resolve an endpoint path against the base URL.
pub(crate) fn absolute_url(base_url: &str, path: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(base_url)?;
    Ok(base.join(path)?.to_string())
}

/// Sends probe requests and turns whatever happens into results.
#[derive(Clone)]
pub struct Prober {
    client: Client,
    request_timeout: Duration,
}

impl Prober {
    pub(crate) fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    /// Probe a single endpoint.
    ///
    /// Timing covers the full request including body download. A request
    /// that never completes keeps the `-1.0` sentinel so it is excluded
    /// from latency statistics.
    pub async fn probe(&self, base_url: &str, definition: &EndpointDefinition) -> EndpointResult {
        let url = match absolute_url(base_url, &definition.path) {
            Ok(url) => url,
            Err(e) => {
                let fallback = format!("{}{}", base_url, definition.path);
                let mut result = EndpointResult::unprobed(definition, fallback);
                result.error = Some(format!("Invalid endpoint URL: {e}"));
                return result;
            }
        };
        let mut result = EndpointResult::unprobed(definition, url.clone());

        let mut request = self
            .client
            .request(definition.method.into(), &url)
            .timeout(self.request_timeout);
        if definition.method.allows_body() {
            if let Some(data) = &definition.data {
                request = request.json(data);
            }
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = ProbeErrorKind::classify(&e);
                result.error = Some(kind.describe(&e));
                tracing::warn!(endpoint = %definition.path, kind = ?kind, error = %e, "Probe request failed");
                return result;
            }
        };

        let status = response.status().as_u16();
        result.status_code = Some(status);
        let headers = response.headers();
        result.headers_count = headers.len();
        result.content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        result.has_cache_headers = CACHE_HEADERS.iter().any(|name| headers.contains_key(*name));
        result.has_security_headers = SECURITY_HEADERS.iter().any(|name| headers.contains_key(*name));

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                result.response_time_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
                result.error = Some(format!("Failed to read response body: {e}"));
                tracing::warn!(endpoint = %definition.path, status, error = %e, "Body download failed");
                return result;
            }
        };
        result.response_time_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
        result.response_size = body.len() as u64;
        result.success =
            (200..300).contains(&status) && result.response_time_ms < MAX_ACCEPTABLE_RESPONSE_MS;

        if result.content_type.contains("application/json") {
            if let Some(expected_schema) = &definition.expected_schema {
                match serde_json::from_slice::<serde_json::Value>(&body) {
                    Ok(value) => match schema::validate_response(&value, expected_schema) {
                        Ok(()) => result.schema_valid = SchemaValidity::Valid,
                        Err(message) => {
                            result.schema_valid = SchemaValidity::Invalid;
                            result.success = false;
                            result.error = Some(format!("Schema validation failed: {message}"));
                        }
                    },
                    Err(_) => {
                        result.schema_valid = SchemaValidity::Invalid;
                        result.success = false;
                        result.error = Some("Response is not valid JSON.".to_string());
                    }
                }
            }
        }

        tracing::debug!(
            endpoint = %definition.path,
            status,
            elapsed_ms = result.response_time_ms,
            success = result.success,
            "Probe completed"
        );
        result
    }
}
