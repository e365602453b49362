//! Core data models shared by discovery, probing, and reporting.
//!
//! Probe outcomes are plain serializable records: every definition handed to
//! the tester produces a complete [`EndpointResult`] no matter what went
//! wrong, so downstream consumers never have to guess which fields exist.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error as ThisError;

/// HTTP methods the tester knows how to probe.
///
/// Anything else found in an API spec (HEAD, OPTIONS, TRACE, vendor
/// extensions) is skipped during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Whether a request body is attached when the definition carries payload data.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        };
        f.write_str(verb)
    }
}

/// Error returned when parsing an HTTP verb the tester does not probe.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

fn default_description() -> String {
    "No description".to_string()
}

/// A single endpoint to probe, discovered from an API spec or supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDefinition {
    /// Path relative to the base URL, e.g. `/api/v1/health`.
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_description")]
    pub description: String,
    /// JSON schema the response body is validated against, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_schema: Option<serde_json::Value>,
    /// Request payload for body-carrying methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl EndpointDefinition {
    /// A plain GET definition with no schema or payload.
    pub fn get(path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: HttpMethod::Get,
            description: description.to_string(),
            expected_schema: None,
            data: None,
        }
    }
}

/// Letter grade assigned to a single endpoint or to a whole test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    D,
    #[default]
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Outcome of JSON schema validation for one probe.
///
/// Serializes as a JSON boolean for checked responses and as the string
/// `"N/A"` when no schema applied, so report consumers can tell "passed"
/// apart from "never checked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaValidity {
    /// No schema was declared, or the response was not JSON.
    #[default]
    NotApplicable,
    Valid,
    Invalid,
}

impl Serialize for SchemaValidity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SchemaValidity::NotApplicable => serializer.serialize_str("N/A"),
            SchemaValidity::Valid => serializer.serialize_bool(true),
            SchemaValidity::Invalid => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaValidity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SchemaValidityVisitor;

        impl<'de> Visitor<'de> for SchemaValidityVisitor {
            type Value = SchemaValidity;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean or the string \"N/A\"")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(if value {
                    SchemaValidity::Valid
                } else {
                    SchemaValidity::Invalid
                })
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value == "N/A" {
                    Ok(SchemaValidity::NotApplicable)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(SchemaValidityVisitor)
    }
}

/// Everything observed while probing a single endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointResult {
    /// Path of the endpoint as given in its definition.
    pub endpoint: String,
    pub method: HttpMethod,
    /// Fully resolved URL the probe was sent to.
    pub url: String,
    /// True only for a 2xx response under the latency ceiling whose body
    /// passed schema validation (when a schema was declared).
    pub success: bool,
    /// None when no HTTP response was received at all.
    pub status_code: Option<u16>,
    /// Wall-clock time for the full request including body download, in
    /// milliseconds. `-1.0` when the request never completed.
    pub response_time_ms: f64,
    /// Body size in bytes.
    pub response_size: u64,
    /// Content-Type header value, empty if absent.
    pub content_type: String,
    pub schema_valid: SchemaValidity,
    /// Number of response headers received.
    pub headers_count: usize,
    pub has_cache_headers: bool,
    pub has_security_headers: bool,
    /// Human-readable failure description, if anything went wrong.
    pub error: Option<String>,
    pub performance_grade: Grade,
}

impl EndpointResult {
    /// The failure-shaped starting point a probe fills in as it learns more.
    pub(crate) fn unprobed(definition: &EndpointDefinition, url: String) -> Self {
        Self {
            endpoint: definition.path.clone(),
            method: definition.method,
            url,
            success: false,
            status_code: None,
            response_time_ms: -1.0,
            response_size: 0,
            content_type: String::new(),
            schema_valid: SchemaValidity::NotApplicable,
            headers_count: 0,
            has_cache_headers: false,
            has_security_headers: false,
            error: None,
            performance_grade: Grade::F,
        }
    }
}
