//! Endpoint discovery.
//!
//! Tries the well-known OpenAPI/Swagger document locations first and parses
//! every operation found there. When no usable spec exists the tester falls
//! back to probing a fixed list of conventional endpoints, so a bare base URL
//! still yields a meaningful report.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::models::{EndpointDefinition, HttpMethod};

/// Well-known locations for OpenAPI/Swagger documents, tried in order.
pub(crate) const SPEC_PATHS: [&str; 3] = ["/openapi.json", "/swagger.json", "/api/docs/json"];

/// Conventional endpoints probed when no API spec can be found.
pub(crate) const FALLBACK_ENDPOINTS: [(&str, &str); 10] = [
    ("/health", "Health check"),
    ("/status", "Status endpoint"),
    ("/api/v1/ping", "Ping endpoint"),
    ("/api/v1/health", "API health check"),
    ("/api/status", "API status endpoint"),
    ("/ping", "Simple ping endpoint"),
    ("/api/v1/status", "API v1 status"),
    ("/healthcheck", "Health check endpoint"),
    ("/api/healthcheck", "API health check"),
    ("/metrics", "Metrics endpoint"),
];

/// Discover the endpoints to test for `base_url`.
///
/// Never fails: a spec that is missing, unreachable, or empty degrades to the
/// common-endpoint fallback list.
pub async fn discover(client: &Client, timeout: Duration, base_url: &str) -> Vec<EndpointDefinition> {
    match from_api_spec(client, timeout, base_url).await {
        Some(endpoints) if !endpoints.is_empty() => {
            tracing::info!(count = endpoints.len(), "Discovered endpoints from API specification");
            endpoints
        }
        _ => {
            tracing::info!("No usable API specification found, probing common endpoints instead");
            fallback_endpoints()
        }
    }
}

/// The conventional endpoint list as ready-to-probe definitions.
pub fn fallback_endpoints() -> Vec<EndpointDefinition> {
    FALLBACK_ENDPOINTS
        .iter()
        .map(|(path, description)| EndpointDefinition::get(path, description))
        .collect()
}

/// Fetch the first well-known spec location that answers with parseable JSON.
async fn from_api_spec(
    client: &Client,
    timeout: Duration,
    base_url: &str,
) -> Option<Vec<EndpointDefinition>> {
    for path in SPEC_PATHS {
        let spec_url = match Url::parse(base_url).and_then(|base| base.join(path)) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(base_url, path, error = %e, "Skipping unbuildable spec URL");
                continue;
            }
        };
        let response = match client.get(spec_url.clone()).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %spec_url, error = %e, "Spec fetch failed");
                continue;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(url = %spec_url, status = %response.status(), "No spec at location");
            continue;
        }
        match response.json::<Value>().await {
            Ok(document) => {
                tracing::debug!(url = %spec_url, "Found API specification");
                return Some(parse_api_spec(&document));
            }
            Err(e) => {
                tracing::debug!(url = %spec_url, error = %e, "Spec body was not valid JSON");
                continue;
            }
        }
    }
    None
}

/// Extract probe definitions from an OpenAPI document.
///
/// Unknown verbs and non-operation keys under a path item (`parameters`,
/// `servers`, ...) are skipped. The expected response schema, when present,
/// comes from the JSON content of the 200 response.
pub fn parse_api_spec(document: &Value) -> Vec<EndpointDefinition> {
    let mut endpoints = Vec::new();
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return endpoints;
    };
    for (path, operations) in paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        for (verb, details) in operations {
            let Ok(method) = verb.parse::<HttpMethod>() else {
                continue;
            };
            let description = details
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or("No description")
                .to_string();
            let expected_schema = details
                .pointer("/responses/200/content/application~1json/schema")
                .cloned();
            endpoints.push(EndpointDefinition {
                path: path.clone(),
                method,
                description,
                expected_schema,
                data: None,
            });
        }
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_spec() -> Value {
        json!({
            "openapi": "3.0.0",
            "paths": {
                "/users": {
                    "get": {
                        "summary": "List users",
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "responses": { "201": { "description": "created" } }
                    },
                    "parameters": [{ "name": "page", "in": "query" }]
                },
                "/users/{id}": {
                    "trace": { "summary": "Never probed" },
                    "delete": { "summary": "Remove a user" }
                }
            }
        })
    }

    #[test]
    fn parse_extracts_operations_with_summaries_and_schemas() {
        let endpoints = parse_api_spec(&sample_spec());
        assert_eq!(endpoints.len(), 3);

        let list = endpoints
            .iter()
            .find(|e| e.path == "/users" && e.method == HttpMethod::Get)
            .unwrap();
        assert_eq!(list.description, "List users");
        assert_eq!(list.expected_schema, Some(json!({ "type": "array" })));

        let create = endpoints
            .iter()
            .find(|e| e.path == "/users" && e.method == HttpMethod::Post)
            .unwrap();
        assert_eq!(create.description, "No description");
        assert!(create.expected_schema.is_none());
    }

    #[test]
    fn parse_skips_unknown_verbs_and_path_level_keys() {
        let endpoints = parse_api_spec(&sample_spec());
        assert!(endpoints.iter().all(|e| e.path != "/users/{id}" || e.method == HttpMethod::Delete));
        assert!(!endpoints.iter().any(|e| e.description == "Never probed"));
    }

    #[test]
    fn parse_handles_documents_without_paths() {
        assert!(parse_api_spec(&json!({ "openapi": "3.0.0" })).is_empty());
        assert!(parse_api_spec(&json!({ "paths": "not-an-object" })).is_empty());
    }

    #[test]
    fn fallback_list_covers_the_conventional_endpoints() {
        let endpoints = fallback_endpoints();
        assert_eq!(endpoints.len(), 10);
        assert!(endpoints.iter().all(|e| e.method == HttpMethod::Get));
        assert_eq!(endpoints[0].path, "/health");
        assert_eq!(endpoints[0].description, "Health check");
    }

    #[test_log::test(tokio::test)]
    async fn discover_prefers_the_first_spec_location_that_answers() {
        let server = MockServer::start().await;
        // First well-known location 404s, the second serves a document.
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/swagger.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_spec()))
            .mount(&server)
            .await;

        let client = Client::new();
        let endpoints = discover(&client, Duration::from_secs(5), &server.uri()).await;
        assert_eq!(endpoints.len(), 3);
        assert!(endpoints.iter().any(|e| e.description == "List users"));
    }

    #[test_log::test(tokio::test)]
    async fn discover_falls_back_when_no_spec_exists() {
        let server = MockServer::start().await;

        let client = Client::new();
        let endpoints = discover(&client, Duration::from_secs(5), &server.uri()).await;
        assert_eq!(endpoints.len(), FALLBACK_ENDPOINTS.len());
        assert!(endpoints.iter().any(|e| e.path == "/metrics"));
    }

    #[test_log::test(tokio::test)]
    async fn discover_falls_back_when_the_spec_has_no_operations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "paths": {} })))
            .mount(&server)
            .await;

        let client = Client::new();
        let endpoints = discover(&client, Duration::from_secs(5), &server.uri()).await;
        assert_eq!(endpoints.len(), FALLBACK_ENDPOINTS.len());
    }
}
