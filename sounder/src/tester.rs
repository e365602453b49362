//! The tester: concurrent fan-out of probes and report assembly.
//!
//! [`ApiTester`] owns the HTTP client and a semaphore bounding how many
//! probes run at once. Every submitted definition yields exactly one result:
//! probes capture their own failures, and a probe task that dies is replaced
//! by a synthetic failed result so the batch never comes up short.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::discovery;
use crate::errors::{Error, Result};
use crate::models::{EndpointDefinition, EndpointResult};
use crate::prober::{absolute_url, Prober};
use crate::report::{self, AggregateReport};

/// Concurrent API endpoint tester.
pub struct ApiTester {
    config: Config,
    client: reqwest::Client,
    prober: Prober,
    permits: Arc<Semaphore>,
}

impl ApiTester {
    /// Build a tester from configuration.
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        let prober = Prober::new(client.clone(), Duration::from_millis(config.request_timeout_ms));
        // A zero bound would stall the whole run, so probe with at least one permit.
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Ok(Self {
            config,
            client,
            prober,
            permits,
        })
    }

    /// Probe endpoints under `base_url` and aggregate the results.
    ///
    /// With `endpoints` as `None` (or empty), the tester discovers what to
    /// probe: OpenAPI/Swagger documents first, then the conventional
    /// fallback list. Returns an error only for an invalid base URL; every
    /// probe-level failure is captured inside the report.
    pub async fn test_endpoints(
        &self,
        base_url: &str,
        endpoints: Option<Vec<EndpointDefinition>>,
    ) -> Result<AggregateReport> {
        if !is_valid_base_url(base_url) {
            return Err(Error::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }

        let definitions = match endpoints {
            Some(definitions) if !definitions.is_empty() => definitions,
            _ => {
                let timeout = Duration::from_millis(self.config.discovery_timeout_ms);
                discovery::discover(&self.client, timeout, base_url).await
            }
        };

        tracing::info!(base_url, count = definitions.len(), "Starting endpoint test run");
        let started = Instant::now();
        let results = self.run_all(base_url, definitions).await;
        let elapsed = started.elapsed();
        tracing::info!(
            base_url,
            total = results.len(),
            successful = results.iter().filter(|r| r.success).count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Endpoint test run complete"
        );

        Ok(report::aggregate(base_url, results, elapsed))
    }

    /// Fan out one probe task per definition, bounded by the permit pool.
    async fn run_all(
        &self,
        base_url: &str,
        definitions: Vec<EndpointDefinition>,
    ) -> Vec<EndpointResult> {
        let mut join_set = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, EndpointDefinition> = HashMap::new();

        for definition in definitions {
            let permits = self.permits.clone();
            let prober = self.prober.clone();
            let base = base_url.to_string();
            let task_definition = definition.clone();
            let handle = join_set.spawn(async move {
                // The pool lives as long as the tester and is never closed.
                let _permit = permits.acquire_owned().await.ok();
                prober.probe(&base, &task_definition).await
            });
            pending.insert(handle.id(), definition);
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    pending.remove(&id);
                    results.push(result);
                }
                Err(join_error) => {
                    // A dead task still owes the batch a result.
                    let Some(definition) = pending.remove(&join_error.id()) else {
                        continue;
                    };
                    tracing::error!(
                        endpoint = %definition.path,
                        error = %join_error,
                        "Probe task died, recording a synthetic failure"
                    );
                    let url = absolute_url(base_url, &definition.path)
                        .unwrap_or_else(|_| format!("{}{}", base_url, definition.path));
                    let mut synthetic = EndpointResult::unprobed(&definition, url);
                    synthetic.error = Some(format!("Probe task failed: {join_error}"));
                    results.push(synthetic);
                }
            }
        }
        results
    }
}

/// Accepts only absolute HTTP(S) base URLs.
fn is_valid_base_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
