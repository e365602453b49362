//! Tester configuration.

/// Configuration for [`ApiTester`](crate::ApiTester).
///
/// Every field has a working default; override a subset with struct update
/// syntax:
///
/// ```
/// use sounder::Config;
///
/// let config = Config {
///     max_concurrency: 25,
///     ..Config::default()
/// };
/// assert_eq!(config.request_timeout_ms, 15_000);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of probes in flight at any moment.
    pub max_concurrency: usize,
    /// Per-request timeout for endpoint probes, in milliseconds.
    pub request_timeout_ms: u64,
    /// Per-request timeout for API spec discovery fetches, in milliseconds.
    pub discovery_timeout_ms: u64,
    /// User-Agent header sent with every outgoing request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            request_timeout_ms: 15_000,
            discovery_timeout_ms: 5_000,
            user_agent: format!("sounder/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
