//! # sounder: Concurrent API Endpoint Testing
//!
//! `sounder` probes the endpoints of an HTTP API concurrently, measures how
//! each one behaves, and aggregates the observations into a single graded
//! report covering latency statistics, reliability, and security posture.
//!
//! ## Overview
//!
//! Point the tester at a base URL and it works out the rest. If the service
//! publishes an OpenAPI/Swagger document at a well-known location, every
//! operation in it becomes a probe target, including any declared response
//! schema the body is validated against. Without a spec, a list of
//! conventional endpoints (`/health`, `/status`, `/metrics`, ...) is probed
//! instead, so even an undocumented service yields a useful report. Callers
//! with exact knowledge of the API can skip discovery and pass their own
//! endpoint definitions.
//!
//! Probes run concurrently under a configurable bound. Each one records
//! everything observable about its endpoint: status, timing, body size,
//! content type, header hygiene, and schema validity. Failures never abort a
//! run; a timeout or refused connection is just another shape of result.
//!
//! ### The Report
//!
//! Aggregation turns a batch of results into one [`AggregateReport`]:
//!
//! - latency statistics over completed probes (mean, percentiles, standard
//!   deviation, IQR outliers, a banded distribution histogram),
//! - per-endpoint letter grades and an overall grade for the run,
//! - composite reliability and health scores on a 0-100 scale,
//! - distributions over status codes, content types, and HTTP methods,
//! - a security analysis checking transport encryption and error surfaces.
//!
//! Requests that never completed are excluded from latency statistics so a
//! few timeouts cannot drag the percentiles into fiction; they still count
//! against success rate and the composite scores.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sounder::{ApiTester, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tester = ApiTester::new(Config::default())?;
//!     let report = tester.test_endpoints("https://api.example.com", None).await?;
//!
//!     println!(
//!         "{}: grade {} ({}% success, {} ms median)",
//!         report.base_url,
//!         report.overall_grade,
//!         report.success_rate,
//!         report.performance_metrics.median_response_time,
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod errors;
pub mod models;
pub mod prober;
pub mod report;
mod schema;
pub mod tester;

pub use config::Config;
pub use errors::{Error, Result};
pub use models::{EndpointDefinition, EndpointResult, Grade, HttpMethod, SchemaValidity};
pub use report::{AggregateReport, PerformanceMetrics, SecurityAnalysis};
pub use tester::ApiTester;
