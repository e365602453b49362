//! Report assembly.
//!
//! The aggregator folds a batch of probe results into one immutable
//! [`AggregateReport`]: distributions over status codes, content types, and
//! methods, latency statistics, letter grades, composite scores, and the
//! security analysis. Field names are stable; downstream renderers consume
//! the serialized form verbatim.

pub mod grading;
pub mod security;
pub mod stats;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{EndpointResult, Grade, HttpMethod};

pub use security::SecurityAnalysis;
pub use stats::{
    Consistency, EndpointTiming, LatencyDistribution, OutlierSummary, PerformanceMetrics,
};

/// Per-HTTP-method latency and success breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodPerformance {
    #[serde(skip)]
    times: Vec<f64>,
    pub total: usize,
    pub successes: usize,
    /// Percent of probes with this method that succeeded, one decimal.
    pub success_rate: f64,
    /// Mean over completed probes only, two decimals.
    pub avg_response_time: f64,
}

/// Totals over response body sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTransferStats {
    pub total_bytes: u64,
    pub average_bytes: f64,
    pub largest_response: u64,
    pub smallest_response: u64,
}

/// The final report for one test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub base_url: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub total_duration_seconds: f64,
    pub total_endpoints_tested: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    /// Percent, one decimal.
    pub success_rate: f64,
    pub overall_grade: Grade,
    pub performance_metrics: PerformanceMetrics,
    /// Counts keyed by status code, with `"Error"` for probes that never
    /// received a response.
    pub status_code_distribution: BTreeMap<String, usize>,
    /// Counts keyed by media type without parameters, `"unknown"` when the
    /// response carried no Content-Type.
    pub content_type_analysis: BTreeMap<String, usize>,
    pub method_performance: BTreeMap<HttpMethod, MethodPerformance>,
    pub reliability_score: f64,
    pub health_score: f64,
    pub security_analysis: SecurityAnalysis,
    pub data_transfer: DataTransferStats,
    pub endpoint_results: Vec<EndpointResult>,
}

/// Fold probe results into the final report.
///
/// Stamps each result's letter grade in place, then derives every
/// distribution and score from the stamped batch.
pub fn aggregate(base_url: &str, mut results: Vec<EndpointResult>, elapsed: Duration) -> AggregateReport {
    for result in &mut results {
        result.performance_grade = grading::grade_endpoint(result);
    }

    let successful_tests = results.iter().filter(|r| r.success).count();
    let failed_tests = results.len() - successful_tests;

    let mut status_code_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut content_type_analysis: BTreeMap<String, usize> = BTreeMap::new();
    let mut method_performance: BTreeMap<HttpMethod, MethodPerformance> = BTreeMap::new();
    let mut response_times = Vec::new();

    for result in &results {
        let status_key = result
            .status_code
            .map_or_else(|| "Error".to_string(), |code| code.to_string());
        *status_code_distribution.entry(status_key).or_insert(0) += 1;

        let media_type = result.content_type.split(';').next().unwrap_or("").trim();
        let content_key = if media_type.is_empty() {
            "unknown".to_string()
        } else {
            media_type.to_string()
        };
        *content_type_analysis.entry(content_key).or_insert(0) += 1;

        let entry = method_performance.entry(result.method).or_default();
        entry.total += 1;
        if result.success {
            entry.successes += 1;
        }
        if result.response_time_ms > 0.0 {
            entry.times.push(result.response_time_ms);
            response_times.push(result.response_time_ms);
        }
    }

    for entry in method_performance.values_mut() {
        entry.success_rate = stats::round1(entry.successes as f64 / entry.total as f64 * 100.0);
        if !entry.times.is_empty() {
            entry.avg_response_time =
                stats::round2(entry.times.iter().sum::<f64>() / entry.times.len() as f64);
        }
    }

    let mut performance_metrics = stats::compute(&response_times);
    performance_metrics.fastest_endpoint = extreme_endpoint(&results, Extreme::Fastest);
    performance_metrics.slowest_endpoint = extreme_endpoint(&results, Extreme::Slowest);

    let grades: Vec<Grade> = results.iter().map(|r| r.performance_grade).collect();
    let overall_grade = grading::overall_grade(&grades, successful_tests, results.len());
    let success_rate = if results.is_empty() {
        0.0
    } else {
        stats::round1(successful_tests as f64 / results.len() as f64 * 100.0)
    };

    AggregateReport {
        base_url: base_url.to_string(),
        timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        total_duration_seconds: stats::round2(elapsed.as_secs_f64()),
        total_endpoints_tested: results.len(),
        successful_tests,
        failed_tests,
        success_rate,
        overall_grade,
        reliability_score: grading::reliability_score(&results, &performance_metrics),
        health_score: grading::health_score(&results, &performance_metrics),
        security_analysis: security::analyze(&results),
        data_transfer: data_transfer_stats(&results),
        performance_metrics,
        status_code_distribution,
        content_type_analysis,
        method_performance,
        endpoint_results: results,
    }
}

enum Extreme {
    Fastest,
    Slowest,
}

fn extreme_endpoint(results: &[EndpointResult], extreme: Extreme) -> Option<EndpointTiming> {
    let completed = results.iter().filter(|r| r.response_time_ms > 0.0);
    let pick = |a: &&EndpointResult, b: &&EndpointResult| {
        a.response_time_ms
            .partial_cmp(&b.response_time_ms)
            .unwrap_or(std::cmp::Ordering::Equal)
    };
    let result = match extreme {
        Extreme::Fastest => completed.min_by(pick),
        Extreme::Slowest => completed.max_by(pick),
    };
    result.map(|r| EndpointTiming {
        endpoint: r.endpoint.clone(),
        time_ms: r.response_time_ms,
    })
}

fn data_transfer_stats(results: &[EndpointResult]) -> DataTransferStats {
    if results.is_empty() {
        return DataTransferStats::default();
    }
    let total_bytes: u64 = results.iter().map(|r| r.response_size).sum();
    DataTransferStats {
        total_bytes,
        average_bytes: stats::round2(total_bytes as f64 / results.len() as f64),
        largest_response: results.iter().map(|r| r.response_size).max().unwrap_or(0),
        smallest_response: results.iter().map(|r| r.response_size).min().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EndpointDefinition;

    struct Sample {
        path: &'static str,
        method: HttpMethod,
        success: bool,
        status: Option<u16>,
        time_ms: f64,
        content_type: &'static str,
        size: u64,
    }

    fn build(sample: Sample) -> EndpointResult {
        let definition = EndpointDefinition {
            path: sample.path.to_string(),
            method: sample.method,
            description: "No description".to_string(),
            expected_schema: None,
            data: None,
        };
        let url = format!("http://api.test{}", sample.path);
        let mut result = EndpointResult::unprobed(&definition, url);
        result.success = sample.success;
        result.status_code = sample.status;
        result.response_time_ms = sample.time_ms;
        result.content_type = sample.content_type.to_string();
        result.response_size = sample.size;
        result
    }

    fn mixed_batch() -> Vec<EndpointResult> {
        vec![
            build(Sample {
                path: "/a",
                method: HttpMethod::Get,
                success: true,
                status: Some(200),
                time_ms: 80.0,
                content_type: "application/json",
                size: 100,
            }),
            build(Sample {
                path: "/b",
                method: HttpMethod::Get,
                success: false,
                status: Some(404),
                time_ms: 110.0,
                content_type: "text/html; charset=utf-8",
                size: 50,
            }),
            build(Sample {
                path: "/c",
                method: HttpMethod::Post,
                success: true,
                status: Some(200),
                time_ms: 220.0,
                content_type: "application/json; charset=utf-8",
                size: 250,
            }),
            build(Sample {
                path: "/d",
                method: HttpMethod::Get,
                success: false,
                status: None,
                time_ms: -1.0,
                content_type: "",
                size: 0,
            }),
        ]
    }

    #[test]
    fn counts_and_success_rate() {
        let report = aggregate("http://api.test", mixed_batch(), Duration::from_millis(1234));
        assert_eq!(report.total_endpoints_tested, 4);
        assert_eq!(report.successful_tests, 2);
        assert_eq!(report.failed_tests, 2);
        assert_eq!(report.success_rate, 50.0);
        assert_eq!(report.total_duration_seconds, 1.23);
        assert_eq!(report.base_url, "http://api.test");
        assert_eq!(report.timestamp.len(), 19);
    }

    #[test]
    fn distributions_group_by_status_and_media_type() {
        let report = aggregate("http://api.test", mixed_batch(), Duration::ZERO);
        assert_eq!(report.status_code_distribution["200"], 2);
        assert_eq!(report.status_code_distribution["404"], 1);
        assert_eq!(report.status_code_distribution["Error"], 1);
        assert_eq!(report.content_type_analysis["application/json"], 2);
        assert_eq!(report.content_type_analysis["text/html"], 1);
        assert_eq!(report.content_type_analysis["unknown"], 1);
    }

    #[test]
    fn method_breakdown_excludes_sentinel_times() {
        let report = aggregate("http://api.test", mixed_batch(), Duration::ZERO);
        let get = &report.method_performance[&HttpMethod::Get];
        assert_eq!(get.total, 3);
        assert_eq!(get.successes, 1);
        assert_eq!(get.success_rate, 33.3);
        // Mean of 80 and 110; the -1 sentinel does not participate.
        assert_eq!(get.avg_response_time, 95.0);

        let post = &report.method_performance[&HttpMethod::Post];
        assert_eq!(post.total, 1);
        assert_eq!(post.success_rate, 100.0);
        assert_eq!(post.avg_response_time, 220.0);
    }

    #[test]
    fn grades_are_stamped_onto_the_results() {
        let report = aggregate("http://api.test", mixed_batch(), Duration::ZERO);
        let by_path = |path: &str| {
            report
                .endpoint_results
                .iter()
                .find(|r| r.endpoint == path)
                .unwrap()
                .performance_grade
        };
        assert_eq!(by_path("/a"), Grade::A);
        assert_eq!(by_path("/b"), Grade::F);
        assert_eq!(by_path("/c"), Grade::BPlus);
        assert_eq!(by_path("/d"), Grade::F);
        // (5 + 1 + 4 + 1) / 4 = 2.75, halved by the 50% success rate.
        assert_eq!(report.overall_grade, Grade::F);
    }

    #[test]
    fn metrics_cover_extremes_and_transfer_totals() {
        let report = aggregate("http://api.test", mixed_batch(), Duration::ZERO);
        let fastest = report.performance_metrics.fastest_endpoint.as_ref().unwrap();
        assert_eq!(fastest.endpoint, "/a");
        assert_eq!(fastest.time_ms, 80.0);
        let slowest = report.performance_metrics.slowest_endpoint.as_ref().unwrap();
        assert_eq!(slowest.endpoint, "/c");
        assert_eq!(slowest.time_ms, 220.0);

        assert_eq!(report.data_transfer.total_bytes, 400);
        assert_eq!(report.data_transfer.average_bytes, 100.0);
        assert_eq!(report.data_transfer.largest_response, 250);
        assert_eq!(report.data_transfer.smallest_response, 0);

        assert!(!report.security_analysis.https_enabled);
        assert!((0.0..=100.0).contains(&report.reliability_score));
        assert!((0.0..=100.0).contains(&report.health_score));
    }

    #[test]
    fn empty_batches_produce_a_complete_zeroed_report() {
        let report = aggregate("http://api.test", Vec::new(), Duration::ZERO);
        assert_eq!(report.total_endpoints_tested, 0);
        assert_eq!(report.successful_tests, 0);
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.overall_grade, Grade::F);
        assert!(report.status_code_distribution.is_empty());
        assert!(report.content_type_analysis.is_empty());
        assert!(report.method_performance.is_empty());
        assert_eq!(report.performance_metrics, PerformanceMetrics::empty());
        assert_eq!(report.data_transfer, DataTransferStats::default());
        assert_eq!(report.reliability_score, 0.0);
        assert_eq!(report.health_score, 0.0);
        assert!(report.endpoint_results.is_empty());
    }

    #[test]
    fn reports_serialize_with_stable_keys() {
        let report = aggregate("http://api.test", mixed_batch(), Duration::ZERO);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["overall_grade"], serde_json::json!("F"));
        assert_eq!(value["status_code_distribution"]["Error"], serde_json::json!(1));
        assert_eq!(value["method_performance"]["GET"]["total"], serde_json::json!(3));
        assert!(value["method_performance"]["GET"].get("times").is_none());
        assert_eq!(
            value["performance_metrics"]["distribution"]["<100ms"],
            serde_json::json!(1)
        );
        assert_eq!(value["endpoint_results"][0]["schema_valid"], serde_json::json!("N/A"));
    }
}
