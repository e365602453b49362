//! Latency statistics over completed probes.
//!
//! Everything here is a pure function over the valid response times of a
//! batch. Requests that never completed carry the `-1.0` sentinel and must
//! be filtered out before these run, otherwise they would drag every
//! distribution toward nonsense.

use serde::{Deserialize, Serialize};

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Qualitative consistency rating derived from the coefficient of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consistency {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl Consistency {
    pub fn from_cv(cv: f64) -> Self {
        if cv < 10.0 {
            Consistency::Excellent
        } else if cv < 25.0 {
            Consistency::Good
        } else if cv < 50.0 {
            Consistency::Fair
        } else if cv < 100.0 {
            Consistency::Poor
        } else {
            Consistency::Critical
        }
    }
}

/// Response-time histogram over fixed latency bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    #[serde(rename = "<100ms")]
    pub under_100ms: usize,
    #[serde(rename = "100-200ms")]
    pub from_100_to_200ms: usize,
    #[serde(rename = "200-500ms")]
    pub from_200_to_500ms: usize,
    #[serde(rename = "500-1000ms")]
    pub from_500_to_1000ms: usize,
    #[serde(rename = "1000-2000ms")]
    pub from_1000_to_2000ms: usize,
    #[serde(rename = "2000-5000ms")]
    pub from_2000_to_5000ms: usize,
    #[serde(rename = ">=5000ms")]
    pub over_5000ms: usize,
}

impl LatencyDistribution {
    fn record(&mut self, time_ms: f64) {
        if time_ms < 100.0 {
            self.under_100ms += 1;
        } else if time_ms < 200.0 {
            self.from_100_to_200ms += 1;
        } else if time_ms < 500.0 {
            self.from_200_to_500ms += 1;
        } else if time_ms < 1000.0 {
            self.from_500_to_1000ms += 1;
        } else if time_ms < 2000.0 {
            self.from_1000_to_2000ms += 1;
        } else if time_ms < 5000.0 {
            self.from_2000_to_5000ms += 1;
        } else {
            self.over_5000ms += 1;
        }
    }

    /// Total number of recorded samples.
    pub fn total(&self) -> usize {
        self.under_100ms
            + self.from_100_to_200ms
            + self.from_200_to_500ms
            + self.from_500_to_1000ms
            + self.from_1000_to_2000ms
            + self.from_2000_to_5000ms
            + self.over_5000ms
    }
}

/// Count and share of samples outside the 1.5 * IQR fences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub count: usize,
    pub percentage: f64,
}

/// The endpoint observed at one extreme of the latency range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointTiming {
    pub endpoint: String,
    pub time_ms: f64,
}

/// Aggregate latency statistics for one test run.
///
/// All times are in milliseconds, rounded to two decimals. The fastest and
/// slowest endpoints are filled in by the aggregator, which knows which
/// result each sample came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub average_response_time: f64,
    pub median_response_time: f64,
    pub std_deviation: f64,
    pub coefficient_of_variation: f64,
    pub consistency: Consistency,
    pub p50_response_time: f64,
    pub p75_response_time: f64,
    pub p90_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub outliers: OutlierSummary,
    pub distribution: LatencyDistribution,
    /// Requests per second had the batch run serially.
    pub throughput_estimate: f64,
    pub fastest_endpoint: Option<EndpointTiming>,
    pub slowest_endpoint: Option<EndpointTiming>,
}

impl PerformanceMetrics {
    /// The all-zero metrics block used when a run produced no valid samples.
    pub fn empty() -> Self {
        Self {
            average_response_time: 0.0,
            median_response_time: 0.0,
            std_deviation: 0.0,
            coefficient_of_variation: 0.0,
            consistency: Consistency::from_cv(0.0),
            p50_response_time: 0.0,
            p75_response_time: 0.0,
            p90_response_time: 0.0,
            p95_response_time: 0.0,
            p99_response_time: 0.0,
            min_response_time: 0.0,
            max_response_time: 0.0,
            outliers: OutlierSummary::default(),
            distribution: LatencyDistribution::default(),
            throughput_estimate: 0.0,
            fastest_endpoint: None,
            slowest_endpoint: None,
        }
    }
}

/// Linear-interpolation percentile with the `(n + 1) * p / 100` rank.
///
/// The rank is clamped to `[1, n]`, so extreme percentiles degrade to the
/// min or max instead of extrapolating. The input must be sorted ascending.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = ((n as f64 + 1.0) * p / 100.0).clamp(1.0, n as f64);
    let lower = rank.floor() as usize - 1;
    let upper = rank.ceil() as usize - 1;
    let fraction = rank - rank.floor();
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Compute aggregate statistics over the valid response times of a batch.
pub fn compute(times: &[f64]) -> PerformanceMetrics {
    if times.is_empty() {
        return PerformanceMetrics::empty();
    }
    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / count;
    let variance = sorted.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / count;
    let std_deviation = variance.sqrt();
    let coefficient_of_variation = if mean > 0.0 {
        std_deviation / mean * 100.0
    } else {
        0.0
    };

    let median = percentile(&sorted, 50.0);
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let outlier_count = sorted
        .iter()
        .filter(|t| **t < lower_fence || **t > upper_fence)
        .count();

    let mut distribution = LatencyDistribution::default();
    for time in &sorted {
        distribution.record(*time);
    }

    let total_ms: f64 = sorted.iter().sum();
    let throughput = count / (total_ms / 1000.0).max(0.1);

    PerformanceMetrics {
        average_response_time: round2(mean),
        median_response_time: round2(median),
        std_deviation: round2(std_deviation),
        coefficient_of_variation: round2(coefficient_of_variation),
        consistency: Consistency::from_cv(coefficient_of_variation),
        p50_response_time: round2(median),
        p75_response_time: round2(q3),
        p90_response_time: round2(percentile(&sorted, 90.0)),
        p95_response_time: round2(percentile(&sorted, 95.0)),
        p99_response_time: round2(percentile(&sorted, 99.0)),
        min_response_time: round2(sorted[0]),
        max_response_time: round2(sorted[sorted.len() - 1]),
        outliers: OutlierSummary {
            count: outlier_count,
            percentage: round1(outlier_count as f64 / count * 100.0),
        },
        distribution,
        throughput_estimate: round2(throughput),
        fastest_endpoint: None,
        slowest_endpoint: None,
    }
}
