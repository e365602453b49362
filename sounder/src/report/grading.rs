//! Letter grading and composite scoring.
//!
//! Individual endpoints get a latency-based letter adjusted for status class
//! and header hygiene. Whole runs get an overall letter plus two 0-100
//! composite scores (reliability and health) blending success rate, latency
//! behavior, error classes, and header posture with different weights.

use crate::models::{EndpointResult, Grade};

use super::stats::{round1, Consistency, PerformanceMetrics};

impl Grade {
    /// Base letter for a successful probe at the given latency.
    pub fn from_response_time(ms: f64) -> Self {
        if ms < 50.0 {
            Grade::APlus
        } else if ms < 100.0 {
            Grade::A
        } else if ms < 200.0 {
            Grade::AMinus
        } else if ms < 300.0 {
            Grade::BPlus
        } else if ms < 500.0 {
            Grade::B
        } else if ms < 700.0 {
            Grade::BMinus
        } else if ms < 1000.0 {
            Grade::CPlus
        } else if ms < 1500.0 {
            Grade::C
        } else if ms < 2000.0 {
            Grade::CMinus
        } else if ms < 3000.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Fixed numeric score for the letter, on the 100-point adjustment scale.
    pub fn score(self) -> f64 {
        match self {
            Grade::APlus => 97.0,
            Grade::A => 93.0,
            Grade::AMinus => 90.0,
            Grade::BPlus => 87.0,
            Grade::B => 83.0,
            Grade::BMinus => 80.0,
            Grade::CPlus => 77.0,
            Grade::C => 73.0,
            Grade::CMinus => 70.0,
            Grade::D => 65.0,
            Grade::F => 40.0,
        }
    }

    /// Nearest letter for an adjusted numeric score.
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            Grade::APlus
        } else if score >= 91.0 {
            Grade::A
        } else if score >= 88.0 {
            Grade::AMinus
        } else if score >= 85.0 {
            Grade::BPlus
        } else if score >= 81.0 {
            Grade::B
        } else if score >= 78.0 {
            Grade::BMinus
        } else if score >= 75.0 {
            Grade::CPlus
        } else if score >= 71.0 {
            Grade::C
        } else if score >= 68.0 {
            Grade::CMinus
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// 1-5 weight of the letter family, used for the overall grade.
    pub fn family_weight(self) -> f64 {
        match self {
            Grade::APlus | Grade::A | Grade::AMinus => 5.0,
            Grade::BPlus | Grade::B | Grade::BMinus => 4.0,
            Grade::CPlus | Grade::C | Grade::CMinus => 3.0,
            Grade::D => 2.0,
            Grade::F => 1.0,
        }
    }
}

/// Grade a single endpoint result. Failed probes always grade F.
pub fn grade_endpoint(result: &EndpointResult) -> Grade {
    if !result.success {
        return Grade::F;
    }
    let mut score = Grade::from_response_time(result.response_time_ms).score();
    if let Some(status) = result.status_code {
        score += match status {
            300..=399 => -5.0,
            400..=499 => -15.0,
            500..=599 => -25.0,
            _ => 0.0,
        };
    }
    if result.has_security_headers {
        score += 2.0;
    }
    if result.has_cache_headers {
        score += 1.0;
    }
    Grade::from_score(score)
}

/// Overall letter for a run: average family weight scaled by the success rate.
pub fn overall_grade(grades: &[Grade], successful: usize, total: usize) -> Grade {
    if total == 0 {
        return Grade::F;
    }
    let average = if grades.is_empty() {
        1.0
    } else {
        grades.iter().map(|g| g.family_weight()).sum::<f64>() / grades.len() as f64
    };
    let final_score = average * (successful as f64 / total as f64);
    if final_score >= 4.5 {
        Grade::A
    } else if final_score >= 3.5 {
        Grade::B
    } else if final_score >= 2.5 {
        Grade::C
    } else if final_score >= 1.5 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Composite 0-100 reliability score for a run.
///
/// Success rate dominates, with smaller factors for latency consistency,
/// absolute speed, observed error classes, and header hygiene.
pub fn reliability_score(results: &[EndpointResult], metrics: &PerformanceMetrics) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total = results.len() as f64;
    let success_rate = results.iter().filter(|r| r.success).count() as f64 / total;
    // Latency-derived factors contribute nothing when no probe ever completed.
    let has_samples = results.iter().any(|r| r.response_time_ms > 0.0);
    let consistency = if has_samples {
        consistency_sub_score(metrics.consistency)
    } else {
        0.0
    };
    let speed = if has_samples {
        speed_sub_score(metrics.average_response_time)
    } else {
        0.0
    };
    let security_share = header_share(results, |r| r.has_security_headers);
    let cache_share = header_share(results, |r| r.has_cache_headers);
    let header_hygiene = (security_share + cache_share) / 2.0 * 100.0;

    let score = success_rate * 100.0 * 0.40
        + consistency * 0.25
        + speed * 0.20
        + error_class_sub_score(results) * 0.10
        + header_hygiene * 0.05;
    round1(score.clamp(0.0, 100.0))
}

/// Composite 0-100 health score for a run.
///
/// Similar blend to reliability but tilted toward latency, and counting only
/// security headers for the posture factor.
pub fn health_score(results: &[EndpointResult], metrics: &PerformanceMetrics) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total = results.len() as f64;
    let success_rate = results.iter().filter(|r| r.success).count() as f64 / total;
    let has_samples = results.iter().any(|r| r.response_time_ms > 0.0);
    let consistency = if has_samples {
        consistency_sub_score(metrics.consistency)
    } else {
        0.0
    };
    let speed = if has_samples {
        speed_sub_score(metrics.average_response_time)
    } else {
        0.0
    };
    let security_share = header_share(results, |r| r.has_security_headers);

    let score = success_rate * 100.0 * 0.30
        + speed * 0.25
        + consistency * 0.20
        + error_class_sub_score(results) * 0.15
        + security_share * 100.0 * 0.10;
    round1(score.clamp(0.0, 100.0))
}

fn consistency_sub_score(consistency: Consistency) -> f64 {
    match consistency {
        Consistency::Excellent => 100.0,
        Consistency::Good => 85.0,
        Consistency::Fair => 65.0,
        Consistency::Poor => 40.0,
        Consistency::Critical => 15.0,
    }
}

fn speed_sub_score(average_ms: f64) -> f64 {
    if average_ms < 100.0 {
        100.0
    } else if average_ms < 300.0 {
        85.0
    } else if average_ms < 500.0 {
        70.0
    } else if average_ms < 1000.0 {
        50.0
    } else if average_ms < 3000.0 {
        30.0
    } else {
        10.0
    }
}

/// 100 minus heavy penalties for server errors and lighter ones for client
/// errors, floored at zero.
fn error_class_sub_score(results: &[EndpointResult]) -> f64 {
    let total = results.len() as f64;
    let server_errors = results
        .iter()
        .filter(|r| matches!(r.status_code, Some(500..=599)))
        .count() as f64;
    let client_errors = results
        .iter()
        .filter(|r| matches!(r.status_code, Some(400..=499)))
        .count() as f64;
    (100.0 - 100.0 * server_errors / total - 50.0 * client_errors / total).max(0.0)
}

fn header_share(results: &[EndpointResult], has: fn(&EndpointResult) -> bool) -> f64 {
    results.iter().filter(|r| has(r)).count() as f64 / results.len() as f64
}
