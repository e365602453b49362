//! Security posture analysis over a batch of results.

use serde::{Deserialize, Serialize};

use crate::models::EndpointResult;

/// Findings and composite score for the security section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAnalysis {
    pub https_enabled: bool,
    /// 100 minus fixed penalties per finding, floored at zero.
    pub security_score: u32,
    pub security_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Inspect a batch of results for transport and error-surface weaknesses.
pub fn analyze(results: &[EndpointResult]) -> SecurityAnalysis {
    let https_enabled = results.iter().any(|r| r.url.starts_with("https://"));
    let status_codes: Vec<u16> = results.iter().filter_map(|r| r.status_code).collect();

    let mut issues = Vec::new();
    let mut score: i32 = 100;

    if !https_enabled {
        issues.push("Critical: API not served over HTTPS".to_string());
        score -= 50;
    }
    if status_codes.iter().any(|code| matches!(code, 500 | 502 | 503)) {
        issues.push("Warning: Server errors detected - may expose internal information".to_string());
        score -= 10;
    }
    if results.len() > 5 && !status_codes.contains(&404) {
        issues.push("Info: No 404 responses - endpoint enumeration might be possible".to_string());
        score -= 5;
    }

    let recommendations = recommendations_for(&issues);
    SecurityAnalysis {
        https_enabled,
        security_score: score.max(0) as u32,
        security_issues: issues,
        recommendations,
    }
}

fn recommendations_for(issues: &[String]) -> Vec<String> {
    issues
        .iter()
        .filter_map(|issue| {
            if issue.contains("HTTPS") {
                Some("Enable HTTPS/TLS encryption for all API endpoints".to_string())
            } else if issue.contains("Server errors") {
                Some("Implement proper error handling to avoid information disclosure".to_string())
            } else if issue.contains("404") {
                Some("Implement consistent error responses for non-existent endpoints".to_string())
            } else {
                None
            }
        })
        .collect()
}
