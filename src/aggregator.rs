use crate::features::{CheckName, CheckResult, MAX_SCORE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Threat text carried by the synthetic result for a URL that cannot be parsed
pub const UNPARSEABLE_URL_THREAT: &str = "unparseable URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Warning => "warning",
            RiskLevel::Danger => "danger",
        };
        f.write_str(label)
    }
}

/// Score bands: `>= safe_min` is safe, `>= warning_min` is a warning,
/// anything lower is dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub safe_min: u8,
    pub warning_min: u8,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            safe_min: 80,
            warning_min: 60,
        }
    }
}

impl RiskThresholds {
    /// Looser bands (`danger < 40`, `warning < 70`) kept for hosts that
    /// still expect them
    pub fn legacy_background() -> Self {
        Self {
            safe_min: 70,
            warning_min: 40,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.warning_min <= self.safe_min && self.safe_min as i32 <= MAX_SCORE
    }

    pub fn classify(&self, score: u8) -> RiskLevel {
        if score >= self.safe_min {
            RiskLevel::Safe
        } else if score >= self.warning_min {
            RiskLevel::Warning
        } else {
            RiskLevel::Danger
        }
    }
}

/// Outcome of one evaluation. Built once and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub url: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<CheckName, CheckResult>,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    pub threats: Vec<String>,
    /// Set when the URL could not be evaluated at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_error: Option<String>,
}

impl Analysis {
    /// Maximal-risk stand-in for a URL that could not be parsed
    pub fn unparseable(url: &str, reason: impl fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            domain: String::new(),
            timestamp: Utc::now(),
            checks: BTreeMap::new(),
            overall_score: 0,
            risk_level: RiskLevel::Danger,
            threats: vec![UNPARSEABLE_URL_THREAT.to_string()],
            input_error: Some(reason.to_string()),
        }
    }

    /// True for the unparseable stand-in; hosts should show "unknown", not "safe"
    pub fn is_synthetic(&self) -> bool {
        self.input_error.is_some()
    }
}

/// Unweighted mean, rounded half up
pub fn mean_score<'a>(scores: impl IntoIterator<Item = &'a CheckResult>) -> u8 {
    let (sum, count) = scores
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), r| (sum + r.score as u32, count + 1));

    if count == 0 {
        return MAX_SCORE as u8;
    }

    ((2 * sum + count) / (2 * count)).min(MAX_SCORE as u32) as u8
}

/// Reduce the results of one battery run, given in evaluation order
pub fn aggregate(
    url: &str,
    domain: &str,
    results: Vec<(CheckName, CheckResult)>,
    thresholds: &RiskThresholds,
) -> Analysis {
    let overall_score = mean_score(results.iter().map(|(_, result)| result));
    let risk_level = thresholds.classify(overall_score);

    let threats: Vec<String> = results
        .iter()
        .flat_map(|(_, result)| result.threats.iter().cloned())
        .collect();

    Analysis {
        url: url.to_string(),
        domain: domain.to_string(),
        timestamp: Utc::now(),
        checks: results.into_iter().collect(),
        overall_score,
        risk_level,
        threats,
        input_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u8, threats: &[&str]) -> CheckResult {
        CheckResult {
            score,
            threats: threats.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_bands() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(100), RiskLevel::Safe);
        assert_eq!(t.classify(80), RiskLevel::Safe);
        assert_eq!(t.classify(79), RiskLevel::Warning);
        assert_eq!(t.classify(60), RiskLevel::Warning);
        assert_eq!(t.classify(59), RiskLevel::Danger);
        assert_eq!(t.classify(0), RiskLevel::Danger);
    }

    #[test]
    fn test_legacy_bands() {
        let t = RiskThresholds::legacy_background();
        assert_eq!(t.classify(70), RiskLevel::Safe);
        assert_eq!(t.classify(69), RiskLevel::Warning);
        assert_eq!(t.classify(40), RiskLevel::Warning);
        assert_eq!(t.classify(39), RiskLevel::Danger);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(RiskThresholds::default().is_valid());
        assert!(!RiskThresholds {
            safe_min: 50,
            warning_min: 60
        }
        .is_valid());
        assert!(!RiskThresholds {
            safe_min: 120,
            warning_min: 60
        }
        .is_valid());
    }

    #[test]
    fn test_mean_rounds_half_up() {
        assert_eq!(mean_score(&[result(100, &[]), result(51, &[])]), 76);
        assert_eq!(mean_score(&[result(100, &[]), result(50, &[])]), 75);
        assert_eq!(
            mean_score(&[result(100, &[]), result(100, &[]), result(50, &[])]),
            83
        );
        assert_eq!(mean_score(&[]), 100);
    }

    #[test]
    fn test_aggregate_concatenates_in_order() {
        let analysis = aggregate(
            "http://x.tk/",
            "x.tk",
            vec![
                (CheckName::DomainReputation, result(70, &["b"])),
                (CheckName::Blacklist, result(100, &[])),
                (CheckName::Ssl, result(50, &["a", "a"])),
            ],
            &RiskThresholds::default(),
        );

        // Evaluation order, not key order
        assert_eq!(analysis.threats, vec!["b", "a", "a"]);
        assert_eq!(analysis.overall_score, 73);
        assert_eq!(analysis.risk_level, RiskLevel::Warning);
        assert_eq!(analysis.checks.len(), 3);
        assert!(!analysis.is_synthetic());
    }

    #[test]
    fn test_unparseable_is_maximal_risk() {
        let analysis = Analysis::unparseable("not a url", "relative URL without a base");
        assert_eq!(analysis.overall_score, 0);
        assert_eq!(analysis.risk_level, RiskLevel::Danger);
        assert_eq!(analysis.threats, vec![UNPARSEABLE_URL_THREAT]);
        assert!(analysis.checks.is_empty());
        assert!(analysis.is_synthetic());
    }

    #[test]
    fn test_analysis_json_shape() {
        let analysis = aggregate(
            "https://example.com/",
            "example.com",
            vec![(CheckName::Ssl, result(100, &[]))],
            &RiskThresholds::default(),
        );
        let json = serde_json::to_value(&analysis).unwrap();

        assert_eq!(json["risk_level"], "safe");
        assert_eq!(json["checks"]["ssl"]["score"], 100);
        assert!(json.get("input_error").is_none());

        let back: Analysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, analysis);
    }
}
