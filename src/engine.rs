use crate::aggregator::{aggregate, Analysis, RiskThresholds};
use crate::context::ScanContext;
use crate::features::CheckBattery;
use crate::lexicon::LexicalTables;
use crate::page::PageSnapshot;

/// Check battery plus the risk bands used to classify its results.
/// Holds no per-evaluation state, so one engine can serve any number of
/// concurrent evaluations.
pub struct PhishingEngine {
    battery: CheckBattery,
    thresholds: RiskThresholds,
}

impl Default for PhishingEngine {
    fn default() -> Self {
        Self::new(RiskThresholds::default())
    }
}

impl PhishingEngine {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self {
            battery: CheckBattery::new(),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// URL and domain checks only
    pub fn evaluate_url(&self, url: &str, tables: &LexicalTables) -> Analysis {
        self.evaluate(url, None, tables)
    }

    /// Full battery, including checks over the page snapshot
    pub fn evaluate_page(&self, url: &str, page: &PageSnapshot, tables: &LexicalTables) -> Analysis {
        self.evaluate(url, Some(page), tables)
    }

    fn evaluate(&self, url: &str, page: Option<&PageSnapshot>, tables: &LexicalTables) -> Analysis {
        let context = match ScanContext::parse(url, page) {
            Ok(context) => context,
            Err(e) => {
                log::warn!("Treating '{}' as maximal risk: {}", url, e);
                return Analysis::unparseable(url, e);
            }
        };

        let results = self.battery.run(&context, tables);
        let analysis = aggregate(&context.url, &context.host, results, &self.thresholds);

        log::debug!(
            "{} scored {} ({}), {} threat(s)",
            analysis.domain,
            analysis.overall_score,
            analysis.risk_level,
            analysis.threats.len()
        );

        analysis
    }
}

/// Evaluate a URL with the default risk bands
pub fn evaluate_url(url: &str, tables: &LexicalTables) -> Analysis {
    PhishingEngine::default().evaluate_url(url, tables)
}

/// Evaluate a URL and its page snapshot with the default risk bands
pub fn evaluate_page(url: &str, page: &PageSnapshot, tables: &LexicalTables) -> Analysis {
    PhishingEngine::default().evaluate_page(url, page, tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{RiskLevel, UNPARSEABLE_URL_THREAT};
    use crate::features::CheckName;
    use crate::lexicon::LexiconConfig;
    use crate::page::{FormElement, InputField};
    use proptest::prelude::*;

    fn tables() -> LexicalTables {
        LexicalTables::default()
    }

    #[test]
    fn test_clean_url_is_safe() {
        let analysis = evaluate_url("https://www.google.com/search?q=x", &tables());

        assert_eq!(analysis.checks.len(), 5);
        assert!(analysis.checks.values().all(|c| c.score == 100));
        assert_eq!(analysis.overall_score, 100);
        assert_eq!(analysis.risk_level, RiskLevel::Safe);
        assert!(analysis.threats.is_empty());
        assert_eq!(analysis.domain, "www.google.com");
    }

    #[test]
    fn test_typosquatted_phishing_url() {
        let analysis = evaluate_url("http://paypa1-secure-login.tk/verify", &tables());

        assert!(analysis.checks[&CheckName::Ssl].score <= 50);
        assert_eq!(analysis.checks[&CheckName::DomainReputation].score, 30);
        assert_eq!(analysis.checks[&CheckName::UrlStructure].score, 70);
        // (100 + 30 + 70 + 50 + 100) / 5
        assert_eq!(analysis.overall_score, 70);
        assert_eq!(analysis.risk_level, RiskLevel::Warning);
        assert_eq!(
            RiskThresholds::legacy_background().classify(analysis.overall_score),
            RiskLevel::Safe
        );
        assert!(analysis.threats.contains(&"No SSL encryption".to_string()));
        assert!(analysis
            .threats
            .contains(&"Suspicious top-level domain".to_string()));
    }

    #[test]
    fn test_threats_follow_check_order() {
        let analysis = evaluate_url("http://paypa1-secure-login.tk/verify", &tables());
        assert_eq!(
            analysis.threats,
            vec![
                "Suspicious top-level domain",
                "Suspicious keyword in domain: secure",
                "Suspicious keyword in domain: login",
                "Suspicious URL pattern",
                "No SSL encryption",
            ]
        );
    }

    #[test]
    fn test_stacked_signals_reach_danger() {
        let analysis = evaluate_url(
            "http://secure-g00gle.com-login-verify.tk/account/suspended?redirect=x",
            &tables(),
        );
        // reputation 0, structure 70, ssl 50, patterns 75, blacklist 100
        assert_eq!(analysis.overall_score, 59);
        assert_eq!(analysis.risk_level, RiskLevel::Danger);
    }

    #[test]
    fn test_ip_address_url() {
        let analysis = evaluate_url("http://192.168.1.1/login", &tables());
        assert_eq!(analysis.checks[&CheckName::UrlStructure].score, 60);
        assert!(analysis
            .threats
            .contains(&"IP address used instead of domain".to_string()));
    }

    #[test]
    fn test_malformed_input_never_panics() {
        let analysis = evaluate_url("not a url", &tables());
        assert_eq!(analysis.overall_score, 0);
        assert_eq!(analysis.risk_level, RiskLevel::Danger);
        assert_eq!(analysis.threats, vec![UNPARSEABLE_URL_THREAT]);
        assert!(analysis.is_synthetic());
    }

    #[test]
    fn test_blacklisted_domain() {
        let analysis = evaluate_url("https://fake-bank.net/", &tables());
        assert_eq!(analysis.checks[&CheckName::Blacklist].score, 0);
        assert_eq!(analysis.threats[0], "Domain is blacklisted");
    }

    #[test]
    fn test_page_evaluation_adds_page_checks() {
        let page = PageSnapshot {
            text: Some("Verify immediately or your account will be closed".to_string()),
            forms: vec![FormElement {
                action: "/login".to_string(),
                method: "post".to_string(),
                inputs: vec![InputField {
                    input_type: "password".to_string(),
                    name: "pw".to_string(),
                    placeholder: String::new(),
                }],
            }],
            ..PageSnapshot::default()
        };
        let analysis = evaluate_page("http://example.com/", &page, &tables());

        assert_eq!(analysis.checks.len(), 8);
        assert_eq!(analysis.checks[&CheckName::PageContent].score, 70);
        assert_eq!(analysis.checks[&CheckName::PageForms].score, 60);
        // URL threats come before page threats
        assert_eq!(analysis.threats[0], "No SSL encryption");
        assert_eq!(
            analysis.threats.last().map(String::as_str),
            Some("Password form on non-HTTPS page")
        );
    }

    #[test]
    fn test_page_without_text_skips_content_check() {
        let page = PageSnapshot::default();
        let analysis = evaluate_page("https://example.com/", &page, &tables());
        assert_eq!(analysis.checks.len(), 7);
        assert!(!analysis.checks.contains_key(&CheckName::PageContent));
        assert_eq!(analysis.overall_score, 100);
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = PhishingEngine::new(RiskThresholds::legacy_background());
        let analysis = engine.evaluate_url("http://example.com/", &tables());
        // 4 x 100 + 50 => 90
        assert_eq!(analysis.overall_score, 90);
        assert_eq!(analysis.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_extra_violation_never_raises_a_check_score() {
        let base = evaluate_url("https://example.com/", &tables());
        let worse = evaluate_url("https://example.tk/", &tables());
        for (name, result) in &worse.checks {
            assert!(result.score <= base.checks[name].score, "{name}");
        }
    }

    #[test]
    fn test_blacklist_dominates_with_custom_tables() {
        let config = LexiconConfig {
            blacklist: vec!["google.com".to_string()],
            ..LexiconConfig::default()
        };
        let tables = LexicalTables::from_config(&config).unwrap();
        let analysis = evaluate_url("https://google.com/", &tables);
        assert_eq!(analysis.checks[&CheckName::Blacklist].score, 0);
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_bounds(url in "\\PC{0,60}") {
            let analysis = evaluate_url(&url, &tables());
            prop_assert!(analysis.overall_score <= 100);
            for result in analysis.checks.values() {
                prop_assert!(result.score <= 100);
            }
        }

        #[test]
        fn prop_extra_violation_never_raises_a_check_score(
            host in "[a-z]{1,10}(\\.[a-z]{1,8}){1,3}",
            path in "[a-z/]{0,16}",
        ) {
            let tables = tables();
            let base = evaluate_url(&format!("https://{}/{}", host, path), &tables);

            let mut worse = vec![
                evaluate_url(&format!("http://{}/{}", host, path), &tables),
                evaluate_url(&format!("https://{}/{}?redirect=x", host, path), &tables),
            ];

            // Same URL, but its TLD is now on the suspicious list
            let tld = host.rsplit('.').next().unwrap_or_default();
            let mut config = LexiconConfig::default();
            config.suspicious_tlds.push(format!(".{}", tld));
            let stricter = LexicalTables::from_config(&config).unwrap();
            worse.push(evaluate_url(&format!("https://{}/{}", host, path), &stricter));

            for analysis in &worse {
                prop_assert_eq!(analysis.checks.len(), base.checks.len());
                for (name, result) in &analysis.checks {
                    prop_assert!(
                        result.score <= base.checks[name].score,
                        "{} rose for {}", name, analysis.url
                    );
                }
            }
        }

        #[test]
        fn prop_blacklisted_host_always_scores_zero(
            host in "[a-z]{1,10}(\\.[a-z]{1,8}){1,3}",
            scheme in "https?",
        ) {
            let config = LexiconConfig {
                blacklist: vec![host.clone()],
                ..LexiconConfig::default()
            };
            let tables = LexicalTables::from_config(&config).unwrap();
            let analysis = evaluate_url(&format!("{}://{}/", scheme, host), &tables);

            prop_assert_eq!(analysis.checks[&CheckName::Blacklist].score, 0);
            prop_assert_eq!(analysis.threats[0].as_str(), "Domain is blacklisted");
        }

        #[test]
        fn prop_generated_urls_are_deterministic(
            scheme in "https?",
            host in "[a-z0-9-]{1,12}(\\.[a-z0-9-]{1,8}){1,5}",
            path in "[a-z/]{0,20}",
        ) {
            let url = format!("{}://{}/{}", scheme, host, path);
            let tables = tables();
            let first = evaluate_url(&url, &tables);
            let second = evaluate_url(&url, &tables);

            prop_assert_eq!(first.overall_score, second.overall_score);
            prop_assert_eq!(first.risk_level, second.risk_level);
            prop_assert_eq!(&first.checks, &second.checks);
            prop_assert_eq!(&first.threats, &second.threats);
        }
    }
}
