use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;
use crate::typosquat::TyposquatDetector;

pub const SUSPICIOUS_TLD_PENALTY: i32 = 30;
pub const TYPOSQUAT_PENALTY: i32 = 50;
pub const KEYWORD_PENALTY: i32 = 20;

/// TLD reputation, look-alike spelling of a popular domain, and
/// alarm-word keywords in the hostname
pub struct DomainReputationCheck;

impl Check for DomainReputationCheck {
    fn name(&self) -> CheckName {
        CheckName::DomainReputation
    }

    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult> {
        let mut card = ScoreCard::new(self.name());
        let host = context.host.as_str();

        if tables.suspicious_tld_of(host).is_some() {
            card.penalize(SUSPICIOUS_TLD_PENALTY, "Suspicious top-level domain");
        }

        // Only the first popular domain that matches is reported
        let detector = TyposquatDetector::new(&tables.popular_domains);
        if let Some(hit) = detector.find_match(&context.domain) {
            log::debug!(
                "{} resembles {} ({:?}, distance {})",
                context.domain,
                hit.reference,
                hit.kind,
                hit.distance
            );
            card.penalize(
                TYPOSQUAT_PENALTY,
                format!("Possible typosquatting of {}", hit.reference),
            );
        }

        if !tables.is_popular(&context.domain) {
            for keyword in &tables.suspicious_keywords {
                if host.contains(keyword.as_str()) {
                    card.penalize(
                        KEYWORD_PENALTY,
                        format!("Suspicious keyword in domain: {}", keyword),
                    );
                }
            }
        }

        Some(card.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconConfig;

    fn run_with(url: &str, tables: &LexicalTables) -> CheckResult {
        let ctx = ScanContext::parse(url, None).unwrap();
        DomainReputationCheck.run(&ctx, tables).unwrap()
    }

    fn run(url: &str) -> CheckResult {
        run_with(url, &LexicalTables::default())
    }

    #[test]
    fn test_clean_popular_domain() {
        let result = run("https://www.google.com/");
        assert_eq!(result.score, 100);
        assert!(result.threats.is_empty());
    }

    #[test]
    fn test_suspicious_tld() {
        let result = run("https://example.tk/");
        assert_eq!(result.score, 70);
        assert_eq!(result.threats, vec!["Suspicious top-level domain"]);
    }

    #[test]
    fn test_trailing_dot_does_not_hide_tld() {
        let result = run("https://evil.tk./");
        assert_eq!(result.score, 70);
        assert_eq!(result.threats, vec!["Suspicious top-level domain"]);
    }

    #[test]
    fn test_mixed_substitution_typosquat() {
        let result = run("https://g00g1e.com/");
        assert_eq!(result.score, 50);
        assert_eq!(result.threats, vec!["Possible typosquatting of google.com"]);
    }

    #[test]
    fn test_typosquat_reports_first_reference() {
        let result = run("https://go0gle.com/");
        assert_eq!(result.score, 50);
        assert_eq!(result.threats, vec!["Possible typosquatting of google.com"]);
    }

    #[test]
    fn test_keywords_are_cumulative() {
        let result = run("http://paypa1-secure-login.tk/verify");
        assert_eq!(
            result.threats,
            vec![
                "Suspicious top-level domain",
                "Suspicious keyword in domain: secure",
                "Suspicious keyword in domain: login",
            ]
        );
        assert_eq!(result.score, 30);
    }

    #[test]
    fn test_everything_at_once_clamps_to_zero() {
        // .tk, typosquat of paypal.com via substitution, and three keywords
        let result = run("https://secure-paypa1.com-login-verify.tk/");
        assert_eq!(result.score, 0);
        assert_eq!(result.threats.len(), 5);
    }

    #[test]
    fn test_popular_domains_skip_keyword_penalty() {
        let config = LexiconConfig {
            popular_domains: vec!["securebank.com".to_string()],
            ..LexiconConfig::default()
        };
        let tables = LexicalTables::from_config(&config).unwrap();

        assert_eq!(run_with("https://securebank.com/", &tables).score, 100);
        // Same keywords on a non-listed host are penalised
        let result = run_with("https://securebank-online.com/", &tables);
        assert_eq!(result.score, 60);
    }
}
