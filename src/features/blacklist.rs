use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;

pub struct BlacklistCheck;

impl Check for BlacklistCheck {
    fn name(&self) -> CheckName {
        CheckName::Blacklist
    }

    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult> {
        let mut card = ScoreCard::new(self.name());

        if tables.is_blacklisted(&context.host) || tables.is_blacklisted(&context.domain) {
            card.fail("Domain is blacklisted");
        }

        Some(card.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(url: &str) -> CheckResult {
        let ctx = ScanContext::parse(url, None).unwrap();
        BlacklistCheck.run(&ctx, &LexicalTables::default()).unwrap()
    }

    #[test]
    fn test_blacklisted_domain_scores_zero() {
        let result = run("https://fake-bank.net/");
        assert_eq!(result.score, 0);
        assert_eq!(result.threats, vec!["Domain is blacklisted"]);

        assert_eq!(run("http://www.phishing-example.com/login").score, 0);
    }

    #[test]
    fn test_membership_is_exact() {
        assert_eq!(run("https://login.fake-bank.net/").score, 100);
        assert_eq!(run("https://fake-bank.network/").score, 100);
        assert!(run("https://example.com/").threats.is_empty());
    }
}
