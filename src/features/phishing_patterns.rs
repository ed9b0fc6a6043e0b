use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;

pub const SHORTENER_PENALTY: i32 = 30;
pub const REDIRECT_PARAMETER_PENALTY: i32 = 25;

/// Link-obfuscation signals: shortener hosts and open-redirect style parameters
pub struct PhishingPatternCheck;

impl PhishingPatternCheck {
    /// Substring match, so shortener names embedded in a longer host count too
    fn shortener_for<'t>(&self, host: &str, tables: &'t LexicalTables) -> Option<&'t str> {
        tables
            .shorteners
            .iter()
            .find(|shortener| host.contains(shortener.as_str()))
            .map(String::as_str)
    }

    fn redirect_parameter<'t>(
        &self,
        context: &ScanContext,
        tables: &'t LexicalTables,
    ) -> Option<&'t str> {
        let query = context.query_lower()?;
        tables
            .redirect_parameters
            .iter()
            .find(|param| query.contains(param.as_str()))
            .map(String::as_str)
    }
}

impl Check for PhishingPatternCheck {
    fn name(&self) -> CheckName {
        CheckName::PhishingPatterns
    }

    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult> {
        let mut card = ScoreCard::new(self.name());

        if let Some(shortener) = self.shortener_for(&context.host, tables) {
            log::debug!("{} is served by shortener {}", context.host, shortener);
            card.penalize(SHORTENER_PENALTY, "URL shortener detected");
        }

        if let Some(param) = self.redirect_parameter(context, tables) {
            log::debug!("redirect parameter '{}' in {}", param, context.url);
            card.penalize(REDIRECT_PARAMETER_PENALTY, "Redirect parameters detected");
        }

        Some(card.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(url: &str) -> CheckResult {
        let ctx = ScanContext::parse(url, None).unwrap();
        PhishingPatternCheck
            .run(&ctx, &LexicalTables::default())
            .unwrap()
    }

    #[test]
    fn test_shortener_host() {
        let result = run("https://bit.ly/3abcDEF");
        assert_eq!(result.score, 70);
        assert_eq!(result.threats, vec!["URL shortener detected"]);
    }

    #[test]
    fn test_shortener_embedded_in_host() {
        let result = run("https://bit.ly.evil.com/x");
        assert_eq!(result.score, 70);
        assert_eq!(result.threats, vec!["URL shortener detected"]);

        assert_eq!(run("https://t.co/xyz").score, 70);
        // Plain containment: "microsoft.com" holds "t.co"
        assert_eq!(run("https://www.microsoft.com/").score, 70);
        assert_eq!(run("https://example.com/").score, 100);
    }

    #[test]
    fn test_redirect_parameter_in_query() {
        let result = run("https://example.com/out?URL=https://evil.tk");
        assert_eq!(result.score, 75);
        assert_eq!(result.threats, vec!["Redirect parameters detected"]);
    }

    #[test]
    fn test_redirect_words_in_path_are_ignored() {
        assert_eq!(run("https://example.com/redirect=/docs").score, 100);
    }

    #[test]
    fn test_both_signals() {
        let result = run("http://tinyurl.com/x?goto=login");
        assert_eq!(result.score, 45);
        assert_eq!(result.threats.len(), 2);
    }
}
