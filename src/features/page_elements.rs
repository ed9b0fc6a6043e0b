use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;
use crate::page::{IframeElement, ImageElement, ScriptElement};

pub const HIDDEN_IFRAME_PENALTY: i32 = 30;
pub const SCRIPT_SOURCE_PENALTY: i32 = 25;
pub const FAKE_BADGE_PENALTY: i32 = 20;

const BADGE_CLAIMS: &[&str] = &["secure", "verified"];

/// Hidden frames, script sources that execute inline code, and security
/// badges that do not come from a security vendor
pub struct PageElementsCheck;

impl PageElementsCheck {
    fn is_untrusted_hidden_iframe(iframe: &IframeElement, tables: &LexicalTables) -> bool {
        let src = iframe.src.trim().to_lowercase();
        iframe.is_hidden()
            && !src.is_empty()
            && !tables
                .iframe_allowlist
                .iter()
                .any(|token| src.contains(token.as_str()))
    }

    fn is_executable_script_source(script: &ScriptElement) -> bool {
        let Some(src) = script.src.as_deref() else {
            return false;
        };
        let src = src.trim().to_lowercase();

        src.starts_with("javascript:")
            || src.starts_with("data:text/javascript")
            || (src.starts_with("data:")
                && (src.contains("eval(") || src.contains("document.write(")))
    }

    fn is_fake_badge(image: &ImageElement, tables: &LexicalTables) -> bool {
        let alt = image.alt.to_lowercase();
        let src = image.src.to_lowercase();

        BADGE_CLAIMS.iter().any(|claim| alt.contains(claim))
            && !tables
                .security_brands
                .iter()
                .any(|brand| src.contains(brand.as_str()))
    }
}

impl Check for PageElementsCheck {
    fn name(&self) -> CheckName {
        CheckName::PageElements
    }

    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult> {
        let page = context.page?;
        let mut card = ScoreCard::new(self.name());

        if page
            .iframes
            .iter()
            .any(|iframe| Self::is_untrusted_hidden_iframe(iframe, tables))
        {
            card.penalize(HIDDEN_IFRAME_PENALTY, "Hidden iframe detected");
        }

        for script in &page.scripts {
            if Self::is_executable_script_source(script) {
                card.penalize(SCRIPT_SOURCE_PENALTY, "Suspicious script source");
            }
        }

        if page
            .images
            .iter()
            .any(|image| Self::is_fake_badge(image, tables))
        {
            card.penalize(FAKE_BADGE_PENALTY, "Fake security badge detected");
        }

        Some(card.finish())
    }
}
