use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;

pub const URGENT_PHRASE_PENALTY: i32 = 15;
pub const MISSPELLING_PENALTY: i32 = 10;

/// Pressure language and careless spelling in the visible page text
pub struct PageContentCheck;

impl Check for PageContentCheck {
    fn name(&self) -> CheckName {
        CheckName::PageContent
    }

    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult> {
        let text = context.page?.text.as_deref()?.to_lowercase();
        let mut card = ScoreCard::new(self.name());

        for phrase in &tables.urgent_phrases {
            if text.contains(phrase.as_str()) {
                card.penalize(
                    URGENT_PHRASE_PENALTY,
                    format!("Urgent language detected: \"{}\"", phrase),
                );
            }
        }

        for misspelling in &tables.misspellings {
            if text.contains(misspelling.as_str()) {
                card.penalize(MISSPELLING_PENALTY, "Spelling errors detected");
            }
        }

        Some(card.finish())
    }
}
