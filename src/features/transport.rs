use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;

pub const NO_TLS_PENALTY: i32 = 50;

/// Scheme-only transport check; no certificate inspection is attempted
pub struct TransportCheck;

impl Check for TransportCheck {
    fn name(&self) -> CheckName {
        CheckName::Ssl
    }

    fn run(&self, context: &ScanContext, _tables: &LexicalTables) -> Option<CheckResult> {
        let mut card = ScoreCard::new(self.name());

        if !context.is_https() {
            card.penalize(NO_TLS_PENALTY, "No SSL encryption");
        }

        Some(card.finish())
    }
}
