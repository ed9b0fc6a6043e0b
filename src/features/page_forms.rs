use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;
use crate::page::{FormElement, InputField};

pub const INSECURE_PASSWORD_PENALTY: i32 = 40;
pub const SCRIPTED_ACTION_PENALTY: i32 = 35;
pub const SSN_FIELD_PENALTY: i32 = 30;
pub const CARD_FIELD_PENALTY: i32 = 25;

const SSN_PLACEHOLDER_TERMS: &[&str] = &["ssn", "social security"];
const SSN_NAME_TERMS: &[&str] = &["ssn", "social"];
const CARD_PLACEHOLDER_TERMS: &[&str] = &["credit card", "card number"];
const CARD_NAME_TERMS: &[&str] = &["credit", "card"];

/// Credential and payment forms that are unsafe or unusually nosy
pub struct PageFormsCheck;

impl PageFormsCheck {
    fn has_scripted_action(form: &FormElement) -> bool {
        let action = form.action.to_lowercase();
        action.contains("data:") || action.contains("javascript:")
    }

    fn mentions(input: &InputField, placeholder_terms: &[&str], name_terms: &[&str]) -> bool {
        let placeholder = input.placeholder.to_lowercase();
        let name = input.name.to_lowercase();

        placeholder_terms.iter().any(|t| placeholder.contains(t))
            || name_terms.iter().any(|t| name.contains(t))
    }
}

impl Check for PageFormsCheck {
    fn name(&self) -> CheckName {
        CheckName::PageForms
    }

    fn run(&self, context: &ScanContext, _tables: &LexicalTables) -> Option<CheckResult> {
        let page = context.page?;
        let mut card = ScoreCard::new(self.name());

        for form in &page.forms {
            if form.has_password_field() && !context.is_https() {
                card.penalize(INSECURE_PASSWORD_PENALTY, "Password form on non-HTTPS page");
            }

            if Self::has_scripted_action(form) {
                card.penalize(SCRIPTED_ACTION_PENALTY, "Suspicious form action");
            }

            for input in &form.inputs {
                if Self::mentions(input, SSN_PLACEHOLDER_TERMS, SSN_NAME_TERMS) {
                    card.penalize(SSN_FIELD_PENALTY, "Form requesting SSN");
                }
                if Self::mentions(input, CARD_PLACEHOLDER_TERMS, CARD_NAME_TERMS) {
                    card.penalize(CARD_FIELD_PENALTY, "Form requesting credit card");
                }
            }
        }

        Some(card.finish())
    }
}
