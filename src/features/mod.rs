pub mod blacklist;
pub mod domain_reputation;
pub mod page_content;
pub mod page_elements;
pub mod page_forms;
pub mod phishing_patterns;
pub mod transport;
pub mod url_structure;

use crate::aggregator::{RiskLevel, RiskThresholds};
use crate::context::ScanContext;
use crate::lexicon::LexicalTables;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every check starts from a clean score and only ever subtracts
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    Blacklist,
    DomainReputation,
    UrlStructure,
    Ssl,
    PhishingPatterns,
    PageElements,
    PageContent,
    PageForms,
}

impl CheckName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::Blacklist => "blacklist",
            CheckName::DomainReputation => "domain_reputation",
            CheckName::UrlStructure => "url_structure",
            CheckName::Ssl => "ssl",
            CheckName::PhishingPatterns => "phishing_patterns",
            CheckName::PageElements => "page_elements",
            CheckName::PageContent => "page_content",
            CheckName::PageForms => "page_forms",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub score: u8,
    pub threats: Vec<String>,
}

impl CheckResult {
    pub fn clean() -> Self {
        Self {
            score: MAX_SCORE as u8,
            threats: Vec::new(),
        }
    }

    pub fn status(&self, thresholds: &RiskThresholds) -> RiskLevel {
        thresholds.classify(self.score)
    }
}

/// Running tally for one check: penalties accumulate unclamped and the
/// score is clamped to `0..=100` once, in `finish`.
#[derive(Debug)]
pub struct ScoreCard {
    check: CheckName,
    score: i32,
    threats: Vec<String>,
}

impl ScoreCard {
    pub fn new(check: CheckName) -> Self {
        Self {
            check,
            score: MAX_SCORE,
            threats: Vec::new(),
        }
    }

    pub fn penalize(&mut self, penalty: i32, threat: impl Into<String>) {
        let threat = threat.into();
        log::debug!("{}: -{} ({})", self.check, penalty, threat);
        self.score -= penalty.abs();
        self.threats.push(threat);
    }

    /// Drop straight to zero regardless of earlier penalties
    pub fn fail(&mut self, threat: impl Into<String>) {
        let threat = threat.into();
        log::debug!("{}: score forced to 0 ({})", self.check, threat);
        self.score = 0;
        self.threats.push(threat);
    }

    pub fn finish(self) -> CheckResult {
        CheckResult {
            score: self.score.clamp(0, MAX_SCORE) as u8,
            threats: self.threats,
        }
    }
}

/// One independent heuristic. Returns `None` when the inputs it needs are
/// absent, so the check is left out instead of being scored.
pub trait Check: Send + Sync {
    fn name(&self) -> CheckName;
    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult>;
}

/// Ordered set of checks; evaluation order is also the threat order
pub struct CheckBattery {
    url_checks: Vec<Box<dyn Check>>,
    page_checks: Vec<Box<dyn Check>>,
}

impl Default for CheckBattery {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckBattery {
    pub fn new() -> Self {
        Self {
            url_checks: vec![
                Box::new(blacklist::BlacklistCheck),
                Box::new(domain_reputation::DomainReputationCheck),
                Box::new(url_structure::UrlStructureCheck::new()),
                Box::new(transport::TransportCheck),
                Box::new(phishing_patterns::PhishingPatternCheck),
            ],
            page_checks: vec![
                Box::new(page_elements::PageElementsCheck),
                Box::new(page_content::PageContentCheck),
                Box::new(page_forms::PageFormsCheck),
            ],
        }
    }

    pub fn names(&self, include_page: bool) -> Vec<CheckName> {
        let mut names: Vec<CheckName> = self.url_checks.iter().map(|c| c.name()).collect();
        if include_page {
            names.extend(self.page_checks.iter().map(|c| c.name()));
        }
        names
    }

    /// Runs the URL checks, then the page checks when a snapshot is present
    pub fn run(
        &self,
        context: &ScanContext,
        tables: &LexicalTables,
    ) -> Vec<(CheckName, CheckResult)> {
        let page_checks: &[Box<dyn Check>] = if context.page.is_some() {
            &self.page_checks
        } else {
            &[]
        };

        self.url_checks
            .iter()
            .chain(page_checks.iter())
            .filter_map(|check| match check.run(context, tables) {
                Some(result) => Some((check.name(), result)),
                None => {
                    log::debug!("{}: inputs missing, check skipped", check.name());
                    None
                }
            })
            .collect()
    }
}
