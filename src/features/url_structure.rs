use super::{Check, CheckName, CheckResult, ScoreCard};
use crate::context::ScanContext;
use crate::domain_utils::DomainUtils;
use crate::lexicon::LexicalTables;
use regex::Regex;

pub const MAX_SUBDOMAINS: usize = 3;
pub const EXCESSIVE_SUBDOMAIN_PENALTY: i32 = 25;
pub const URL_PATTERN_PENALTY: i32 = 30;
pub const IP_HOST_PENALTY: i32 = 40;

const IPV4_URL_PREFIX: &str = r"(?i)^https?://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";

pub struct UrlStructureCheck {
    ip_regex: Regex,
}

impl Default for UrlStructureCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlStructureCheck {
    pub fn new() -> Self {
        Self {
            ip_regex: Regex::new(IPV4_URL_PREFIX).expect("IPv4 prefix pattern is valid"),
        }
    }

    fn uses_ip_address(&self, context: &ScanContext) -> bool {
        // Also catches integer and hex forms the URL parser normalises to IPv4
        self.ip_regex.is_match(&context.url) || context.host_is_ipv4()
    }
}

impl Check for UrlStructureCheck {
    fn name(&self) -> CheckName {
        CheckName::UrlStructure
    }

    fn run(&self, context: &ScanContext, tables: &LexicalTables) -> Option<CheckResult> {
        let mut card = ScoreCard::new(self.name());

        if DomainUtils::subdomain_count(&context.host) > MAX_SUBDOMAINS {
            card.penalize(EXCESSIVE_SUBDOMAIN_PENALTY, "Excessive subdomains");
        }

        if tables
            .url_patterns
            .iter()
            .any(|pattern| pattern.is_match(&context.url))
        {
            card.penalize(URL_PATTERN_PENALTY, "Suspicious URL pattern");
        }

        if self.uses_ip_address(context) {
            card.penalize(IP_HOST_PENALTY, "IP address used instead of domain");
        }

        Some(card.finish())
    }
}
