pub mod aggregator;
pub mod cache;
pub mod config;
pub mod context;
pub mod domain_utils;
pub mod engine;
pub mod features;
pub mod lexicon;
pub mod monitor;
pub mod page;
pub mod statistics;
pub mod typosquat;

pub use aggregator::{Analysis, RiskLevel, RiskThresholds};
pub use config::{Config, ScanPolicy};
pub use context::{ScanContext, UrlError};
pub use engine::{evaluate_page, evaluate_url, PhishingEngine};
pub use features::{CheckName, CheckResult};
pub use lexicon::{LexicalTables, LexiconConfig, LexiconError, SharedLexicon};
pub use monitor::{ScanOutcome, ScanService, ThreatNotifier};
pub use page::PageSnapshot;
pub use statistics::{ScanStatistics, StatEvent};
