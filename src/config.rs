use crate::aggregator::RiskThresholds;
use crate::domain_utils::DomainUtils;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("risk thresholds must satisfy warning_min <= safe_min <= 100 (got safe_min={safe_min}, warning_min={warning_min})")]
    Thresholds { safe_min: u8, warning_min: u8 },
    #[error("cache freshness ({freshness}s) must not exceed max age ({max_age}s)")]
    CacheWindow { freshness: u64, max_age: u64 },
    #[error("refresh interval must be greater than zero")]
    RefreshInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: RiskThresholds,
    pub cache: CacheConfig,
    /// How often the lexicon file is re-read (default 6 hours)
    pub refresh_interval_seconds: u64,
    /// How often stale cache entries are swept (default hourly)
    pub cleanup_interval_seconds: u64,
    pub lexicon_path: Option<String>,
    pub statistics_path: Option<String>,
    /// JSON list of blocked hosts, kept across runs
    pub blocked_sites_path: Option<String>,
    pub scan_policy: ScanPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// A cached analysis is reused for this long
    pub freshness_seconds: u64,
    /// Entries older than this are dropped by the sweep
    pub max_age_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            freshness_seconds: 5 * 60,
            max_age_seconds: 24 * 60 * 60,
        }
    }
}

/// Which URLs and pages the service layer evaluates, and whether
/// dangerous results lead to blocking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPolicy {
    pub protection_enabled: bool,
    pub skip_schemes: Vec<String>,
    /// Page-level scans are skipped for these hosts and their subdomains
    pub trusted_domains: Vec<String>,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            protection_enabled: true,
            skip_schemes: vec![
                "chrome://".to_string(),
                "chrome-extension://".to_string(),
                "moz-extension://".to_string(),
                "about:".to_string(),
            ],
            trusted_domains: [
                "google.com",
                "youtube.com",
                "facebook.com",
                "instagram.com",
                "twitter.com",
                "linkedin.com",
                "github.com",
                "stackoverflow.com",
                "wikipedia.org",
                "amazon.com",
                "netflix.com",
                "spotify.com",
                "apple.com",
                "microsoft.com",
                "mozilla.org",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        }
    }
}

impl ScanPolicy {
    /// Browser-internal pages are never scanned, whatever `protection_enabled` says
    pub fn should_scan_url(&self, url: &str) -> bool {
        let url = url.trim().to_lowercase();
        !self
            .skip_schemes
            .iter()
            .any(|prefix| url.starts_with(&prefix.to_lowercase()))
    }

    pub fn is_trusted_host(&self, host: &str) -> bool {
        DomainUtils::matches_domain_list(host, &self.trusted_domains)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            thresholds: RiskThresholds::default(),
            cache: CacheConfig::default(),
            refresh_interval_seconds: 6 * 60 * 60,
            cleanup_interval_seconds: 60 * 60,
            lexicon_path: None,
            statistics_path: None,
            blocked_sites_path: None,
            scan_policy: ScanPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.thresholds.is_valid() {
            return Err(ConfigError::Thresholds {
                safe_min: self.thresholds.safe_min,
                warning_min: self.thresholds.warning_min,
            });
        }
        if self.cache.freshness_seconds > self.cache.max_age_seconds {
            return Err(ConfigError::CacheWindow {
                freshness: self.cache.freshness_seconds,
                max_age: self.cache.max_age_seconds,
            });
        }
        if self.refresh_interval_seconds == 0 || self.cleanup_interval_seconds == 0 {
            return Err(ConfigError::RefreshInterval);
        }
        Ok(())
    }
}
