use crate::aggregator::{Analysis, RiskLevel};
use crate::cache::AnalysisCache;
use crate::config::Config;
use crate::context::{ScanContext, UrlError};
use crate::engine::PhishingEngine;
use crate::lexicon::{LexicalTables, SharedLexicon};
use crate::page::PageSnapshot;
use crate::statistics::ScanStatistics;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Told about every dangerous result; hosts decide how to surface it
pub trait ThreatNotifier: Send + Sync {
    fn on_danger(&self, analysis: &Analysis);
}

/// Default notifier: one warning line per dangerous site
pub struct LogNotifier;

impl ThreatNotifier for LogNotifier {
    fn on_danger(&self, analysis: &Analysis) {
        log::warn!(
            "Dangerous site {} (score {}): {}",
            analysis.domain,
            analysis.overall_score,
            analysis.threats.join(", ")
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Skipped(SkipReason),
    /// Host is already on the blocked list and protection is on; nothing was evaluated
    Blocked { domain: String },
    Cached(Analysis),
    Fresh(Analysis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InternalPage,
    TrustedDomain,
}

impl ScanOutcome {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            ScanOutcome::Cached(analysis) | ScanOutcome::Fresh(analysis) => Some(analysis),
            _ => None,
        }
    }
}

/// Stateful front end over the engine: policy, cache, counters and the
/// blocked-site list live here, never in the checks.
///
/// Turning protection off does not stop scanning or counting; it only
/// stops dangerous sites from being blocked and reported.
pub struct ScanService {
    config: Config,
    engine: PhishingEngine,
    lexicon: SharedLexicon,
    cache: AnalysisCache,
    statistics: ScanStatistics,
    blocked_sites: BTreeSet<String>,
    notifier: Box<dyn ThreatNotifier>,
}

impl ScanService {
    pub fn new(config: Config, lexicon: SharedLexicon) -> Self {
        Self::with_notifier(config, lexicon, Box::new(LogNotifier))
    }

    pub fn with_notifier(
        config: Config,
        lexicon: SharedLexicon,
        notifier: Box<dyn ThreatNotifier>,
    ) -> Self {
        let cache = AnalysisCache::new(config.cache.freshness_seconds, config.cache.max_age_seconds);
        Self {
            engine: PhishingEngine::new(config.thresholds),
            config,
            lexicon,
            cache,
            statistics: ScanStatistics::default(),
            blocked_sites: BTreeSet::new(),
            notifier,
        }
    }

    pub fn with_statistics(mut self, statistics: ScanStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_blocked_sites(mut self, sites: impl IntoIterator<Item = String>) -> Self {
        self.blocked_sites
            .extend(sites.into_iter().map(|site| site.to_lowercase()));
        self
    }

    pub fn lexicon(&self) -> &SharedLexicon {
        &self.lexicon
    }

    pub fn statistics(&self) -> &ScanStatistics {
        &self.statistics
    }

    pub fn blocked_sites(&self) -> impl Iterator<Item = &str> {
        self.blocked_sites.iter().map(String::as_str)
    }

    pub fn is_blocked(&self, host: &str) -> bool {
        self.blocked_sites.contains(&host.to_lowercase())
    }

    pub fn protection_enabled(&self) -> bool {
        self.config.scan_policy.protection_enabled
    }

    pub fn set_protection(&mut self, enabled: bool) {
        log::info!(
            "Protection {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.config.scan_policy.protection_enabled = enabled;
    }

    pub fn scan_url(&mut self, url: &str) -> ScanOutcome {
        self.scan_url_at(url, Utc::now())
    }

    /// URL-only scan with an explicit clock for cache expiry
    pub fn scan_url_at(&mut self, url: &str, now: DateTime<Utc>) -> ScanOutcome {
        if let Some(reason) = self.skip_reason(url) {
            return ScanOutcome::Skipped(reason);
        }

        // Unparseable input goes straight to the engine for its stand-in result
        let host = ScanContext::parse(url, None).ok().map(|ctx| ctx.host);

        if let Some(host) = &host {
            if self.protection_enabled() && self.blocked_sites.contains(host) {
                log::info!("Blocked navigation to {}", host);
                return ScanOutcome::Blocked {
                    domain: host.clone(),
                };
            }

            if self.config.cache.enabled {
                if let Some(cached) = self.cache.get(host, now) {
                    log::debug!("Cache hit for {}", host);
                    return ScanOutcome::Cached(cached.clone());
                }
            }
        }

        let tables = self.lexicon.snapshot();
        let analysis = self.engine.evaluate_url(url, &tables);
        self.record(&analysis);

        if let Some(host) = host {
            if self.config.cache.enabled && !analysis.is_synthetic() {
                self.cache.insert(&host, analysis.clone(), now);
            }
        }

        ScanOutcome::Fresh(analysis)
    }

    /// Full scan of a loaded page; page results are never cached
    pub fn scan_page(&mut self, url: &str, page: &PageSnapshot) -> ScanOutcome {
        if let Some(reason) = self.skip_reason(url) {
            return ScanOutcome::Skipped(reason);
        }

        if let Ok(ctx) = ScanContext::parse(url, None) {
            if self.config.scan_policy.is_trusted_host(&ctx.host) {
                log::debug!("Skipping page scan for trusted host {}", ctx.host);
                return ScanOutcome::Skipped(SkipReason::TrustedDomain);
            }
        }

        let tables = self.lexicon.snapshot();
        let analysis = self.engine.evaluate_page(url, page, &tables);
        self.record(&analysis);
        ScanOutcome::Fresh(analysis)
    }

    /// User report: the site's host goes on the blocked list
    pub fn report_site(&mut self, url: &str) -> Result<String, UrlError> {
        let host = ScanContext::parse(url, None)?.host;
        log::info!("Site reported as phishing: {}", host);
        self.blocked_sites.insert(host.clone());
        Ok(host)
    }

    pub fn unblock_site(&mut self, host: &str) -> bool {
        self.blocked_sites.remove(&host.to_lowercase())
    }

    /// Re-read the lexicon file named in the config and swap it in whole.
    /// On error the current tables stay in place.
    pub fn reload_lexicon(&self) -> Result<()> {
        let path = self
            .config
            .lexicon_path
            .as_deref()
            .context("No lexicon_path configured")?;
        reload_from(&self.lexicon, path)
    }

    pub fn sweep_cache(&mut self, now: DateTime<Utc>) -> usize {
        self.cache.sweep(now)
    }

    pub fn save_statistics(&self) -> Result<()> {
        match &self.config.statistics_path {
            Some(path) => self.statistics.save(path),
            None => Ok(()),
        }
    }

    pub fn save_blocked_sites(&self) -> Result<()> {
        match &self.config.blocked_sites_path {
            Some(path) => write_blocked_sites(path, &self.blocked_sites),
            None => Ok(()),
        }
    }

    /// Persist counters and the blocked-site list
    pub fn save_state(&self) -> Result<()> {
        self.save_statistics()?;
        self.save_blocked_sites()
    }

    fn skip_reason(&self, url: &str) -> Option<SkipReason> {
        if !self.config.scan_policy.should_scan_url(url) {
            return Some(SkipReason::InternalPage);
        }
        None
    }

    fn record(&mut self, analysis: &Analysis) {
        self.statistics.record(analysis);

        if analysis.risk_level != RiskLevel::Danger || analysis.is_synthetic() {
            return;
        }
        if !self.protection_enabled() {
            log::debug!("Protection off, not blocking {}", analysis.domain);
            return;
        }

        self.blocked_sites.insert(analysis.domain.clone());
        self.notifier.on_danger(analysis);
    }
}

/// Blocked hosts as a JSON array; a missing file is an empty list
pub fn load_blocked_sites(path: &str) -> Result<BTreeSet<String>> {
    if !Path::new(path).exists() {
        return Ok(BTreeSet::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read blocked sites file: {path}"))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse blocked sites file: {path}"))
}

fn write_blocked_sites(path: &str, sites: &BTreeSet<String>) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let content = serde_json::to_string_pretty(sites)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write blocked sites file: {path}"))?;
    Ok(())
}

fn reload_from(lexicon: &SharedLexicon, path: &str) -> Result<()> {
    let tables = LexicalTables::from_file(path)
        .with_context(|| format!("Failed to reload lexicon from {path}"))?;
    lexicon.replace(tables);
    Ok(())
}

/// Periodically reload the lexicon file. The first tick is skipped since
/// the tables were just loaded at startup.
pub fn spawn_refresh(lexicon: SharedLexicon, path: String, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            log::debug!("Refreshing lexicon from {}", path);
            if let Err(e) = reload_from(&lexicon, &path) {
                log::warn!("{e:#}; keeping current tables");
            }
        }
    })
}
