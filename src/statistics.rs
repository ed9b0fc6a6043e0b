use crate::aggregator::{Analysis, RiskLevel};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatEvent {
    SiteScanned,
    ThreatBlocked,
    UnparseableUrl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStatistics {
    pub sites_scanned: u64,
    pub threats_blocked: u64,
    #[serde(default)]
    pub unparseable_urls: u64,
    pub start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Default for ScanStatistics {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            sites_scanned: 0,
            threats_blocked: 0,
            unparseable_urls: 0,
            start_time: now,
            last_updated: now,
        }
    }
}

impl ScanStatistics {
    pub fn record_event(&mut self, event: StatEvent) {
        self.last_updated = Utc::now();

        match event {
            StatEvent::SiteScanned => self.sites_scanned += 1,
            StatEvent::ThreatBlocked => self.threats_blocked += 1,
            StatEvent::UnparseableUrl => self.unparseable_urls += 1,
        }
    }

    /// Count one fresh evaluation. The unparseable stand-in is tracked
    /// separately and never counts as a blocked threat.
    pub fn record(&mut self, analysis: &Analysis) {
        if analysis.is_synthetic() {
            self.record_event(StatEvent::UnparseableUrl);
            return;
        }

        self.record_event(StatEvent::SiteScanned);
        if analysis.risk_level == RiskLevel::Danger {
            self.record_event(StatEvent::ThreatBlocked);
        }
    }

    /// Missing file means a fresh start
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read statistics file: {path}"))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse statistics file: {path}"))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create stats directory: {}", parent.display())
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write statistics file: {path}"))?;
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("📊 PhishGuard Statistics");
        println!("========================");
        println!("Sites scanned:    {}", self.sites_scanned);
        println!("Threats blocked:  {}", self.threats_blocked);
        println!("Unparseable URLs: {}", self.unparseable_urls);
        if self.sites_scanned > 0 {
            let pct = self.threats_blocked as f64 / self.sites_scanned as f64 * 100.0;
            println!("Block rate:       {:.1}%", pct);
        }
        println!(
            "Tracking since:   {}",
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!(
            "Last updated:     {}",
            self.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
}
