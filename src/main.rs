use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::aggregator::{Analysis, RiskLevel};
use phishguard::config::Config;
use phishguard::engine::PhishingEngine;
use phishguard::lexicon::{LexicalTables, LexiconConfig, SharedLexicon};
use phishguard::monitor::{load_blocked_sites, spawn_refresh, ScanOutcome, ScanService};
use phishguard::page::PageSnapshot;
use phishguard::statistics::ScanStatistics;
use std::process;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic phishing risk scoring for URLs and page snapshots")
        .long_about("PhishGuard scores a URL, and optionally a snapshot of the page it loaded,\n\
                    against a battery of independent heuristics:\n\
                    • blacklist, domain reputation and typosquatting\n\
                    • URL structure, transport and redirect patterns\n\
                    • hidden iframes, scripts, fake badges, urgent language and unsafe forms")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("URL to evaluate")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("page")
                .short('p')
                .long("page")
                .value_name("FILE")
                .help("Page snapshot (JSON) to evaluate together with --url")
                .requires("url")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishguard.yaml"),
        )
        .arg(
            Arg::new("lexicon")
                .short('l')
                .long("lexicon")
                .value_name("FILE")
                .help("Lexicon file (overrides lexicon_path from the configuration)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-lexicon")
                .long("generate-lexicon")
                .value_name("FILE")
                .help("Generate a lexicon file with the built-in tables")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate configuration and lexicon, then exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the analysis as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("monitor")
                .short('m')
                .long("monitor")
                .help("Read URLs from stdin, one per line, and scan each")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show persisted scan statistics")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-check penalties")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    if let Some(generate_path) = matches.get_one::<String>("generate-lexicon") {
        generate_default_lexicon(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/phishguard.yaml");

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if let Some(lexicon_path) = matches.get_one::<String>("lexicon") {
        config.lexicon_path = Some(lexicon_path.clone());
    }

    let tables = match load_tables(&config) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("❌ Error loading lexicon: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        test_config(&config, &tables);
        return;
    }

    if matches.get_flag("stats") {
        show_statistics(&config);
        return;
    }

    let json = matches.get_flag("json");

    if matches.get_flag("monitor") {
        if let Err(e) = run_monitor(config, tables, json).await {
            eprintln!("❌ Monitor failed: {e:#}");
            process::exit(1);
        }
        return;
    }

    let Some(url) = matches.get_one::<String>("url") else {
        eprintln!("Nothing to do: pass --url, --monitor, --stats or --test-config (see --help)");
        process::exit(2);
    };

    let engine = PhishingEngine::new(config.thresholds);
    let analysis = match matches.get_one::<String>("page") {
        Some(page_file) => match load_page(page_file) {
            Ok(page) => engine.evaluate_page(url, &page, &tables),
            Err(e) => {
                eprintln!("❌ Error reading page snapshot: {e:#}");
                process::exit(1);
            }
        },
        None => engine.evaluate_url(url, &tables),
    };

    if json {
        print_json(&analysis);
    } else {
        print_report(&analysis);
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::debug!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn load_tables(config: &Config) -> anyhow::Result<LexicalTables> {
    match &config.lexicon_path {
        Some(path) => {
            let tables = LexicalTables::from_file(path)?;
            log::info!("Loaded lexicon from {path}");
            Ok(tables)
        }
        None => Ok(LexicalTables::default()),
    }
}

fn load_page(path: &str) -> anyhow::Result<PageSnapshot> {
    use anyhow::Context;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page snapshot: {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse page snapshot: {path}"))
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn generate_default_lexicon(path: &str) {
    let written = LexiconConfig::default()
        .to_yaml()
        .map_err(anyhow::Error::from)
        .and_then(|yaml| std::fs::write(path, yaml).map_err(anyhow::Error::from));

    match written {
        Ok(()) => println!("Default lexicon written to: {path}"),
        Err(e) => {
            eprintln!("Error writing lexicon file: {e:#}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config, tables: &LexicalTables) {
    println!("🔍 Testing configuration...");
    println!();

    if let Err(e) = config.validate() {
        println!("❌ Configuration validation failed:");
        println!("Error: {e}");
        process::exit(1);
    }

    println!(
        "Risk bands: safe >= {}, warning >= {}",
        config.thresholds.safe_min, config.thresholds.warning_min
    );
    println!(
        "Cache: {} (fresh for {}s, kept for {}s)",
        if config.cache.enabled { "enabled" } else { "disabled" },
        config.cache.freshness_seconds,
        config.cache.max_age_seconds
    );
    println!(
        "Lexicon: {}",
        config.lexicon_path.as_deref().unwrap_or("built-in")
    );
    println!("  Blacklisted domains: {}", tables.blacklist.len());
    println!("  Popular domains:     {}", tables.popular_domains.len());
    println!("  Suspicious TLDs:     {}", tables.suspicious_tlds.len());
    println!("  URL patterns:        {}", tables.url_patterns.len());
    println!("All regex patterns compiled successfully.");
    println!("✅ Configuration is valid");
}

fn show_statistics(config: &Config) {
    let Some(path) = config.statistics_path.as_deref() else {
        println!("Statistics are not persisted (no statistics_path configured)");
        return;
    };

    match ScanStatistics::load(path) {
        Ok(stats) => stats.print_summary(),
        Err(e) => {
            eprintln!("❌ Error reading statistics: {e:#}");
            process::exit(1);
        }
    }
}

async fn run_monitor(config: Config, tables: LexicalTables, json: bool) -> anyhow::Result<()> {
    let lexicon = SharedLexicon::new(tables);

    let refresh = config.lexicon_path.clone().map(|path| {
        log::info!(
            "Reloading lexicon from {} every {}s",
            path,
            config.refresh_interval_seconds
        );
        spawn_refresh(
            lexicon.clone(),
            path,
            Duration::from_secs(config.refresh_interval_seconds),
        )
    });

    let statistics = match config.statistics_path.as_deref() {
        Some(path) => ScanStatistics::load(path)?,
        None => ScanStatistics::default(),
    };

    let blocked_sites = match config.blocked_sites_path.as_deref() {
        Some(path) => load_blocked_sites(path)?,
        None => Default::default(),
    };

    let mut cleanup = tokio::time::interval(Duration::from_secs(config.cleanup_interval_seconds));
    let mut service = ScanService::new(config, lexicon)
        .with_statistics(statistics)
        .with_blocked_sites(blocked_sites);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    log::info!("Monitoring URLs from stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let url = line.trim();
                if url.is_empty() || url.starts_with('#') {
                    continue;
                }
                print_outcome(url, &service.scan_url(url), json);
            }
            _ = cleanup.tick() => {
                service.sweep_cache(chrono::Utc::now());
                if let Err(e) = service.save_state() {
                    log::warn!("Failed to save state: {e:#}");
                }
            }
        }
    }

    if let Some(handle) = refresh {
        handle.abort();
    }

    service.save_state()?;
    let stats = service.statistics();
    log::info!(
        "Monitor finished: {} scanned, {} threats blocked",
        stats.sites_scanned,
        stats.threats_blocked
    );
    Ok(())
}

fn print_outcome(url: &str, outcome: &ScanOutcome, json: bool) {
    match outcome {
        ScanOutcome::Skipped(reason) => println!("⏭️  {url}: skipped ({reason:?})"),
        ScanOutcome::Blocked { domain } => println!("⛔ {url}: {domain} is on the blocked list"),
        ScanOutcome::Cached(analysis) | ScanOutcome::Fresh(analysis) => {
            if json {
                match serde_json::to_string(analysis) {
                    Ok(line) => println!("{line}"),
                    Err(e) => log::error!("Failed to serialise analysis: {e}"),
                }
            } else {
                println!(
                    "{} {} [{}] {}",
                    risk_icon(analysis),
                    analysis.overall_score,
                    risk_label(analysis),
                    url
                );
            }
        }
    }
}

fn print_json(analysis: &Analysis) {
    match serde_json::to_string_pretty(analysis) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serialising analysis: {e}");
            process::exit(1);
        }
    }
}

fn risk_icon(analysis: &Analysis) -> &'static str {
    if analysis.is_synthetic() {
        return "❓";
    }
    match analysis.risk_level {
        RiskLevel::Safe => "✅",
        RiskLevel::Warning => "⚠️ ",
        RiskLevel::Danger => "❌",
    }
}

// The unparseable stand-in is reported as unknown rather than dangerous
fn risk_label(analysis: &Analysis) -> String {
    if analysis.is_synthetic() {
        "unknown".to_string()
    } else {
        analysis.risk_level.to_string()
    }
}

fn print_report(analysis: &Analysis) {
    println!("🔍 PhishGuard analysis: {}", analysis.url);
    println!();

    if let Some(error) = &analysis.input_error {
        println!("❓ Could not evaluate URL: {error}");
        return;
    }

    println!("Domain: {}", analysis.domain);
    println!(
        "Overall: {} {} ({}/100)",
        risk_icon(analysis),
        risk_label(analysis).to_uppercase(),
        analysis.overall_score
    );
    println!();

    println!("Checks:");
    for (name, result) in &analysis.checks {
        println!("  {:<18} {:>3}", name.as_str(), result.score);
    }

    if !analysis.threats.is_empty() {
        println!();
        println!("Threats:");
        for threat in &analysis.threats {
            println!("  • {threat}");
        }
    }
}
