#![allow(clippy::uninlined_format_args)]

use phishguard::lexicon::{LexicalTables, LexiconConfig};
use phishguard::page::{FormElement, IframeElement, InputField, PageSnapshot};
use phishguard::{evaluate_page, evaluate_url, Analysis};

fn show(label: &str, analysis: &Analysis) {
    println!("--- {} ---", label);
    println!("URL:     {}", analysis.url);
    println!(
        "Score:   {} ({})",
        analysis.overall_score, analysis.risk_level
    );
    for (name, result) in &analysis.checks {
        println!("  {:<18} {:>3}", name.as_str(), result.score);
    }
    for threat in &analysis.threats {
        println!("  ! {}", threat);
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Running PhishGuard against a handful of known cases...");
    println!();

    let tables = LexicalTables::default();

    show(
        "Well-known site",
        &evaluate_url("https://www.google.com/search?q=x", &tables),
    );
    show(
        "Typosquat on a free TLD",
        &evaluate_url("http://paypa1-secure-login.tk/verify", &tables),
    );
    show(
        "Everything at once",
        &evaluate_url(
            "http://secure-g00gle.com-login-verify.tk/account/suspended?redirect=x",
            &tables,
        ),
    );
    show(
        "Raw IP address",
        &evaluate_url("http://192.168.1.1/login", &tables),
    );
    show("Not a URL", &evaluate_url("not a url", &tables));

    let page = PageSnapshot {
        title: Some("Account verification".to_string()),
        text: Some("URGENT ACTION REQUIRED. Verify immediately or your account will be closed. You will recieve a confirmation.".to_string()),
        forms: vec![FormElement {
            action: "/collect".to_string(),
            method: "post".to_string(),
            inputs: vec![
                InputField {
                    input_type: "password".to_string(),
                    name: "password".to_string(),
                    placeholder: "Password".to_string(),
                },
                InputField {
                    input_type: "text".to_string(),
                    name: "cardnumber".to_string(),
                    placeholder: "Card number".to_string(),
                },
            ],
        }],
        iframes: vec![IframeElement {
            src: "http://tracker.invalid/frame".to_string(),
            style: "display: none".to_string(),
        }],
        ..PageSnapshot::default()
    };
    show(
        "Credential harvesting page",
        &evaluate_page("http://account-update.example/login", &page, &tables),
    );

    // Custom lexicon: treat an internal look-alike as blacklisted
    let custom = LexicalTables::from_config(&LexiconConfig {
        blacklist: vec!["intranet-login.example".to_string()],
        ..LexiconConfig::default()
    })?;
    show(
        "Custom blacklist",
        &evaluate_url("https://intranet-login.example/", &custom),
    );

    Ok(())
}
