use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lexicon: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid URL pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// On-disk form of the lexical tables. Missing sections fall back to the
/// built-in lists, so a file may override only what it needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LexiconConfig {
    pub blacklist: Vec<String>,
    pub suspicious_tlds: Vec<String>,
    pub popular_domains: Vec<String>,
    pub suspicious_keywords: Vec<String>,
    pub shorteners: Vec<String>,
    pub url_patterns: Vec<String>,
    pub redirect_parameters: Vec<String>,
    pub urgent_phrases: Vec<String>,
    pub misspellings: Vec<String>,
    pub iframe_allowlist: Vec<String>,
    pub security_brands: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            blacklist: strings(&[
                "phishing-example.com",
                "fake-bank.net",
                "suspicious-site.org",
            ]),
            suspicious_tlds: strings(&[
                ".tk", ".ml", ".ga", ".cf", ".pw", ".top", ".click", ".download",
            ]),
            popular_domains: strings(&[
                "google.com",
                "facebook.com",
                "amazon.com",
                "paypal.com",
                "microsoft.com",
                "apple.com",
                "netflix.com",
                "instagram.com",
                "youtube.com",
                "wikipedia.org",
                "twitter.com",
                "linkedin.com",
                "github.com",
                "stackoverflow.com",
                "ebay.com",
            ]),
            suspicious_keywords: strings(&[
                "secure", "verify", "update", "confirm", "login", "account", "bank",
            ]),
            shorteners: strings(&[
                "bit.ly",
                "tinyurl.com",
                "t.co",
                "goo.gl",
                "ow.ly",
                "short.link",
            ]),
            url_patterns: strings(&[
                r"login.*verify",
                r"account.*suspend",
                r"security.*alert",
                r"urgent.*action",
                r"click.*here.*now",
                r"limited.*time",
            ]),
            redirect_parameters: strings(&["redirect=", "url=", "goto="]),
            urgent_phrases: strings(&[
                "urgent action required",
                "account will be closed",
                "verify immediately",
                "suspended account",
                "click here now",
                "limited time offer",
                "act now",
            ]),
            misspellings: strings(&[
                "recieve",
                "seperate",
                "occured",
                "neccessary",
                "definately",
            ]),
            iframe_allowlist: strings(&[
                "google",
                "facebook",
                "instagram",
                "twitter",
                "youtube",
                "analytics",
            ]),
            security_brands: strings(&["verisign", "norton", "mcafee", "ssl"]),
        }
    }
}

impl LexiconConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, LexiconError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String, LexiconError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Read-only reference tables consulted by every check.
///
/// Entries are lower-cased and URL patterns compiled once here; nothing
/// mutates a built table, so it can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct LexicalTables {
    pub blacklist: Vec<String>,
    pub suspicious_tlds: Vec<String>,
    pub popular_domains: Vec<String>,
    pub suspicious_keywords: Vec<String>,
    pub shorteners: Vec<String>,
    pub url_patterns: Vec<Regex>,
    pub redirect_parameters: Vec<String>,
    pub urgent_phrases: Vec<String>,
    pub misspellings: Vec<String>,
    pub iframe_allowlist: Vec<String>,
    pub security_brands: Vec<String>,
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl LexicalTables {
    pub fn from_config(config: &LexiconConfig) -> Result<Self, LexiconError> {
        let url_patterns = config
            .url_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| LexiconError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let suspicious_tlds = lowered(&config.suspicious_tlds)
            .into_iter()
            .map(|tld| {
                if tld.starts_with('.') {
                    tld
                } else {
                    format!(".{}", tld)
                }
            })
            .collect();

        Ok(Self {
            blacklist: lowered(&config.blacklist),
            suspicious_tlds,
            popular_domains: lowered(&config.popular_domains),
            suspicious_keywords: lowered(&config.suspicious_keywords),
            shorteners: lowered(&config.shorteners),
            url_patterns,
            redirect_parameters: lowered(&config.redirect_parameters),
            urgent_phrases: lowered(&config.urgent_phrases),
            misspellings: lowered(&config.misspellings),
            iframe_allowlist: lowered(&config.iframe_allowlist),
            security_brands: lowered(&config.security_brands),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        Self::from_config(&LexiconConfig::from_file(path)?)
    }

    pub fn is_blacklisted(&self, domain: &str) -> bool {
        self.blacklist.iter().any(|entry| entry == domain)
    }

    pub fn is_popular(&self, domain: &str) -> bool {
        self.popular_domains.iter().any(|entry| entry == domain)
    }

    pub fn suspicious_tld_of(&self, domain: &str) -> Option<&str> {
        self.suspicious_tlds
            .iter()
            .find(|tld| domain.ends_with(tld.as_str()))
            .map(String::as_str)
    }
}

impl Default for LexicalTables {
    fn default() -> Self {
        // The built-in patterns are literal and always compile
        Self::from_config(&LexiconConfig::default())
            .unwrap_or_else(|e| panic!("built-in lexicon is invalid: {e}"))
    }
}

/// Process-wide handle to the current tables.
///
/// Readers take an `Arc` snapshot and keep it for the whole evaluation;
/// `replace` swaps in a complete new table set, so a reader never observes
/// a half-updated one.
#[derive(Debug, Clone)]
pub struct SharedLexicon {
    current: Arc<RwLock<Arc<LexicalTables>>>,
}

impl SharedLexicon {
    pub fn new(tables: LexicalTables) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(tables))),
        }
    }

    pub fn snapshot(&self) -> Arc<LexicalTables> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, tables: LexicalTables) {
        let fresh = Arc::new(tables);
        match self.current.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
        log::info!("Lexical tables replaced");
    }
}

impl Default for SharedLexicon {
    fn default() -> Self {
        Self::new(LexicalTables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_compile() {
        let tables = LexicalTables::default();
        assert_eq!(tables.url_patterns.len(), 6);
        assert!(tables.is_blacklisted("fake-bank.net"));
        assert!(tables.is_popular("paypal.com"));
        assert_eq!(tables.suspicious_tld_of("evil.tk"), Some(".tk"));
        assert_eq!(tables.suspicious_tld_of("example.com"), None);
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let tables = LexicalTables::default();
        assert!(tables.url_patterns[0].is_match("https://x.com/LOGIN/please/Verify"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = LexiconConfig::from_yaml("blacklist:\n  - Evil.Example\n").unwrap();
        let tables = LexicalTables::from_config(&config).unwrap();

        assert!(tables.is_blacklisted("evil.example"));
        assert!(!tables.is_blacklisted("fake-bank.net"));
        assert_eq!(tables.popular_domains.len(), 15);
    }

    #[test]
    fn test_tld_entries_get_leading_dot() {
        let config = LexiconConfig {
            suspicious_tlds: vec!["xyz".to_string(), ".Zip".to_string()],
            ..LexiconConfig::default()
        };
        let tables = LexicalTables::from_config(&config).unwrap();
        assert_eq!(tables.suspicious_tlds, vec![".xyz", ".zip"]);
        // "xyz" must not match a domain that merely ends in those letters
        assert_eq!(tables.suspicious_tld_of("examplexyz"), None);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = LexiconConfig {
            url_patterns: vec!["login(".to_string()],
            ..LexiconConfig::default()
        };
        let err = LexicalTables::from_config(&config).unwrap_err();
        assert!(matches!(err, LexiconError::Pattern { .. }));
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let config = LexiconConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(LexiconConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_shared_lexicon_replace_is_whole_table() {
        let shared = SharedLexicon::default();
        let before = shared.snapshot();

        let config = LexiconConfig {
            blacklist: vec!["new-threat.com".to_string()],
            ..LexiconConfig::default()
        };
        shared.replace(LexicalTables::from_config(&config).unwrap());

        // The old snapshot is untouched, the new one is complete
        assert!(before.is_blacklisted("fake-bank.net"));
        assert!(!before.is_blacklisted("new-threat.com"));
        let after = shared.snapshot();
        assert!(after.is_blacklisted("new-threat.com"));
        assert!(!after.is_blacklisted("fake-bank.net"));
    }
}
