use crate::domain_utils::DomainUtils;
use crate::page::PageSnapshot;
use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("URL could not be parsed: {0}")]
    Parse(#[from] url::ParseError),
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Everything a check may look at for one evaluation
#[derive(Debug, Clone)]
pub struct ScanContext<'a> {
    /// The URL exactly as supplied (surrounding whitespace trimmed)
    pub url: String,
    pub parsed: Url,
    /// Lower-cased hostname without the trailing root dot
    pub host: String,
    /// Host with `www.` removed, used for list membership and typosquatting
    pub domain: String,
    pub page: Option<&'a PageSnapshot>,
}

impl<'a> ScanContext<'a> {
    pub fn parse(url: &str, page: Option<&'a PageSnapshot>) -> Result<Self, UrlError> {
        let url = url.trim().to_string();
        let parsed = Url::parse(&url)?;

        // `evil.tk.` names the same host as `evil.tk`
        let host = parsed
            .host_str()
            .map(|h| h.trim_end_matches('.').to_lowercase())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| UrlError::MissingHost(url.clone()))?;
        let domain = DomainUtils::canonicalize_domain(&host);

        Ok(Self {
            url,
            parsed,
            host,
            domain,
            page,
        })
    }

    pub fn scheme(&self) -> &str {
        self.parsed.scheme()
    }

    pub fn is_https(&self) -> bool {
        self.parsed.scheme() == "https"
    }

    pub fn query_lower(&self) -> Option<String> {
        self.parsed.query().map(|q| q.to_lowercase())
    }

    /// Host was written (or normalised to) a dotted IPv4 address
    pub fn host_is_ipv4(&self) -> bool {
        matches!(self.parsed.host(), Some(Host::Ipv4(_)))
    }
}
