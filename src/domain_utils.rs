/// Minimal host and domain-list utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Check if domain matches any in list (with hierarchy support)
    pub fn matches_domain_list(domain: &str, domain_list: &[String]) -> bool {
        Self::find_in_domain_list(domain, domain_list).is_some()
    }

    /// Return the first list entry the domain equals or is a subdomain of
    pub fn find_in_domain_list<'a>(domain: &str, domain_list: &'a [String]) -> Option<&'a str> {
        let domain_lower = domain.to_lowercase();

        for pattern in domain_list {
            let pattern_lower = pattern.to_lowercase();

            // Exact match
            if domain_lower == pattern_lower {
                return Some(pattern);
            }

            // Subdomain match (domain ends with .pattern)
            if domain_lower.ends_with(&format!(".{}", pattern_lower)) {
                return Some(pattern);
            }
        }

        None
    }

    /// Canonicalize domain (remove www prefix and trailing dot)
    pub fn canonicalize_domain(domain: &str) -> String {
        let domain_lower = domain.trim_end_matches('.').to_lowercase();
        if let Some(stripped) = domain_lower.strip_prefix("www.") {
            stripped.to_string()
        } else {
            domain_lower
        }
    }

    /// Number of labels to the left of the registrable `name.tld` pair
    pub fn subdomain_count(domain: &str) -> usize {
        domain.split('.').count().saturating_sub(2)
    }
}
