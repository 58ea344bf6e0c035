use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Returns true if `candidate` is a syntactically plausible hostname.
///
/// The overall length is checked on the raw input; a leading `*.` wildcard
/// label is stripped before the per-label checks.
pub fn is_valid_subdomain(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let host = candidate.strip_prefix("*.").unwrap_or(candidate);
    host.split('.')
        .all(|label| !label.is_empty() && label.len() <= MAX_LABEL_LEN)
}

/// Build the matcher for hostnames ending in `domain`: any number of DNS
/// labels followed by the literal domain, bounded by ASCII word edges so
/// non-ASCII neighbours do not glue onto a hostname.
fn hostname_pattern(domain: &str) -> Result<Regex, regex::Error> {
    let pattern = format!(
        r"(?-u:\b)(?:[a-z0-9](?:[a-z0-9-]{{0,61}}[a-z0-9])?\.)*{}(?-u:\b)",
        regex::escape(domain)
    );
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

/// Pull every subdomain of `domain` out of raw certificate `name_value`
/// fields. A single field may bundle several SANs separated by newlines.
///
/// Output is lowercase, wildcard-stripped, deduplicated and sorted.
pub fn extract_subdomains<S: AsRef<str>>(domain: &str, name_values: &[S]) -> Vec<String> {
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        return Vec::new();
    }

    let re = match hostname_pattern(&domain) {
        Ok(re) => re,
        Err(e) => {
            tracing::error!(domain=%domain, error=%e, "failed to build hostname pattern");
            return Vec::new();
        }
    };

    let mut found = BTreeSet::new();
    for name_value in name_values {
        for line in name_value.as_ref().split('\n') {
            for m in re.find_iter(line) {
                let lowered = m.as_str().trim().to_lowercase();
                let sub = lowered.strip_prefix("*.").unwrap_or(&lowered);

                if is_valid_subdomain(sub) && sub.contains(&domain) {
                    found.insert(sub.to_string());
                }
            }
        }
    }

    found.into_iter().collect()
}
