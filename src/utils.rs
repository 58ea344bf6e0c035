use std::path::Path;

use crate::error::InputError;

/// Trim and lowercase a user-supplied domain.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

/// Newline-delimited domains with blank and whitespace-only lines dropped.
pub fn parse_domain_lines(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_domain_list(path: &Path) -> Result<Vec<String>, InputError> {
    let data = std::fs::read_to_string(path).map_err(|source| InputError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_domain_lines(&data))
}
