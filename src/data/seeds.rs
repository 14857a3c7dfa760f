//! Seed list loading

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Read seed identifiers, one per line. Blank lines and `#` comments are
/// skipped; only the first field of a line is used.
pub fn load_seeds(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let seeds = parse_seeds(&content);
    log::info!("Read {} seeds from {}", seeds.len(), path.display());
    Ok(seeds)
}

pub fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(|c: char| c == '\t' || c == ',' || c == ' ').next())
        .map(str::to_string)
        .collect()
}
