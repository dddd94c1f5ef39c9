//! Popularity extraction from scraped metadata.
//!
//! The scraper stores a free-text blob such as
//! `"Senin, 12 Februari 2024 | Dilihat 123 kali"`. The access count is the
//! number immediately before the trailing `kali` token.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TRAILING_COUNT: Regex = Regex::new(r"(\d+)\s+kali$").expect("valid regex");
}

/// Parses the trailing `<digits> kali` count, or 0 when absent or unparseable.
pub fn extract_access_count(metadata: &str) -> u64 {
    TRAILING_COUNT
        .captures(metadata.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}
