//! Priority queue construction
//!
//! Users can name event pages that must be scraped first. The list is
//! accepted either as a JSON array of strings or as loose text with one
//! reference per line (quotes and commas stripped, so a pasted array or
//! CSV column works too).

use std::collections::HashSet;
use std::path::Path;

/// Parses a priority list, auto-detecting its format
pub fn parse_priority_list(raw: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }

    raw.lines()
        .map(|line| line.replace(['\'', '"', ','], ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Loads the priority list from `path`
///
/// A missing or unreadable file is not an error: the run proceeds in
/// discovery order.
pub fn load_priority_list(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            let list = parse_priority_list(&raw);
            tracing::info!("Loaded {} priority references from {}", list.len(), path.display());
            list
        }
        Err(e) => {
            tracing::warn!(
                "Could not read priority list {}: {}, using discovery order",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Merges the priority list with the discovered references
///
/// The priority list comes first, exactly as given (user duplicates
/// included). Discovered references follow in discovery order, minus any
/// already named by the priority list.
pub fn build_queue(priority: &[String], discovered: &[String]) -> Vec<String> {
    let prioritized: HashSet<&str> = priority.iter().map(String::as_str).collect();

    priority
        .iter()
        .cloned()
        .chain(
            discovered
                .iter()
                .filter(|link| !prioritized.contains(link.as_str()))
                .cloned(),
        )
        .collect()
}
