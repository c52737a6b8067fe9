//! Splitting model output into individual ideas

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "- idea", "* idea", "12. idea", optionally indented
    static ref RE_LIST_ITEM: Regex = Regex::new(r"(?m)^[ \t]*(?:[-*]|\d+\.)[ \t]+(.*)$").unwrap();
}

/// Pull list items out of free text, or fall back to one idea per line.
///
/// Items are trimmed and blank ones dropped. If the list markers only ever
/// carry blank items the line fallback is used, so any text with visible
/// content yields at least one idea.
pub fn extract_ideas(raw: &str) -> Vec<String> {
    let listed = non_blank(
        RE_LIST_ITEM
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str()),
    );

    if !listed.is_empty() {
        return listed;
    }

    non_blank(raw.split('\n'))
}

fn non_blank<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
