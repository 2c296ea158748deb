use regex::RegexSet;
use std::sync::OnceLock;

const ADDRESS_PATTERNS: &[&str] = &[
    // "123 Main Street", "9 Elm Rd"
    r"(?i)\d+\s+\w+\s+(street|st|avenue|ave|road|rd|drive|dr|lane|ln|blvd|boulevard|way|court|ct|place|pl)",
    // "Springfield, IL 62704"
    r"(?i)\w+,\s*\w{2}\s*\d{5}",
    // "Springfield, Illinois", "Toronto, Canada"
    r"\w+,\s*\w+",
    // trailing ZIP / ZIP+4
    r"\d{5}(-\d{4})?$",
];

fn address_patterns() -> Option<&'static RegexSet> {
    static PATTERNS: OnceLock<Option<RegexSet>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| match RegexSet::new(ADDRESS_PATTERNS) {
            Ok(set) => Some(set),
            Err(err) => {
                log::error!("Address heuristics disabled: {err}");
                None
            }
        })
        .as_ref()
}

/// Heuristic: does `search` look like a street address or "City, Region" string?
pub fn looks_like_address(search: &str) -> bool {
    address_patterns().is_some_and(|set| set.is_match(search.trim()))
}
