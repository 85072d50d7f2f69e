//! Symbolic name to capability constant matching
//!
//! A symbolic name such as `enabled?` or `title_ui_element` becomes a
//! lower-cased suffix pattern (`enabled`, `titleuielement`) that is matched
//! against the tail of each capability constant, ignoring case.

/// Suffix pattern for a symbolic name.
///
/// Strips one trailing setter marker (`=`), then one trailing `?`, then every
/// underscore, and lower-cases the rest.
pub fn pattern_for(name: &str) -> String {
    let name = name.strip_suffix('=').unwrap_or(name);
    let name = name.strip_suffix('?').unwrap_or(name);
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `candidate` ends with `pattern`, ignoring case.
///
/// An empty pattern matches nothing.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    !pattern.is_empty() && candidate.to_lowercase().ends_with(pattern)
}

/// The capability in `names` that `name` denotes, if any.
///
/// When several constants match, the shortest wins: qualified variants are
/// longer than the base capability they refine. Equal lengths keep the
/// transport's order.
pub fn constant_for(name: &str, names: &[String]) -> Option<String> {
    let pattern = pattern_for(name);
    names
        .iter()
        .filter(|candidate| matches(&pattern, candidate))
        .min_by_key(|candidate| candidate.len())
        .cloned()
}
