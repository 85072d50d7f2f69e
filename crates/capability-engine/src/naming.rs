//! Plural/singular naming convention and kind-to-role matching

use crate::constants::CONSTANT_PREFIX;

const IRREGULAR: &[(&str, &str)] = &[("children", "child"), ("people", "person")];

/// Words ending in `s` that are already singular.
const INVARIANT: &[&str] = &["status", "focus", "axis", "series", "news", "radius"];

/// Singular form of a (snake_case) kind name.
pub fn singularize(name: &str) -> String {
    let name = name.strip_suffix('?').unwrap_or(name);
    let lower = name.to_ascii_lowercase();

    for (plural, singular) in IRREGULAR {
        if lower.ends_with(plural) {
            return format!("{}{}", &name[..name.len() - plural.len()], singular);
        }
    }

    let last_word = lower.rsplit('_').next().unwrap_or(lower.as_str());
    if lower.ends_with("ss") || INVARIANT.contains(&last_word) {
        return name.to_string();
    }
    if lower.ends_with("ies") && name.len() > 3 {
        return format!("{}y", &name[..name.len() - 3]);
    }
    if ["sses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return name[..name.len() - 2].to_string();
    }
    if lower.ends_with('s') && name.len() > 1 {
        return name[..name.len() - 1].to_string();
    }
    name.to_string()
}

/// Whether `name` is a plural kind name (multi-result search).
pub fn is_plural(name: &str) -> bool {
    let name = name.strip_suffix('?').unwrap_or(name);
    singularize(name) != name
}

/// Canonical form of a kind or role: prefix and underscores dropped, lower-cased.
pub fn normalize_kind(kind: &str) -> String {
    let kind = kind.strip_prefix(CONSTANT_PREFIX).unwrap_or(kind);
    kind.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether an element with this role/subrole is of the (normalized) kind.
pub fn kind_matches(normalized_kind: &str, role: Option<&str>, subrole: Option<&str>) -> bool {
    [role, subrole]
        .into_iter()
        .flatten()
        .any(|r| normalize_kind(r) == normalized_kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("buttons"), "button");
        assert_eq!(singularize("check_boxes"), "check_box");
        assert_eq!(singularize("static_texts"), "static_text");
        assert_eq!(singularize("entries"), "entry");
        assert_eq!(singularize("classes"), "class");
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("window"), "window");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("menus"), "menu");
        assert_eq!(singularize("menu_bar_items"), "menu_bar_item");
        assert_eq!(singularize("x_axis"), "x_axis");
        assert_eq!(singularize("series"), "series");
        assert_eq!(singularize("radio_buttons?"), "radio_button");
    }

    #[test]
    fn test_is_plural() {
        assert!(is_plural("windows"));
        assert!(is_plural("menu_items"));
        assert!(!is_plural("window"));
        assert!(!is_plural("text_field"));
        assert!(!is_plural("progress"));
        assert!(is_plural("menus"));
        assert!(!is_plural("status"));
    }

    #[test]
    fn test_kind_matching() {
        let kind = normalize_kind("text_field");
        assert!(kind_matches(&kind, Some("AXTextField"), None));
        assert!(kind_matches(&normalize_kind("Button"), Some("AXButton"), None));
        assert!(kind_matches(
            &normalize_kind("close_button"),
            Some("AXButton"),
            Some("AXCloseButton")
        ));
        assert!(!kind_matches(&normalize_kind("button"), Some("AXCheckBox"), None));
        assert!(!kind_matches(&normalize_kind("button"), None, None));
    }
}
