//! Identifier normalisation shared by the mappers.

use std::sync::LazyLock;

use inflector::Inflector;
use regex::Regex;

static UPPER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z]+)").unwrap());
static CAPITALISED_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z][a-z]+)").unwrap());

/// Field names treated as a human-readable label for a row.
const DISPLAY_NAMES: &[&str] = &["name", "title", "label", "full_name", "display_name"];

/// Irregular plurals common in table names that inflector gets wrong.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("analysis", "analyses"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("index", "indices"),
    ("matrix", "matrices"),
];

/// Convert an identifier or label to snake_case.
///
/// Case transitions, hyphens, underscores and whitespace are word
/// boundaries. Runs of capitals stay together (`HTTPServer` becomes
/// `http_server`).
///
/// ```ignore
/// assert_eq!(snake_case("Order Analysis"), "order_analysis");
/// assert_eq!(snake_case("orderSummary"), "order_summary");
/// ```
pub fn snake_case(s: &str) -> String {
    let spaced = s.replace(['-', '_'], " ");
    let spaced = UPPER_RUN.replace_all(&spaced, " $1");
    let spaced = CAPITALISED_WORD.replace_all(&spaced, " $1");
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Singularize a word, handling irregulars first then falling back to inflector.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }

    word.to_singular()
}

/// Whether a dimension reads as the display name of rows in `view_name`.
///
/// Matches `name`, `title`, `label`, `full_name`, `display_name`, any
/// `*_name` / `*_title`, and the singular of the view name (`customer` in
/// `customers`).
pub fn is_display_name(field: &str, view_name: &str) -> bool {
    DISPLAY_NAMES.contains(&field)
        || field.ends_with("_name")
        || field.ends_with("_title")
        || field == singularize(view_name)
}
