//! Textual dependency queries between variables.
//!
//! A variable B *depends on* A when B's raw value mentions `$A` as a whole
//! token. Queries are one level deep: values are free text, not an
//! expression tree, so anything beyond "who mentions X" would be
//! guesswork. Callers that need transitive closure repeat the query over
//! the results.

use indexmap::IndexSet;

use crate::store::VarStore;

/// Names of all *other* components whose raw value references `name`.
///
/// Matches `$name` as a whole token: a following letter, digit, `_`, or
/// `-` disqualifies the occurrence, so `$gray-base` does not count as a
/// reference inside `$gray-base-dark`. The result preserves global
/// component order. Unknown names simply yield an empty set.
///
/// # Example
///
/// ```rust
/// use swatch_vars::parse_definitions;
///
/// let store = parse_definitions(
///     "//== Colors\n$gray-base: #000;\n$text-color: $gray-base;\n",
/// );
/// let deps = store.dependencies("gray-base");
/// assert!(deps.contains("text-color"));
/// ```
pub fn dependencies(store: &VarStore, name: &str) -> IndexSet<String> {
    let needle = format!("${}", name);
    let mut dependents = IndexSet::new();
    for comp in store.components() {
        if comp.name() != name && references(comp.value(), &needle) {
            dependents.insert(comp.name().to_string());
        }
    }
    dependents
}

/// Whether `value` contains `needle` (a `$`-prefixed variable name) as a
/// whole token.
fn references(value: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(offset) = value[start..].find(needle) {
        let end = start + offset + needle.len();
        let continues = value[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !continues {
            return true;
        }
        start += offset + 1;
    }
    false
}
