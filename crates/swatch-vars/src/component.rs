//! A single named style variable.
//!
//! [`Component`] is the leaf of the data model: one variable name, its raw
//! textual value, an optional documentation string, and (after
//! classification) the colour its value resolves to.
//!
//! The value is normalized exactly once, at construction: the `!default`
//! marker, anything from the first unescaped `;`, and anything from the
//! first `//` are stripped, and the result is trimmed. Normalizing an
//! already-normalized value is a no-op, so components rebuilt from a
//! serialized artifact come out identical.

use deunicode::deunicode;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::VarsError;

/// One named style variable.
///
/// # Example
///
/// ```rust
/// use swatch_vars::Component;
///
/// let comp = Component::new("body-bg", "#fff !default; // page background", "");
/// assert_eq!(comp.name(), "body-bg");
/// assert_eq!(comp.value(), "#fff");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) info: String,
    pub(crate) colour_value: String,
}

impl Component {
    /// Creates a component, normalizing the raw value.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        info: impl Into<String>,
    ) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "component name must not be empty");
        Self {
            name,
            value: normalize_value(&value.into()),
            info: info.into(),
            colour_value: String::new(),
        }
    }

    /// The variable name, without the `$` sigil.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized raw value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The documentation string; empty when the declaration carried none.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// The colour literal this variable resolved to during the last
    /// classification, or an empty string if it is not a colour (or no
    /// classification has run yet).
    pub fn colour_value(&self) -> &str {
        &self.colour_value
    }

    /// A URL-safe identifier derived from the name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Encodes the component as an artifact fragment.
    ///
    /// Empty strings produce no key at all, so `{"value": "#fff"}`,
    /// `{"info": "..."}`, `{"info": "...", "value": "#fff"}` and `{}` are
    /// all possible encodings.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if !self.info.is_empty() {
            map.insert("info".to_string(), Value::String(self.info.clone()));
        }
        if !self.value.is_empty() {
            map.insert("value".to_string(), Value::String(self.value.clone()));
        }
        Value::Object(map)
    }

    /// Decodes an artifact fragment produced by [`Component::to_value`].
    pub fn from_value(name: &str, value: &Value) -> Result<Self, VarsError> {
        let map = value.as_object().ok_or_else(|| {
            VarsError::Shape(format!("component '{}' is not an object", name))
        })?;
        let info = string_field(map, name, "info")?;
        let raw = string_field(map, name, "value")?;
        Ok(Self::new(name, raw, info))
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn string_field(map: &Map<String, Value>, name: &str, key: &str) -> Result<String, VarsError> {
    match map.get(key) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(VarsError::Shape(format!(
            "component '{}' field '{}' is not a string: {}",
            name, key, other
        ))),
    }
}

/// Strips declaration syntax from a raw value.
///
/// Removes every `!default` marker (plus one preceding whitespace
/// separator), truncates at the first unescaped `;`, truncates at the first
/// `//`, and trims. Idempotent.
pub(crate) fn normalize_value(raw: &str) -> String {
    let mut value = raw.trim().to_string();

    while let Some(i) = value.find("!default") {
        let start = value[..i]
            .char_indices()
            .next_back()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(j, _)| j)
            .unwrap_or(i);
        value.replace_range(start..i + "!default".len(), "");
    }

    if let Some(i) = find_unescaped_semicolon(&value) {
        value.truncate(i);
    }

    if let Some(i) = value.find("//") {
        value.truncate(i);
    }

    value.trim().to_string()
}

fn find_unescaped_semicolon(value: &str) -> Option<usize> {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b';' && (i == 0 || bytes[i - 1] != b'\\') {
            return Some(i);
        }
    }
    None
}

/// Derives a lowercase ASCII slug from a name.
pub(crate) fn slugify(name: &str) -> String {
    let transliterated = deunicode(name);
    let mut slug: String = transliterated
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    // =========================================================================
    // Normalization tests
    // =========================================================================

    #[test]
    fn test_strips_default_marker() {
        let comp = Component::new("gray-base", "#000 !default", "");
        assert_eq!(comp.value(), "#000");
    }

    #[test]
    fn test_strips_trailing_semicolon() {
        let comp = Component::new("gray-base", "#000;", "");
        assert_eq!(comp.value(), "#000");
    }

    #[test]
    fn test_strips_trailing_comment() {
        let comp = Component::new("text-color", "$gray-base;   // ignore this", "");
        assert_eq!(comp.value(), "$gray-base");
    }

    #[test]
    fn test_strips_all_three() {
        let comp = Component::new("body-bg", "   #fff !default;  // page background ", "");
        assert_eq!(comp.value(), "#fff");
    }

    #[test]
    fn test_keeps_expression_values() {
        let comp = Component::new("gray-darker", "lighten($gray-base, 13.5%)", "");
        assert_eq!(comp.value(), "lighten($gray-base, 13.5%)");
    }

    #[test]
    fn test_escaped_semicolon_is_kept() {
        let comp = Component::new("sep", "a\\;b;c", "");
        assert_eq!(comp.value(), "a\\;b");
    }

    #[test]
    fn test_empty_value() {
        let comp = Component::new("blank", "   ", "");
        assert_eq!(comp.value(), "");
    }

    proptest! {
        #[test]
        fn test_normalization_is_idempotent(raw in ".{0,60}") {
            let once = normalize_value(&raw);
            let twice = normalize_value(&once);
            prop_assert_eq!(once, twice);
        }
    }

    // =========================================================================
    // Encoding tests
    // =========================================================================

    #[test]
    fn test_to_value_omits_empty_keys() {
        let comp = Component::new("gray-base", "#000", "");
        assert_eq!(comp.to_value().to_string(), r##"{"value":"#000"}"##);

        let comp = Component::new("body-bg", "#fff", "Background color for `<body>`.");
        assert_eq!(
            comp.to_value().to_string(),
            r##"{"info":"Background color for `<body>`.","value":"#fff"}"##
        );

        let comp = Component::new("blank", "", "");
        assert_eq!(comp.to_value().to_string(), "{}");
    }

    #[test]
    fn test_from_value_round_trip() {
        let comp = Component::new("body-bg", "#fff !default;", "Background color");
        let rebuilt = Component::from_value("body-bg", &comp.to_value()).unwrap();
        assert_eq!(rebuilt, comp);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = Component::from_value("x", &Value::String("#fff".into()));
        assert!(matches!(result, Err(VarsError::Shape(_))));
    }

    #[test]
    fn test_from_value_rejects_non_string_field() {
        let value: Value = serde_json::from_str(r#"{"value": 12}"#).unwrap();
        let result = Component::from_value("x", &value);
        assert!(matches!(result, Err(VarsError::Shape(_))));
    }

    // =========================================================================
    // Slug tests
    // =========================================================================

    #[test]
    fn test_slug_lowercases_and_dashes() {
        let comp = Component::new("navbar-inverse-bg", "#222", "");
        assert_eq!(comp.slug(), "navbar-inverse-bg");
        assert_eq!(slugify("Inverted navbar"), "inverted-navbar");
        assert_eq!(slugify("Héllo  Wörld"), "hello-world");
    }
}
