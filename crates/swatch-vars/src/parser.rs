//! Definition-file parsing.
//!
//! The definition grammar is line-oriented:
//!
//! ```text
//! //== Colors                       section header (also `//===`)
//! //## Gray and brand colors.       section documentation
//! //** Base gray for text.          documentation for the next declaration
//! $gray-base: #000 !default;        variable declaration
//! ```
//!
//! Anything else is either a plain comment or noise; such lines are
//! dropped silently. Parsing never fails: malformed input degrades by
//! omission, which lets real-world variables files (hand-edited, partially
//! commented out) load without ceremony.
//!
//! # Example
//!
//! ```rust
//! use swatch_vars::parse_definitions;
//!
//! let store = parse_definitions(r#"
//! //== Colors
//! //## Gray and brand colors.
//! $gray-base: #000 !default;
//! $gray-darker: lighten($gray-base, 13.5%);
//! "#);
//!
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.get_value("gray-darker").unwrap(), "lighten($gray-base, 13.5%)");
//! ```

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{Result, VarsError};
use crate::store::VarStore;

/// Parses definition-file text into a store with no layers attached.
///
/// Sections appear in encounter order; components keep their per-section
/// declaration order. Lines that are not blank, not a marker, and not a
/// well-formed `$name: value` declaration inside an open section are
/// discarded without error.
pub fn parse_definitions(text: &str) -> VarStore {
    let mut store = VarStore::new();
    let mut current_section: Option<String> = None;
    let mut pending_info = String::new();
    let mut dropped = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("//===") {
            let name = rest.trim();
            store.add_section(name, "");
            current_section = Some(name.to_string());
        } else if let Some(rest) = line.strip_prefix("//==") {
            let name = rest.trim();
            store.add_section(name, "");
            current_section = Some(name.to_string());
        } else if let Some(rest) = line.strip_prefix("//##") {
            // Section documentation; tolerated (and dropped) when no
            // section is open yet.
            if let Some(section) = &current_section {
                store.set_section_info(section, rest.trim());
            }
        } else if let Some(rest) = line.strip_prefix("//**") {
            pending_info = rest.trim().to_string();
        } else {
            if !try_declaration(&mut store, &current_section, line, &pending_info) {
                trace!(line, "dropped unparsable definition line");
                dropped += 1;
            }
            // The pending doc string belongs to the immediately following
            // declaration attempt, successful or not.
            pending_info.clear();
        }
    }

    debug!(
        sections = store.sections().count(),
        components = store.len(),
        dropped,
        "parsed variable definitions"
    );
    store
}

/// Reads and parses a definition file from disk.
///
/// # Errors
///
/// [`VarsError::Io`] when the file cannot be read. Malformed *content*
/// never fails; see [`parse_definitions`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<VarStore> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| VarsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_definitions(&text))
}

/// Attempts to parse one `$name: value` declaration line. Returns false
/// when the line is dropped.
fn try_declaration(
    store: &mut VarStore,
    current_section: &Option<String>,
    line: &str,
    pending_info: &str,
) -> bool {
    let Some(section) = current_section else {
        return false;
    };
    let Some((name, value)) = line.split_once(':') else {
        return false;
    };
    let Some(name) = name.trim().strip_prefix('$') else {
        return false;
    };
    if name.is_empty() {
        return false;
    }
    store.add_section_component(section, name, value, pending_info);
    true
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const VARS_FILE: &str = r#"
// --------------------------------------------------

//== Colors
//
//## Gray and brand colors for use across the framework.

$gray-base:              #000 !default;

//== Scaffolding
//
//## Settings for some of the most global styles.

//** Background color for `<body>`.
$body-bg:               #fff !default;
//** Global text color on `<body>`.
$text-color:            $gray-base;   // ignore this

//=== Inverted navbar
// Reset inverted navbar basics
$navbar-inverse-bg:                         #222 !default;
"#;

    #[test]
    fn test_sections_in_encounter_order() {
        let store = parse_definitions(VARS_FILE);
        let names: Vec<&str> = store.sections().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Colors", "Scaffolding", "Inverted navbar"]);
    }

    #[test]
    fn test_section_docs_attach_to_open_section() {
        let store = parse_definitions(VARS_FILE);
        assert_eq!(
            store.section("Colors").unwrap().info(),
            "Gray and brand colors for use across the framework."
        );
        assert_eq!(
            store.section("Scaffolding").unwrap().info(),
            "Settings for some of the most global styles."
        );
        assert_eq!(store.section("Inverted navbar").unwrap().info(), "");
    }

    #[test]
    fn test_component_docs_and_values() {
        let store = parse_definitions(VARS_FILE);

        let body_bg = store.component("body-bg").unwrap();
        assert_eq!(body_bg.value(), "#fff");
        assert_eq!(body_bg.info(), "Background color for `<body>`.");

        let text_color = store.component("text-color").unwrap();
        assert_eq!(text_color.value(), "$gray-base");
        assert_eq!(text_color.info(), "Global text color on `<body>`.");

        // No doc comment preceded this one.
        let navbar = store.component("navbar-inverse-bg").unwrap();
        assert_eq!(navbar.value(), "#222");
        assert_eq!(navbar.info(), "");
    }

    #[test]
    fn test_global_order_matches_declaration_order() {
        let store = parse_definitions(VARS_FILE);
        let names: Vec<&str> = store.names().collect();
        assert_eq!(
            names,
            vec!["gray-base", "body-bg", "text-color", "navbar-inverse-bg"]
        );
    }

    // =========================================================================
    // Malformed input tolerance
    // =========================================================================

    #[test]
    fn test_declaration_before_any_section_is_dropped() {
        let store = parse_definitions("$orphan: #000;\n//== Colors\n$gray-base: #000;\n");
        assert!(store.component("orphan").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_line_without_colon_is_dropped() {
        let store = parse_definitions("//== Colors\n$gray-base #000\n$ok: #111;\n");
        assert!(store.component("gray-base").is_none());
        assert_eq!(store.get_value("ok").unwrap(), "#111");
    }

    #[test]
    fn test_line_without_sigil_is_dropped() {
        let store = parse_definitions("//== Colors\nfoo: #000;\n$gray-base: #000;\n");
        assert!(store.component("foo").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bare_sigil_is_dropped() {
        let store = parse_definitions("//== Colors\n$: #000;\n");
        assert!(store.is_empty());
    }

    #[test]
    fn test_section_doc_without_section_is_ignored() {
        let store = parse_definitions("//## floating doc\n//== Colors\n$a: 1;\n");
        assert_eq!(store.section("Colors").unwrap().info(), "");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_pending_doc_cleared_by_failed_declaration() {
        let store = parse_definitions(
            "//== Colors\n//** doc for the next declaration\nnot a declaration\n$a: 1;\n",
        );
        assert_eq!(store.component("a").unwrap().info(), "");
    }

    #[test]
    fn test_pending_doc_consumed_once() {
        let store = parse_definitions("//== Colors\n//** first only\n$a: 1;\n$b: 2;\n");
        assert_eq!(store.component("a").unwrap().info(), "first only");
        assert_eq!(store.component("b").unwrap().info(), "");
    }

    #[test]
    fn test_value_may_contain_colons() {
        let store = parse_definitions("//== Misc\n$icon-url: url(https://example.com/x.png);\n");
        assert_eq!(
            store.get_value("icon-url").unwrap(),
            "url(https://example.com/x.png)"
        );
    }

    #[test]
    fn test_mixed_garbage_never_fails() {
        let store = parse_definitions(
            "garbage\n//## stray\n$early: 1;\n//== S\n:::\n$ok: 2;\nfoo bar\n",
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_value("ok").unwrap(), "2");
    }

    // =========================================================================
    // File loading
    // =========================================================================

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VARS_FILE.as_bytes()).unwrap();

        let store = parse_file(file.path()).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_parse_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_file(dir.path().join("absent.scss"));
        assert!(matches!(result, Err(VarsError::Io { .. })));
    }
}
