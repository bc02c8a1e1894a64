//! Colour classification via the external compiler.
//!
//! The engine cannot know that `lighten($gray-base, 13.5%)` is a colour;
//! only the compiler can evaluate it. So classification builds one probe
//! unit containing, for every component in order, an assignment of its
//! *resolved* value and a synthetic rule that forces the compiler to echo
//! the evaluated result:
//!
//! ```text
//! $gray-base: #000;
//! .gray-base { color: $gray-base; }
//! $gray-darker: lighten($gray-base, 13.5%);
//! .gray-darker { color: $gray-darker; }
//! ```
//!
//! The unit is compiled once per classification. Each echoed rule is read
//! back as a `(class name, value up to the first `;`)` pair, and values
//! that pass [`is_colour`](crate::colour::is_colour) are attributed to
//! their components. Rules that never surface in the output, and values
//! that are not colours, are simply omitted. A compile failure fails the
//! whole batch and leaves the store untouched.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::colour::is_colour;
use crate::compiler::{CompileError, Compiler};
use crate::store::VarStore;

/// Extracts `(class, value)` pairs from compiled output shaped like
/// `.name { color: value; }`, tolerating arbitrary whitespace.
static RULE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([^\s{]+)[^:]*:\s*([^;}]*)").expect("rule pattern compiles"));

/// Classifies a store's components as colours or non-colours.
///
/// # Example
///
/// ```rust
/// use swatch_vars::{parse_definitions, Classifier, CompileError};
///
/// let mut store = parse_definitions("//== Colors\n$gray-base: #000;\n");
/// let fake = |_: &str| -> Result<String, CompileError> {
///     Ok(".gray-base {\n  color: #000; }\n".to_string())
/// };
/// Classifier::new(&fake).classify(&mut store).unwrap();
/// assert_eq!(store.colour_values()["gray-base"], "#000");
/// ```
pub struct Classifier<'c> {
    compiler: &'c dyn Compiler,
    prelude: Option<String>,
}

impl<'c> Classifier<'c> {
    /// Creates a classifier around a compiler.
    pub fn new(compiler: &'c dyn Compiler) -> Self {
        Self {
            compiler,
            prelude: None,
        }
    }

    /// Prepends a line to every probe unit. Useful for compiler-specific
    /// guards a variables file assumes, such as disabling a framework's
    /// asset helpers.
    pub fn with_prelude(mut self, line: impl Into<String>) -> Self {
        self.prelude = Some(line.into());
        self
    }

    /// Runs one classification batch over the store.
    ///
    /// On success the store's colour annotations are replaced wholesale;
    /// on a compile failure they are left exactly as they were, so a
    /// failed batch is safely retryable.
    pub fn classify(&self, store: &mut VarStore) -> Result<(), CompileError> {
        let source = self.build_probe_source(store);
        let output = self.compiler.compile(&source)?;
        let evaluated = parse_probe_output(&output);

        let mut colours = IndexMap::new();
        for comp in store.components() {
            if let Some(value) = evaluated.get(comp.name()) {
                if is_colour(value) {
                    colours.insert(comp.name().to_string(), value.clone());
                }
            }
        }

        debug!(
            components = store.len(),
            colours = colours.len(),
            "classified variable colours"
        );
        store.set_classification(colours);
        Ok(())
    }

    /// Builds the probe compilation unit from the store's resolved values.
    fn build_probe_source(&self, store: &VarStore) -> String {
        let mut source = String::new();
        if let Some(line) = &self.prelude {
            source.push_str(line);
            source.push('\n');
        }
        for (name, value) in store.all_value_pairs() {
            source.push_str(&format!("${}: {};\n", name, value));
            source.push_str(&format!(".{} {{ color: ${}; }}\n", name, name));
        }
        source
    }
}

/// Parses compiler output into class-name → evaluated-value pairs.
///
/// This is the only place coupled to the compiler's output format; swap
/// the pattern here if a differently-shaped compiler is integrated.
fn parse_probe_output(output: &str) -> IndexMap<String, String> {
    let mut evaluated = IndexMap::new();
    for capture in RULE_PATTERN.captures_iter(output) {
        let name = capture[1].to_string();
        let value = capture[2].trim().to_string();
        evaluated.insert(name, value);
    }
    evaluated
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::parser::parse_definitions;

    /// Returns a canned output and records the source it was asked to
    /// compile.
    struct ScriptedCompiler {
        output: Result<String, String>,
        seen: RefCell<Vec<String>>,
    }

    impl ScriptedCompiler {
        fn ok(output: &str) -> Self {
            Self {
                output: Ok(output.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(stderr: &str) -> Self {
            Self {
                output: Err(stderr.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Compiler for ScriptedCompiler {
        fn compile(&self, source: &str) -> Result<String, CompileError> {
            self.seen.borrow_mut().push(source.to_string());
            match &self.output {
                Ok(output) => Ok(output.clone()),
                Err(stderr) => Err(CompileError::Failed {
                    command: "scripted".to_string(),
                    stderr: stderr.clone(),
                }),
            }
        }
    }

    fn sample() -> VarStore {
        parse_definitions(
            r#"
//== Colors
$gray-base: #000;
$gray-darker: lighten($gray-base, 13.5%);
//== Scaffolding
$body-bg: #fff;
$body-font: arial;
"#,
        )
    }

    const COMPILED: &str = "\
.gray-base {
  color: #000; }

.gray-darker {
  color: #222222; }

.body-bg {
  color: #fff; }

.body-font {
  color: arial; }
";

    // =========================================================================
    // Probe construction
    // =========================================================================

    #[test]
    fn test_probe_source_uses_resolved_values_in_order() {
        let mut store = sample().with_overrides([("gray-base".to_string(), "#111".to_string())]);
        let compiler = ScriptedCompiler::ok(COMPILED);
        Classifier::new(&compiler).classify(&mut store).unwrap();

        let seen = compiler.seen.borrow();
        assert_eq!(
            seen[0],
            "$gray-base: #111;\n\
             .gray-base { color: $gray-base; }\n\
             $gray-darker: lighten($gray-base, 13.5%);\n\
             .gray-darker { color: $gray-darker; }\n\
             $body-bg: #fff;\n\
             .body-bg { color: $body-bg; }\n\
             $body-font: arial;\n\
             .body-font { color: $body-font; }\n"
        );
    }

    #[test]
    fn test_prelude_is_prepended() {
        let mut store = sample();
        let compiler = ScriptedCompiler::ok(COMPILED);
        Classifier::new(&compiler)
            .with_prelude("$asset-helper: false;")
            .classify(&mut store)
            .unwrap();
        assert!(compiler.seen.borrow()[0].starts_with("$asset-helper: false;\n$gray-base:"));
    }

    // =========================================================================
    // Attribution
    // =========================================================================

    #[test]
    fn test_colours_attributed_in_component_order() {
        let mut store = sample();
        let compiler = ScriptedCompiler::ok(COMPILED);
        Classifier::new(&compiler).classify(&mut store).unwrap();

        let pairs: Vec<(&str, &str)> = store
            .colour_values()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("gray-base", "#000"),
                ("gray-darker", "#222222"),
                ("body-bg", "#fff"),
            ]
        );

        assert_eq!(store.component("gray-darker").unwrap().colour_value(), "#222222");
        assert_eq!(store.component("body-font").unwrap().colour_value(), "");

        let colour_names: Vec<&str> = store.colour_components().map(|c| c.name()).collect();
        assert_eq!(colour_names, vec!["gray-base", "gray-darker", "body-bg"]);
    }

    #[test]
    fn test_reclassification_replaces_previous_results() {
        let mut store = sample();
        let compiler = ScriptedCompiler::ok(COMPILED);
        Classifier::new(&compiler).classify(&mut store).unwrap();

        // The base gray flipped to white; its dependent lightens to match.
        let recompiled = COMPILED
            .replace("#000", "#fff")
            .replace("#222222", "#dddddd");
        let compiler = ScriptedCompiler::ok(&recompiled);
        let mut store = store.with_overrides([("gray-base".to_string(), "#fff".to_string())]);
        Classifier::new(&compiler).classify(&mut store).unwrap();

        assert_eq!(store.colour_values()["gray-base"], "#fff");
        assert_eq!(store.colour_values()["gray-darker"], "#dddddd");
    }

    #[test]
    fn test_missing_rule_is_omitted() {
        let mut store = sample();
        // gray-darker never surfaced (e.g. its expression broke upstream).
        let partial = "\
.gray-base {
  color: #000; }

.body-bg {
  color: #fff; }
";
        let compiler = ScriptedCompiler::ok(partial);
        Classifier::new(&compiler).classify(&mut store).unwrap();

        assert!(!store.colour_values().contains_key("gray-darker"));
        assert_eq!(store.component("gray-darker").unwrap().colour_value(), "");
    }

    #[test]
    fn test_compile_failure_is_atomic() {
        let mut store = sample();
        let compiler = ScriptedCompiler::ok(COMPILED);
        Classifier::new(&compiler).classify(&mut store).unwrap();
        let before = store.colour_values().clone();

        let failing = ScriptedCompiler::failing("undefined variable $missing");
        let result = Classifier::new(&failing).classify(&mut store);
        assert!(matches!(result, Err(CompileError::Failed { .. })));
        assert_eq!(store.colour_values(), &before);
        assert_eq!(store.component("gray-base").unwrap().colour_value(), "#000");
    }

    #[test]
    fn test_store_classify_entry_point() {
        let mut store = sample();
        let compiler = ScriptedCompiler::ok(COMPILED);
        store.classify(&compiler).unwrap();
        assert_eq!(store.colour_values().len(), 3);
    }

    // =========================================================================
    // Output parsing
    // =========================================================================

    #[test]
    fn test_parse_probe_output_shapes() {
        // Compact and expanded formatting both extract.
        let evaluated = parse_probe_output(".a{color:#000}\n.b {\n  color: 180px; }\n");
        assert_eq!(evaluated["a"], "#000");
        assert_eq!(evaluated["b"], "180px");
    }

    #[test]
    fn test_parse_probe_output_stops_at_semicolon() {
        let evaluated = parse_probe_output(".a {\n  color: #000; background: #fff; }\n");
        assert_eq!(evaluated["a"], "#000");
    }

    #[test]
    fn test_parse_probe_output_empty() {
        assert!(parse_probe_output("").is_empty());
    }
}
