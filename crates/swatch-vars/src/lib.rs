//! # swatch-vars: layered style-variable resolution
//!
//! `swatch-vars` parses style-variable definition files (the
//! `$name: value !default;` dialect used by SASS-based UI frameworks) into
//! an ordered model, resolves each variable's effective value through up
//! to three layers, and answers "who depends on this variable" queries.
//! With an external style-sheet compiler plugged in, it also classifies
//! every resolved value as a colour or a non-colour.
//!
//! ## Core Concepts
//!
//! - [`Component`]: one named variable (raw value, documentation, colour)
//! - [`Section`]: a named, ordered group of components
//! - [`VarStore`]: the parsed base plus `custom` and `overrides` layers
//! - [`Classifier`] / [`Compiler`]: colour detection through an external
//!   compiler
//!
//! ## Quick Start
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
//! assert_eq!(store.get_value("gray-base").unwrap(), "#000");
//! assert!(store.dependencies("gray-base").contains("gray-darker"));
//!
//! // Layer a transient override over the base; an empty override means
//! // "use the base value", distinct from no override at all.
//! let store = store.with_overrides([("gray-base".to_string(), "#111".to_string())]);
//! assert_eq!(store.get_value("gray-base").unwrap(), "#111");
//! ```
//!
//! ## Serialization
//!
//! A store round-trips through two JSON artifacts (the base definition
//! tree and the flat custom layer) with declaration order preserved
//! byte-for-byte:
//!
//! ```rust
//! use swatch_vars::{parse_definitions, VarStore};
//!
//! let store = parse_definitions("//== Colors\n$gray-base: #000;\n");
//! let json = store.base_to_json();
//! let rebuilt = VarStore::from_json(&json).unwrap();
//! assert_eq!(rebuilt.base_to_json(), json);
//! ```
//!
//! ## Layering
//!
//! Resolution applies, highest priority first: a non-empty override, the
//! custom value, the base value. The base is immutable once parsed, so one
//! parsed store can serve many resolution contexts: clone it and attach
//! different layers per request.

pub mod classify;
pub mod colour;
pub mod compiler;
pub mod component;
pub mod depends;
pub mod error;
pub mod parser;
pub mod section;
pub mod store;

pub use classify::Classifier;
pub use colour::is_colour;
pub use compiler::{CommandCompiler, CompileError, Compiler};
pub use component::Component;
pub use error::{Result, VarsError};
pub use parser::{parse_definitions, parse_file};
pub use section::Section;
pub use store::VarStore;
