//! The variable store: base definitions plus customization layers.
//!
//! [`VarStore`] owns the parsed [`Section`]s and ungrouped [`Component`]s
//! (the *base* layer) and up to two layers of per-variable substitutions:
//!
//! - `custom`: persisted substitutions, applied under any override;
//! - `overrides`: transient substitutions, where an empty string is an
//!   explicit "use the base value" signal rather than a value.
//!
//! The base layer is immutable once built. Layers are attached with the
//! consuming builder methods ([`VarStore::with_custom`],
//! [`VarStore::with_overrides`]), so pairing one parsed base with several
//! different layer combinations is a matter of cloning the store:
//!
//! ```rust
//! use swatch_vars::parse_definitions;
//!
//! let base = parse_definitions("//== Colors\n$gray-base: #000 !default;\n");
//! let night = base
//!     .clone()
//!     .with_custom([("gray-base".to_string(), "#111".to_string())]);
//! assert_eq!(base.get_value("gray-base").unwrap(), "#000");
//! assert_eq!(night.get_value("gray-base").unwrap(), "#111");
//! ```
//!
//! # Resolution
//!
//! [`VarStore::get_value`] resolves highest-priority-first: a non-empty
//! override wins; an empty override falls through to the *base* value
//! (skipping `custom`); otherwise `custom`; otherwise the base value;
//! otherwise the lookup fails.
//!
//! # Serialization
//!
//! The store round-trips through two independent JSON artifacts: the base
//! artifact (`{"sections": ..., "nonsections": ...}`) and the custom
//! artifact (a flat object). Deserializing and re-serializing yields
//! byte-identical output; declaration order is preserved end to end.

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::classify::Classifier;
use crate::compiler::Compiler;
use crate::component::Component;
use crate::depends;
use crate::error::{Result, VarsError};
use crate::section::Section;

/// Where a component lives inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// Owned by the named section.
    Sectioned(String),
    /// Ungrouped, owned by the store itself.
    Loose,
}

/// Ordered collection of sections and components plus customization layers.
#[derive(Debug, Clone, Default)]
pub struct VarStore {
    sections: IndexMap<String, Section>,
    nonsectioned: IndexMap<String, Component>,
    /// Global name index, in first-seen order across sections then
    /// nonsectioned components. This order drives `all_value_pairs`,
    /// serialization, and classification.
    index: IndexMap<String, Slot>,
    colour_values: IndexMap<String, String>,
    custom: IndexMap<String, String>,
    overrides: IndexMap<String, String>,
}

impl VarStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Opens a new (empty) section. Used by the definition parser.
    pub(crate) fn add_section(&mut self, name: &str, info: &str) {
        self.sections
            .insert(name.to_string(), Section::new(name, info));
    }

    /// Sets the documentation string of an existing section.
    pub(crate) fn set_section_info(&mut self, name: &str, info: &str) {
        if let Some(section) = self.sections.get_mut(name) {
            section.info = info.to_string();
        }
    }

    /// Appends a component to the named section and indexes it globally.
    pub(crate) fn add_section_component(
        &mut self,
        section_name: &str,
        name: &str,
        value: &str,
        info: &str,
    ) {
        if let Some(section) = self.sections.get_mut(section_name) {
            section.add_component(name, value, info);
            self.index
                .insert(name.to_string(), Slot::Sectioned(section_name.to_string()));
        }
    }

    /// Adds an ungrouped component.
    ///
    /// This is how layers contribute variables that the base definition
    /// file never declared.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        info: impl Into<String>,
    ) {
        let comp = Component::new(name, value, info);
        let name = comp.name.clone();
        self.nonsectioned.insert(name.clone(), comp);
        self.index.insert(name, Slot::Loose);
    }

    /// Attaches persisted customizations.
    ///
    /// Entries naming an existing variable shadow its base value (unless an
    /// override applies); entries naming an unknown variable become new
    /// ungrouped components contributed by this layer.
    pub fn with_custom<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in entries {
            if !self.index.contains_key(&name) {
                self.add_component(name.clone(), value.clone(), "");
            }
            self.custom.insert(name, value);
        }
        self
    }

    /// Attaches persisted customizations from a flat JSON object.
    pub fn with_custom_json(self, json: &str) -> Result<Self> {
        Ok(self.with_custom(parse_flat_map(json)?))
    }

    /// Attaches transient overrides.
    ///
    /// An empty value is an explicit "use the base value" marker. Unknown
    /// names stay in the layer without becoming components.
    pub fn with_overrides<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.overrides.extend(entries);
        self
    }

    /// Attaches transient overrides from a flat JSON object.
    pub fn with_overrides_json(self, json: &str) -> Result<Self> {
        Ok(self.with_overrides(parse_flat_map(json)?))
    }

    // -------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------

    /// The sections in encounter order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Looks up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// The ungrouped components, in the order they were added.
    pub fn nonsectioned(&self) -> impl Iterator<Item = &Component> {
        self.nonsectioned.values()
    }

    /// Looks up any component by name, sectioned or not.
    pub fn component(&self, name: &str) -> Option<&Component> {
        match self.index.get(name)? {
            Slot::Sectioned(section) => self.sections.get(section)?.component(name),
            Slot::Loose => self.nonsectioned.get(name),
        }
    }

    pub(crate) fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        match self.index.get(name)? {
            Slot::Sectioned(section) => self
                .sections
                .get_mut(section)?
                .components
                .get_mut(name),
            Slot::Loose => self.nonsectioned.get_mut(name),
        }
    }

    /// Every component, in global first-seen order.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.index.keys().filter_map(|name| self.component(name))
    }

    /// Every component name, in global first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Total number of components across all sections and the ungrouped set.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no components.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The attached custom layer.
    pub fn custom(&self) -> &IndexMap<String, String> {
        &self.custom
    }

    /// The attached override layer.
    pub fn overrides(&self) -> &IndexMap<String, String> {
        &self.overrides
    }

    // -------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------

    /// Resolves the effective value of a variable through the layers.
    ///
    /// Precedence, highest first: non-empty override; base value when an
    /// *empty* override is present (the custom layer is skipped); custom;
    /// base value.
    ///
    /// # Errors
    ///
    /// [`VarsError::UnknownVariable`] when the name exists in no layer.
    pub fn get_value(&self, name: &str) -> Result<&str> {
        match self.overrides.get(name) {
            Some(value) if !value.is_empty() => return Ok(value),
            Some(_) => {
                // Explicit use-the-default marker: read the base value,
                // skipping any custom entry for this name.
            }
            None => {
                if let Some(value) = self.custom.get(name) {
                    return Ok(value);
                }
            }
        }
        self.component(name)
            .map(Component::value)
            .ok_or_else(|| VarsError::UnknownVariable(name.to_string()))
    }

    /// Lazily yields `(name, resolved value)` for every component, in
    /// global order. Restartable; each call walks the store afresh.
    pub fn all_value_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.components().map(|comp| {
            let name = comp.name();
            let value = match self.get_value(name) {
                Ok(value) => value,
                // Every indexed name has a component, so resolution cannot
                // miss; fall back to the raw value to keep the iterator
                // total.
                Err(_) => comp.value(),
            };
            (name, value)
        })
    }

    /// Names of all *other* components whose raw value references `name`
    /// as a whole token. One level only; callers compose transitive
    /// closure by repeated queries.
    pub fn dependencies(&self, name: &str) -> IndexSet<String> {
        depends::dependencies(self, name)
    }

    // -------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------

    /// Resolves every variable through the given compiler and records
    /// which ones denote colours. See [`Classifier`].
    ///
    /// # Errors
    ///
    /// Fails as a unit on a compile failure; the store is left untouched.
    pub fn classify(&mut self, compiler: &dyn Compiler) -> Result<()> {
        Classifier::new(compiler).classify(self)?;
        Ok(())
    }

    /// Replaces the classification state. `colours` must be in global
    /// component order; components absent from it lose any previous
    /// colour annotation.
    pub(crate) fn set_classification(&mut self, colours: IndexMap<String, String>) {
        let names: Vec<String> = self.index.keys().cloned().collect();
        for name in names {
            let colour = colours.get(&name).cloned().unwrap_or_default();
            if let Some(comp) = self.component_mut(&name) {
                comp.colour_value = colour;
            }
        }
        self.colour_values = colours;
    }

    /// Resolved colour literals from the last classification, keyed by
    /// component name, in global component order.
    pub fn colour_values(&self) -> &IndexMap<String, String> {
        &self.colour_values
    }

    /// The components that classified as colours, in global order.
    pub fn colour_components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.colour_values
            .keys()
            .filter_map(|name| self.component(name))
    }

    // -------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------

    /// Encodes the base layer as the structured artifact.
    pub fn to_value(&self) -> Value {
        let mut sections = Map::new();
        for (name, section) in &self.sections {
            sections.insert(name.clone(), section.to_value());
        }
        let mut nonsections = Map::new();
        for (name, comp) in &self.nonsectioned {
            nonsections.insert(name.clone(), comp.to_value());
        }
        let mut root = Map::new();
        root.insert("sections".to_string(), Value::Object(sections));
        root.insert("nonsections".to_string(), Value::Object(nonsections));
        Value::Object(root)
    }

    /// Serializes the base layer to a JSON string.
    pub fn base_to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Serializes the custom layer to a flat JSON object string.
    pub fn custom_to_json(&self) -> String {
        let mut map = Map::new();
        for (name, value) in &self.custom {
            map.insert(name.clone(), Value::String(value.clone()));
        }
        Value::Object(map).to_string()
    }

    /// Rebuilds a store from the structured base artifact.
    ///
    /// A JSON-encoded string value is accepted in place of the structured
    /// form and parsed first.
    ///
    /// # Errors
    ///
    /// [`VarsError::Shape`] / [`VarsError::Json`] on malformed input; no
    /// store is returned.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = match value {
            Value::String(json) => return Self::from_json(json),
            Value::Object(map) => map,
            other => {
                return Err(VarsError::Shape(format!(
                    "base artifact is not an object: {}",
                    other
                )))
            }
        };

        let mut store = Self::new();

        if let Some(sections) = map.get("sections") {
            let sections = sections.as_object().ok_or_else(|| {
                VarsError::Shape("'sections' is not an object".to_string())
            })?;
            for (name, section_value) in sections {
                let section = Section::from_value(name, section_value)?;
                for comp_name in section.components.keys() {
                    store
                        .index
                        .insert(comp_name.clone(), Slot::Sectioned(name.clone()));
                }
                store.sections.insert(name.clone(), section);
            }
        }

        if let Some(nonsections) = map.get("nonsections") {
            let nonsections = nonsections.as_object().ok_or_else(|| {
                VarsError::Shape("'nonsections' is not an object".to_string())
            })?;
            for (name, comp_value) in nonsections {
                let comp = Component::from_value(name, comp_value)?;
                store.nonsectioned.insert(name.clone(), comp);
                store.index.insert(name.clone(), Slot::Loose);
            }
        }

        Ok(store)
    }

    /// Rebuilds a store from a JSON-encoded base artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }
}

impl Serialize for VarStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Parses a flat `{"name": "value"}` JSON object into ordered entries.
fn parse_flat_map(json: &str) -> Result<Vec<(String, String)>> {
    let value: Value = serde_json::from_str(json)?;
    let map = value.as_object().ok_or_else(|| {
        VarsError::Shape(format!("layer artifact is not an object: {}", value))
    })?;
    let mut entries = Vec::with_capacity(map.len());
    for (name, value) in map {
        let value = value.as_str().ok_or_else(|| {
            VarsError::Shape(format!("layer entry '{}' is not a string: {}", name, value))
        })?;
        entries.push((name.clone(), value.to_string()));
    }
    Ok(entries)
}
