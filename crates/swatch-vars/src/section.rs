//! A named, ordered group of components.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::component::{slugify, Component};
use crate::error::VarsError;

/// A named group of [`Component`]s with a documentation string.
///
/// Components keep their declaration order; that order is load-bearing for
/// serialization equality, so it is preserved through every
/// encode/decode cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub(crate) name: String,
    pub(crate) info: String,
    pub(crate) components: IndexMap<String, Component>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            info: info.into(),
            components: IndexMap::new(),
        }
    }

    /// The section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The section documentation string; empty when the file carried none.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// A URL-safe identifier derived from the name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Appends a component, normalizing its raw value.
    ///
    /// Re-declaring a name replaces the component but keeps its original
    /// position.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        info: impl Into<String>,
    ) -> &Component {
        let comp = Component::new(name, value, info);
        let name = comp.name.clone();
        self.components.insert(name.clone(), comp);
        &self.components[&name]
    }

    /// The components in declaration order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Looks up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Number of components in the section.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the section holds no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Encodes the section as an artifact fragment: its components in
    /// order, then the documentation string (omitted when empty).
    pub fn to_value(&self) -> Value {
        let mut components = Map::new();
        for (name, comp) in &self.components {
            components.insert(name.clone(), comp.to_value());
        }
        let mut map = Map::new();
        map.insert("components".to_string(), Value::Object(components));
        if !self.info.is_empty() {
            map.insert("info".to_string(), Value::String(self.info.clone()));
        }
        Value::Object(map)
    }

    /// Decodes an artifact fragment produced by [`Section::to_value`].
    pub fn from_value(name: &str, value: &Value) -> Result<Self, VarsError> {
        let map = value.as_object().ok_or_else(|| {
            VarsError::Shape(format!("section '{}' is not an object", name))
        })?;

        let info = match map.get("info") {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(VarsError::Shape(format!(
                    "section '{}' info is not a string: {}",
                    name, other
                )))
            }
        };

        let mut section = Self::new(name, info);
        if let Some(components) = map.get("components") {
            let components = components.as_object().ok_or_else(|| {
                VarsError::Shape(format!("section '{}' components is not an object", name))
            })?;
            for (comp_name, comp_value) in components {
                let comp = Component::from_value(comp_name, comp_value)?;
                section.components.insert(comp_name.clone(), comp);
            }
        }
        Ok(section)
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
