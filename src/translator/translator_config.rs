use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::translator::TranslationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Prefix of every GUID-derived query variable.
    pub variable_prefix: String,
    /// Narrow unqualified FROM names to this catalog when set.
    pub default_catalog: Option<String>,
    /// Narrow unqualified FROM names to this schema when set.
    pub default_schema: Option<String>,
    pub type_filters: bool,
    pub coerce_values: bool,
    pub prefixes: IndexMap<String, String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        let mut prefixes = IndexMap::new();
        prefixes.insert("rdf".to_string(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#".to_string());
        prefixes.insert("rdfs".to_string(), "http://www.w3.org/2000/01/rdf-schema#".to_string());
        prefixes.insert("xsd".to_string(), "http://www.w3.org/2001/XMLSchema#".to_string());
        Self {
            variable_prefix: "v".to_string(),
            default_catalog: None,
            default_schema: None,
            type_filters: true,
            coerce_values: true,
            prefixes,
        }
    }
}

impl TranslatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain bindings: no type filters and no coercion.
    pub fn raw() -> Self {
        Self { type_filters: false, coerce_values: false, ..Self::default() }
    }

    pub fn scoped(catalog: &str, schema: &str) -> Self {
        Self {
            default_catalog: Some(catalog.to_string()),
            default_schema: Some(schema.to_string()),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: &str, iri: &str) -> Self {
        self.prefixes.insert(prefix.to_string(), iri.to_string());
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, TranslationError> {
        let config: Self = serde_json::from_str(text).map_err(|e| TranslationError::InvalidCatalog(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The prefix must start a legal variable name on its own.
    pub fn validate(&self) -> Result<(), TranslationError> {
        let ok = self.variable_prefix.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self.variable_prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !ok {
            return TranslationError::invalid_name(self.variable_prefix.clone(), "not a usable variable prefix").err();
        }
        Ok(())
    }
}
