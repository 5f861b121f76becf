//! Pattern library
//!
//! Catalog of named laundering topologies. A library is built once, then
//! shared by reference; nothing mutates it after construction, so concurrent
//! generators can read it without locking.
//!
//! # Example
//!
//! ```
//! use scenario_forge_core_rs::PatternLibrary;
//!
//! let library = PatternLibrary::builtin();
//! let template = library.lookup("smurfing").unwrap();
//! assert_eq!(template.id, "smurfing");
//! assert!(library.lookup("no_such_pattern").is_err());
//! ```

pub mod builtin;
pub mod template;

pub use template::{
    AmountRange, Arrangement, CountRange, RoleSlot, ScenarioTemplate, MAX_AMOUNT, MAX_EDGES,
};

use crate::orchestrator::ForgeError;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Registry of scenario templates, keyed by id
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    templates: BTreeMap<String, ScenarioTemplate>,
}

impl PatternLibrary {
    /// Library with no templates
    pub fn empty() -> Self {
        Self::default()
    }

    /// Process-wide library holding the built-in catalog
    ///
    /// Initialized on first use and read-only afterwards.
    pub fn builtin() -> &'static PatternLibrary {
        static BUILTIN: OnceLock<PatternLibrary> = OnceLock::new();
        BUILTIN.get_or_init(PatternLibrary::with_builtins)
    }

    /// Fresh, owned copy of the built-in catalog (for extension)
    pub fn with_builtins() -> Self {
        let mut library = Self::empty();
        for template in builtin::all() {
            let id = template.id.clone();
            if let Err(err) = library.register(template) {
                tracing::error!(template = %id, error = %err, "built-in template rejected");
            }
        }
        library
    }

    /// Parse a JSON array of templates into a new library
    ///
    /// # Errors
    /// - `Serialization` if the document is not a template array
    /// - `ParameterRange` if any template fails validation
    pub fn from_json_str(json: &str) -> Result<Self, ForgeError> {
        let templates: Vec<ScenarioTemplate> = serde_json::from_str(json)
            .map_err(|e| ForgeError::Serialization(format!("template catalog: {}", e)))?;
        Self::empty().with_templates(templates)
    }

    /// Register additional templates, consuming the library
    pub fn with_templates<I>(mut self, templates: I) -> Result<Self, ForgeError>
    where
        I: IntoIterator<Item = ScenarioTemplate>,
    {
        for template in templates {
            self.register(template)?;
        }
        Ok(self)
    }

    /// Validate and add a template
    ///
    /// # Errors
    /// `ParameterRange` if the template is invalid or its id is taken
    pub fn register(&mut self, template: ScenarioTemplate) -> Result<(), ForgeError> {
        template.validate()?;
        if self.templates.contains_key(&template.id) {
            return Err(ForgeError::ParameterRange {
                template: template.id.clone(),
                reason: "a template with this id is already registered".to_string(),
            });
        }
        tracing::debug!(template = %template.id, version = %template.version, "registered template");
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    /// Find a template by name
    ///
    /// # Errors
    /// `UnknownPattern` if no template has that id
    pub fn lookup(&self, name: &str) -> Result<&ScenarioTemplate, ForgeError> {
        self.templates
            .get(name)
            .ok_or_else(|| ForgeError::UnknownPattern {
                name: name.to_string(),
            })
    }

    /// Registered ids in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
