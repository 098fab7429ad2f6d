//! Named annotator library
//!
//! Annotators are declared in TOML, one table per annotator name:
//!
//! ```toml
//! [annotators.patient_number]
//! kind = "regex"
//! category = "patient_number"
//! patterns = ['\b\d{7}\b']
//!
//! [annotators.residence]
//! kind = "lookup"
//! category = "location"
//! terms = ["Utrecht", "Den Haag"]
//!
//! [annotators.person_surname]
//! kind = "patient"
//! field = "surname"
//!
//! [annotators.name_context]
//! kind = "context"
//! category = "name"
//! seeds = ["name", "patient"]
//! after = '\s(\p{Lu}\p{Ll}+)'
//! ```
//!
//! Context annotators run after all other selected annotators.
//!
//! Categories are checked against [`Category`] while the file is parsed, so a
//! typo fails at load time rather than when a document is processed.

use super::context::ContextAnnotator;
use super::lookup::LookupAnnotator;
use super::patient::{PatientAnnotator, PatientField};
use super::regex::RegexAnnotator;
use super::Annotator;
use crate::domain::{Category, DeidError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Annotator definition from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotatorDefinition {
    /// Regular-expression matches
    Regex {
        category: Category,
        patterns: Vec<String>,
        /// Capture group to annotate instead of the whole match
        #[serde(default)]
        group: Option<usize>,
        #[serde(default)]
        case_insensitive: bool,
    },
    /// Term list
    Lookup {
        category: Category,
        terms: Vec<String>,
        #[serde(default)]
        case_insensitive: bool,
    },
    /// Patient name field from document metadata
    Patient { field: PatientField },
    /// Text next to annotations of the seed categories
    Context {
        category: Category,
        seeds: Vec<Category>,
        #[serde(default)]
        after: Option<String>,
        #[serde(default)]
        before: Option<String>,
    },
}

impl AnnotatorDefinition {
    fn kind(&self) -> &'static str {
        match self {
            Self::Regex { .. } => "regex",
            Self::Lookup { .. } => "lookup",
            Self::Patient { .. } => "patient",
            Self::Context { .. } => "context",
        }
    }

    fn build(&self) -> Result<Arc<dyn Annotator>> {
        Ok(match self {
            Self::Regex {
                category,
                patterns,
                group,
                case_insensitive,
            } => Arc::new(RegexAnnotator::new(*category, patterns, *group, *case_insensitive)?),
            Self::Lookup {
                category,
                terms,
                case_insensitive,
            } => Arc::new(LookupAnnotator::new(*category, terms, *case_insensitive)?),
            Self::Patient { field } => Arc::new(PatientAnnotator::new(*field)),
            Self::Context {
                category,
                seeds,
                after,
                before,
            } => Arc::new(ContextAnnotator::new(
                *category,
                seeds.clone(),
                after.as_deref(),
                before.as_deref(),
            )?),
        })
    }
}

/// Library file container
#[derive(Debug, Deserialize)]
struct LibraryFile {
    annotators: BTreeMap<String, AnnotatorDefinition>,
}

/// A compiled, named annotator
#[derive(Clone)]
pub struct AnnotatorEntry {
    pub name: String,
    pub kind: &'static str,
    pub category: Category,
    annotator: Arc<dyn Annotator>,
}

impl AnnotatorEntry {
    pub fn annotator(&self) -> Arc<dyn Annotator> {
        Arc::clone(&self.annotator)
    }
}

/// Registry of named annotators
#[derive(Clone, Default)]
pub struct AnnotatorLibrary {
    entries: BTreeMap<String, AnnotatorEntry>,
}

impl AnnotatorLibrary {
    /// Load a library from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DeidError::Io(format!(
                "Failed to read annotator library {}: {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Load a library from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: LibraryFile = toml::from_str(content).map_err(|e| {
            DeidError::Configuration(format!("Failed to parse annotator library: {e}"))
        })?;

        let mut entries = BTreeMap::new();
        for (name, definition) in file.annotators {
            let annotator = definition.build().map_err(|e| {
                DeidError::Configuration(format!("Invalid annotator '{name}': {e}"))
            })?;
            let entry = AnnotatorEntry {
                name: name.clone(),
                kind: definition.kind(),
                category: annotator.category(),
                annotator,
            };
            entries.insert(name, entry);
        }

        tracing::debug!(annotators = entries.len(), "Loaded annotator library");
        Ok(Self { entries })
    }

    /// The built-in library
    pub fn default_library() -> Result<Self> {
        let default_toml = include_str!("../../patterns/default_annotators.toml");
        Self::from_toml(default_toml)
    }

    /// Register an annotator under a name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, kind: &'static str, annotator: Arc<dyn Annotator>) {
        let name = name.into();
        let entry = AnnotatorEntry {
            name: name.clone(),
            kind,
            category: annotator.category(),
            annotator,
        };
        self.entries.insert(name, entry);
    }

    /// Look up an annotator by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Annotator>> {
        self.entries
            .get(name)
            .map(AnnotatorEntry::annotator)
            .ok_or_else(|| DeidError::UnknownAnnotator(name.to_string()))
    }

    /// Resolve a list of names, failing on the first unknown one
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<(String, Arc<dyn Annotator>)>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).map(|annotator| (name.to_string(), annotator))
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Annotator names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &AnnotatorEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
