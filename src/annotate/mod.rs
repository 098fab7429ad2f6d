//! Annotators
//!
//! Annotators scan a [`Document`] and propose category-tagged spans. They are
//! independent of each other and only read the document, so their outputs may
//! overlap or duplicate; the consolidation stages in [`crate::core`] clean
//! that up.
//!
//! Concrete annotators:
//! - [`regex::RegexAnnotator`] - pattern matches
//! - [`lookup::LookupAnnotator`] - term lists
//! - [`patient::PatientAnnotator`] - the patient's own name fields from metadata
//! - [`context::ContextAnnotator`] - text next to annotations found by the others
//!
//! Named annotators are configured in an [`library::AnnotatorLibrary`].

pub mod context;
pub mod library;
pub mod lookup;
pub mod patient;
pub mod regex;
pub mod tokenizer;

use crate::domain::{Annotation, Category, Document, Result};

pub use library::AnnotatorLibrary;
pub use tokenizer::{Token, Tokenizer, WordTokenizer};

/// Trait for annotator implementations
///
/// Implementations must be pure functions of the document text and metadata
/// and return annotations with valid offsets into that text.
pub trait Annotator: Send + Sync {
    /// Propose annotations for a document
    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>>;

    /// Category of the annotations this annotator produces
    fn category(&self) -> Category;

    /// Whether this annotator needs the other annotators' output
    ///
    /// Contextual annotators run after all others, through
    /// [`Annotator::annotate_with_context`].
    fn is_contextual(&self) -> bool {
        false
    }

    /// Propose annotations given the candidates found so far
    fn annotate_with_context(&self, document: &Document, _candidates: &[Annotation]) -> Result<Vec<Annotation>> {
        self.annotate(document)
    }
}
