//! Document and metadata models

use super::annotation::{sorted_by_position, Annotation};
use super::category::Category;
use super::errors::DeidError;
use super::ids::DocumentId;
use super::offset::CharOffsets;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity fields of a person, as supplied in document metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// First names, in order
    #[serde(default)]
    pub first_names: Vec<String>,
    /// Initials as written in the text, e.g. `"J.A."`
    #[serde(default)]
    pub initials: Option<String>,
    /// Surname
    #[serde(default)]
    pub surname: Option<String>,
    /// Name the person goes by ("roepnaam")
    #[serde(default)]
    pub given_name: Option<String>,
}

impl Person {
    /// Whether no identity field is set
    pub fn is_empty(&self) -> bool {
        self.first_names.is_empty()
            && self.initials.is_none()
            && self.surname.is_none()
            && self.given_name.is_none()
    }
}

/// Metadata supplied alongside a document's text.
///
/// Consumed read-only by annotators; the consolidation stages never look at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The patient the document is about
    #[serde(default)]
    pub patient: Option<Person>,
    /// Free-form key/value pairs
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Metadata {
    /// Metadata carrying only a patient
    pub fn with_patient(patient: Person) -> Self {
        Self {
            patient: Some(patient),
            values: BTreeMap::new(),
        }
    }
}

/// A document under de-identification
///
/// Owns the original text (never modified), the metadata, and the annotations
/// collected so far.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    text: String,
    offsets: CharOffsets,
    metadata: Metadata,
    annotations: Vec<Annotation>,
}

impl Document {
    /// Create a document with a generated identifier
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self::with_id(DocumentId::generate(), text, metadata)
    }

    /// Create a document with a caller-supplied identifier
    pub fn with_id(id: DocumentId, text: impl Into<String>, metadata: Metadata) -> Self {
        let text = text.into();
        let offsets = CharOffsets::new(&text);
        Self {
            id,
            text,
            offsets,
            metadata,
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn offsets(&self) -> &CharOffsets {
        &self.offsets
    }

    /// Text length in chars
    pub fn char_len(&self) -> usize {
        self.offsets.char_len()
    }

    /// Slice of the text between two char offsets
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::MalformedSpan`] if the range is inverted or out of bounds.
    pub fn slice(&self, start_char: usize, end_char: usize) -> Result<&str> {
        let range = self
            .offsets
            .byte_range(start_char, end_char)
            .ok_or(DeidError::MalformedSpan {
                start_char,
                end_char,
                text_len: self.char_len(),
            })?;
        Ok(&self.text[range])
    }

    /// Create an annotation over `[start_char, end_char)`, capturing the text
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::MalformedSpan`] if the span is empty or out of bounds.
    pub fn annotation(&self, start_char: usize, end_char: usize, tag: Category) -> Result<Annotation> {
        if start_char >= end_char || end_char > self.char_len() {
            return Err(DeidError::MalformedSpan {
                start_char,
                end_char,
                text_len: self.char_len(),
            });
        }
        let text = self.slice(start_char, end_char)?;
        Annotation::new(start_char, end_char, text, tag)
    }

    /// Create an annotation from a byte range, as returned by regex matches
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::MalformedSpan`] if the range does not fall on char boundaries.
    pub fn annotation_from_bytes(
        &self,
        byte_start: usize,
        byte_end: usize,
        tag: Category,
    ) -> Result<Annotation> {
        let malformed = || DeidError::MalformedSpan {
            start_char: byte_start,
            end_char: byte_end,
            text_len: self.char_len(),
        };
        let start_char = self.offsets.byte_to_char(byte_start).ok_or_else(malformed)?;
        let end_char = self.offsets.byte_to_char(byte_end).ok_or_else(malformed)?;
        self.annotation(start_char, end_char, tag)
    }

    /// Check that an annotation lies within this document and matches its text
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::MalformedSpan`] on any mismatch.
    pub fn validate_annotation(&self, annotation: &Annotation) -> Result<()> {
        let malformed = DeidError::MalformedSpan {
            start_char: annotation.start_char(),
            end_char: annotation.end_char(),
            text_len: self.char_len(),
        };
        if annotation.end_char() > self.char_len() {
            return Err(malformed);
        }
        if self.slice(annotation.start_char(), annotation.end_char())? != annotation.text() {
            return Err(malformed);
        }
        Ok(())
    }

    /// Add annotations after validating them against the text
    ///
    /// # Errors
    ///
    /// Fails on the first malformed annotation; none are added in that case.
    pub fn add_annotations(&mut self, annotations: Vec<Annotation>) -> Result<()> {
        for annotation in &annotations {
            self.validate_annotation(annotation)?;
        }
        self.annotations.extend(annotations);
        Ok(())
    }

    /// Replace the annotation collection
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Annotations sorted by position
    pub fn annotations_sorted(&self) -> Vec<Annotation> {
        sorted_by_position(&self.annotations)
    }

    /// Take the annotation collection, leaving it empty
    pub fn take_annotations(&mut self) -> Vec<Annotation> {
        std::mem::take(&mut self.annotations)
    }
}
