//! Annotation value type

use super::category::Category;
use super::errors::DeidError;
use super::result::Result;
use serde::Serialize;
use std::cmp::Ordering;

/// A detected span of sensitive text.
///
/// Offsets are char offsets into the document text, `end_char` exclusive.
/// The matched text is captured at creation, so it stays valid even if the
/// text it came from is later rewritten. Annotations are never mutated; the
/// consolidation stages build new ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Annotation {
    start_char: usize,
    end_char: usize,
    text: String,
    tag: Category,
}

impl Annotation {
    /// Create an annotation from offsets and the text they cover
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::MalformedSpan`] if the span is empty or inverted,
    /// or if `text` does not have exactly `end_char - start_char` chars.
    pub fn new(
        start_char: usize,
        end_char: usize,
        text: impl Into<String>,
        tag: Category,
    ) -> Result<Self> {
        let text = text.into();
        let text_len = text.chars().count();
        if start_char >= end_char || end_char - start_char != text_len {
            return Err(DeidError::MalformedSpan {
                start_char,
                end_char,
                text_len,
            });
        }

        Ok(Self {
            start_char,
            end_char,
            text,
            tag,
        })
    }

    pub fn start_char(&self) -> usize {
        self.start_char
    }

    pub fn end_char(&self) -> usize {
        self.end_char
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tag(&self) -> Category {
        self.tag
    }

    /// Span length in chars
    pub fn len(&self) -> usize {
        self.end_char - self.start_char
    }

    /// Always false; annotations cannot be empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the two char ranges share at least one position
    pub fn overlaps(&self, other: &Annotation) -> bool {
        self.start_char < other.end_char && other.start_char < self.end_char
    }

    /// Order by position: start ascending, then end, then tag, then text
    pub fn cmp_by_position(&self, other: &Annotation) -> Ordering {
        self.start_char
            .cmp(&other.start_char)
            .then(self.end_char.cmp(&other.end_char))
            .then(self.tag.cmp(&other.tag))
            .then_with(|| self.text.cmp(&other.text))
    }
}

/// Return the annotations sorted by [`Annotation::cmp_by_position`]
pub fn sorted_by_position(annotations: &[Annotation]) -> Vec<Annotation> {
    let mut sorted = annotations.to_vec();
    sorted.sort_by(Annotation::cmp_by_position);
    sorted
}

/// Whether any two annotations in the slice overlap
pub fn has_overlap(annotations: &[Annotation]) -> bool {
    let sorted = sorted_by_position(annotations);
    sorted.windows(2).any(|pair| pair[0].overlaps(&pair[1]))
}
