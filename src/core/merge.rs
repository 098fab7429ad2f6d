//! Adjacent-annotation merging
//!
//! Detectors for the same entity type often fire on fragments separated by
//! formatting noise ("Dr. - Jansen"). This stage joins same-category
//! neighbours whose gap is nothing but slack text.

use super::processor::AnnotationProcessor;
use crate::domain::{Annotation, DeidError, Document, Result};
use regex::Regex;

/// Default slack: at most one of `. whitespace - ,` followed by at most one of `. whitespace`
pub const DEFAULT_SLACK_PATTERN: &str = r"[\.\s\-,]?[\.\s]?";

/// Merges same-category annotations separated only by slack text
#[derive(Debug, Clone)]
pub struct MergeAdjacentAnnotations {
    slack: Regex,
}

impl MergeAdjacentAnnotations {
    /// Create a merger for a slack pattern
    ///
    /// The pattern is anchored on both ends: the whole gap must match.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Pattern`] if the pattern does not compile.
    pub fn new(slack_pattern: &str) -> Result<Self> {
        let anchored = format!(r"\A(?:{slack_pattern})\z");
        let slack = Regex::new(&anchored)
            .map_err(|e| DeidError::Pattern(format!("Invalid slack pattern '{slack_pattern}': {e}")))?;
        Ok(Self { slack })
    }

    /// Merge adjacent annotations of `document`
    ///
    /// Input must be non-overlapping (the output of the overlap resolver).
    /// A single left-to-right pass reaches the fixpoint because the input is
    /// sorted and disjoint.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::PreconditionViolation`] on overlapping input, or
    /// [`DeidError::MalformedSpan`] if an annotation does not fit the document.
    pub fn merge(&self, annotations: Vec<Annotation>, document: &Document) -> Result<Vec<Annotation>> {
        let mut sorted = annotations;
        sorted.sort_by(Annotation::cmp_by_position);

        let mut merged = Vec::with_capacity(sorted.len());
        let mut iter = sorted.into_iter();
        let Some(mut current) = iter.next() else {
            return Ok(merged);
        };

        for next in iter {
            if next.start_char() < current.end_char() {
                return Err(DeidError::PreconditionViolation(format!(
                    "annotations [{}, {}) and [{}, {}) overlap; resolve overlaps before merging",
                    current.start_char(),
                    current.end_char(),
                    next.start_char(),
                    next.end_char()
                )));
            }

            if current.tag() == next.tag() && self.is_slack(document, &current, &next)? {
                current = document.annotation(current.start_char(), next.end_char(), current.tag())?;
            } else {
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);

        Ok(merged)
    }

    fn is_slack(&self, document: &Document, left: &Annotation, right: &Annotation) -> Result<bool> {
        let gap = document.slice(left.end_char(), right.start_char())?;
        Ok(self.slack.is_match(gap))
    }
}

impl Default for MergeAdjacentAnnotations {
    fn default() -> Self {
        Self {
            slack: Regex::new(&format!(r"\A(?:{DEFAULT_SLACK_PATTERN})\z"))
                .expect("default slack pattern is valid"),
        }
    }
}

impl AnnotationProcessor for MergeAdjacentAnnotations {
    fn process(&self, annotations: Vec<Annotation>, document: &Document) -> Result<Vec<Annotation>> {
        self.merge(annotations, document)
    }

    fn name(&self) -> &str {
        "merge_adjacent_annotations"
    }
}
