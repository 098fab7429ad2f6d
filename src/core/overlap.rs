//! Overlap resolution
//!
//! Greedy interval selection where longer spans win: candidates are visited
//! longest first and kept only if they overlap nothing kept so far. Category
//! plays no part in conflict resolution, only geometry does.

use super::processor::AnnotationProcessor;
use crate::domain::{Annotation, Document, Result};
use std::cmp::Ordering;

/// Selects a non-overlapping subset of annotations, preferring longer spans
#[derive(Debug, Clone, Default)]
pub struct OverlapResolver;

impl OverlapResolver {
    /// Create a new overlap resolver
    pub fn new() -> Self {
        Self
    }

    /// Priority order: length descending, then position ascending
    fn priority(a: &Annotation, b: &Annotation) -> Ordering {
        b.len().cmp(&a.len()).then_with(|| a.cmp_by_position(b))
    }

    /// Resolve overlaps, returning the kept annotations sorted by position
    pub fn resolve(&self, mut annotations: Vec<Annotation>) -> Vec<Annotation> {
        annotations.sort_by(Self::priority);

        // Kept spans, sorted by start so a lookup is a binary search.
        let mut kept: Vec<Annotation> = Vec::with_capacity(annotations.len());

        for candidate in annotations {
            let idx = kept.partition_point(|k| k.start_char() < candidate.start_char());
            let clashes_before = idx > 0 && kept[idx - 1].overlaps(&candidate);
            let clashes_after = idx < kept.len() && kept[idx].overlaps(&candidate);

            if clashes_before || clashes_after {
                tracing::trace!(
                    start_char = candidate.start_char(),
                    end_char = candidate.end_char(),
                    tag = %candidate.tag(),
                    "Discarding overlapping annotation"
                );
                continue;
            }
            kept.insert(idx, candidate);
        }

        kept
    }
}

impl AnnotationProcessor for OverlapResolver {
    fn process(&self, annotations: Vec<Annotation>, _document: &Document) -> Result<Vec<Annotation>> {
        Ok(self.resolve(annotations))
    }

    fn name(&self) -> &str {
        "overlap_resolver"
    }
}
