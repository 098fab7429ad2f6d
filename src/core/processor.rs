//! Annotation post-processing seam

use crate::domain::{Annotation, Document, Result};

/// A consolidation stage that turns one annotation set into another.
///
/// Processors run in sequence after all annotators have finished. Each one
/// receives the full output of the previous stage and must return a fully
/// materialized set.
pub trait AnnotationProcessor: Send + Sync {
    /// Process the annotations of `document`
    fn process(&self, annotations: Vec<Annotation>, document: &Document) -> Result<Vec<Annotation>>;

    /// Stage name used in logs
    fn name(&self) -> &str;
}
