//! Annotation consolidation and de-identification.
//!
//! # Modules
//!
//! - [`overlap`] - keeps a non-overlapping subset, longest spans first
//! - [`merge`] - joins same-category neighbours separated by slack text
//! - [`redact`] - rewrites text with annotation markers
//! - [`cluster`] - numbers tagged values per category with fuzzy matching
//! - [`pipeline`] - the [`Deidentifier`] running all stages for one document
//! - [`batch`] - concurrent processing of many documents
//! - [`report`] - batch summaries
//!
//! # Example
//!
//! ```rust
//! use deid::core::cluster_tags;
//!
//! let clustered = cluster_tags("<NAME Jansen> and <NAME Janssen> and <NAME Peters>");
//! assert_eq!(clustered, "<NAME-1> and <NAME-1> and <NAME-2>");
//! ```

pub mod batch;
pub mod cluster;
pub mod merge;
pub mod overlap;
pub mod pipeline;
pub mod processor;
pub mod redact;
pub mod report;

pub use batch::{BatchInput, BatchOutput, BatchProcessor, DocumentOutcome};
pub use cluster::{cluster_tags, TagClusterer};
pub use merge::MergeAdjacentAnnotations;
pub use overlap::OverlapResolver;
pub use pipeline::{DeidentifiedDocument, Deidentifier};
pub use processor::AnnotationProcessor;
pub use redact::{render_intext, Redactor, RenderMode};
pub use report::BatchReport;
