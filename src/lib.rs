// Deid - Clinical text de-identification
// Copyright (c) 2025 Deid Contributors
// Licensed under the MIT License

//! # deid - clinical text de-identification
//!
//! deid finds protected health information in free-text clinical documents,
//! such as names, dates, locations, phone numbers and URLs, and replaces each
//! occurrence with a numbered category marker like `<PATIENT-1>` or `<DATE-2>`.
//!
//! ## Pipeline
//!
//! 1. Named annotators from an [`annotate::AnnotatorLibrary`] propose
//!    candidate annotations.
//! 2. Overlapping candidates are resolved, longest first.
//! 3. Same-category annotations separated only by slack (a period, comma,
//!    hyphen or space) are merged.
//! 4. Every annotation is replaced with a `<TAG value>` marker.
//! 5. Marker values are clustered by edit distance and numbered per category,
//!    so `Jansen` and `Janssen` share `<NAME-1>`.
//!
//! ## Architecture
//!
//! - [`domain`] - Documents, annotations, categories and errors
//! - [`annotate`] - Annotators and the annotator library
//! - [`core`] - Consolidation, redaction, clustering and batch processing
//! - [`legacy`] - Deprecated group-based entry points
//! - [`audit`] - Per-document audit records
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deid::annotate::AnnotatorLibrary;
//! use deid::domain::{Metadata, Person};
//! use deid::Deidentifier;
//!
//! # fn main() -> deid::Result<()> {
//! let deidentifier = Deidentifier::new(AnnotatorLibrary::default_library()?);
//!
//! let patient = Person {
//!     surname: Some("Visscher".to_string()),
//!     ..Person::default()
//! };
//! let result = deidentifier.deidentify(
//!     "Mevr. Visscher is op 12-03-2020 gezien.",
//!     None,
//!     Metadata::with_patient(patient),
//! )?;
//!
//! println!("{}", result.redacted_text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`Result`], an alias over [`DeidError`]. Failures
//! are per document: a batch keeps going when one document fails.

pub mod annotate;
pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod legacy;
pub mod logging;

pub use crate::core::{cluster_tags, render_intext, DeidentifiedDocument, Deidentifier};
pub use domain::{Annotation, Category, DeidError, Result};
