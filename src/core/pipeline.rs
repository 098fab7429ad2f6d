//! De-identification pipeline
//!
//! [`Deidentifier`] ties the stages together for one document:
//!
//! 1. run the selected annotators and validate their spans
//! 2. resolve overlaps, longest span first
//! 3. merge same-category neighbours separated by slack
//! 4. redact with `<TAG value>` markers
//! 5. number the markers per category with fuzzy clustering
//!
//! Every stage runs to completion before the next starts, and any error
//! aborts the document without partial output.
//!
//! # Example
//!
//! ```rust,no_run
//! use deid::core::Deidentifier;
//! use deid::annotate::AnnotatorLibrary;
//! use deid::domain::Metadata;
//!
//! # fn example() -> deid::domain::Result<()> {
//! let deidentifier = Deidentifier::new(AnnotatorLibrary::default_library()?);
//! let result = deidentifier.deidentify("Gezien op 12-03-2020", None, Metadata::default())?;
//! assert_eq!(result.redacted_text, "Gezien op <DATE-1>");
//! # Ok(())
//! # }
//! ```

use super::cluster::{TagClusterer, DEFAULT_MAX_EDIT_DISTANCE};
use super::merge::MergeAdjacentAnnotations;
use super::overlap::OverlapResolver;
use super::processor::AnnotationProcessor;
use super::redact::{render_intext, Redactor, RenderMode};
use crate::annotate::AnnotatorLibrary;
use crate::audit::AuditLogger;
use crate::config::DeidConfig;
use crate::domain::{Annotation, Document, DocumentId, Metadata, Result};
use crate::log_stage_complete;
use serde::Serialize;
use std::time::Instant;

/// Output of de-identifying one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeidentifiedDocument {
    pub id: DocumentId,
    /// Original text
    pub text: String,
    /// Text with `<CATEGORY-N>` and `<PATIENT>` markers
    pub redacted_text: String,
    /// Consolidated annotations, sorted by position
    pub annotations: Vec<Annotation>,
}

impl DeidentifiedDocument {
    /// The original text with `<TAG>value</TAG>` markup
    pub fn render_intext(&self) -> Result<String> {
        render_intext(&self.text, &self.annotations)
    }
}

/// De-identification pipeline
///
/// Built explicitly from an [`AnnotatorLibrary`] or a [`DeidConfig`] and
/// shared by reference or `Arc`; it holds no per-document state.
pub struct Deidentifier {
    library: AnnotatorLibrary,
    default_annotators: Vec<String>,
    resolver: OverlapResolver,
    merger: MergeAdjacentAnnotations,
    redactor: Redactor,
    clusterer: TagClusterer,
    audit_logger: Option<AuditLogger>,
}

impl Deidentifier {
    /// Pipeline with default settings that runs every annotator in `library`
    pub fn new(library: AnnotatorLibrary) -> Self {
        let default_annotators = library.names().into_iter().map(String::from).collect();
        Self {
            library,
            default_annotators,
            resolver: OverlapResolver::new(),
            merger: MergeAdjacentAnnotations::default(),
            redactor: Redactor::new(RenderMode::Tagged),
            clusterer: TagClusterer::new(DEFAULT_MAX_EDIT_DISTANCE),
            audit_logger: None,
        }
    }

    /// Pipeline from configuration
    ///
    /// Loads the configured annotator library (or the built-in one) and
    /// checks the default annotator names against it.
    ///
    /// # Errors
    ///
    /// Fails if the library cannot be loaded, a default annotator is unknown,
    /// the slack pattern is invalid, or the audit log cannot be created.
    pub fn from_config(config: &DeidConfig) -> Result<Self> {
        let library = match &config.annotators.library {
            Some(path) => AnnotatorLibrary::from_file(path)?,
            None => AnnotatorLibrary::default_library()?,
        };

        let mut deidentifier = Self::new(library)
            .with_slack_pattern(&config.pipeline.slack_pattern)?
            .with_edit_distance(config.pipeline.edit_distance_threshold);

        if let Some(names) = &config.pipeline.annotators_enabled {
            deidentifier = deidentifier.with_default_annotators(names.clone())?;
        }

        if config.audit.enabled {
            let logger = AuditLogger::new(&config.audit.log_path, config.audit.json_format)?;
            deidentifier = deidentifier.with_audit_logger(logger);
        }

        tracing::info!(
            annotators = deidentifier.library.len(),
            default_annotators = deidentifier.default_annotators.len(),
            edit_distance = deidentifier.clusterer.max_distance(),
            audit = deidentifier.audit_logger.is_some(),
            "De-identification pipeline ready"
        );

        Ok(deidentifier)
    }

    /// Annotators used when a call names none
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::DeidError::UnknownAnnotator`] for a name missing from the library.
    pub fn with_default_annotators(mut self, names: Vec<String>) -> Result<Self> {
        self.library.select(&names)?;
        self.default_annotators = names;
        Ok(self)
    }

    /// Replace the merge slack pattern
    pub fn with_slack_pattern(mut self, slack_pattern: &str) -> Result<Self> {
        self.merger = MergeAdjacentAnnotations::new(slack_pattern)?;
        Ok(self)
    }

    /// Replace the clustering edit-distance threshold
    pub fn with_edit_distance(mut self, max_distance: usize) -> Self {
        self.clusterer = TagClusterer::new(max_distance);
        self
    }

    pub fn with_audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    pub fn library(&self) -> &AnnotatorLibrary {
        &self.library
    }

    pub fn default_annotators(&self) -> &[String] {
        &self.default_annotators
    }

    pub fn clusterer(&self) -> &TagClusterer {
        &self.clusterer
    }

    fn processors(&self) -> [&dyn AnnotationProcessor; 2] {
        [&self.resolver, &self.merger]
    }

    /// Run annotators and consolidation, storing the result on `document`
    ///
    /// `annotators_enabled = None` selects the default annotators. All names
    /// are checked before any annotator runs.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::DeidError::UnknownAnnotator`] for an unknown name
    /// - [`crate::domain::DeidError::MalformedSpan`] if an annotator returns a
    ///   span that does not fit the document
    pub fn annotate(&self, document: &mut Document, annotators_enabled: Option<&[String]>) -> Result<()> {
        let names = annotators_enabled.unwrap_or(self.default_annotators.as_slice());
        let selected = self.library.select(names)?;

        // Contextual annotators see everything the others found
        let (contextual, independent): (Vec<_>, Vec<_>) =
            selected.iter().partition(|(_, annotator)| annotator.is_contextual());

        let mut candidates: Vec<Annotation> = Vec::new();
        for (name, annotator) in independent.into_iter().chain(contextual) {
            let found = annotator.annotate_with_context(document, &candidates)?;
            for annotation in &found {
                document.validate_annotation(annotation)?;
            }
            tracing::trace!(
                document_id = %document.id(),
                annotator = %name,
                found = found.len(),
                "Annotator finished"
            );
            candidates.extend(found);
        }

        let consolidated = self.consolidate(candidates, document)?;
        document.set_annotations(consolidated);
        Ok(())
    }

    /// Run the consolidation stages over candidate annotations of `document`
    pub fn consolidate(&self, mut annotations: Vec<Annotation>, document: &Document) -> Result<Vec<Annotation>> {
        for processor in self.processors() {
            let started = Instant::now();
            let input = annotations.len();
            annotations = processor.process(annotations, document)?;
            log_stage_complete!(processor.name(), input, annotations.len(), started.elapsed());
        }
        Ok(annotations)
    }

    /// De-identify a text
    ///
    /// # Errors
    ///
    /// See [`Deidentifier::annotate`]; redaction and audit errors propagate too.
    pub fn deidentify(
        &self,
        text: &str,
        annotators_enabled: Option<&[String]>,
        metadata: Metadata,
    ) -> Result<DeidentifiedDocument> {
        self.deidentify_document(Document::new(text, metadata), annotators_enabled)
    }

    /// De-identify a document, keeping its identifier
    pub fn deidentify_document(
        &self,
        mut document: Document,
        annotators_enabled: Option<&[String]>,
    ) -> Result<DeidentifiedDocument> {
        let started = Instant::now();

        self.annotate(&mut document, annotators_enabled)?;
        let annotations = document.take_annotations();

        let tagged = self.redactor.redact(document.text(), &annotations)?;
        let redacted_text = self.clusterer.cluster(&tagged);

        let result = DeidentifiedDocument {
            id: document.id().clone(),
            text: document.text().to_string(),
            redacted_text,
            annotations,
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        if let Some(logger) = &self.audit_logger {
            logger.log_document(&result, duration_ms)?;
        }

        tracing::info!(
            document_id = %result.id,
            annotations = result.annotations.len(),
            duration_ms,
            "Document de-identified"
        );

        Ok(result)
    }

    /// Redact with `<TAG value>` markers, without clustering
    pub fn redact_tagged(&self, text: &str, annotations: &[Annotation]) -> Result<String> {
        self.redactor.redact(text, annotations)
    }
}
