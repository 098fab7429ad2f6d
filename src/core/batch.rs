//! Concurrent batch de-identification
//!
//! Documents are de-identified on tokio's blocking pool, at most
//! `concurrency` at a time. A failing document only fails its own outcome.

use super::pipeline::{DeidentifiedDocument, Deidentifier};
use super::report::BatchReport;
use crate::domain::{DeidError, Document, DocumentId, Metadata, Result};
use crate::{log_batch_progress, log_error_with_context};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One document to de-identify
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub id: DocumentId,
    pub text: String,
    pub metadata: Metadata,
}

impl BatchInput {
    pub fn new(id: DocumentId, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id,
            text: text.into(),
            metadata,
        }
    }
}

/// Result for one document of a batch
#[derive(Debug)]
pub struct DocumentOutcome {
    pub id: DocumentId,
    pub result: Result<DeidentifiedDocument>,
    pub duration: Duration,
}

/// Output of a batch run, outcomes in input order
#[derive(Debug)]
pub struct BatchOutput {
    pub outcomes: Vec<DocumentOutcome>,
    pub report: BatchReport,
}

/// Runs a shared [`Deidentifier`] over many documents
pub struct BatchProcessor {
    deidentifier: Arc<Deidentifier>,
    concurrency: usize,
}

impl BatchProcessor {
    /// `concurrency` is clamped to at least 1
    pub fn new(deidentifier: Arc<Deidentifier>, concurrency: usize) -> Self {
        Self {
            deidentifier,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// De-identify every input
    ///
    /// `annotators_enabled` applies to all documents; `None` uses the
    /// pipeline's defaults.
    pub async fn process(
        &self,
        inputs: Vec<BatchInput>,
        annotators_enabled: Option<Vec<String>>,
    ) -> BatchOutput {
        let total = inputs.len();
        let annotators_enabled = annotators_enabled.map(Arc::new);

        tracing::info!(
            documents = total,
            concurrency = self.concurrency,
            "Starting batch"
        );
        let started = Instant::now();

        let outcomes: Vec<DocumentOutcome> = stream::iter(inputs)
            .map(|input| {
                let deidentifier = Arc::clone(&self.deidentifier);
                let annotators_enabled = annotators_enabled.clone();
                async move { run_one(deidentifier, input, annotators_enabled).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = BatchReport::new();
        for (index, outcome) in outcomes.iter().enumerate() {
            let duration_ms = outcome.duration.as_millis() as u64;
            match &outcome.result {
                Ok(document) => report.add_success(document, duration_ms),
                Err(e) => {
                    let context = format!("Failed to de-identify document {}", outcome.id);
                    log_error_with_context!(e, context.as_str());
                    report.add_failure(&outcome.id, e, duration_ms);
                }
            }
            log_batch_progress!(index + 1, total);
        }

        tracing::info!(
            documents = total,
            successful = report.successful,
            failed = report.failed,
            duration_ms = started.elapsed().as_millis() as u64,
            "Batch completed"
        );

        BatchOutput { outcomes, report }
    }
}

async fn run_one(
    deidentifier: Arc<Deidentifier>,
    input: BatchInput,
    annotators_enabled: Option<Arc<Vec<String>>>,
) -> DocumentOutcome {
    let id = input.id.clone();
    let started = Instant::now();

    let joined = tokio::task::spawn_blocking(move || {
        let document = Document::with_id(input.id, input.text, input.metadata);
        deidentifier.deidentify_document(document, annotators_enabled.as_deref().map(Vec::as_slice))
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(e) => Err(DeidError::Internal(format!("De-identification task failed: {e}"))),
    };

    DocumentOutcome {
        id,
        result,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::AnnotatorLibrary;

    fn processor(concurrency: usize) -> BatchProcessor {
        let library = AnnotatorLibrary::from_toml(
            r#"
[annotators.date]
kind = "regex"
category = "date"
patterns = ['\b\d{2}-\d{2}-\d{4}\b']

[annotators.markup]
kind = "regex"
category = "url"
patterns = ['<[a-z]+>']
"#,
        )
        .unwrap();
        BatchProcessor::new(Arc::new(Deidentifier::new(library)), concurrency)
    }

    fn input(id: &str, text: &str) -> BatchInput {
        BatchInput::new(DocumentId::new(id).unwrap(), text, Metadata::default())
    }

    #[tokio::test]
    async fn test_outcomes_in_input_order() {
        let inputs = (0..10)
            .map(|i| input(&format!("doc-{i}"), &format!("Gezien op 0{i}-01-2020")))
            .collect();

        let output = processor(3).process(inputs, None).await;

        assert_eq!(output.outcomes.len(), 10);
        for (i, outcome) in output.outcomes.iter().enumerate() {
            assert_eq!(outcome.id.as_str(), format!("doc-{i}"));
            assert_eq!(outcome.result.as_ref().unwrap().redacted_text, "Gezien op <DATE-1>");
        }
        assert_eq!(output.report.successful, 10);
        assert_eq!(output.report.annotations_by_category.get("DATE"), Some(&10));
    }

    #[tokio::test]
    async fn test_failure_isolated() {
        let inputs = vec![
            input("first", "01-01-2020"),
            input("markup", "zie <b>bijlage"),
            input("last", "02-01-2020"),
        ];
        let output = processor(2).process(inputs, None).await;

        assert_eq!(output.report.successful, 2);
        assert_eq!(output.report.failed, 1);
        assert!(output.outcomes[0].result.is_ok());
        assert!(matches!(
            output.outcomes[1].result,
            Err(DeidError::PreconditionViolation(_))
        ));
        assert!(output.outcomes[2].result.is_ok());
        assert_eq!(output.report.failures[0].document_id, "markup");
    }

    #[tokio::test]
    async fn test_unknown_annotator_fails_every_document() {
        let inputs = vec![input("a", "01-01-2020"), input("b", "geen datum")];
        let output = processor(2)
            .process(inputs, Some(vec!["unknown".to_string()]))
            .await;

        assert_eq!(output.report.failed, 2);
        assert!(output
            .outcomes
            .iter()
            .all(|o| matches!(o.result, Err(DeidError::UnknownAnnotator(_)))));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let output = processor(4).process(Vec::new(), None).await;
        assert!(output.outcomes.is_empty());
        assert_eq!(output.report.total_documents, 0);
    }

    #[test]
    fn test_concurrency_clamped() {
        assert_eq!(processor(0).concurrency(), 1);
    }
}
