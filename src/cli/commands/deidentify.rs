//! Deidentify command implementation

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_DOCUMENT_FAILURES, EXIT_OK};
use crate::config::DeidConfig;
use crate::core::{BatchInput, BatchProcessor, DeidentifiedDocument, Deidentifier};
use crate::domain::{DocumentId, Metadata, Person};
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Redacted text with numbered markers
    #[default]
    Text,
    /// Full result as JSON, including the original text and annotations
    Json,
    /// Original text with <TAG>value</TAG> markup
    Intext,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Text => "deid.txt",
            Self::Json => "deid.json",
            Self::Intext => "intext.txt",
        }
    }

    fn render(&self, document: &DeidentifiedDocument) -> anyhow::Result<String> {
        Ok(match self {
            Self::Text => document.redacted_text.clone(),
            Self::Json => serde_json::to_string_pretty(document)?,
            Self::Intext => document.render_intext()?,
        })
    }
}

/// Arguments for the deidentify command
#[derive(Args, Debug, Default)]
pub struct DeidentifyArgs {
    /// Text files to de-identify; stdin when none are given
    pub files: Vec<PathBuf>,

    /// Annotators to run (comma-separated), overriding the configured defaults
    #[arg(long, value_delimiter = ',')]
    pub annotators: Option<Vec<String>>,

    /// Patient first names, space-separated
    #[arg(long)]
    pub patient_first_names: Option<String>,

    /// Patient initials, e.g. J.P.
    #[arg(long)]
    pub patient_initials: Option<String>,

    /// Patient surname
    #[arg(long)]
    pub patient_surname: Option<String>,

    /// Name the patient goes by
    #[arg(long)]
    pub patient_given_name: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write one output file per input into this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write a JSON batch report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl DeidentifyArgs {
    /// Patient metadata from the command-line fields
    pub fn metadata(&self) -> Metadata {
        let patient = Person {
            first_names: self
                .patient_first_names
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(String::from)
                .collect(),
            initials: self.patient_initials.clone(),
            surname: self.patient_surname.clone(),
            given_name: self.patient_given_name.clone(),
        };

        if patient.is_empty() {
            Metadata::default()
        } else {
            Metadata::with_patient(patient)
        }
    }

    /// Execute the deidentify command
    pub async fn execute(&self, config: &DeidConfig) -> anyhow::Result<i32> {
        let deidentifier = match Deidentifier::from_config(config) {
            Ok(d) => Arc::new(d),
            Err(e) => {
                eprintln!("❌ Failed to build de-identification pipeline: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if self.files.is_empty() {
            return self.execute_stdin(&deidentifier);
        }

        let mut inputs = Vec::with_capacity(self.files.len());
        let mut unreadable = 0usize;
        for (path, id) in self.files.iter().zip(document_ids(&self.files)) {
            match tokio::fs::read_to_string(path).await {
                Ok(text) => inputs.push(BatchInput::new(id, text, self.metadata())),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to read input file");
                    eprintln!("❌ {}: {e}", path.display());
                    unreadable += 1;
                }
            }
        }

        if let Some(dir) = &self.output_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        let processor = BatchProcessor::new(deidentifier, config.pipeline.batch_concurrency);
        let output = processor.process(inputs, self.annotators.clone()).await;

        for outcome in &output.outcomes {
            match &outcome.result {
                Ok(document) => self.emit(document).await?,
                Err(e) => eprintln!("❌ {}: {e}", outcome.id),
            }
        }

        eprint!("{}", output.report.format_console());

        if let Some(path) = &self.report {
            output
                .report
                .write_to_file(path)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
        }

        if output.report.is_successful() && unreadable == 0 {
            Ok(EXIT_OK)
        } else {
            Ok(EXIT_DOCUMENT_FAILURES)
        }
    }

    fn execute_stdin(&self, deidentifier: &Deidentifier) -> anyhow::Result<i32> {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;

        match deidentifier.deidentify(&text, self.annotators.as_deref(), self.metadata()) {
            Ok(document) => {
                println!("{}", self.format.render(&document)?);
                Ok(EXIT_OK)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                Ok(EXIT_DOCUMENT_FAILURES)
            }
        }
    }

    async fn emit(&self, document: &DeidentifiedDocument) -> anyhow::Result<()> {
        let rendered = self.format.render(document)?;
        match &self.output_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.{}", document.id, self.format.extension()));
                tokio::fs::write(&path, rendered)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::debug!(document_id = %document.id, path = %path.display(), "Output written");
            }
            None => {
                if self.files.len() > 1 {
                    println!("==> {} <==", document.id);
                }
                println!("{rendered}");
            }
        }
        Ok(())
    }
}

/// File stem as document id, falling back to a generated one
fn document_id(path: &Path) -> DocumentId {
    path.file_stem()
        .and_then(|stem| DocumentId::new(stem.to_string_lossy()).ok())
        .unwrap_or_else(DocumentId::generate)
}

/// Document ids for a batch, unique even when file stems repeat
///
/// A repeated stem gets the first free `-N` suffix, starting at 2, so output
/// files and report entries never collide.
fn document_ids(paths: &[PathBuf]) -> Vec<DocumentId> {
    let mut used: HashSet<String> = HashSet::with_capacity(paths.len());
    paths
        .iter()
        .map(|path| {
            let id = document_id(path);
            if used.insert(id.as_str().to_string()) {
                return id;
            }
            let unique = (2..)
                .map(|n| format!("{id}-{n}"))
                .find(|candidate| !used.contains(candidate))
                .map(|candidate| {
                    used.insert(candidate.clone());
                    DocumentId::new(candidate)
                });
            match unique {
                Some(Ok(id)) => {
                    tracing::debug!(path = %path.display(), document_id = %id, "Repeated file stem renamed");
                    id
                }
                _ => DocumentId::generate(),
            }
        })
        .collect()
}
