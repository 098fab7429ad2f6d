//! Patient-identity annotator
//!
//! Matches the patient's own name fields from document metadata against the
//! token stream. Comparison is case-insensitive; name parts of at least
//! [`FUZZY_MIN_CHARS`] chars also match with one edit, to catch typos.

use super::tokenizer::{Token, Tokenizer, WordTokenizer};
use super::Annotator;
use crate::core::cluster::within_distance;
use crate::domain::{Annotation, Category, Document, Person, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name parts shorter than this are matched exactly
pub const FUZZY_MIN_CHARS: usize = 5;

/// Which patient field an annotator matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientField {
    /// Any of the first names
    FirstName,
    /// The initial of any first name, with its period when present
    InitialFromName,
    /// Initials exactly as supplied, e.g. `J.A.`
    Initials,
    /// Given name
    GivenName,
    /// Surname, possibly several words
    Surname,
}

/// Annotates mentions of the patient, tagged [`Category::Patient`]
#[derive(Clone)]
pub struct PatientAnnotator {
    field: PatientField,
    tokenizer: Arc<dyn Tokenizer>,
}

impl PatientAnnotator {
    pub fn new(field: PatientField) -> Self {
        Self::with_tokenizer(field, Arc::new(WordTokenizer::new()))
    }

    pub fn with_tokenizer(field: PatientField, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { field, tokenizer }
    }

    pub fn field(&self) -> PatientField {
        self.field
    }

    /// Phrases to look for, each already tokenized
    fn phrases(&self, patient: &Person) -> Vec<Vec<Token>> {
        let raw: Vec<String> = match self.field {
            PatientField::FirstName => patient.first_names.clone(),
            PatientField::InitialFromName => {
                let mut initials: Vec<String> = patient
                    .first_names
                    .iter()
                    .filter_map(|name| name.chars().next())
                    .map(|c| c.to_uppercase().collect())
                    .collect();
                initials.dedup();
                initials
            }
            PatientField::Initials => patient.initials.iter().cloned().collect(),
            PatientField::GivenName => patient.given_name.iter().cloned().collect(),
            PatientField::Surname => patient.surname.iter().cloned().collect(),
        };

        raw.iter()
            .map(|phrase| self.tokenizer.tokenize(phrase))
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }

    fn part_matches(&self, expected: &str, actual: &str) -> bool {
        if matches!(self.field, PatientField::Initials | PatientField::InitialFromName) {
            return expected == actual;
        }
        let expected = expected.to_lowercase();
        let actual = actual.to_lowercase();
        if expected == actual {
            return true;
        }
        expected.chars().count() >= FUZZY_MIN_CHARS && within_distance(&expected, &actual, 1)
    }
}

impl Annotator for PatientAnnotator {
    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>> {
        let Some(patient) = document.metadata().patient.as_ref() else {
            return Ok(Vec::new());
        };

        let phrases = self.phrases(patient);
        if phrases.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = self.tokenizer.tokenize(document.text());
        let mut annotations = Vec::new();

        for phrase in &phrases {
            if phrase.len() > tokens.len() {
                continue;
            }
            for (index, window) in tokens.windows(phrase.len()).enumerate() {
                let matched = window
                    .iter()
                    .zip(phrase)
                    .all(|(actual, expected)| self.part_matches(&expected.text, &actual.text));
                if matched {
                    let start = window[0].start_char;
                    let mut end = window[window.len() - 1].end_char;
                    if self.field == PatientField::InitialFromName {
                        // Take the period of "J." along
                        if let Some(next) = tokens.get(index + phrase.len()) {
                            if next.text == "." && next.start_char == end {
                                end = next.end_char;
                            }
                        }
                    }
                    annotations.push(document.annotation(start, end, Category::Patient)?);
                }
            }
        }

        Ok(annotations)
    }

    fn category(&self) -> Category {
        Category::Patient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;

    fn patient() -> Metadata {
        Metadata::with_patient(Person {
            first_names: vec!["Johannes".to_string(), "Pieter".to_string()],
            initials: Some("J.P.".to_string()),
            surname: Some("de Vries".to_string()),
            given_name: Some("Hans".to_string()),
        })
    }

    fn texts(annotations: &[Annotation]) -> Vec<&str> {
        annotations.iter().map(|a| a.text()).collect()
    }

    #[test]
    fn test_surname_multiword() {
        let doc = Document::new("Dhr. de Vries en mevr. De Vries", patient());
        let annotations = PatientAnnotator::new(PatientField::Surname).annotate(&doc).unwrap();
        assert_eq!(texts(&annotations), vec!["de Vries", "De Vries"]);
        assert!(annotations.iter().all(|a| a.tag() == Category::Patient));
    }

    #[test]
    fn test_first_names_with_typo() {
        let doc = Document::new("Johanes en Pieter kwamen", patient());
        let annotations = PatientAnnotator::new(PatientField::FirstName).annotate(&doc).unwrap();
        assert_eq!(texts(&annotations), vec!["Johanes", "Pieter"]);
    }

    #[test]
    fn test_short_names_exact_only() {
        let doc = Document::new("Hans, Hank en hans", patient());
        let annotations = PatientAnnotator::new(PatientField::GivenName).annotate(&doc).unwrap();
        assert_eq!(texts(&annotations), vec!["Hans", "hans"]);
    }

    #[test]
    fn test_initials_case_sensitive() {
        let doc = Document::new("Gezien: J.P. de Vries, j.p. niet", patient());
        let annotations = PatientAnnotator::new(PatientField::Initials).annotate(&doc).unwrap();
        assert_eq!(texts(&annotations), vec!["J.P."]);
    }

    #[test]
    fn test_initial_from_first_name() {
        let doc = Document::new("Gezien: J. de Vries, P de Vries, j. niet", patient());
        let annotations = PatientAnnotator::new(PatientField::InitialFromName)
            .annotate(&doc)
            .unwrap();
        assert_eq!(texts(&annotations), vec!["J.", "P"]);
    }

    #[test]
    fn test_no_patient_metadata() {
        let doc = Document::new("de Vries", Metadata::default());
        let annotations = PatientAnnotator::new(PatientField::Surname).annotate(&doc).unwrap();
        assert!(annotations.is_empty());
    }
}
