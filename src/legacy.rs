//! Deprecated entry points
//!
//! Older callers select annotators with boolean groups and pass the patient's
//! name as loose strings. These functions translate that onto a
//! [`Deidentifier`] and return their value wrapped in [`Deprecated`], which
//! carries the deprecation notice. The notice is also logged.

use crate::core::{cluster_tags, Deidentifier};
use crate::domain::{Annotation, Document, Metadata, Person, Result};
use serde::{Deserialize, Serialize};

/// Annotator names behind each legacy group
pub const NAME_ANNOTATORS: &[&str] = &[
    "prefix_with_name",
    "interfix_with_name",
    "initial_with_capital",
    "initial_interfix",
    "first_name_lookup",
    "surname_lookup",
    "person_first_name",
    "person_initial_from_name",
    "person_initials",
    "person_given_name",
    "person_surname",
    "name_context",
];
pub const INSTITUTION_ANNOTATORS: &[&str] = &["institution", "altrecht"];
pub const LOCATION_ANNOTATORS: &[&str] = &["residence", "street_with_number", "postal_code", "postbus"];
pub const PHONE_NUMBER_ANNOTATORS: &[&str] = &["phone_1", "phone_2", "phone_3"];
pub const PATIENT_NUMBER_ANNOTATORS: &[&str] = &["patient_number"];
pub const DATE_ANNOTATORS: &[&str] = &["date_1", "date_2"];
pub const AGE_ANNOTATORS: &[&str] = &["age"];
pub const URL_ANNOTATORS: &[&str] = &["email", "url_1", "url_2"];

/// A value returned by a deprecated function, with the notice to show the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deprecated<T> {
    pub value: T,
    pub warning: String,
}

impl<T> Deprecated<T> {
    fn new(value: T, function: &str, replacement: &str) -> Self {
        let warning = format!("{function} is deprecated and will be removed, use {replacement} instead");
        tracing::warn!(function, replacement, "Deprecated function called");
        Self { value, warning }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Legacy options: patient name strings and annotator groups
///
/// Empty name strings mean "not given". All groups are enabled by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyOptions {
    /// First names separated by whitespace
    pub patient_first_names: String,
    pub patient_initials: String,
    pub patient_surname: String,
    pub patient_given_name: String,

    pub names: bool,
    pub institutions: bool,
    pub locations: bool,
    pub phone_numbers: bool,
    pub patient_numbers: bool,
    pub dates: bool,
    pub ages: bool,
    pub urls: bool,
}

impl Default for LegacyOptions {
    fn default() -> Self {
        Self {
            patient_first_names: String::new(),
            patient_initials: String::new(),
            patient_surname: String::new(),
            patient_given_name: String::new(),
            names: true,
            institutions: true,
            locations: true,
            phone_numbers: true,
            patient_numbers: true,
            dates: true,
            ages: true,
            urls: true,
        }
    }
}

impl LegacyOptions {
    /// Annotator names selected by the enabled groups
    pub fn annotator_names(&self) -> Vec<String> {
        let groups = [
            (self.names, NAME_ANNOTATORS),
            (self.institutions, INSTITUTION_ANNOTATORS),
            (self.locations, LOCATION_ANNOTATORS),
            (self.phone_numbers, PHONE_NUMBER_ANNOTATORS),
            (self.patient_numbers, PATIENT_NUMBER_ANNOTATORS),
            (self.dates, DATE_ANNOTATORS),
            (self.ages, AGE_ANNOTATORS),
            (self.urls, URL_ANNOTATORS),
        ];

        groups
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, names)| names.iter().map(|n| n.to_string()))
            .collect()
    }

    /// Metadata carrying the patient, if any name field is given
    pub fn metadata(&self) -> Metadata {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        let patient = Person {
            first_names: self
                .patient_first_names
                .split_whitespace()
                .map(String::from)
                .collect(),
            initials: non_empty(&self.patient_initials),
            surname: non_empty(&self.patient_surname),
            given_name: non_empty(&self.patient_given_name),
        };

        if patient.is_empty() {
            Metadata::default()
        } else {
            Metadata::with_patient(patient)
        }
    }
}

fn annotate(deidentifier: &Deidentifier, text: &str, options: &LegacyOptions) -> Result<Document> {
    let mut document = Document::new(text, options.metadata());
    let names = options.annotator_names();
    deidentifier.annotate(&mut document, Some(names.as_slice()))?;
    Ok(document)
}

/// Annotate `text` and return it with `<TAG value>` markers, not numbered
///
/// # Errors
///
/// Fails with [`crate::domain::DeidError::UnknownAnnotator`] if the
/// deidentifier's library lacks an annotator of an enabled group.
pub fn annotate_text(
    deidentifier: &Deidentifier,
    text: &str,
    options: &LegacyOptions,
) -> Result<Deprecated<String>> {
    let document = annotate(deidentifier, text, options)?;
    let tagged = deidentifier.redact_tagged(document.text(), document.annotations())?;
    Ok(Deprecated::new(tagged, "annotate_text", "Deidentifier::deidentify"))
}

/// Annotate `text` and return the consolidated annotations
pub fn annotate_text_structured(
    deidentifier: &Deidentifier,
    text: &str,
    options: &LegacyOptions,
) -> Result<Deprecated<Vec<Annotation>>> {
    let mut document = annotate(deidentifier, text, options)?;
    Ok(Deprecated::new(
        document.take_annotations(),
        "annotate_text_structured",
        "Deidentifier::deidentify",
    ))
}

/// Number the `<TAG value>` markers of already annotated text
pub fn deidentify_annotations(text: &str) -> Deprecated<String> {
    let value = if text.is_empty() {
        String::new()
    } else {
        cluster_tags(text)
    };
    Deprecated::new(value, "deidentify_annotations", "cluster_tags")
}
