//! Annotation categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of sensitive information carried by an annotation.
///
/// The set is closed: annotator libraries and configuration files are
/// validated against it when they are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The document's own patient; never fuzzy-clustered
    Patient,
    /// Person names other than the patient
    Name,
    /// Residences, streets, postal codes
    Location,
    /// Hospitals, practices and other care institutions
    Institution,
    /// Dates
    Date,
    /// Ages
    Age,
    /// Patient numbers and other record identifiers
    PatientNumber,
    /// Telephone numbers
    PhoneNumber,
    /// URLs and e-mail addresses
    Url,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 9] = [
        Category::Patient,
        Category::Name,
        Category::Location,
        Category::Institution,
        Category::Date,
        Category::Age,
        Category::PatientNumber,
        Category::PhoneNumber,
        Category::Url,
    ];

    /// Categories that take part in fuzzy clustering, in clustering order
    pub const CLUSTERED: [Category; 8] = [
        Category::Name,
        Category::Location,
        Category::Institution,
        Category::Date,
        Category::Age,
        Category::PatientNumber,
        Category::PhoneNumber,
        Category::Url,
    ];

    /// Uppercase label used inside redaction markers
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "PATIENT",
            Self::Name => "NAME",
            Self::Location => "LOCATION",
            Self::Institution => "INSTITUTION",
            Self::Date => "DATE",
            Self::Age => "AGE",
            Self::PatientNumber => "PATIENT_NUMBER",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Url => "URL",
        }
    }

    /// Whether occurrences of this category are numbered by fuzzy clustering
    pub fn is_clustered(&self) -> bool {
        !matches!(self, Self::Patient)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label() == upper)
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("phone_number".parse::<Category>().unwrap(), Category::PhoneNumber);
        assert_eq!(" Name ".parse::<Category>().unwrap(), Category::Name);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("persoon".parse::<Category>().is_err());
    }

    #[test]
    fn test_patient_not_clustered() {
        assert!(!Category::Patient.is_clustered());
        assert!(!Category::CLUSTERED.contains(&Category::Patient));
        assert!(Category::CLUSTERED.iter().all(|c| c.is_clustered()));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Category::PatientNumber).unwrap();
        assert_eq!(json, "\"patient_number\"");
        let parsed: Category = serde_json::from_str("\"url\"").unwrap();
        assert_eq!(parsed, Category::Url);
    }
}
