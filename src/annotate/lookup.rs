//! Term-list annotator

use super::regex::RegexAnnotator;
use super::Annotator;
use crate::domain::{Annotation, Category, DeidError, Document, Result};
use regex::RegexBuilder;

/// Annotates occurrences of listed terms on word boundaries.
///
/// Longer terms are tried first, so "Den Haag" wins over "Den".
#[derive(Debug, Clone)]
pub struct LookupAnnotator {
    category: Category,
    term_count: usize,
    /// `None` when the term list is empty
    matcher: Option<RegexAnnotator>,
}

impl LookupAnnotator {
    /// Build a lookup annotator from a term list
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Pattern`] if the combined term pattern is too large to compile.
    pub fn new(category: Category, terms: &[String], case_insensitive: bool) -> Result<Self> {
        let mut sorted: Vec<&str> = terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        sorted.dedup();

        let matcher = if sorted.is_empty() {
            None
        } else {
            let alternation = sorted
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| DeidError::Pattern(format!("Invalid lookup list: {e}")))?;
            Some(RegexAnnotator::with_patterns(category, vec![regex]))
        };

        Ok(Self {
            category,
            term_count: sorted.len(),
            matcher,
        })
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.term_count
    }
}

impl Annotator for LookupAnnotator {
    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>> {
        match &self.matcher {
            Some(matcher) => matcher.annotate(document),
            None => Ok(Vec::new()),
        }
    }

    fn category(&self) -> Category {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_longest_term_first() {
        let annotator =
            LookupAnnotator::new(Category::Location, &terms(&["Den", "Den Haag"]), false).unwrap();
        let doc = Document::new("Verhuisd naar Den Haag.", Metadata::default());

        let annotations = annotator.annotate(&doc).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].text(), "Den Haag");
    }

    #[test]
    fn test_word_boundaries() {
        let annotator = LookupAnnotator::new(Category::Name, &terms(&["Jan"]), false).unwrap();
        let doc = Document::new("Jansen en Jan", Metadata::default());

        let annotations = annotator.annotate(&doc).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].start_char(), 10);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let annotator =
            LookupAnnotator::new(Category::Institution, &terms(&["Altrecht"]), true).unwrap();
        let doc = Document::new("Opgenomen in ALTRECHT", Metadata::default());
        assert_eq!(annotator.annotate(&doc).unwrap().len(), 1);
    }

    #[test]
    fn test_terms_escaped_and_deduplicated() {
        let annotator =
            LookupAnnotator::new(Category::Institution, &terms(&["U.M.C.", "U.M.C.", " "]), false)
                .unwrap();
        assert_eq!(annotator.term_count(), 1);
        let doc = Document::new("UxMxCx", Metadata::default());
        assert!(annotator.annotate(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_empty_term_list() {
        let annotator = LookupAnnotator::new(Category::Name, &[], false).unwrap();
        let doc = Document::new("Jan Jansen", Metadata::default());
        assert!(annotator.annotate(&doc).unwrap().is_empty());
    }
}
