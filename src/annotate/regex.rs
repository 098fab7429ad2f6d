//! Regex-based annotator

use super::Annotator;
use crate::domain::{Annotation, Category, DeidError, Document, Result};
use regex::{Regex, RegexBuilder};

/// Annotates every match of a set of regular expressions with one category
#[derive(Debug, Clone)]
pub struct RegexAnnotator {
    category: Category,
    patterns: Vec<Regex>,
    /// Capture group to annotate instead of the whole match
    group: Option<usize>,
}

impl RegexAnnotator {
    /// Compile a regex annotator
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Pattern`] if any pattern fails to compile.
    pub fn new(
        category: Category,
        patterns: &[String],
        group: Option<usize>,
        case_insensitive: bool,
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(case_insensitive)
                    .build()
                    .map_err(|e| DeidError::Pattern(format!("Invalid regex '{p}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            category,
            patterns,
            group,
        })
    }

    /// Build from already compiled patterns
    pub fn with_patterns(category: Category, patterns: Vec<Regex>) -> Self {
        Self {
            category,
            patterns,
            group: None,
        }
    }
}

impl Annotator for RegexAnnotator {
    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>> {
        let mut annotations = Vec::new();
        let group = self.group.unwrap_or(0);

        for pattern in &self.patterns {
            for captures in pattern.captures_iter(document.text()) {
                let Some(matched) = captures.get(group) else {
                    continue;
                };
                if matched.is_empty() {
                    continue;
                }
                annotations.push(document.annotation_from_bytes(
                    matched.start(),
                    matched.end(),
                    self.category,
                )?);
            }
        }

        Ok(annotations)
    }

    fn category(&self) -> Category {
        self.category
    }
}
