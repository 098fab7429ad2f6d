//! Context annotator
//!
//! Claims text right next to annotations the other annotators found. An
//! `after` pattern is anchored at the end of a seed annotation, a `before`
//! pattern at its start. Every claimed span seeds the next round, so a chain
//! like `Jan` + `de Vries` + `Bakker` is followed until nothing new turns up.

use super::Annotator;
use crate::domain::{Annotation, Category, DeidError, Document, Result};
use regex::Regex;
use std::collections::HashSet;

/// Annotates text adjacent to annotations of the seed categories
#[derive(Debug, Clone)]
pub struct ContextAnnotator {
    category: Category,
    seeds: Vec<Category>,
    after: Option<Regex>,
    before: Option<Regex>,
}

impl ContextAnnotator {
    /// Compile a context annotator
    ///
    /// Group 1 of a pattern is annotated when it takes part in the match,
    /// otherwise the whole match.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Pattern`] if a pattern does not compile or if
    /// neither pattern is given.
    pub fn new(
        category: Category,
        seeds: Vec<Category>,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Self> {
        if after.is_none() && before.is_none() {
            return Err(DeidError::Pattern(
                "context annotator needs an `after` or `before` pattern".to_string(),
            ));
        }

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| DeidError::Pattern(format!("Invalid regex '{pattern}': {e}")))
        };

        Ok(Self {
            category,
            seeds,
            after: after.map(|p| compile(format!(r"\A(?:{p})"))).transpose()?,
            before: before.map(|p| compile(format!(r"(?:{p})\z"))).transpose()?,
        })
    }

    fn claim(&self, document: &Document, seed: &Annotation) -> Result<Vec<Annotation>> {
        let text = document.text();
        let mut claimed = Vec::new();

        if let Some(after) = &self.after {
            let rest = document.slice(seed.end_char(), document.char_len())?;
            let base = text.len() - rest.len();
            if let Some(m) = after.captures(rest).and_then(|c| c.get(1).or_else(|| c.get(0))) {
                if !m.is_empty() {
                    claimed.push(document.annotation_from_bytes(base + m.start(), base + m.end(), self.category)?);
                }
            }
        }

        if let Some(before) = &self.before {
            let head = document.slice(0, seed.start_char())?;
            if let Some(m) = before.captures(head).and_then(|c| c.get(1).or_else(|| c.get(0))) {
                if !m.is_empty() {
                    claimed.push(document.annotation_from_bytes(m.start(), m.end(), self.category)?);
                }
            }
        }

        Ok(claimed)
    }
}

impl Annotator for ContextAnnotator {
    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>> {
        self.annotate_with_context(document, &[])
    }

    fn category(&self) -> Category {
        self.category
    }

    fn is_contextual(&self) -> bool {
        true
    }

    fn annotate_with_context(&self, document: &Document, candidates: &[Annotation]) -> Result<Vec<Annotation>> {
        let mut seen: HashSet<(usize, usize)> = candidates
            .iter()
            .map(|a| (a.start_char(), a.end_char()))
            .collect();
        let mut frontier: Vec<Annotation> = candidates
            .iter()
            .filter(|a| self.seeds.contains(&a.tag()))
            .cloned()
            .collect();
        let mut found = Vec::new();

        // Terminates: every round adds spans not seen before
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for seed in &frontier {
                for annotation in self.claim(document, seed)? {
                    if seen.insert((annotation.start_char(), annotation.end_char())) {
                        next.push(annotation);
                    }
                }
            }
            found.extend(next.iter().cloned());
            frontier = next
                .into_iter()
                .filter(|a| self.seeds.contains(&a.tag()))
                .collect();
        }

        Ok(found)
    }
}
