//! Redaction: rewriting text with annotation markers
//!
//! Annotations are applied in descending `end_char` order. Each rewrite only
//! touches text at or after its own start, and every annotation still to be
//! processed lies entirely before that, so the original offsets stay valid
//! without any offset-translation table.

use crate::domain::annotation::has_overlap;
use crate::domain::{Annotation, DeidError, Result};
use crate::domain::offset::CharOffsets;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How a redacted span is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// `<TAG original_text>`, the input format of tag clustering
    #[default]
    Tagged,
    /// `<TAG>original_text</TAG>`
    Intext,
}

impl RenderMode {
    fn render(&self, annotation: &Annotation) -> String {
        let label = annotation.tag().label();
        match self {
            Self::Tagged => format!("<{} {}>", label, annotation.text()),
            Self::Intext => format!("<{label}>{}</{label}>", annotation.text()),
        }
    }
}

/// Replaces annotated spans with markers
#[derive(Debug, Clone, Copy, Default)]
pub struct Redactor {
    mode: RenderMode,
}

impl Redactor {
    /// Create a redactor for a render mode
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Processing order: end descending, ties broken by start descending
    fn order(a: &Annotation, b: &Annotation) -> Ordering {
        b.end_char()
            .cmp(&a.end_char())
            .then(b.start_char().cmp(&a.start_char()))
    }

    /// Rewrite `text`, replacing every annotation with its marker
    ///
    /// Characters outside the annotated spans are left untouched.
    ///
    /// # Errors
    ///
    /// - [`DeidError::PreconditionViolation`] if annotations overlap, or if a
    ///   tagged-mode value contains the reserved `<` / `>` characters
    /// - [`DeidError::MalformedSpan`] if an annotation does not fit `text`
    pub fn redact(&self, text: &str, annotations: &[Annotation]) -> Result<String> {
        if has_overlap(annotations) {
            return Err(DeidError::PreconditionViolation(
                "redaction requires non-overlapping annotations".to_string(),
            ));
        }

        let offsets = CharOffsets::new(text);
        let mut ordered: Vec<&Annotation> = annotations.iter().collect();
        ordered.sort_by(|a, b| Self::order(a, b));

        let mut redacted = text.to_string();
        for annotation in ordered {
            if self.mode == RenderMode::Tagged && annotation.text().contains(['<', '>']) {
                return Err(DeidError::PreconditionViolation(format!(
                    "annotated value at [{}, {}) contains reserved marker characters",
                    annotation.start_char(),
                    annotation.end_char()
                )));
            }

            let range = offsets
                .byte_range(annotation.start_char(), annotation.end_char())
                .ok_or(DeidError::MalformedSpan {
                    start_char: annotation.start_char(),
                    end_char: annotation.end_char(),
                    text_len: offsets.char_len(),
                })?;
            redacted.replace_range(range, &self.mode.render(annotation));
        }

        Ok(redacted)
    }
}

/// Render annotations in-text as `<TAG>original_text</TAG>`
///
/// # Errors
///
/// See [`Redactor::redact`].
pub fn render_intext(text: &str, annotations: &[Annotation]) -> Result<String> {
    Redactor::new(RenderMode::Intext).redact(text, annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Document, Metadata};

    #[test]
    fn test_redact_tagged() {
        let text = "Hello John, bye John.";
        let annotations = vec![
            Annotation::new(6, 10, "John", Category::Name).unwrap(),
            Annotation::new(17, 21, "John", Category::Name).unwrap(),
        ];

        let redacted = Redactor::default().redact(text, &annotations).unwrap();
        assert_eq!(redacted, "Hello <NAME John>, bye <NAME John>.");
    }

    #[test]
    fn test_render_intext() {
        let text = "Opname 12 mei in Utrecht";
        let annotations = vec![
            Annotation::new(17, 24, "Utrecht", Category::Location).unwrap(),
            Annotation::new(7, 13, "12 mei", Category::Date).unwrap(),
        ];

        let rendered = render_intext(text, &annotations).unwrap();
        assert_eq!(
            rendered,
            "Opname <DATE>12 mei</DATE> in <LOCATION>Utrecht</LOCATION>"
        );
    }

    #[test]
    fn test_redact_multibyte_text() {
        let doc = Document::new("Zoë Jansen uit Tiël", Metadata::default());
        let annotations = vec![
            doc.annotation(0, 10, Category::Patient).unwrap(),
            doc.annotation(15, 19, Category::Location).unwrap(),
        ];

        let redacted = Redactor::default().redact(doc.text(), &annotations).unwrap();
        assert_eq!(redacted, "<PATIENT Zoë Jansen> uit <LOCATION Tiël>");
    }

    #[test]
    fn test_text_outside_spans_untouched() {
        let text = "a1b22c333d";
        let doc = Document::new(text, Metadata::default());
        let annotations = vec![
            doc.annotation(1, 2, Category::Age).unwrap(),
            doc.annotation(3, 5, Category::Age).unwrap(),
            doc.annotation(6, 9, Category::Age).unwrap(),
        ];

        let redacted = Redactor::new(RenderMode::Intext).redact(text, &annotations).unwrap();
        let stripped = redacted
            .replace("<AGE>1</AGE>", "")
            .replace("<AGE>22</AGE>", "")
            .replace("<AGE>333</AGE>", "");
        assert_eq!(stripped, "abcd");
    }

    #[test]
    fn test_empty_annotations() {
        let redacted = Redactor::default().redact("nothing here", &[]).unwrap();
        assert_eq!(redacted, "nothing here");
    }

    #[test]
    fn test_overlap_is_precondition_violation() {
        let annotations = vec![
            Annotation::new(0, 4, "John", Category::Name).unwrap(),
            Annotation::new(2, 6, "hn D", Category::Name).unwrap(),
        ];
        let err = Redactor::default().redact("John Doe", &annotations).unwrap_err();
        assert!(matches!(err, DeidError::PreconditionViolation(_)));
    }

    #[test]
    fn test_reserved_characters_rejected_in_tagged_mode() {
        let annotations = vec![Annotation::new(0, 5, "<b>x>", Category::Url).unwrap()];
        let err = Redactor::default().redact("<b>x> tail", &annotations).unwrap_err();
        assert!(matches!(err, DeidError::PreconditionViolation(_)));
    }

    #[test]
    fn test_span_beyond_text() {
        let annotations = vec![Annotation::new(4, 8, "Jans", Category::Name).unwrap()];
        let err = Redactor::default().redact("Jan", &annotations).unwrap_err();
        assert!(matches!(err, DeidError::MalformedSpan { .. }));
    }
}
