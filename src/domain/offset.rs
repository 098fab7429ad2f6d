//! Character/byte offset conversion
//!
//! Annotation offsets count Unicode scalar values, while Rust strings are
//! indexed by byte. [`CharOffsets`] precomputes the mapping for one text so
//! that every conversion is O(1).

use std::ops::Range;

/// Offset table for a single text
#[derive(Debug, Clone)]
pub struct CharOffsets {
    /// `char_to_byte[i]` is the byte index of char `i`; the last entry is the text length.
    /// Empty for ASCII text, where both offsets coincide.
    char_to_byte: Vec<usize>,
    char_len: usize,
    byte_len: usize,
}

impl CharOffsets {
    /// Build the offset table for `text`
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_to_byte: Vec::new(),
                char_len: text.len(),
                byte_len: text.len(),
            };
        }

        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let char_len = char_to_byte.len();
        char_to_byte.push(text.len());

        Self {
            char_to_byte,
            char_len,
            byte_len: text.len(),
        }
    }

    /// Number of chars in the text
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Byte index of a char offset, `None` when past the end
    pub fn char_to_byte(&self, char_idx: usize) -> Option<usize> {
        if char_idx > self.char_len {
            return None;
        }
        if self.char_to_byte.is_empty() {
            Some(char_idx)
        } else {
            Some(self.char_to_byte[char_idx])
        }
    }

    /// Char offset of a byte index that lies on a char boundary
    pub fn byte_to_char(&self, byte_idx: usize) -> Option<usize> {
        if byte_idx > self.byte_len {
            return None;
        }
        if self.char_to_byte.is_empty() {
            Some(byte_idx)
        } else {
            self.char_to_byte.binary_search(&byte_idx).ok()
        }
    }

    /// Byte range of the char range `[start_char, end_char)`
    pub fn byte_range(&self, start_char: usize, end_char: usize) -> Option<Range<usize>> {
        if start_char > end_char {
            return None;
        }
        Some(self.char_to_byte(start_char)?..self.char_to_byte(end_char)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identity() {
        let offsets = CharOffsets::new("Hello John");
        assert_eq!(offsets.char_len(), 10);
        assert_eq!(offsets.char_to_byte(6), Some(6));
        assert_eq!(offsets.byte_to_char(10), Some(10));
        assert_eq!(offsets.char_to_byte(11), None);
    }

    #[test]
    fn test_multibyte_mapping() {
        let text = "Zoë woont in Utrecht";
        let offsets = CharOffsets::new(text);
        assert_eq!(offsets.char_len(), text.chars().count());

        let range = offsets.byte_range(0, 3).unwrap();
        assert_eq!(&text[range], "Zoë");

        let range = offsets.byte_range(13, 20).unwrap();
        assert_eq!(&text[range], "Utrecht");
    }

    #[test]
    fn test_byte_to_char_inside_codepoint() {
        let offsets = CharOffsets::new("ë");
        assert_eq!(offsets.byte_to_char(0), Some(0));
        assert_eq!(offsets.byte_to_char(1), None);
        assert_eq!(offsets.byte_to_char(2), Some(1));
    }

    #[test]
    fn test_inverted_range() {
        let offsets = CharOffsets::new("abc");
        assert!(offsets.byte_range(2, 1).is_none());
    }
}
