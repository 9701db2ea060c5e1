//! Case folding shared by dictionary keys and the scanner.
//!
//! Folding is per character and never changes the character count: a
//! character folds to its lowercase form when that form is a single
//! character, and to itself otherwise (e.g. `İ`, whose lowercase is two
//! characters). The UTF-8 byte length of a character may still change.

pub(crate) fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-fold a keyword into its dictionary key.
pub fn fold_keyword(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Folded copy of `text` plus a map from every folded byte offset (and the
/// end offset) back to the byte offset of the same character in `text`.
pub(crate) struct FoldedText {
    pub folded: String,
    origin: Vec<usize>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            let f = fold_char(c);
            folded.push(f);
            origin.extend(std::iter::repeat_n(offset, f.len_utf8()));
        }
        origin.push(text.len());
        Self { folded, origin }
    }

    /// Byte offset in the source text for a char-boundary offset in `folded`.
    pub fn origin(&self, folded_offset: usize) -> usize {
        self.origin[folded_offset]
    }
}
