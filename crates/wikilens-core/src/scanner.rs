//! Greedy longest-match keyword scanner.
//!
//! Splits a text into plain and keyword segments against a [`Dictionary`]:
//! scanning left to right, the longest keyword starting at the current
//! position (compared case-insensitively) is taken, and scanning resumes
//! right after it. Characters not covered by a keyword are coalesced into
//! plain segments. Matches never overlap and ignore word boundaries, so
//! `agent` is found inside `agential`.
//!
//! The scan is lossless: concatenating [`Segment::text`] over the output
//! reproduces the input exactly, and keyword segments carry the casing found
//! in the text rather than the dictionary's.
//!
//! Matching runs an Aho-Corasick automaton in leftmost-longest mode over a
//! case-folded copy of the text, which yields the same segmentation as
//! trying every keyword (longest first) at every position.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dictionary::Dictionary;
use crate::fold::{FoldedText, fold_char};

/// One piece of a scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment<'a> {
    Plain { text: &'a str },
    /// `text` is the slice of the input; `key` is the folded dictionary key.
    Keyword { text: &'a str, key: &'a str },
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match *self {
            Self::Plain { text } | Self::Keyword { text, .. } => text,
        }
    }

    pub fn key(&self) -> Option<&'a str> {
        match *self {
            Self::Plain { .. } => None,
            Self::Keyword { key, .. } => Some(key),
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword { .. })
    }
}

/// Matcher compiled from one dictionary snapshot.
pub struct Scanner<'d> {
    /// Folded keys, longest first, ties in lexicographic order.
    keys: Vec<&'d str>,
    /// `None` when the dictionary is empty or the automaton could not be built.
    automaton: Option<AhoCorasick>,
}

impl<'d> Scanner<'d> {
    pub fn new(dictionary: &'d Dictionary) -> Self {
        let mut keys: Vec<&'d str> = dictionary.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let automaton = if keys.is_empty() {
            None
        } else {
            match AhoCorasick::builder()
                .match_kind(MatchKind::LeftmostLongest)
                .build(&keys)
            {
                Ok(ac) => Some(ac),
                Err(e) => {
                    warn!(error = %e, patterns = keys.len(), "automaton build failed, using linear scan");
                    None
                }
            }
        };

        Self { keys, automaton }
    }

    /// Segment `text`. Empty text yields no segments; an empty dictionary
    /// yields the whole text as one plain segment.
    pub fn scan<'a>(&self, text: &'a str) -> Vec<Segment<'a>>
    where
        'd: 'a,
    {
        if text.is_empty() {
            return Vec::new();
        }
        if self.keys.is_empty() {
            return vec![Segment::Plain { text }];
        }

        let segments = match &self.automaton {
            Some(ac) => self.scan_automaton(ac, text),
            None => scan_linear(&self.keys, text),
        };
        debug!(
            keywords = self.keys.len(),
            segments = segments.len(),
            matched = segments.iter().filter(|s| s.is_keyword()).count(),
            "scanned text"
        );
        segments
    }

    fn scan_automaton<'a>(&self, ac: &AhoCorasick, text: &'a str) -> Vec<Segment<'a>>
    where
        'd: 'a,
    {
        let folded = FoldedText::new(text);
        let mut segments = Vec::new();
        let mut cursor = 0;

        for m in ac.find_iter(folded.folded.as_str()) {
            let start = folded.origin(m.start());
            let end = folded.origin(m.end());
            if start > cursor {
                segments.push(Segment::Plain {
                    text: &text[cursor..start],
                });
            }
            segments.push(Segment::Keyword {
                text: &text[start..end],
                key: self.keys[m.pattern().as_usize()],
            });
            cursor = end;
        }
        if cursor < text.len() {
            segments.push(Segment::Plain {
                text: &text[cursor..],
            });
        }
        segments
    }
}

/// Scan `text` against `dictionary`.
///
/// With the lens disabled the whole text comes back as a single plain
/// segment, even when it is empty.
pub fn annotate<'a>(text: &'a str, dictionary: &'a Dictionary, enabled: bool) -> Vec<Segment<'a>> {
    if !enabled {
        return vec![Segment::Plain { text }];
    }
    Scanner::new(dictionary).scan(text)
}

/// Try every key (longest first) at every position. Used when the automaton
/// is unavailable.
fn scan_linear<'a>(keys: &[&'a str], text: &'a str) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let hit = keys
            .iter()
            .find_map(|key| folded_prefix_len(rest, key).map(|len| (*key, len)));

        match hit {
            Some((key, len)) => {
                if plain_start < pos {
                    segments.push(Segment::Plain {
                        text: &text[plain_start..pos],
                    });
                }
                segments.push(Segment::Keyword {
                    text: &text[pos..pos + len],
                    key,
                });
                pos += len;
                plain_start = pos;
            }
            None => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    if plain_start < text.len() {
        segments.push(Segment::Plain {
            text: &text[plain_start..],
        });
    }
    segments
}

/// Byte length of the prefix of `text` that folds to `key`, if any.
fn folded_prefix_len(text: &str, key: &str) -> Option<usize> {
    let mut text_chars = text.char_indices();
    for k in key.chars() {
        let (_, c) = text_chars.next()?;
        if fold_char(c) != k {
            return None;
        }
    }
    Some(text_chars.next().map_or(text.len(), |(i, _)| i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Reference};
    use crate::level::UnderstandingLevel;
    use proptest::prelude::*;

    fn dict(keywords: &[&str]) -> Dictionary {
        let mut d = Dictionary::new();
        for k in keywords {
            d.insert(Annotation::new(
                *k,
                UnderstandingLevel::Unknown,
                Reference::new("ref", 0, *k),
            ))
            .unwrap();
        }
        d
    }

    fn joined(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.text()).collect()
    }

    fn keyword_texts<'a>(segments: &[Segment<'a>]) -> Vec<&'a str> {
        segments
            .iter()
            .filter(|s| s.is_keyword())
            .map(|s| s.text())
            .collect()
    }

    #[test]
    fn longest_match_wins() {
        let d = dict(&["LLM", "LLM agent"]);
        let segments = annotate("an LLM agent", &d, true);
        assert_eq!(
            segments,
            vec![
                Segment::Plain { text: "an " },
                Segment::Keyword {
                    text: "LLM agent",
                    key: "llm agent"
                },
            ]
        );
    }

    #[test]
    fn original_casing_is_emitted() {
        let d = dict(&["llm"]);
        let segments = annotate("The LLM is large", &d, true);
        assert_eq!(keyword_texts(&segments), ["LLM"]);
        assert_eq!(segments[1].key(), Some("llm"));
    }

    #[test]
    fn matches_do_not_overlap() {
        let d = dict(&["ab", "bc"]);
        let segments = annotate("abc", &d, true);
        assert_eq!(
            segments,
            vec![
                Segment::Keyword {
                    text: "ab",
                    key: "ab"
                },
                Segment::Plain { text: "c" },
            ]
        );
    }

    #[test]
    fn substring_of_larger_word_matches() {
        let d = dict(&["agent"]);
        let segments = annotate("agential", &d, true);
        assert_eq!(keyword_texts(&segments), ["agent"]);
        assert_eq!(segments[1], Segment::Plain { text: "ial" });
    }

    #[test]
    fn adjacent_keywords_match_consecutively() {
        let d = dict(&["foo", "bar"]);
        let segments = annotate("FooBarfoo", &d, true);
        assert_eq!(keyword_texts(&segments), ["Foo", "Bar", "foo"]);
        assert!(segments.iter().all(Segment::is_keyword));
    }

    #[test]
    fn full_text_match() {
        let d = dict(&["large language model"]);
        let segments = annotate("Large Language Model", &d, true);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_keyword());
    }

    #[test]
    fn empty_text_yields_nothing() {
        let d = dict(&["llm"]);
        assert!(annotate("", &d, true).is_empty());
        let empty = Dictionary::new();
        assert!(annotate("", &empty, true).is_empty());
    }

    #[test]
    fn empty_dictionary_yields_one_plain_segment() {
        let empty = Dictionary::new();
        let segments = annotate("no keywords here", &empty, true);
        assert_eq!(
            segments,
            vec![Segment::Plain {
                text: "no keywords here"
            }]
        );
    }

    #[test]
    fn disabled_lens_passes_text_through() {
        let d = dict(&["llm"]);
        assert_eq!(
            annotate("an LLM", &d, false),
            vec![Segment::Plain { text: "an LLM" }]
        );
        assert_eq!(annotate("", &d, false), vec![Segment::Plain { text: "" }]);
    }

    #[test]
    fn no_matches_yields_one_plain_segment() {
        let d = dict(&["zebra"]);
        assert_eq!(
            annotate("an LLM agent", &d, true),
            vec![Segment::Plain {
                text: "an LLM agent"
            }]
        );
    }

    #[test]
    fn unicode_case_insensitive_match() {
        let d = dict(&["über"]);
        let segments = annotate("Das ÜBER-Ich", &d, true);
        assert_eq!(keyword_texts(&segments), ["ÜBER"]);
        assert_eq!(joined(&segments), "Das ÜBER-Ich");
    }

    #[test]
    fn match_across_byte_length_change() {
        // KELVIN SIGN folds to ASCII 'k'.
        let d = dict(&["kw"]);
        let text = "x\u{212A}Wy";
        let segments = annotate(text, &d, true);
        assert_eq!(keyword_texts(&segments), ["\u{212A}W"]);
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn segments_serialize_with_kind_tag() {
        let d = dict(&["llm"]);
        let segments = annotate("an LLM", &d, true);
        let json = serde_json::to_value(&segments).unwrap();
        assert_eq!(json[0]["kind"], "plain");
        assert_eq!(json[1]["kind"], "keyword");
        assert_eq!(json[1]["key"], "llm");
        assert_eq!(json[1]["text"], "LLM");
    }

    #[test]
    fn linear_scan_agrees_on_examples() {
        let d = dict(&["LLM", "LLM agent", "ab", "bc", "agent"]);
        let scanner = Scanner::new(&d);
        for text in ["an LLM agent", "abc", "agential llm AGENT", "xabcbc"] {
            assert_eq!(scanner.scan(text), scan_linear(&scanner.keys, text), "{text}");
        }
    }

    proptest! {
        #[test]
        fn scan_is_lossless(text in "[a-cA-C ]{0,40}", keys in prop::collection::vec("[a-c]{1,3}", 0..5)) {
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            let d = dict(&refs);
            let segments = annotate(&text, &d, true);
            prop_assert_eq!(joined(&segments), text);
        }

        #[test]
        fn disabled_scan_is_single_segment(text in "\\PC{0,40}") {
            let d = dict(&["a", "the"]);
            let segments = annotate(&text, &d, false);
            prop_assert_eq!(segments, vec![Segment::Plain { text: &text }]);
        }

        #[test]
        fn automaton_matches_linear_scan(text in "[a-cA-CäÄ ]{0,40}", keys in prop::collection::vec("[a-cä]{1,3}", 1..5)) {
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            let d = dict(&refs);
            let scanner = Scanner::new(&d);
            prop_assert_eq!(scanner.scan(&text), scan_linear(&scanner.keys, &text));
        }

        #[test]
        fn plain_segments_never_adjacent(text in "[a-cA-C ]{0,40}", keys in prop::collection::vec("[a-c]{1,3}", 0..5)) {
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            let d = dict(&refs);
            let segments = annotate(&text, &d, true);
            for pair in segments.windows(2) {
                prop_assert!(pair[0].is_keyword() || pair[1].is_keyword());
            }
        }
    }
}
