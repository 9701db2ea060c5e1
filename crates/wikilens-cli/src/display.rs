//! Terminal rendering for annotated text and reference cards.

use crossterm::style::Stylize;
use serde::Serialize;
use wikilens_core::{Annotation, Color, Dictionary, Segment, UnderstandingLevel};

/// Render segments as one string. Keywords are coloured by level when
/// `color` is set, otherwise marked as `[text|level]`.
pub fn render_segments(segments: &[Segment<'_>], dict: &Dictionary, color: bool) -> String {
    let mut out = String::new();
    for segment in segments {
        match *segment {
            Segment::Plain { text } => out.push_str(text),
            Segment::Keyword { text, key } => {
                let level = level_of(dict, key);
                if color {
                    let styled = match level.color() {
                        Color::Red => text.red(),
                        Color::Amber => text.dark_yellow(),
                        Color::Green => text.green(),
                    };
                    out.push_str(&styled.bold().to_string());
                } else {
                    out.push_str(&format!("[{text}|{level}]"));
                }
            }
        }
    }
    out
}

/// JSON-friendly view of a segment with its level resolved.
#[derive(Debug, Serialize)]
pub struct SegmentView<'a> {
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<UnderstandingLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'static str>,
}

pub fn segment_views<'a>(segments: &[Segment<'a>], dict: &Dictionary) -> Vec<SegmentView<'a>> {
    segments
        .iter()
        .map(|segment| match *segment {
            Segment::Plain { text } => SegmentView {
                kind: "plain",
                text,
                key: None,
                level: None,
                color: None,
            },
            Segment::Keyword { text, key } => {
                let level = level_of(dict, key);
                SegmentView {
                    kind: "keyword",
                    text,
                    key: Some(key),
                    level: Some(level),
                    color: Some(level.color().as_str()),
                }
            }
        })
        .collect()
}

/// One-line tally of keyword matches per level.
pub fn match_summary(segments: &[Segment<'_>], dict: &Dictionary) -> String {
    let mut counts = [0usize; 3];
    for key in segments.iter().filter_map(Segment::key) {
        let idx = match level_of(dict, key) {
            UnderstandingLevel::Known => 0,
            UnderstandingLevel::Partial => 1,
            UnderstandingLevel::Unknown => 2,
        };
        counts[idx] += 1;
    }
    let total: usize = counts.iter().sum();
    format!(
        "{total} keyword matches: {} known, {} partial, {} unknown",
        counts[0], counts[1], counts[2]
    )
}

/// Format an annotation as a vertical card.
pub fn format_reference_card(annotation: &Annotation) -> String {
    let reference = &annotation.reference;
    let level = annotation.level;

    let mut out = format!("=== {} ===\n", annotation.keyword);
    out.push_str(&format!("  {:<13} {} ({})\n", "level", level, level.color().as_str()));
    out.push_str("\nReference\n");
    out.push_str(&format!("  {:<13} {}\n", "title", reference.title));
    out.push_str(&format!("  {:<13} {}\n", "page", reference.page));
    out.push_str(&format!("  {:<13} {}\n", "description", reference.description));

    if !reference.additional_references.is_empty() {
        out.push_str("\nAdditional references\n");
        for (i, extra) in reference.additional_references.iter().enumerate() {
            out.push_str(&format!("  {}. {} (p. {})\n", i + 1, extra.title, extra.page));
            if !extra.description.is_empty() {
                out.push_str(&format!("     {}\n", extra.description));
            }
        }
    }
    out
}

fn level_of(dict: &Dictionary, key: &str) -> UnderstandingLevel {
    dict.get_by_key(key)
        .map(|ann| ann.level)
        .unwrap_or_default()
}
