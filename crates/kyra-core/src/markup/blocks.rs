//! Line classification and block segmentation
//!
//! Each line is classified once; runs of compatible lines are then grouped
//! into blocks top to bottom. Input is already escaped, so a blockquote
//! marker arrives as `&gt;`.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3}) (.*)$").unwrap());
static ORDERED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)(\d{1,9})\. (.*)$").unwrap());
static UNORDERED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([ \t]*)[-*] (.*)$").unwrap());

const FENCE: &str = "```";
const QUOTE_MARKER: &str = "&gt;";

/// What a single line is, before grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Blank,
    Fence { info: &'a str },
    Heading { level: u8, text: &'a str },
    Quote { text: &'a str },
    Item(ListLine<'a>),
    Text(&'a str),
}

/// A list-item line with its marker stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListLine<'a> {
    pub ordered: bool,
    /// Leading whitespace width, tabs counting as four columns
    pub indent: usize,
    pub number: Option<u64>,
    pub text: &'a str,
}

/// A segmented block awaiting inline transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    Code {
        language: Option<&'a str>,
        content: String,
    },
    Heading {
        level: u8,
        text: &'a str,
    },
    Quote(Vec<&'a str>),
    List(Vec<ListLine<'a>>),
    Paragraph(Vec<&'a str>),
}

/// Classify one line. Rules are tried in precedence order: fence, heading,
/// blockquote, list item, text.
pub(crate) fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end();
    let trimmed = line.trim_start();

    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(info) = trimmed.strip_prefix(FENCE) {
        return Line::Fence { info: info.trim() };
    }

    if let Some(caps) = HEADING_REGEX.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
        let text = caps.get(2).map_or("", |m| m.as_str()).trim();
        if !text.is_empty() {
            return Line::Heading { level, text };
        }
    }

    if let Some(rest) = trimmed.strip_prefix(QUOTE_MARKER) {
        if rest.is_empty() {
            return Line::Quote { text: "" };
        }
        if let Some(text) = rest.strip_prefix(' ') {
            return Line::Quote { text: text.trim() };
        }
    }

    if let Some(caps) = ORDERED_REGEX.captures(line) {
        let number = caps.get(2).and_then(|m| m.as_str().parse::<u64>().ok());
        return Line::Item(ListLine {
            ordered: true,
            indent: indent_width(caps.get(1).map_or("", |m| m.as_str())),
            number,
            text: caps.get(3).map_or("", |m| m.as_str()).trim(),
        });
    }

    if let Some(caps) = UNORDERED_REGEX.captures(line) {
        return Line::Item(ListLine {
            ordered: false,
            indent: indent_width(caps.get(1).map_or("", |m| m.as_str())),
            number: None,
            text: caps.get(2).map_or("", |m| m.as_str()).trim(),
        });
    }

    Line::Text(trimmed)
}

fn indent_width(prefix: &str) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn is_closing_fence(line: &str) -> bool {
    line.trim() == FENCE
}

/// Split escaped text into blocks
pub(crate) fn segment(text: &str) -> Vec<Block<'_>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        match classify(lines[idx]) {
            Line::Blank => {
                idx += 1;
            }
            Line::Fence { info } => {
                let language = info.split_whitespace().next();
                let body_start = idx + 1;
                let close = lines[body_start..]
                    .iter()
                    .position(|line| is_closing_fence(line))
                    .map(|offset| body_start + offset);

                let body_end = close.unwrap_or(lines.len());
                if close.is_none() {
                    tracing::trace!(line = idx + 1, "Unclosed code fence runs to end of input");
                }

                blocks.push(Block::Code {
                    language,
                    content: lines[body_start..body_end].join("\n"),
                });
                idx = close.map_or(lines.len(), |c| c + 1);
            }
            Line::Heading { level, text } => {
                blocks.push(Block::Heading { level, text });
                idx += 1;
            }
            Line::Quote { .. } => {
                let mut quoted = Vec::new();
                while let Some(Line::Quote { text }) = lines.get(idx).copied().map(classify) {
                    quoted.push(text);
                    idx += 1;
                }
                blocks.push(Block::Quote(quoted));
            }
            Line::Item(_) => {
                let mut items = Vec::new();
                while let Some(Line::Item(item)) = lines.get(idx).copied().map(classify) {
                    items.push(item);
                    idx += 1;
                }
                blocks.push(Block::List(items));
            }
            Line::Text(_) => {
                let mut paragraph = Vec::new();
                while let Some(Line::Text(text)) = lines.get(idx).copied().map(classify) {
                    paragraph.push(text);
                    idx += 1;
                }
                blocks.push(Block::Paragraph(paragraph));
            }
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(
            classify("## Title"),
            Line::Heading {
                level: 2,
                text: "Title"
            }
        );
        assert!(matches!(classify("#### Too deep"), Line::Text(_)));
        assert!(matches!(classify("#NoSpace"), Line::Text(_)));
        assert_eq!(classify("&gt; quoted"), Line::Quote { text: "quoted" });
        assert!(matches!(classify("&gt;no space"), Line::Text(_)));
        assert!(matches!(classify("```rust"), Line::Fence { info: "rust" }));
        assert!(matches!(classify("   \t "), Line::Blank));
    }

    #[test]
    fn test_classify_list_markers() {
        assert_eq!(
            classify("12. Twelfth"),
            Line::Item(ListLine {
                ordered: true,
                indent: 0,
                number: Some(12),
                text: "Twelfth",
            })
        );
        assert_eq!(
            classify("    - nested"),
            Line::Item(ListLine {
                ordered: false,
                indent: 4,
                number: None,
                text: "nested",
            })
        );
        assert!(matches!(classify("* star"), Line::Item(ListLine { ordered: false, .. })));
        assert!(matches!(classify("**bold** start"), Line::Text(_)));
        assert!(matches!(classify("1.5 is a number"), Line::Text(_)));
    }

    #[test]
    fn test_segment_paragraphs_split_on_blank_line() {
        let blocks = segment("first line\nsecond line\n\nnext paragraph");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec!["first line", "second line"]),
                Block::Paragraph(vec!["next paragraph"]),
            ]
        );
    }

    #[test]
    fn test_segment_code_fence_is_verbatim() {
        let blocks = segment("```python\n  **not bold**\n# not heading\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::Code {
                    language: Some("python"),
                    content: "  **not bold**\n# not heading".to_string(),
                },
                Block::Paragraph(vec!["after"]),
            ]
        );
    }

    #[test]
    fn test_segment_unclosed_fence_consumes_rest() {
        let blocks = segment("intro\n```\ncode\n\nmore code");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec!["intro"]),
                Block::Code {
                    language: None,
                    content: "code\n\nmore code".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_segment_merges_quote_lines() {
        let blocks = segment("&gt; one\n&gt; two\nplain");
        assert_eq!(
            blocks,
            vec![
                Block::Quote(vec!["one", "two"]),
                Block::Paragraph(vec!["plain"]),
            ]
        );
    }

    #[test]
    fn test_segment_list_run_ends_at_blank_line() {
        let blocks = segment("1. A\n2. B\n\n- C");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::List(items) if items.len() == 2));
        assert!(matches!(&blocks[1], Block::List(items) if items.len() == 1));
    }

    #[test]
    fn test_segment_heading_interrupts_paragraph() {
        let blocks = segment("text\n# Heading\nmore");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec!["text"]),
                Block::Heading {
                    level: 1,
                    text: "Heading"
                },
                Block::Paragraph(vec!["more"]),
            ]
        );
    }

    #[test]
    fn test_segment_blank_input_is_empty() {
        assert!(segment("").is_empty());
        assert!(segment("  \n\n\t\n").is_empty());
    }
}
