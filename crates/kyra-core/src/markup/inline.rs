//! Inline span transformation
//!
//! Runs over the escaped content of paragraphs, headings, list items and
//! blockquotes. Inline code is split out first, then link destinations, so
//! neither is touched by emphasis. Bold and italic run last, bold first.
//! Once a pass turns a span into a node, later passes only see the text
//! around it.

use super::elements::Node;
use super::escape::unescape;
use super::links::LinkRegistry;
use crate::config::RenderConfig;

/// Intermediate state between passes
#[derive(Debug)]
enum Span {
    /// Text no pass has claimed yet
    Raw(String),
    /// A node produced by an earlier pass
    Done(Node),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Bold,
    Italic,
}

/// A delimiter position inside the raw span at index `span`
#[derive(Debug, Clone, Copy)]
struct Delimiter {
    span: usize,
    pos: usize,
    opens: bool,
    closes: bool,
}

impl Emphasis {
    fn delimiter_len(self) -> usize {
        match self {
            Emphasis::Bold => 2,
            Emphasis::Italic => 1,
        }
    }

    fn node(self, children: Vec<Node>) -> Node {
        match self {
            Emphasis::Bold => Node::Bold { children },
            Emphasis::Italic => Node::Italic { children },
        }
    }

    /// Resolve the emphasis nested inside a matched body
    fn inner(self, body: Vec<Span>) -> Vec<Span> {
        match self {
            Emphasis::Bold => emphasis(body, Emphasis::Italic),
            Emphasis::Italic => body,
        }
    }

    /// Is there an opening delimiter at byte `pos`?
    fn opens_at(self, text: &str, pos: usize) -> bool {
        // Must be followed by content, not whitespace
        next_char(text, pos + self.delimiter_len()).map_or(true, |c| !c.is_whitespace())
    }

    /// Is there a closing delimiter at byte `pos`?
    fn closes_at(text: &str, pos: usize) -> bool {
        prev_char(text, pos).map_or(true, |c| !c.is_whitespace())
    }

    fn delimiter_at(self, text: &str, pos: usize) -> bool {
        match self {
            Emphasis::Bold => text[pos..].starts_with("**"),
            // A lone asterisk; one touching another belongs to a bold delimiter
            Emphasis::Italic => {
                text[pos..].starts_with('*')
                    && prev_char(text, pos) != Some('*')
                    && next_char(text, pos + 1) != Some('*')
            }
        }
    }

    /// Every usable delimiter in the raw spans, in document order
    fn delimiters(self, spans: &[Span]) -> Vec<Delimiter> {
        let needle = match self {
            Emphasis::Bold => "**",
            Emphasis::Italic => "*",
        };
        let mut found = Vec::new();
        for (span, text) in spans.iter().enumerate().filter_map(|(idx, span)| match span {
            Span::Raw(text) => Some((idx, text)),
            Span::Done(_) => None,
        }) {
            for (pos, _) in text.match_indices(needle) {
                if !self.delimiter_at(text, pos) {
                    continue;
                }
                let delimiter = Delimiter {
                    span,
                    pos,
                    opens: self.opens_at(text, pos),
                    closes: Self::closes_at(text, pos),
                };
                if delimiter.opens || delimiter.closes {
                    found.push(delimiter);
                }
            }
        }
        found
    }

    /// Pair each opener with the first closer after it, left to right
    ///
    /// Returns the matched delimiters in document order, opener then closer.
    /// Delimiters left unpaired stay literal. A closer in the opener's own
    /// span needs a non-empty body between them.
    fn pair(self, spans: &[Span]) -> Vec<Delimiter> {
        let delimiters = self.delimiters(spans);
        let len = self.delimiter_len();

        // next_closer[i]: first closing delimiter at index >= i
        let mut next_closer = vec![None; delimiters.len() + 1];
        for idx in (0..delimiters.len()).rev() {
            next_closer[idx] = if delimiters[idx].closes {
                Some(idx)
            } else {
                next_closer[idx + 1]
            };
        }

        let mut pairs = Vec::new();
        let mut idx = 0;
        while idx < delimiters.len() {
            let open = delimiters[idx];
            if !open.opens {
                idx += 1;
                continue;
            }

            let mut close = next_closer[idx + 1];
            while let Some(candidate) = close {
                let closer = delimiters[candidate];
                if closer.span != open.span || closer.pos > open.pos + len {
                    break;
                }
                close = next_closer[candidate + 1];
            }

            // No closer after this opener means none after any later one
            let Some(close) = close else {
                break;
            };
            pairs.push(open);
            pairs.push(delimiters[close]);
            idx = close + 1;
        }
        pairs
    }
}

fn prev_char(text: &str, pos: usize) -> Option<char> {
    text[..pos].chars().next_back()
}

fn next_char(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|rest| rest.chars().next())
}

/// Turn paired delimiters of one kind into nodes
///
/// A pair may enclose nodes produced by earlier passes, so a body can span
/// several raw spans.
fn emphasis(spans: Vec<Span>, kind: Emphasis) -> Vec<Span> {
    let pairs = kind.pair(&spans);
    if pairs.is_empty() {
        return spans;
    }

    let len = kind.delimiter_len();
    let mut cuts = pairs.into_iter().peekable();
    let mut out = Vec::new();
    let mut body: Option<Vec<Span>> = None;

    for (idx, span) in spans.into_iter().enumerate() {
        let text = match span {
            Span::Raw(text) => text,
            done => {
                body.as_mut().unwrap_or(&mut out).push(done);
                continue;
            }
        };

        let mut start = 0;
        while let Some(cut) = cuts.next_if(|cut| cut.span == idx) {
            push_raw(body.as_mut().unwrap_or(&mut out), &text[start..cut.pos]);
            start = cut.pos + len;
            match body.take() {
                Some(inner) => {
                    let children = into_nodes(kind.inner(inner));
                    out.push(Span::Done(kind.node(children)));
                }
                None => body = Some(Vec::new()),
            }
        }
        push_raw(body.as_mut().unwrap_or(&mut out), &text[start..]);
    }

    out
}

/// Transforms inline content, allocating link ids from one pass's registry
pub(crate) struct InlineTransformer<'a> {
    registry: &'a mut LinkRegistry,
    config: &'a RenderConfig,
}

impl<'a> InlineTransformer<'a> {
    pub fn new(registry: &'a mut LinkRegistry, config: &'a RenderConfig) -> Self {
        Self { registry, config }
    }

    /// Transform escaped inline content into nodes
    pub fn transform(&mut self, text: &str) -> Vec<Node> {
        let spans = split_code(text);
        let spans = self.links(spans);
        let spans = emphasis(spans, Emphasis::Bold);
        let spans = emphasis(spans, Emphasis::Italic);
        into_nodes(spans)
    }

    fn links(&mut self, spans: Vec<Span>) -> Vec<Span> {
        let mut out = Vec::new();
        for span in spans {
            match span {
                Span::Raw(text) => self.links_in(&text, &mut out),
                done => out.push(done),
            }
        }
        out
    }

    fn links_in(&mut self, text: &str, out: &mut Vec<Span>) {
        let mut literal_start = 0;
        let mut cursor = 0;

        while let Some(offset) = text[cursor..].find('[') {
            let open = cursor + offset;
            match parse_link(text, open) {
                Some(link) if self.allows(link.url) => {
                    push_raw(out, &text[literal_start..open]);
                    let label = link_label(link.label);
                    let id = self.registry.register(link.url, label.as_str());
                    out.push(Span::Done(Node::Link {
                        id,
                        label,
                        url: link.url.to_string(),
                    }));
                    cursor = link.end;
                    literal_start = link.end;
                }
                Some(link) => {
                    tracing::trace!(url = link.url, "Link scheme not allowed, keeping literal");
                    cursor = open + 1;
                }
                None => {
                    cursor = open + 1;
                }
            }
        }

        push_raw(out, &text[literal_start..]);
    }

    fn allows(&self, escaped_url: &str) -> bool {
        let href = unescape(escaped_url);
        match href.split_once(':') {
            Some((scheme, _)) => {
                !scheme.is_empty()
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                    && self.config.allows_link_scheme(scheme)
            }
            None => false,
        }
    }
}

/// Label text with its emphasis delimiters resolved away
fn link_label(label: &str) -> String {
    let spans = emphasis(vec![Span::Raw(label.to_string())], Emphasis::Bold);
    let spans = emphasis(spans, Emphasis::Italic);
    into_nodes(spans).iter().map(Node::plain_text).collect()
}

/// A syntactically complete `[label](url)` span
struct ParsedLink<'t> {
    label: &'t str,
    url: &'t str,
    /// Byte offset just past the closing parenthesis
    end: usize,
}

/// Parse a link starting at the `[` at byte `open`
///
/// Neither the label nor the destination may contain a bracket, so every
/// scan stops before the next candidate `[`.
fn parse_link(text: &str, open: usize) -> Option<ParsedLink<'_>> {
    let label_start = open + 1;
    let label_end = label_start + text[label_start..].find(|c: char| c == '[' || c == ']')?;
    if !text[label_end..].starts_with(']') {
        return None;
    }
    let label = &text[label_start..label_end];
    if label.trim().is_empty() {
        return None;
    }

    let url_start = label_end + 2;
    if !text[label_end + 1..].starts_with('(') {
        return None;
    }

    // Parentheses inside the destination must balance
    let mut depth = 0usize;
    let mut url_end = None;
    for (pos, c) in text[url_start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                url_end = Some(url_start + pos);
                break;
            }
            ')' => depth -= 1,
            '[' | ']' => return None,
            c if c.is_whitespace() => return None,
            _ => {}
        }
    }

    let url_end = url_end?;
    let url = &text[url_start..url_end];
    if url.is_empty() {
        return None;
    }

    Some(ParsedLink {
        label,
        url,
        end: url_end + 1,
    })
}

/// Split out single-backtick code spans; an unmatched backtick stays literal
fn split_code(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('`') {
        let open = cursor + offset;
        let Some(len) = text[open + 1..].find('`') else {
            break;
        };
        let close = open + 1 + len;
        if len == 0 {
            // Empty span is not code
            cursor = close + 1;
            continue;
        }
        push_raw(&mut spans, &text[literal_start..open]);
        spans.push(Span::Done(Node::InlineCode {
            code: text[open + 1..close].to_string(),
        }));
        cursor = close + 1;
        literal_start = cursor;
    }

    push_raw(&mut spans, &text[literal_start..]);
    spans
}

fn push_raw(spans: &mut Vec<Span>, text: &str) {
    if !text.is_empty() {
        spans.push(Span::Raw(text.to_string()));
    }
}

fn into_nodes(spans: Vec<Span>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for span in spans {
        match span {
            Span::Raw(text) => push_text(&mut nodes, &text),
            Span::Done(node) => nodes.push(node),
        }
    }
    nodes
}

/// Append text, merging into a trailing `Text` node
pub(crate) fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text { text: last }) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::text(text));
    }
}

/// Append another line's inline content after a line break
pub(crate) fn append_line(nodes: &mut Vec<Node>, line: Vec<Node>) {
    push_text(nodes, "\n");
    for node in line {
        match node {
            Node::Text { text } => push_text(nodes, &text),
            other => nodes.push(other),
        }
    }
}
