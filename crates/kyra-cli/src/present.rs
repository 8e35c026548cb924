//! Plain-text presentation of rendered messages
//!
//! Walks the typed tree and wires every `Link` node to its registry entry,
//! either as an OSC 8 terminal hyperlink or as a numbered footnote.

use kyra_core::markup::escape::unescape;
use kyra_core::{LinkRegistry, List, Node};

/// Render nodes as terminal text
pub struct TextPresenter<'a> {
    registry: &'a LinkRegistry,
    hyperlinks: bool,
    footnotes: Vec<String>,
    out: String,
}

impl<'a> TextPresenter<'a> {
    pub fn new(registry: &'a LinkRegistry, hyperlinks: bool) -> Self {
        Self {
            registry,
            hyperlinks,
            footnotes: Vec::new(),
            out: String::new(),
        }
    }

    /// Present a sequence of block nodes, footnotes last
    pub fn present<'n>(mut self, nodes: impl IntoIterator<Item = &'n Node>) -> String {
        let mut first = true;
        for node in nodes {
            if !first {
                self.out.push('\n');
            }
            first = false;
            self.block(node);
        }

        if !self.footnotes.is_empty() {
            self.out.push('\n');
            for (idx, href) in self.footnotes.iter().enumerate() {
                self.out.push_str(&format!("[{}] {}\n", idx + 1, sanitize(href)));
            }
        }
        self.out
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn block(&mut self, node: &Node) {
        match node {
            Node::Heading { level, children } => {
                let marker = "#".repeat(usize::from(*level));
                let text = self.inline(children);
                self.line(&format!("{} {}", marker, text));
            }
            Node::Paragraph { children } => {
                let text = self.inline(children);
                self.line(&text);
            }
            Node::Blockquote { children } => {
                let text = self.inline(children);
                for line in text.lines() {
                    self.line(&format!("│ {}", line));
                }
            }
            Node::CodeBlock { language, content } => {
                if let Some(language) = language {
                    self.line(&format!("    [{}]", display(language)));
                }
                for line in content.lines() {
                    self.line(&format!("    {}", display(line)));
                }
            }
            Node::List(list) => self.list(list, 0),
            inline => {
                let text = self.inline(std::slice::from_ref(inline));
                self.line(&text);
            }
        }
    }

    fn list(&mut self, list: &List, depth: usize) {
        let indent = "   ".repeat(depth);
        let start = list.start.unwrap_or(1);
        for (idx, item) in list.items.iter().enumerate() {
            let marker = if list.ordered {
                format!("{}.", start + idx as u64)
            } else {
                "-".to_string()
            };
            let text = self.inline(&item.children);
            let continuation = " ".repeat(marker.chars().count() + 1);
            for (line_idx, line) in text.lines().enumerate() {
                if line_idx == 0 {
                    self.line(&format!("{}{} {}", indent, marker, line));
                } else {
                    self.line(&format!("{}{}{}", indent, continuation, line));
                }
            }
            if let Some(nested) = &item.nested {
                self.list(nested, depth + 1);
            }
        }
    }

    fn inline(&mut self, nodes: &[Node]) -> String {
        let mut text = String::new();
        for node in nodes {
            self.inline_node(node, &mut text);
        }
        text
    }

    fn inline_node(&mut self, node: &Node, text: &mut String) {
        match node {
            Node::Text { text: t } => text.push_str(&display(t)),
            Node::Bold { children } | Node::Italic { children } => {
                for child in children {
                    self.inline_node(child, text);
                }
            }
            Node::InlineCode { code } => text.push_str(&format!("`{}`", display(code))),
            Node::Link { id, label, .. } => {
                let label = display(label);
                // Unresolvable ids are shown as plain text, never as a link
                let Some(target) = self.registry.activate(id) else {
                    text.push_str(&label);
                    return;
                };
                let href = target.href();
                if self.hyperlinks {
                    let href = sanitize(&href);
                    let link = format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", href, label);
                    text.push_str(&link);
                } else {
                    self.footnotes.push(href);
                    text.push_str(&format!("{} [{}]", label, self.footnotes.len()));
                }
            }
            block => text.push_str(&display(&block.plain_text())),
        }
    }
}

/// Decode escaped tree text for the terminal and neutralise control characters
fn display(escaped: &str) -> String {
    sanitize(&unescape(escaped))
}

/// Replace control characters (other than tab and newline) with visible
/// stand-ins so rendered text cannot drive the terminal. C0 controls and DEL
/// become their Unicode control pictures; C1 controls, which some terminals
/// read as 8-bit escape sequences, become U+FFFD.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' => c,
            '\u{7f}' => '␡',
            '\u{80}'..='\u{9f}' => '\u{fffd}',
            c if (c as u32) < 0x20 => char::from_u32(0x2400 + c as u32).unwrap_or('?'),
            c => c,
        })
        .collect()
}
