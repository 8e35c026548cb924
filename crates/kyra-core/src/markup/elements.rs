//! Render tree types
//!
//! A document is an ordered sequence of block nodes. Every string held by a
//! node is already escaped; presenters may emit it as-is.

use serde::Serialize;

use super::links::LinkId;

/// One renderable unit, block or inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Literal text; a `\n` inside is a line break within the parent block
    Text { text: String },
    /// Strong emphasis
    Bold { children: Vec<Node> },
    /// Emphasis
    Italic { children: Vec<Node> },
    /// Inline code span, never transformed further
    InlineCode { code: String },
    /// Fenced code block with optional language tag
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    /// Heading with level 1-3
    Heading { level: u8, children: Vec<Node> },
    /// Link resolved through the pass's registry by `id`
    Link {
        id: LinkId,
        label: String,
        url: String,
    },
    /// Ordered or unordered list
    List(List),
    /// Block quote; children are inline content
    Blockquote { children: Vec<Node> },
    /// Paragraph; children are inline content
    Paragraph { children: Vec<Node> },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Visit this node and all of its descendants, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        match self {
            Node::Bold { children }
            | Node::Italic { children }
            | Node::Heading { children, .. }
            | Node::Blockquote { children }
            | Node::Paragraph { children } => {
                for child in children {
                    child.walk(visit);
                }
            }
            Node::List(list) => list.walk(visit),
            Node::Text { .. }
            | Node::InlineCode { .. }
            | Node::CodeBlock { .. }
            | Node::Link { .. } => {}
        }
    }

    /// Concatenated plain text of this node, links contributing their label
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| match node {
            Node::Text { text } => out.push_str(text),
            Node::InlineCode { code } => out.push_str(code),
            Node::CodeBlock { content, .. } => out.push_str(content),
            Node::Link { label, .. } => out.push_str(label),
            _ => {}
        });
        out
    }
}

/// A list and its items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    /// Number of the first item for ordered lists
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(ordered: bool, start: Option<u64>) -> Self {
        Self {
            ordered,
            start,
            items: Vec::new(),
        }
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for item in &self.items {
            for child in &item.children {
                child.walk(visit);
            }
            if let Some(nested) = &item.nested {
                nested.walk(visit);
            }
        }
    }
}

/// A list item: inline content plus at most one nested unordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<List>,
}

impl ListItem {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            nested: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_collects_leaves() {
        let node = Node::Paragraph {
            children: vec![
                Node::text("a "),
                Node::Bold {
                    children: vec![Node::text("b")],
                },
                Node::InlineCode { code: " c".into() },
            ],
        };
        assert_eq!(node.plain_text(), "a b c");
    }

    #[test]
    fn test_walk_descends_into_nested_lists() {
        let mut nested = List::new(false, None);
        nested.items.push(ListItem::new(vec![Node::text("inner")]));
        let mut outer = List::new(true, Some(1));
        let mut item = ListItem::new(vec![Node::text("outer")]);
        item.nested = Some(nested);
        outer.items.push(item);

        let mut seen = Vec::new();
        Node::List(outer).walk(&mut |node| {
            if let Node::Text { text } = node {
                seen.push(text.clone());
            }
        });
        assert_eq!(seen, vec!["outer", "inner"]);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(Node::text("hi")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hi");
    }
}
