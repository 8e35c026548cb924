//! Markup rendering for assistant messages
//!
//! Escaper → block segmenter → inline transformer → list assembler. Each
//! render pass owns one [`LinkRegistry`]; the tree and the registry are
//! produced together and dropped together.

mod blocks;
mod elements;
pub mod escape;
mod inline;
mod links;
mod lists;

pub use elements::{List, ListItem, Node};
pub use links::{LinkId, LinkRegistry, LinkTarget};

use serde::Serialize;

use crate::config::RenderConfig;
use blocks::Block;
use inline::InlineTransformer;

/// A rendered document and the registry its links resolve in
#[derive(Debug, Clone, Serialize)]
pub struct RenderedMarkup {
    pub document: Vec<Node>,
    #[serde(rename = "links")]
    pub registry: LinkRegistry,
}

impl RenderedMarkup {
    /// Resolve an activated link to the target the host should open
    pub fn activate(&self, id: &LinkId) -> Option<&LinkTarget> {
        self.registry.activate(id)
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// Renders message text and citation lists into typed node trees
#[derive(Debug, Clone, Default)]
pub struct MarkupRenderer {
    config: RenderConfig,
}

impl MarkupRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render one message in a fresh pass
    pub fn render(&self, raw: &str) -> RenderedMarkup {
        let mut registry = LinkRegistry::new();
        let document = self.render_into(raw, &mut registry);
        tracing::debug!(
            blocks = document.len(),
            links = registry.len(),
            "Rendered message"
        );
        RenderedMarkup { document, registry }
    }

    /// Render `raw`, allocating link ids from a caller-owned registry
    pub(crate) fn render_into(&self, raw: &str, registry: &mut LinkRegistry) -> Vec<Node> {
        let escaped = escape::escape(raw);
        let mut inline = InlineTransformer::new(registry, &self.config);

        blocks::segment(&escaped)
            .into_iter()
            .flat_map(|block| block_nodes(block, &mut inline))
            .collect()
    }
}

fn block_nodes(block: Block<'_>, inline: &mut InlineTransformer<'_>) -> Vec<Node> {
    match block {
        Block::Code { language, content } => vec![Node::CodeBlock {
            language: language.map(str::to_string),
            content,
        }],
        Block::Heading { level, text } => vec![Node::Heading {
            level,
            children: inline.transform(text),
        }],
        Block::Quote(lines) => vec![Node::Blockquote {
            children: inline.transform(&lines.join("\n")),
        }],
        Block::List(lines) => lists::assemble(&lines, inline),
        Block::Paragraph(lines) => vec![Node::Paragraph {
            children: inline.transform(&lines.join("\n")),
        }],
    }
}
