//! Kyra core: safe rendering of assistant messages
//!
//! Turns assistant text written in a small markup dialect (headings,
//! emphasis, code, lists, blockquotes, links) into a typed node tree, and
//! formats the source list that accompanies a response. All literal text is
//! escaped before any structure is recognised, and every link resolves
//! through a registry owned by the render pass that produced it.
//!
//! ```
//! let rendered = kyra_core::render("See [NHS guidance](https://nhs.uk/x)");
//! let target = rendered.registry.iter().next().map(|(_, t)| t.href());
//! assert_eq!(target.as_deref(), Some("https://nhs.uk/x"));
//! ```

pub mod citations;
pub mod config;
pub mod error;
pub mod markup;
pub mod message;
pub mod text;

pub use citations::Citation;
pub use config::RenderConfig;
pub use error::{ConfigError, RenderError};
pub use markup::{
    LinkId, LinkRegistry, LinkTarget, List, ListItem, MarkupRenderer, Node, RenderedMarkup,
};
pub use message::RenderedMessage;

/// Render one message with the default configuration
pub fn render(raw: &str) -> RenderedMarkup {
    MarkupRenderer::default().render(raw)
}

/// Render a citation list with the default configuration
pub fn render_citations<S: AsRef<str>>(
    citations: &[S],
    used_curated_sources: bool,
) -> RenderedMarkup {
    MarkupRenderer::default().render_citations(citations, used_curated_sources)
}
