//! Citation rendering
//!
//! Formats the source list that accompanies a response. Entries that parse
//! as URLs with a recognised scheme become links in the same registry as the
//! message body; everything else is shown as inert, visibly distinct text.

use url::Url;

use crate::config::RenderConfig;
use crate::markup::escape::escape;
use crate::markup::{LinkRegistry, List, ListItem, MarkupRenderer, Node, RenderedMarkup};
use crate::text::truncate_ellipsis;

/// How one citation string will be shown, decided at render time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Citation {
    /// Clickable source with a derived display label (both unescaped)
    Url { url: String, label: String },
    /// Static annotation
    Text(String),
}

impl Citation {
    /// Classify a citation string. Returns `None` for blank entries.
    pub fn classify(raw: &str, config: &RenderConfig) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let Some((scheme, _)) = trimmed.split_once(':') else {
            return Some(Self::Text(trimmed.to_string()));
        };
        if !config.allows_citation_scheme(scheme) {
            return Some(Self::Text(trimmed.to_string()));
        }

        match Url::parse(trimmed) {
            Ok(url) => match display_label(&url, config.citation_label_max) {
                Some(label) => Some(Self::Url {
                    url: trimmed.to_string(),
                    label,
                }),
                None => {
                    tracing::debug!(
                        citation = trimmed,
                        "Citation URL has no host, showing as text"
                    );
                    Some(Self::Text(trimmed.to_string()))
                }
            },
            Err(e) => {
                tracing::debug!(
                    citation = trimmed,
                    error = %e,
                    "Citation is not a valid URL, showing as text"
                );
                Some(Self::Text(trimmed.to_string()))
            }
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::Url { .. })
    }
}

/// Host (without `www.`) plus path, cut to `max_width` columns
fn display_label(url: &Url, max_width: usize) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let path = url.path();
    let label = if path.is_empty() || path == "/" {
        host.to_string()
    } else {
        format!("{}{}", host, path.trim_end_matches('/'))
    };

    Some(truncate_ellipsis(&label, max_width).into_owned())
}

impl MarkupRenderer {
    /// Render a citation list in a fresh pass
    pub fn render_citations<S: AsRef<str>>(
        &self,
        citations: &[S],
        used_curated_sources: bool,
    ) -> RenderedMarkup {
        let mut registry = LinkRegistry::new();
        let document = self.citations_into(citations, used_curated_sources, &mut registry);
        RenderedMarkup { document, registry }
    }

    /// Render citations as a caption heading followed by one unordered list
    pub(crate) fn citations_into<S: AsRef<str>>(
        &self,
        citations: &[S],
        used_curated_sources: bool,
        registry: &mut LinkRegistry,
    ) -> Vec<Node> {
        let config = self.config();
        let mut list = List::new(false, None);

        for raw in citations {
            let Some(citation) = Citation::classify(raw.as_ref(), config) else {
                continue;
            };
            let children = match citation {
                Citation::Url { url, label } => {
                    let url = escape(&url);
                    let label = escape(&label);
                    let id = registry.register(url.clone(), label.clone());
                    vec![Node::Link { id, label, url }]
                }
                Citation::Text(text) => vec![Node::Italic {
                    children: vec![Node::text(escape(&text))],
                }],
            };
            list.items.push(ListItem::new(children));
        }

        if list.items.is_empty() {
            return Vec::new();
        }

        tracing::debug!(
            citations = list.items.len(),
            curated = used_curated_sources,
            "Rendered citations"
        );

        vec![
            Node::Heading {
                level: 3,
                children: vec![Node::text(escape(config.caption(used_curated_sources)))],
            },
            Node::List(list),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> Option<Citation> {
        Citation::classify(raw, &RenderConfig::default())
    }

    fn items(document: &[Node]) -> &[ListItem] {
        match document {
            [Node::Heading { .. }, Node::List(list)] => &list.items,
            other => panic!("Expected caption and list, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_url_and_text() {
        assert_eq!(
            classify("https://www.nhs.uk/conditions/flu/"),
            Some(Citation::Url {
                url: "https://www.nhs.uk/conditions/flu/".into(),
                label: "nhs.uk/conditions/flu".into(),
            })
        );
        assert_eq!(
            classify("Dr. Smith, 2020"),
            Some(Citation::Text("Dr. Smith, 2020".into()))
        );
        assert_eq!(classify("   "), None);
    }

    #[test]
    fn test_bare_host_label() {
        assert!(matches!(
            classify("https://nhs.uk"),
            Some(Citation::Url { label, .. }) if label == "nhs.uk"
        ));
    }

    #[test]
    fn test_unrecognised_scheme_is_text() {
        assert!(matches!(classify("ftp://files.example/a"), Some(Citation::Text(_))));
        assert!(matches!(classify("Note: see leaflet"), Some(Citation::Text(_))));
        assert!(matches!(classify("javascript:alert(1)"), Some(Citation::Text(_))));
    }

    #[test]
    fn test_malformed_url_falls_back_to_text() {
        assert!(matches!(classify("https://"), Some(Citation::Text(_))));
        assert!(matches!(classify("http://exa mple.com/"), Some(Citation::Text(_))));
    }

    #[test]
    fn test_long_label_is_truncated() {
        let url = format!("https://example.com/{}", "a".repeat(100));
        let Some(Citation::Url { label, .. }) = classify(&url) else {
            panic!("Expected URL citation");
        };
        assert_eq!(label.chars().count(), 60);
        assert!(label.ends_with(crate::text::ELLIPSIS));
        assert!(label.starts_with("example.com/aaa"));
    }

    #[test]
    fn test_render_distinguishes_links_from_text() {
        let citations = ["https://nhs.uk/a", "Dr. Smith, 2020"];
        let rendered = MarkupRenderer::default().render_citations(&citations, true);
        let items = items(&rendered.document);
        assert_eq!(items.len(), 2);

        let Node::Link { id, label, url } = &items[0].children[0] else {
            panic!("Expected Link");
        };
        assert_eq!(url, "https://nhs.uk/a");
        assert_eq!(label, "nhs.uk/a");
        assert_eq!(rendered.activate(id).unwrap().url, "https://nhs.uk/a");

        assert!(matches!(&items[1].children[0], Node::Italic { .. }));
        assert_eq!(items[1].children[0].plain_text(), "Dr. Smith, 2020");
        assert_eq!(rendered.registry.len(), 1);
    }

    #[test]
    fn test_caption_depends_on_curated_flag() {
        let renderer = MarkupRenderer::default();
        let citations = ["https://nhs.uk/a", "Dr. Smith, 2020"];
        let curated = renderer.render_citations(&citations, true);
        let general = renderer.render_citations(&citations, false);

        assert_ne!(
            curated.document[0].plain_text(),
            general.document[0].plain_text()
        );
        assert_eq!(curated.document.len(), general.document.len());
    }

    #[test]
    fn test_text_citation_is_escaped() {
        let rendered = MarkupRenderer::default().render_citations(&["<b>Smith</b> & Jones"], false);
        let items = items(&rendered.document);
        assert_eq!(
            items[0].children[0].plain_text(),
            "&lt;b&gt;Smith&lt;/b&gt; &amp; Jones"
        );
    }

    #[test]
    fn test_empty_or_blank_list_renders_nothing() {
        let renderer = MarkupRenderer::default();
        let empty: [&str; 0] = [];
        assert!(renderer.render_citations(&empty, true).is_empty());
        assert!(renderer.render_citations(&["", "  "], true).is_empty());
    }
}
