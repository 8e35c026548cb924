//! Host payload boundary
//!
//! The chat endpoint answers with `{"response", "sources", "metadata"}`.
//! This module validates that shape and renders body and sources in one pass
//! so their links share a single registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::markup::{LinkId, LinkRegistry, LinkTarget, MarkupRenderer, Node};

/// A rendered assistant message: body, citation section, shared registry
#[derive(Debug, Clone, Serialize)]
pub struct RenderedMessage {
    pub body: Vec<Node>,
    pub sources: Vec<Node>,
    #[serde(rename = "links")]
    pub registry: LinkRegistry,
}

impl RenderedMessage {
    pub fn activate(&self, id: &LinkId) -> Option<&LinkTarget> {
        self.registry.activate(id)
    }

    /// Body followed by the citation section
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.body.iter().chain(&self.sources)
    }
}

/// Response body of the chat endpoint; unknown fields are ignored
#[derive(Debug, Deserialize)]
struct ChatPayload {
    response: String,
    #[serde(default)]
    sources: Option<Vec<String>>,
    #[serde(default)]
    metadata: Option<PayloadMetadata>,
}

#[derive(Debug, Deserialize)]
struct PayloadMetadata {
    #[serde(default)]
    used_rag: Option<bool>,
}

/// Name the field that made a payload object fail to deserialize
fn invalid_field(object: &Map<String, Value>, source: serde_json::Error) -> RenderError {
    match object.get("response") {
        Some(Value::String(_)) => {}
        other => return RenderError::invalid("response", "a string", other.unwrap_or(&Value::Null)),
    }

    match object.get("sources") {
        None | Some(Value::Null) => {}
        Some(Value::Array(entries)) => {
            if let Some((idx, entry)) = entries.iter().enumerate().find(|(_, e)| !e.is_string()) {
                return RenderError::invalid(format!("sources[{}]", idx), "a string", entry);
            }
        }
        Some(other) => return RenderError::invalid("sources", "an array", other),
    }

    match object.get("metadata") {
        None | Some(Value::Null) => {}
        Some(Value::Object(metadata)) => match metadata.get("used_rag") {
            None | Some(Value::Null) | Some(Value::Bool(_)) => {}
            Some(other) => return RenderError::invalid("metadata.used_rag", "a boolean", other),
        },
        Some(other) => return RenderError::invalid("metadata", "an object", other),
    }

    RenderError::Decode(source)
}

impl MarkupRenderer {
    /// Render a message body and its citations in one pass
    pub fn render_message<S: AsRef<str>>(
        &self,
        raw: &str,
        citations: &[S],
        used_curated_sources: bool,
    ) -> RenderedMessage {
        let mut registry = LinkRegistry::new();
        let body = self.render_into(raw, &mut registry);
        let sources = self.citations_into(citations, used_curated_sources, &mut registry);
        tracing::debug!(
            blocks = body.len(),
            links = registry.len(),
            has_sources = !sources.is_empty(),
            "Rendered message with sources"
        );
        RenderedMessage {
            body,
            sources,
            registry,
        }
    }

    /// Render a chat response payload
    ///
    /// `metadata.used_rag` selects the curated caption. Wrong field types are
    /// reported, never coerced.
    pub fn render_payload(&self, payload: &Value) -> Result<RenderedMessage, RenderError> {
        // Checked first: serde would also accept a struct written as an array
        let object = payload
            .as_object()
            .ok_or_else(|| RenderError::invalid("payload", "an object", payload))?;
        let payload =
            ChatPayload::deserialize(payload).map_err(|source| invalid_field(object, source))?;
        let used_rag = payload
            .metadata
            .and_then(|metadata| metadata.used_rag)
            .unwrap_or(false);
        let sources = payload.sources.unwrap_or_default();

        Ok(self.render_message(&payload.response, sources.as_slice(), used_rag))
    }

    /// Decode and render a chat response payload from JSON text
    pub fn render_payload_str(&self, json: &str) -> Result<RenderedMessage, RenderError> {
        let payload: Value = serde_json::from_str(json)?;
        self.render_payload(&payload)
    }
}
