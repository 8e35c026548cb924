//! Link tracking for a single render pass
//!
//! Every `Link` node carries a [`LinkId`] that resolves in the registry of the
//! pass that produced it. The registry is owned by that pass's output and
//! dropped with it; there is no shared table to leak entries into.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::escape::unescape;

/// Opaque link identifier, unique within a pass and never reused by another
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId {
    pass: Uuid,
    seq: u32,
}

impl LinkId {
    /// Position of this link within its pass (0-based, in allocation order)
    pub fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pass, self.seq)
    }
}

impl Serialize for LinkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What a link points at, in escaped form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Escaped destination, as it appears in the rendered tree
    pub url: String,
    /// Escaped display label
    pub label: String,
}

impl LinkTarget {
    /// Destination decoded for navigation
    pub fn href(&self) -> String {
        unescape(&self.url)
    }
}

impl Serialize for LinkTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("url", &self.url)?;
        map.serialize_entry("label", &self.label)?;
        map.serialize_entry("href", &self.href())?;
        map.end()
    }
}

/// Mapping from link id to target for one render pass
#[derive(Debug, Clone)]
pub struct LinkRegistry {
    pass: Uuid,
    links: BTreeMap<LinkId, LinkTarget>,
}

impl Default for LinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkRegistry {
    /// Start a registry for a fresh render pass
    pub fn new() -> Self {
        Self {
            pass: Uuid::new_v4(),
            links: BTreeMap::new(),
        }
    }

    /// Record a link and hand back its freshly allocated id
    pub fn register(&mut self, url: impl Into<String>, label: impl Into<String>) -> LinkId {
        let id = LinkId {
            pass: self.pass,
            seq: self.links.len() as u32,
        };
        self.links.insert(
            id,
            LinkTarget {
                url: url.into(),
                label: label.into(),
            },
        );
        id
    }

    /// Look up the target a host should open when link `id` is activated
    ///
    /// Ids from another pass never resolve here.
    pub fn activate(&self, id: &LinkId) -> Option<&LinkTarget> {
        self.links.get(id)
    }

    /// True when `id` was allocated by this registry
    pub fn contains(&self, id: &LinkId) -> bool {
        self.links.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// All links in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (&LinkId, &LinkTarget)> {
        self.links.iter()
    }
}

impl Serialize for LinkRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.links.len()))?;
        for (id, target) in &self.links {
            map.serialize_entry(&id.to_string(), target)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_allocates_sequential_ids() {
        let mut registry = LinkRegistry::new();
        let a = registry.register("https://a.example", "A");
        let b = registry.register("https://b.example", "B");

        assert_ne!(a, b);
        assert_eq!(a.seq(), 0);
        assert_eq!(b.seq(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.activate(&b).unwrap().label, "B");
    }

    #[test]
    fn test_ids_do_not_resolve_across_passes() {
        let mut first = LinkRegistry::new();
        let mut second = LinkRegistry::new();
        let a = first.register("https://a.example", "A");
        let b = second.register("https://a.example", "A");

        assert_ne!(a, b);
        assert!(first.contains(&a));
        assert!(second.activate(&a).is_none());
        assert!(first.activate(&b).is_none());
    }

    #[test]
    fn test_href_decodes_escaped_url() {
        let target = LinkTarget {
            url: "https://x.example/?a=1&amp;b=2".into(),
            label: "x".into(),
        };
        assert_eq!(target.href(), "https://x.example/?a=1&b=2");
    }

    #[test]
    fn test_serializes_as_id_keyed_map() {
        let mut registry = LinkRegistry::new();
        let id = registry.register("https://nhs.uk/x", "NHS");
        let json = serde_json::to_value(&registry).unwrap();

        let entry = &json[id.to_string()];
        assert_eq!(entry["url"], "https://nhs.uk/x");
        assert_eq!(entry["label"], "NHS");
        assert_eq!(entry["href"], "https://nhs.uk/x");
    }
}
