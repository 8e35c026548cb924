//! Render configuration
//!
//! Loaded from `~/.kyra/config.toml` when present. Every field has a default,
//! so a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Default display width of a citation label
pub const DEFAULT_CITATION_LABEL_MAX: usize = 60;

/// Tunables for a render pass
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum display width of a derived citation label, ellipsis included
    pub citation_label_max: usize,
    /// Schemes a `[label](url)` destination may use to become a link
    pub link_schemes: Vec<String>,
    /// Schemes that make a citation clickable
    pub citation_schemes: Vec<String>,
    /// Caption above citations drawn from the curated retrieval set
    pub curated_caption: String,
    /// Caption above general citations
    pub general_caption: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            citation_label_max: DEFAULT_CITATION_LABEL_MAX,
            link_schemes: vec!["http".into(), "https".into(), "mailto".into()],
            citation_schemes: vec!["http".into(), "https".into()],
            curated_caption: "Sources from trusted health references".into(),
            general_caption: "Sources".into(),
        }
    }
}

impl RenderConfig {
    /// `~/.kyra/config.toml`, if a home directory can be resolved
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kyra").join("config.toml"))
    }

    /// Parse a config from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content, path)?;
        tracing::debug!(path = %path.display(), "Loaded render config");
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// True when `scheme` may be used by an inline link
    pub fn allows_link_scheme(&self, scheme: &str) -> bool {
        self.link_schemes
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
    }

    /// True when a citation with `scheme` renders as a link
    pub fn allows_citation_scheme(&self, scheme: &str) -> bool {
        self.citation_schemes
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
    }

    /// Caption for a citation section
    pub fn caption(&self, used_curated_sources: bool) -> &str {
        if used_curated_sources {
            &self.curated_caption
        } else {
            &self.general_caption
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Room for at least one character plus the ellipsis
        if self.citation_label_max < 4 {
            return Err(ConfigError::Invalid {
                field: "citation_label_max",
                reason: format!("must be at least 4, got {}", self.citation_label_max),
            });
        }
        if self.curated_caption == self.general_caption {
            return Err(ConfigError::Invalid {
                field: "curated_caption",
                reason: "must differ from general_caption".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config =
            RenderConfig::from_toml("citation_label_max = 40\n", Path::new("test.toml")).unwrap();
        assert_eq!(config.citation_label_max, 40);
        assert_eq!(config.general_caption, "Sources");
        assert!(config.allows_link_scheme("HTTPS"));
    }

    #[test]
    fn test_rejects_tiny_label_width() {
        let result = RenderConfig::from_toml("citation_label_max = 2\n", Path::new("test.toml"));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "citation_label_max",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_identical_captions() {
        let result = RenderConfig::from_toml(
            "curated_caption = \"Sources\"\ngeneral_caption = \"Sources\"\n",
            Path::new("test.toml"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = RenderConfig::from_toml("citation_label_max = \"wide\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "link_schemes = [\"https\"]").unwrap();

        let config = RenderConfig::load(file.path()).unwrap();
        assert!(config.allows_link_scheme("https"));
        assert!(!config.allows_link_scheme("mailto"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RenderConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_caption_depends_on_curated_flag() {
        let config = RenderConfig::default();
        assert_ne!(config.caption(true), config.caption(false));
    }
}
