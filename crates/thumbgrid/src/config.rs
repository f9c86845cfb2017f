//! Browser configuration.
//!
//! A [`BrowserConfig`] collects every tunable the browser reads at
//! construction time: the refresh tick period, the initial chrome state, the
//! icon-grid layout metrics, and the preview worker pool size. Every field has
//! a default, so a partial TOML document is valid:
//!
//! ```
//! use thumbgrid::BrowserConfig;
//!
//! let config = BrowserConfig::from_toml_str(
//!     r#"
//!     refresh_interval_ms = 50
//!     label_text = "Texture:"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.refresh_interval_ms, 50);
//! assert_eq!(config.label_text, "Texture:");
//! assert_eq!(config.thumbnail_size, 64);
//! ```

use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thumbgrid_core::logging::targets;

use crate::error::{BrowserError, BrowserResult};

/// Configuration for an [`ImageBrowser`](crate::ImageBrowser) and its helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Period of the preview redraw tick, in milliseconds.
    pub refresh_interval_ms: u64,
    /// Initial value of the `PreventSelection` property.
    pub prevent_selection: bool,
    /// Hide the filter input box and its label.
    pub hide_filter_input: bool,
    /// Caption shown next to the filter input box.
    pub label_text: String,
    /// Draw the list with a black background and white text.
    pub dark_background: bool,
    /// Width of one icon cell in the grid surface.
    pub cell_width: f32,
    /// Height of one icon cell in the grid surface.
    pub cell_height: f32,
    /// Gap between adjacent cells.
    pub spacing: f32,
    /// Longest edge of a decoded thumbnail, in pixels.
    pub thumbnail_size: u32,
    /// Number of preview decode threads.
    pub preview_workers: usize,
    /// Maximum number of queued preview loads.
    pub max_pending_previews: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let cores = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(2);
        Self {
            refresh_interval_ms: 100,
            prevent_selection: false,
            hide_filter_input: false,
            label_text: "Filter:".to_string(),
            dark_background: false,
            cell_width: 80.0,
            cell_height: 96.0,
            spacing: 4.0,
            thumbnail_size: 64,
            preview_workers: cores.min(4),
            max_pending_previews: 256,
        }
    }
}

impl BrowserConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ConfigParse`] if the document is not valid TOML
    /// or a field has the wrong type.
    pub fn from_toml_str(content: &str) -> BrowserResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ConfigIo`] if the file cannot be read, or
    /// [`BrowserError::ConfigParse`] if its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> BrowserResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| BrowserError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            "loaded browser config"
        );
        Ok(config)
    }

    /// Serialize this configuration as a pretty-printed TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ConfigSerialize`] if serialization fails.
    pub fn to_toml_string(&self) -> BrowserResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The refresh tick period as a [`Duration`].
    ///
    /// A zero interval is clamped to one millisecond so the repeating timer
    /// cannot spin.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.refresh_interval_ms, 100);
        assert!(!config.prevent_selection);
        assert!(!config.hide_filter_input);
        assert_eq!(config.label_text, "Filter:");
        assert!(config.preview_workers >= 1);
        assert!(config.preview_workers <= 4);
        assert_eq!(config.max_pending_previews, 256);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = BrowserConfig::from_toml_str("prevent_selection = true").unwrap();
        assert!(config.prevent_selection);
        assert_eq!(config.cell_width, 80.0);
        assert_eq!(config.spacing, 4.0);
    }

    #[test]
    fn test_invalid_document() {
        let err = BrowserConfig::from_toml_str("refresh_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, BrowserError::ConfigParse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BrowserConfig {
            dark_background: true,
            label_text: "Sprite:".into(),
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(BrowserConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = BrowserConfig {
            refresh_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_millis(1));
    }
}
