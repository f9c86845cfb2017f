//! Error types for the thumbgrid crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur at the edges of the browser: configuration loading
/// and background preview decoding.
///
/// Misuse of the batch protocol is not reported here; those are contract
/// violations and panic.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// The preview loader already has the maximum number of loads queued.
    #[error("too many pending preview loads (max: {max})")]
    TooManyPending { max: usize },

    /// The preview loader's worker pool has shut down.
    #[error("preview loader has shut down")]
    LoaderShutDown,

    /// A preview worker thread could not be spawned.
    #[error("failed to spawn preview worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// An image could not be decoded into a thumbnail.
    #[error("failed to decode preview: {0}")]
    Decode(#[from] image::ImageError),

    /// A configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configuration document is not valid TOML for [`BrowserConfig`](crate::BrowserConfig).
    #[error("invalid browser config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration could not be serialized.
    #[error("failed to serialize browser config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for browser operations.
pub type BrowserResult<T> = Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::TooManyPending { max: 8 };
        assert_eq!(err.to_string(), "too many pending preview loads (max: 8)");
        assert_eq!(
            BrowserError::LoaderShutDown.to_string(),
            "preview loader has shut down"
        );
    }

    #[test]
    fn test_config_io_display_names_path() {
        let err = BrowserError::ConfigIo {
            path: PathBuf::from("/missing/browser.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/missing/browser.toml"));
    }
}
