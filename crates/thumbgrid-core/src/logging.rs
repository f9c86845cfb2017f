//! Logging facilities for Thumbgrid.
//!
//! Thumbgrid uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("thumbgrid=debug,thumbgrid_core=info")
//!     .init();
//! ```
//!
//! Every subsystem logs under one of the [`targets`] constants so hosts can
//! filter the catalog, view rebuilds, preview refresh and selection
//! independently.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "thumbgrid_core";
    /// Timer system target.
    pub const TIMER: &str = "thumbgrid_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "thumbgrid_core::signal";
    /// Catalog batch protocol target.
    pub const CATALOG: &str = "thumbgrid::catalog";
    /// Filter and view rebuild target.
    pub const VIEW: &str = "thumbgrid::view";
    /// Preview redraw scheduler target.
    pub const REFRESH: &str = "thumbgrid::refresh";
    /// Selection and navigation target.
    pub const SELECTION: &str = "thumbgrid::selection";
    /// Background preview loading target.
    pub const PREVIEW: &str = "thumbgrid::preview";
    /// Configuration loading target.
    pub const CONFIG: &str = "thumbgrid::config";
    /// Performance spans.
    pub const PERF: &str = "thumbgrid::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "thumbgrid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
