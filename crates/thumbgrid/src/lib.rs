//! Thumbgrid: a filterable thumbnail browser engine.
//!
//! Thumbgrid models the item-management and presentation state behind an
//! editor's asset picker: a catalog of items with lazily loaded previews, a
//! text filter deriving the visible subset, a low-frequency redraw scheduler
//! that repaints rows as their previews arrive, and spatial keyboard
//! navigation over the laid-out grid.
//!
//! Drawing is delegated to a [`PresentationSurface`]. [`GridSurface`] is a
//! ready-made icon grid for hosts without their own list widget.
//!
//! # Modules
//!
//! - [`browser`]: The [`ImageBrowser`] facade
//! - [`catalog`]: Item storage and the batch protocol
//! - [`filter`]: Text filter and the derived view list
//! - [`preview`]: Preview sources and the background [`PreviewLoader`]
//! - [`refresh`]: The preview redraw scheduler
//! - [`navigation`]: Selection state and directional search origins
//! - [`surface`]: The presentation surface interface
//! - [`grid_surface`]: An in-memory icon grid surface
//! - [`config`]: TOML-loadable configuration
//!
//! # Logging
//!
//! All subsystems log through `tracing` under the targets in
//! [`thumbgrid_core::logging::targets`].

pub mod browser;
pub mod catalog;
pub mod config;
mod error;
pub mod filter;
pub mod grid_surface;
pub mod item;
pub mod navigation;
pub mod preview;
pub mod refresh;
pub mod surface;

pub use browser::ImageBrowser;
pub use catalog::Catalog;
pub use config::BrowserConfig;
pub use error::{BrowserError, BrowserResult};
pub use filter::{TextFilter, ViewList};
pub use grid_surface::GridSurface;
pub use item::{GroupId, GroupMembership, Item, ItemTag};
pub use navigation::{NavigationKey, SelectionState, search_origin};
pub use preview::{PreviewLoader, PreviewSlot, PreviewSource, PreviewState, Thumbnail};
pub use refresh::{RedrawScheduler, SweepOutcome};
pub use surface::{PresentationSurface, SearchDirection, SurfaceChrome, SurfaceRow};
