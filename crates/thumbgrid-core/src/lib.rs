//! Core systems for Thumbgrid.
//!
//! This crate provides the foundational pieces the browser engine is built on:
//!
//! - **Signal/Slot System**: Explicit multi-listener observer lists
//! - **Property System**: Values with change detection
//! - **Timers**: Repeating timers for cooperative event loops
//! - **Geometry**: Points, sizes and rectangles in surface space
//! - **Logging**: Tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use thumbgrid_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use thumbgrid_core::TimerManager;
//!
//! let mut timers = TimerManager::new();
//! let refresh = timers.start_repeating(Duration::from_millis(100));
//!
//! // In the host event loop:
//! for fired in timers.process_expired() {
//!     if fired == refresh {
//!         // run the refresh sweep
//!     }
//! }
//! ```

mod error;
pub mod geometry;
pub mod logging;
pub mod property;
pub mod signal;
pub mod timer;

pub use error::{CoreError, CoreResult};
pub use geometry::{Point, Rect, Size};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
pub use timer::{TimerId, TimerManager};
