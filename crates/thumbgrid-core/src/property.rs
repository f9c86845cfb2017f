//! Reactive properties with change detection.
//!
//! A [`Property<T>`] wraps a value and reports whether an assignment actually
//! changed it, so owners can emit their notification signal only on real
//! changes.
//!
//! # Example
//!
//! ```
//! use thumbgrid_core::{Property, Signal};
//!
//! struct FilterBox {
//!     text: Property<String>,
//!     text_changed: Signal<String>,
//! }
//!
//! impl FilterBox {
//!     fn set_text(&self, text: &str) {
//!         if self.text.set(text.to_string()) {
//!             self.text_changed.emit(text.to_string());
//!         }
//!     }
//! }
//!
//! let filter = FilterBox { text: Property::new(String::new()), text_changed: Signal::new() };
//! filter.set_text("wall");
//! assert_eq!(filter.text.get(), "wall");
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A reactive property that tracks changes.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_set_reports_change() {
        let prop = Property::new(false);
        assert!(!prop.set(false));
        assert!(prop.set(true));
        assert!(prop.get());
    }

    #[test]
    fn test_property_default() {
        let prop = Property::<String>::default();
        assert_eq!(prop.get(), "");
        assert!(prop.set("wall".into()));
        assert!(!prop.set("wall".into()));
    }
}
