//! Stateful filtering for list views.
//!
//! This crate provides:
//! - `FilterCategory` descriptors with typed accessors
//! - `FilterValues`, the selection mapping from category key to values
//! - Pure filtering functions in `engine`
//! - `FilterState`, an owned cell with replace-only selections
//!
//! ## Matching rules
//! An item passes when, for every key with a non-empty selection, its
//! value contains every selected value, ignoring case. An item with no
//! value under a constrained key never passes.
//!
//! ## Example Usage
//! ```ignore
//! use filter_state::{FilterCategory, FilterState, FilterValues};
//!
//! let mut state = FilterState::new(people, vec![
//!     FilterCategory::new("fullName", |p: &Person| format!("{} {}", p.first, p.last)),
//!     FilterCategory::new("city", |p: &Person| p.city.clone()),
//! ]);
//!
//! state.set_filter_values(FilterValues::new().with("fullName", ["jo do"]));
//! for person in state.filtered_items() {
//!     println!("{}", person.first);
//! }
//! ```

pub mod error;
pub mod value;
pub mod category;
pub mod values;
pub mod engine;
pub mod state;

// Re-export main types
pub use error::{FilterError, Result};
pub use value::ItemValue;
pub use category::{FilterCategory, Record};
pub use values::FilterValues;
pub use engine::{filter_items, filter_records, par_filter_items, par_filter_records};
pub use state::FilterState;
