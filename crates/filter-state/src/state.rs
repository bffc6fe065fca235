//! Owned filter state: the items, their categories and the current
//! selection mapping.
//!
//! `FilterState` is the cell a UI context holds on to. Selections are
//! replaced wholesale, never merged, and the filtered view is recomputed
//! on every read.

use crate::category::{FilterCategory, Record, find_category};
use crate::engine::{self, FieldFallback};
use crate::value::ItemValue;
use crate::values::FilterValues;
use std::collections::HashSet;
use std::sync::Arc;
use tracing;

type SharedFallback<T> = Arc<dyn Fn(&T, &str) -> ItemValue + Send + Sync>;

/// Filter selections over an owned list of items.
///
/// ## Usage
/// ```ignore
/// let mut state = FilterState::new(items, vec![
///     FilterCategory::new("fullName", |p: &Person| format!("{} {}", p.first, p.last)),
/// ]);
/// state.set_filter_values(FilterValues::new().with("fullName", ["jo do"]));
/// let visible = state.filtered_items();
/// ```
pub struct FilterState<T> {
    items: Vec<T>,
    categories: Vec<FilterCategory<T>>,
    values: FilterValues,
    fallback: Option<SharedFallback<T>>,
}

impl<T> FilterState<T> {
    /// Create a state with no active selections.
    ///
    /// Keys without a declared category exclude every item here. For
    /// `Record` items, use `for_records` to read the field named by the key.
    ///
    /// # Arguments
    /// * `items` - The full, unfiltered list
    /// * `categories` - Category descriptors; for duplicate keys the
    ///   first one declared is used
    pub fn new(items: Vec<T>, categories: Vec<FilterCategory<T>>) -> Self {
        warn_on_duplicate_keys(&categories);
        Self {
            items,
            categories,
            values: FilterValues::new(),
            fallback: None,
        }
    }

    /// Use `lookup` for selection keys that have no declared category.
    pub fn with_field_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&T, &str) -> ItemValue + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(lookup));
        self
    }

    pub fn filter_values(&self) -> &FilterValues {
        &self.values
    }

    /// Replace the entire selection mapping.
    ///
    /// No validation is done: unknown keys and empty lists are stored as-is.
    pub fn set_filter_values(&mut self, values: FilterValues) {
        tracing::debug!(
            "Filter values replaced ({} keys, {} active)",
            values.len(),
            values.active_keys().count()
        );
        self.values = values;
    }

    /// Drop every selection.
    pub fn clear_filters(&mut self) {
        self.set_filter_values(FilterValues::new());
    }

    pub fn has_active_filters(&self) -> bool {
        self.values.is_active()
    }

    /// Items passing every active selection, in input order.
    pub fn filtered_items(&self) -> Vec<&T> {
        engine::filter_with(&self.items, &self.values, &self.categories, self.fallback())
    }

    /// Replace the input list; selections are kept.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn categories(&self) -> &[FilterCategory<T>] {
        &self.categories
    }

    pub fn category(&self, key: &str) -> Option<&FilterCategory<T>> {
        find_category(&self.categories, key)
    }

    fn fallback(&self) -> Option<FieldFallback<'_, T>> {
        let lookup: FieldFallback<'_, T> = self.fallback.as_deref()?;
        Some(lookup)
    }
}

impl<T: Sync> FilterState<T> {
    /// Parallel `filtered_items`. Same result, same order.
    pub fn par_filtered_items(&self) -> Vec<&T> {
        engine::par_filter_with(&self.items, &self.values, &self.categories, self.fallback())
    }
}

impl<T: Record> FilterState<T> {
    /// Create a state whose orphan keys read the item field of that name.
    pub fn for_records(items: Vec<T>, categories: Vec<FilterCategory<T>>) -> Self {
        Self::new(items, categories).with_field_fallback(|item: &T, key: &str| item.field(key))
    }
}

fn warn_on_duplicate_keys<T>(categories: &[FilterCategory<T>]) {
    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category.key()) {
            tracing::warn!(
                "Duplicate filter category key '{}'; first declaration wins",
                category.key()
            );
        }
    }
}
