//! Pure filtering over a list of items.
//!
//! An item is kept only if it satisfies every key in the selection mapping
//! that has at least one selected value. Within a key, the item's value must
//! contain every selected value (case-insensitive substring test).
//!
//! ## Algorithm
//! For each item, for each key in the selection mapping:
//! 1. Empty selection: no constraint, pass
//! 2. Look up the category declared with that key (first match wins)
//! 3. Compute the item's value with the category accessor, or with the
//!    field fallback when no category is declared
//! 4. An empty value (absent, "", 0, false) fails the key
//! 5. Otherwise every selected value must be contained in the value
//!
//! Nothing here can fail: missing categories and missing fields become
//! non-matches. Input order is always preserved.

use crate::category::{FilterCategory, Record, find_category};
use crate::value::ItemValue;
use crate::values::FilterValues;
use rayon::prelude::*;
use tracing;

/// Field lookup used for keys that have no declared category.
pub type FieldFallback<'a, T> = &'a (dyn Fn(&T, &str) -> ItemValue + Sync);

/// Decide whether a single item passes every active selection.
///
/// # Arguments
/// * `item` - The item under test
/// * `values` - Current selection mapping
/// * `categories` - Declared categories; keys are expected to be unique
/// * `fallback` - Lookup for orphan keys. With `None`, an orphan key
///   with a non-empty selection excludes the item
pub fn item_matches<T>(
    item: &T,
    values: &FilterValues,
    categories: &[FilterCategory<T>],
    fallback: Option<FieldFallback<'_, T>>,
) -> bool {
    values.iter().all(|(key, selected)| {
        if selected.is_empty() {
            return true;
        }
        let value = match find_category(categories, key) {
            Some(category) => category.value_of(item),
            None => {
                tracing::trace!("No category declared for filter key '{}'", key);
                fallback.map_or(ItemValue::Absent, |lookup| lookup(item, key))
            }
        };
        value.matches_all(selected.as_slice())
    })
}

/// Filter `items` against the selection mapping, keeping input order.
///
/// Keys with no declared category have nothing to compare against, so a
/// non-empty selection under such a key yields an empty result.
pub fn filter_items<'a, T>(
    items: &'a [T],
    values: &FilterValues,
    categories: &[FilterCategory<T>],
) -> Vec<&'a T> {
    filter_with(items, values, categories, None)
}

/// Like `filter_items`, but orphan keys fall back to `Record::field`.
pub fn filter_records<'a, T: Record>(
    items: &'a [T],
    values: &FilterValues,
    categories: &[FilterCategory<T>],
) -> Vec<&'a T> {
    let lookup = |item: &T, key: &str| item.field(key);
    filter_with(items, values, categories, Some(&lookup))
}

/// Filter with an explicit orphan-key fallback.
pub fn filter_with<'a, T>(
    items: &'a [T],
    values: &FilterValues,
    categories: &[FilterCategory<T>],
    fallback: Option<FieldFallback<'_, T>>,
) -> Vec<&'a T> {
    if !values.is_active() {
        tracing::debug!("No active filters (input count: {})", items.len());
        return items.iter().collect();
    }

    let filtered: Vec<&T> = items
        .iter()
        .filter(|item| item_matches(*item, values, categories, fallback))
        .collect();

    tracing::debug!(
        "Filters applied: {:?} (input count: {}, output count: {})",
        values.active_keys().collect::<Vec<_>>(),
        items.len(),
        filtered.len()
    );
    filtered
}

/// Parallel `filter_items`. Same result, same order.
pub fn par_filter_items<'a, T: Sync>(
    items: &'a [T],
    values: &FilterValues,
    categories: &[FilterCategory<T>],
) -> Vec<&'a T> {
    par_filter_with(items, values, categories, None)
}

/// Parallel `filter_records`. Same result, same order.
pub fn par_filter_records<'a, T: Record + Sync>(
    items: &'a [T],
    values: &FilterValues,
    categories: &[FilterCategory<T>],
) -> Vec<&'a T> {
    let lookup = |item: &T, key: &str| item.field(key);
    par_filter_with(items, values, categories, Some(&lookup))
}

/// Parallel `filter_with`, using Rayon's work-stealing pool.
pub fn par_filter_with<'a, T: Sync>(
    items: &'a [T],
    values: &FilterValues,
    categories: &[FilterCategory<T>],
    fallback: Option<FieldFallback<'_, T>>,
) -> Vec<&'a T> {
    if !values.is_active() {
        return items.iter().collect();
    }

    // Rayon's collect keeps the source order for slice iterators
    let filtered: Vec<&T> = items
        .par_iter()
        .filter(|item| item_matches(*item, values, categories, fallback))
        .collect();

    tracing::debug!(
        "Filters applied in parallel (input count: {}, output count: {})",
        items.len(),
        filtered.len()
    );
    filtered
}
