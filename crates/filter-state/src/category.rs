//! Filter category descriptors.
//!
//! Every category carries its own accessor. The "read the field named
//! `key`" default is not dynamic indexing at filter time: `FilterCategory::field`
//! builds a named-field accessor once, for item types that implement `Record`.

use crate::value::ItemValue;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Accessor mapping an item to the value compared against selections.
pub type Accessor<T> = Arc<dyn Fn(&T) -> ItemValue + Send + Sync>;

/// Items whose fields can be addressed by name.
///
/// Implement this for record types that should support
/// `FilterCategory::field` or the orphan-key fallback.
pub trait Record {
    /// Returns the value stored under `name`, or `ItemValue::Absent`.
    fn field(&self, name: &str) -> ItemValue;
}

impl Record for Value {
    fn field(&self, name: &str) -> ItemValue {
        self.get(name).map_or(ItemValue::Absent, ItemValue::from)
    }
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> ItemValue {
        self.get(name).map_or(ItemValue::Absent, ItemValue::from)
    }
}

impl<V: Clone + Into<ItemValue>> Record for HashMap<String, V> {
    fn field(&self, name: &str) -> ItemValue {
        self.get(name).cloned().into()
    }
}

impl<V: Clone + Into<ItemValue>> Record for BTreeMap<String, V> {
    fn field(&self, name: &str) -> ItemValue {
        self.get(name).cloned().into()
    }
}

/// A named dimension items can be filtered along.
pub struct FilterCategory<T> {
    key: String,
    accessor: Accessor<T>,
}

impl<T> FilterCategory<T> {
    /// Create a category with a custom accessor.
    ///
    /// # Arguments
    /// * `key` - Selection mapping key this category answers to
    /// * `accessor` - Extracts the comparable value from an item
    pub fn new<F, V>(key: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<ItemValue>,
    {
        Self {
            key: key.into(),
            accessor: Arc::new(move |item: &T| -> ItemValue { accessor(item).into() }),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Evaluate this category's accessor against an item.
    pub fn value_of(&self, item: &T) -> ItemValue {
        (self.accessor)(item)
    }
}

impl<T: Record> FilterCategory<T> {
    /// Create a category that reads the item's field named `key`.
    pub fn field(key: impl Into<String>) -> Self {
        let key = key.into();
        let name = key.clone();
        Self {
            key,
            accessor: Arc::new(move |item: &T| item.field(&name)),
        }
    }
}

impl<T> Clone for FilterCategory<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for FilterCategory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCategory")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Find the first category declared with `key`.
pub fn find_category<'a, T>(
    categories: &'a [FilterCategory<T>],
    key: &str,
) -> Option<&'a FilterCategory<T>> {
    categories.iter().find(|category| category.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Person {
        first: String,
        last: String,
        age: u32,
    }

    #[test]
    fn test_custom_accessor() {
        let category = FilterCategory::new("fullName", |p: &Person| {
            format!("{} {}", p.first, p.last)
        });
        let person = Person {
            first: "Jo".to_string(),
            last: "Do".to_string(),
            age: 30,
        };

        assert_eq!(category.key(), "fullName");
        assert_eq!(category.value_of(&person), ItemValue::from("Jo Do"));
    }

    #[test]
    fn test_numeric_accessor() {
        let category = FilterCategory::new("age", |p: &Person| p.age);
        let person = Person {
            first: String::new(),
            last: String::new(),
            age: 41,
        };
        assert_eq!(category.value_of(&person), ItemValue::Int(41));
    }

    #[test]
    fn test_field_accessor_on_json() {
        let category = FilterCategory::<Value>::field("name");
        assert_eq!(
            category.value_of(&json!({"name": "Widget"})),
            ItemValue::from("Widget")
        );
        assert_eq!(category.value_of(&json!({"other": 1})), ItemValue::Absent);
        assert_eq!(category.value_of(&json!("not an object")), ItemValue::Absent);
    }

    #[test]
    fn test_field_accessor_on_maps() {
        let mut hash = HashMap::new();
        hash.insert("color".to_string(), "Red".to_string());
        let category = FilterCategory::<HashMap<String, String>>::field("color");
        assert_eq!(category.value_of(&hash), ItemValue::from("Red"));

        let mut tree = BTreeMap::new();
        tree.insert("count".to_string(), 3i64);
        let category = FilterCategory::<BTreeMap<String, i64>>::field("count");
        assert_eq!(category.value_of(&tree), ItemValue::Int(3));
    }

    #[test]
    fn test_find_category_first_wins() {
        let categories = vec![
            FilterCategory::new("k", |_: &Person| "first"),
            FilterCategory::new("k", |_: &Person| "second"),
        ];
        let person = Person {
            first: String::new(),
            last: String::new(),
            age: 0,
        };

        let found = find_category(&categories, "k").unwrap();
        assert_eq!(found.value_of(&person), ItemValue::from("first"));
        assert!(find_category(&categories, "missing").is_none());
    }
}
