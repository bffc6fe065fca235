//! The selection mapping: category key to the values a user picked.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Current filter selections, grouped by category key.
///
/// An absent key and a key with an empty list both mean "no constraint".
/// Serializes as a plain JSON object of string arrays, e.g.
/// `{"name": ["jo"], "status": []}`. A `null` entry decodes as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterValues(BTreeMap<String, Vec<String>>);

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected values for `key`, if the key is present.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Replace the selection for one key.
    pub fn set<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Builder form of `set`.
    pub fn with<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(key, values);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    /// Keys whose selection is non-empty.
    pub fn active_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, _)| key.as_str())
    }

    /// True when at least one category constrains the result.
    pub fn is_active(&self) -> bool {
        self.active_keys().next().is_some()
    }

    /// Number of keys present, active or not.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode a selection mapping from a JSON object of string arrays.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build a mapping from `key=value` pairs.
    ///
    /// Repeated keys append, so `["name=jo", "name=do"]` selects both
    /// values under `name`. The value may be empty; the key may not.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Self::new();
        for pair in pairs {
            values.push_pair(pair.as_ref())?;
        }
        Ok(values)
    }

    /// Append a single `key=value` pair to this mapping.
    pub fn push_pair(&mut self, pair: &str) -> Result<()> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| FilterError::InvalidSelection(pair.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(FilterError::EmptyKey(pair.to_string()));
        }
        self.0
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }
}

impl<'de> Deserialize<'de> for FilterValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<Vec<String>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(key, values)| (key, values.unwrap_or_default()))
            .collect())
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for FilterValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, values)| (key.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a FilterValues {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_inactive() {
        let values = FilterValues::new();
        assert!(values.is_empty());
        assert!(!values.is_active());
    }

    #[test]
    fn test_empty_entry_is_not_active() {
        let values = FilterValues::new().with("name", Vec::<String>::new());
        assert_eq!(values.len(), 1);
        assert!(!values.is_active());
        assert_eq!(values.active_keys().count(), 0);
    }

    #[test]
    fn test_set_replaces_key() {
        let mut values = FilterValues::new().with("name", ["a", "b"]);
        values.set("name", ["c"]);
        assert_eq!(values.get("name"), Some(&["c".to_string()][..]));
    }

    #[test]
    fn test_remove() {
        let mut values = FilterValues::new().with("name", ["a"]);
        assert_eq!(values.remove("name"), Some(vec!["a".to_string()]));
        assert!(values.get("name").is_none());
    }

    #[test]
    fn test_json_shape() {
        let values = FilterValues::new().with("name", ["jo"]).with("status", ["open", "new"]);
        let json = values.to_json().unwrap();
        assert_eq!(json, r#"{"name":["jo"],"status":["open","new"]}"#);

        let decoded = FilterValues::from_json(&json).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_from_json_null_entry_is_no_constraint() {
        let values = FilterValues::from_json(r#"{"city": null, "name": ["jo"]}"#).unwrap();
        assert_eq!(values.get("city"), Some(&[][..]));
        assert_eq!(values.active_keys().collect::<Vec<_>>(), vec!["name"]);

        let cleared = FilterValues::from_json(r#"{"city": null}"#).unwrap();
        assert!(!cleared.is_active());
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        let err = FilterValues::from_json(r#"{"name": "jo"}"#).unwrap_err();
        assert!(matches!(err, FilterError::Json(_)));
    }

    #[test]
    fn test_from_pairs_appends() {
        let values = FilterValues::from_pairs(["name=jo", "name=do", "city="]).unwrap();
        assert_eq!(
            values.get("name"),
            Some(&["jo".to_string(), "do".to_string()][..])
        );
        assert_eq!(values.get("city"), Some(&[String::new()][..]));
    }

    #[test]
    fn test_from_pairs_value_keeps_equals() {
        let values = FilterValues::from_pairs(["expr=a=b"]).unwrap();
        assert_eq!(values.get("expr"), Some(&["a=b".to_string()][..]));
    }

    #[test]
    fn test_from_pairs_errors() {
        assert!(matches!(
            FilterValues::from_pairs(["novalue"]),
            Err(FilterError::InvalidSelection(_))
        ));
        assert!(matches!(
            FilterValues::from_pairs([" =x"]),
            Err(FilterError::EmptyKey(_))
        ));
    }

    #[test]
    fn test_from_iterator() {
        let values: FilterValues = vec![("a", vec!["1"]), ("b", vec![])].into_iter().collect();
        assert_eq!(values.active_keys().collect::<Vec<_>>(), vec!["a"]);
    }
}
