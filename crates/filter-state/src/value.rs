//! Comparable values extracted from items.
//!
//! Accessors hand back an `ItemValue` rather than a raw string so that
//! "no value" (absent field, empty string, zero, false) can be told apart
//! from a value that simply fails to match.

use serde_json::Value;
use std::fmt;

/// A value an accessor extracted from an item for comparison.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemValue {
    /// The item has nothing under this category
    #[default]
    Absent,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Multi-valued field, stringified as a comma-joined list
    List(Vec<ItemValue>),
}

impl ItemValue {
    /// Whether this value counts as present for filtering.
    ///
    /// `Absent`, empty text, zero, NaN and `false` are all "empty" and make
    /// an item fail any non-empty selection. Lists are always present, even
    /// when they have no elements.
    pub fn is_truthy(&self) -> bool {
        match self {
            ItemValue::Absent => false,
            ItemValue::Text(s) => !s.is_empty(),
            ItemValue::Int(n) => *n != 0,
            ItemValue::Float(f) => *f != 0.0 && !f.is_nan(),
            ItemValue::Bool(b) => *b,
            ItemValue::List(_) => true,
        }
    }

    /// The string form used for containment matching.
    ///
    /// Floats at or above `1e21`, or below `1e-6` in magnitude, use
    /// exponent form with an explicit sign (`1e+21`, `1e-7`), and infinities
    /// print as `Infinity`, the same text a browser list view shows.
    pub fn to_match_string(&self) -> String {
        match self {
            ItemValue::Absent => String::new(),
            ItemValue::Text(s) => s.clone(),
            ItemValue::Int(n) => n.to_string(),
            ItemValue::Float(f) => format_float(*f),
            ItemValue::Bool(b) => b.to_string(),
            ItemValue::List(items) => items
                .iter()
                .map(ItemValue::to_match_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Case-insensitive substring test against a single selected value.
    pub fn contains_ci(&self, needle: &str) -> bool {
        self.matches_all(std::slice::from_ref(&needle))
    }

    /// True when this value is present and contains every needle,
    /// ignoring case.
    pub fn matches_all<S: AsRef<str>>(&self, needles: &[S]) -> bool {
        if !self.is_truthy() {
            return false;
        }
        let haystack = self.to_match_string().to_lowercase();
        needles
            .iter()
            .all(|needle| haystack.contains(&needle.as_ref().to_lowercase()))
    }
}

fn format_float(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && (magnitude >= 1e21 || magnitude < 1e-6) {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    f.to_string()
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_match_string())
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for ItemValue {
    fn from(s: &str) -> Self {
        ItemValue::Text(s.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(s: String) -> Self {
        ItemValue::Text(s)
    }
}

impl From<&String> for ItemValue {
    fn from(s: &String) -> Self {
        ItemValue::Text(s.clone())
    }
}

impl From<bool> for ItemValue {
    fn from(b: bool) -> Self {
        ItemValue::Bool(b)
    }
}

impl From<f64> for ItemValue {
    fn from(f: f64) -> Self {
        ItemValue::Float(f)
    }
}

impl From<f32> for ItemValue {
    fn from(f: f32) -> Self {
        ItemValue::Float(f64::from(f))
    }
}

macro_rules! impl_from_small_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ItemValue {
                fn from(n: $t) -> Self {
                    ItemValue::Int(i64::from(n))
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ItemValue {
                fn from(n: $t) -> Self {
                    match i64::try_from(n) {
                        Ok(n) => ItemValue::Int(n),
                        Err(_) => ItemValue::Float(n as f64),
                    }
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, usize, isize);

impl<V: Into<ItemValue>> From<Option<V>> for ItemValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(ItemValue::Absent, Into::into)
    }
}

impl<V: Into<ItemValue>> From<Vec<V>> for ItemValue {
    fn from(values: Vec<V>) -> Self {
        ItemValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<&Value> for ItemValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ItemValue::Absent,
            Value::Bool(b) => ItemValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ItemValue::Int(i),
                None => n.as_f64().map_or(ItemValue::Absent, ItemValue::Float),
            },
            Value::String(s) => ItemValue::Text(s.clone()),
            Value::Array(items) => ItemValue::List(items.iter().map(ItemValue::from).collect()),
            Value::Object(_) => ItemValue::Text(value.to_string()),
        }
    }
}

impl From<Value> for ItemValue {
    fn from(value: Value) -> Self {
        ItemValue::from(&value)
    }
}
