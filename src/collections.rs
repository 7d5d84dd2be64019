//! [`Array`] and [`Map`] are list- and dict-like convenience containers.
//!
//! Both are thin rims around standard containers with non-mutating
//! transformer methods, each returning a new instance. They exist so
//! pipeline edges can stay in one vocabulary; neither carries any
//! stream machinery.

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;

use crate::callable::Callable;
use crate::expr::eval::truthy;
use crate::optional::Optional;
use crate::row::Row;
use crate::stream::Stream;

/// An immutable-by-convention sequence of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array(Vec<Value>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Negative indices count from the end.
    pub fn get_opt(&self, index: i64) -> Optional<Value> {
        let len = self.0.len() as i64;
        let resolved = if index < 0 { index + len } else { index };
        if resolved < 0 || resolved >= len {
            return Optional::Nothing;
        }
        Optional::Some(self.0[resolved as usize].clone())
    }

    pub fn first_opt(&self) -> Optional<Value> {
        self.0.first().cloned().into()
    }

    pub fn last_opt(&self) -> Optional<Value> {
        self.0.last().cloned().into()
    }

    /// A copy with one value appended.
    pub fn with(&self, value: impl Into<Value>) -> Array {
        let mut items = self.0.clone();
        items.push(value.into());
        Array(items)
    }

    /// A copy missing the element at `index`. Out-of-range indices are
    /// a no-op copy.
    pub fn remove(&self, index: usize) -> Array {
        let mut items = self.0.clone();
        if index < items.len() {
            items.remove(index);
        }
        Array(items)
    }

    pub fn map(&self, func: impl Into<Callable>) -> Result<Array> {
        let func = func.into();
        self.0.iter().map(|v| func.invoke(v)).collect()
    }

    pub fn filter(&self, pred: impl Into<Callable>) -> Result<Array> {
        let pred = pred.into();
        let mut items = Vec::new();
        for value in &self.0 {
            if truthy(&pred.invoke(value)?) {
                items.push(value.clone());
            }
        }
        Ok(Array(items))
    }

    pub fn take(&self, n: usize) -> Array {
        Array(self.0.iter().take(n).cloned().collect())
    }

    pub fn drop(&self, n: usize) -> Array {
        Array(self.0.iter().skip(n).cloned().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    pub fn to_stream(&self) -> Stream {
        Stream::new(self.0.clone())
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Array(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array.0)
    }
}

/// An insertion-ordered string-keyed mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map(IndexMap<String, Value>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Map(pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_opt(&self, key: &str) -> Optional<Value> {
        self.0.get(key).cloned().into()
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A copy with one entry added or replaced.
    pub fn with(&self, key: &str, value: impl Into<Value>) -> Map {
        let mut entries = self.0.clone();
        entries.insert(key.to_string(), value.into());
        Map(entries)
    }

    /// A copy missing `key`, preserving the order of the rest.
    pub fn remove(&self, key: &str) -> Map {
        let mut entries = self.0.clone();
        entries.shift_remove(key);
        Map(entries)
    }

    pub fn filter(&self, pred: impl Fn(&str, &Value) -> bool) -> Map {
        Map(self
            .0
            .iter()
            .filter(|(k, v)| pred(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// One `{key, value}` row per entry.
    pub fn to_stream(&self) -> Stream {
        Stream::new(self.0.iter().map(|(k, v)| {
            Value::from(Row::from_pairs([
                ("key", Value::from(k.as_str())),
                ("value", v.clone()),
            ]))
        }))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map.0.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Operations, X};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_array_access() {
        let array: Array = [10, 20, 30].into_iter().collect();
        assert_eq!(array.get_opt(1), Optional::Some(json!(20)));
        assert_eq!(array.get_opt(-1), Optional::Some(json!(30)));
        assert!(array.get_opt(3).is_nothing());
        assert_eq!(array.first_opt(), Optional::Some(json!(10)));
        assert!(Array::new().last_opt().is_nothing());
    }

    #[test]
    fn test_array_transformers_leave_original() {
        let array: Array = [1, 2, 3].into_iter().collect();
        let bigger = array.with(4);
        let smaller = array.remove(0);

        assert_eq!(array.len(), 3);
        assert_eq!(bigger.len(), 4);
        assert_eq!(smaller, [2, 3].into_iter().collect());

        assert_eq!(
            array.map(X * 10).unwrap(),
            [10, 20, 30].into_iter().collect()
        );
        assert_eq!(
            array.filter((X % 2).eq(1)).unwrap(),
            [1, 3].into_iter().collect()
        );
        assert_eq!(array.take(2).drop(1), [2].into_iter().collect());
    }

    #[test]
    fn test_array_to_stream() {
        let array: Array = [1, 2].into_iter().collect();
        assert_eq!(
            array.to_stream().map(X + 1).to_list().unwrap(),
            vec![json!(2), json!(3)]
        );
    }

    #[test]
    fn test_map_transformers() {
        let map = Map::from_pairs([("a", 1), ("b", 2)]);
        assert_eq!(map.get("a"), Some(&json!(1)));
        assert!(map.get_opt("c").is_nothing());
        assert!(map.has("b"));

        let without = map.remove("a");
        assert!(!without.has("a"));
        assert!(map.has("a"));

        let evens = map.filter(|_, v| v.as_i64().unwrap() % 2 == 0);
        assert_eq!(evens, Map::from_pairs([("b", 2)]));
    }

    #[test]
    fn test_map_to_stream() {
        let map = Map::from_pairs([("a", 1)]);
        assert_eq!(
            map.to_stream().to_list().unwrap(),
            vec![json!({"key": "a", "value": 1})]
        );
    }
}
