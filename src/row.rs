//! [`Row`] is an immutable, arbitrarily-fielded record.
//!
//! Fields keep insertion order. All transforming methods return a new
//! `Row`; the original is never touched. On a stream, rows travel as
//! `Value::Object`, and `Row` converts losslessly in both directions.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::optional::Optional;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Zip an ordered field-name sequence onto a tuple of values.
    pub fn from_tuple<V: Into<Value>>(
        values: impl IntoIterator<Item = V>,
        fields: &[&str],
    ) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|f| f.to_string())
                .zip(values.into_iter().map(Into::into))
                .collect(),
        }
    }

    /// Add or replace a single field, returning the new row.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_opt(&self, name: &str) -> Optional<Value> {
        self.fields.get(name).cloned().into()
    }

    /// Merge `changes` over this row, returning the new row.
    pub fn evolve(&self, changes: Row) -> Row {
        let mut fields = self.fields.clone();
        for (name, value) in changes.fields {
            fields.insert(name, value);
        }
        Row { fields }
    }

    /// A copy missing the named fields.
    pub fn without(&self, names: &[&str]) -> Row {
        Row {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| !names.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    /// A copy keeping only the named fields, in the order given.
    pub fn project<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Result<Row> {
        let mut fields = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            match self.fields.get(name) {
                Some(value) => {
                    fields.insert(name.to_string(), value.clone());
                }
                None => bail!("no field '{}'", name),
            }
        }
        Ok(Row { fields })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Row> for Value {
    fn from(row: Row) -> Self {
        Value::Object(row.fields.into_iter().collect())
    }
}

impl TryFrom<Value> for Row {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Row {
                fields: map.into_iter().collect(),
            }),
            other => bail!("expected an object row, got {}", crate::expr::eval::type_name(&other)),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        IndexMap::deserialize(deserializer).map(|fields| Row { fields })
    }
}

/// Constructs a [`Row`] from field/value pairs by passing values through
/// [`json!`]:
///
/// ```
/// let joe = row! { name: "joe", height: 170 };
/// ```
///
/// [`json!`]: serde_json::json!
#[macro_export]
macro_rules! row {
    () => {
        $crate::row::Row::new()
    };
    ($($field:ident : $value:expr),+ $(,)?) => {
        $crate::row::Row::from_pairs([
            $( (stringify!($field), ::serde_json::json!($value)) ),+
        ])
    };
}
