//! [`StreamTable`] is a [`Stream`] constrained to [`Row`]-shaped
//! elements, with projection and predicate sugar expressed through the
//! placeholder [`X`] and an aligned text rendering.
//!
//! ```
//! StreamTable::from_tuples(json!([["joe", 170, 59]]), &["name", "height", "weight"])?
//!     .select(&["name"], fields! { bmi: X.attr("weight") / (X.attr("height") / 100).pow(2) })
//!     .where_(X.attr("bmi").gt(20))
//!     .show()?;
//! ```
//!
//! [`X`]: crate::expr::X

use anyhow::{bail, Context, Result};
use log::debug;
use serde_json::Value;

use crate::callable::Callable;
use crate::expr::eval::type_name;
use crate::row::Row;
use crate::stream::Stream;

/// A stream of rows. Chaining methods mirror [`Stream`] but stay in the
/// table world; terminals are inherited through [`std::ops::Deref`].
#[derive(Clone, Debug)]
pub struct StreamTable {
    stream: Stream,
}

impl std::ops::Deref for StreamTable {
    type Target = Stream;

    fn deref(&self) -> &Stream {
        &self.stream
    }
}

impl StreamTable {
    pub fn new(stream: Stream) -> Self {
        Self { stream }
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self::new(Stream::new(rows.into_iter().map(Value::from)))
    }

    /// Build a table by zipping an ordered field-name sequence onto each
    /// tuple: `from_tuples(json!([["joe", 170]]), &["name", "height"])`.
    pub fn from_tuples(tuples: Value, fields: &[&str]) -> Result<Self> {
        let tuples = match tuples {
            Value::Array(tuples) => tuples,
            other => bail!("from_tuples expects an array, got {}", type_name(&other)),
        };
        let mut rows = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            match tuple {
                Value::Array(values) => rows.push(Row::from_tuple(values, fields)),
                other => bail!("from_tuples expects tuple rows, got {}", type_name(&other)),
            }
        }
        Ok(Self::from_rows(rows))
    }

    pub fn map(&self, func: impl Into<Callable>) -> Self {
        Self::new(self.stream.map(func))
    }

    pub fn filter(&self, pred: impl Into<Callable>) -> Self {
        Self::new(self.stream.filter(pred))
    }

    pub fn flat_map(&self, func: impl Into<Callable>) -> Self {
        Self::new(self.stream.flat_map(func))
    }

    pub fn take(&self, n: usize) -> Self {
        Self::new(self.stream.take(n))
    }

    pub fn drop(&self, n: usize) -> Self {
        Self::new(self.stream.drop(n))
    }

    /// Table-semantic sugar for [`StreamTable::filter`].
    pub fn where_(&self, pred: impl Into<Callable>) -> Self {
        self.filter(pred)
    }

    /// Project each row to the named existing fields (in the order
    /// given) plus computed fields evaluated against the full row. A
    /// computed field with a retained field's name wins.
    pub fn select(&self, keep: &[&str], computed: Vec<(String, Callable)>) -> Self {
        let keep: Vec<String> = keep.iter().map(|s| s.to_string()).collect();
        let mut order = keep;
        for (name, _) in &computed {
            if !order.contains(name) {
                order.push(name.clone());
            }
        }

        self.map(Callable::fallible(move |value: &Value| {
            let mut row = Row::try_from(value.clone()).context("select stage")?;
            for (name, callable) in &computed {
                // every computed field sees the original row
                row = row.with(name, callable.invoke(value)?);
            }
            Ok(row.project(&order)?.into())
        }))
    }

    /// Add or replace fields on each row, keeping the rest.
    pub fn map_fields(&self, computed: Vec<(String, Callable)>) -> Self {
        self.map(Callable::fallible(move |value: &Value| {
            let mut row = Row::try_from(value.clone()).context("map_fields stage")?;
            for (name, callable) in &computed {
                row = row.with(name, callable.invoke(value)?);
            }
            Ok(row.into())
        }))
    }

    /// Expand each row into one row per element of an array-valued
    /// field.
    pub fn explode(&self, field: &str) -> Self {
        let field = field.to_string();
        self.flat_map(Callable::fallible(move |value: &Value| {
            let row = Row::try_from(value.clone()).context("explode stage")?;
            let items = match row.get(&field) {
                Some(Value::Array(items)) => items.clone(),
                Some(other) => bail!("explode field '{}' is {}, not an array", field, type_name(other)),
                None => bail!("no field '{}'", field),
            };
            let rows: Vec<Value> = items
                .into_iter()
                .map(|item| row.clone().with(&field, item).into())
                .collect();
            Ok(Value::Array(rows))
        }))
    }

    /// Render up to `n` rows as an aligned text table. Headers are field
    /// names in first-seen order; numeric columns are right-aligned.
    pub fn tabulate(&self, n: usize) -> Result<String> {
        let mut rows: Vec<Row> = Vec::new();
        for elem in self.stream.iter().take(n) {
            rows.push(Row::try_from(elem?)?);
        }
        debug!("rendering {} rows", rows.len());

        let fields = scan_fields(&rows);
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                fields
                    .iter()
                    .map(|f| row.get(f).map(render_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        let numeric: Vec<bool> = fields
            .iter()
            .map(|f| {
                let mut seen = false;
                for row in &rows {
                    match row.get(f.as_str()) {
                        Some(Value::Number(_)) => seen = true,
                        Some(Value::Null) | None => {}
                        Some(_) => return false,
                    }
                }
                seen
            })
            .collect();

        let widths: Vec<usize> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain([f.len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        render_line(&mut out, &fields, &widths, &numeric);
        out.push('|');
        for (i, width) in widths.iter().enumerate() {
            out.push_str(&"-".repeat(width + 2));
            out.push(if i + 1 == widths.len() { '|' } else { '+' });
        }
        out.push('\n');
        for row in &cells {
            render_line(&mut out, row, &widths, &numeric);
        }
        Ok(out)
    }

    /// Print the first 10 rows and return the rendering. Purely
    /// presentational; the table itself is untouched.
    pub fn show(&self) -> Result<String> {
        let rendered = self.tabulate(10)?;
        println!("{}", rendered);
        Ok(rendered)
    }
}

fn render_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize], numeric: &[bool]) {
    out.push('|');
    for ((cell, width), right_align) in cells.iter().zip(widths).zip(numeric) {
        let cell = cell.as_ref();
        if *right_align {
            out.push_str(&format!(" {:>width$} |", cell, width = *width));
        } else {
            out.push_str(&format!(" {:<width$} |", cell, width = *width));
        }
    }
    out.push('\n');
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Field names in first-seen order across the scanned rows.
fn scan_fields(rows: &[Row]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for row in rows {
        for name in row.fields() {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        }
    }
    fields
}

/// Builds the computed-field list for [`StreamTable::select`] and
/// [`StreamTable::map_fields`]:
/// `fields! { bmi: X.attr("weight") / X.attr("height") }`.
#[macro_export]
macro_rules! fields {
    ($($name:ident : $value:expr),* $(,)?) => {
        vec![ $( (
            stringify!($name).to_string(),
            $crate::Callable::from($value),
        ) ),* ]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Operations, X};
    use crate::row;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn people() -> StreamTable {
        StreamTable::from_rows([
            row! { name: "joe", height: 170, weight: 59 },
            row! { name: "amy", height: 160, weight: 61 },
        ])
    }

    #[test]
    fn test_from_tuples() {
        let table = StreamTable::from_tuples(
            json!([["joe", 170], ["amy", 160]]),
            &["name", "height"],
        )
        .unwrap();
        assert_eq!(
            table.to_list().unwrap(),
            vec![
                json!({"name": "joe", "height": 170}),
                json!({"name": "amy", "height": 160}),
            ]
        );
        assert!(StreamTable::from_tuples(json!(3), &["x"]).is_err());
    }

    #[test]
    fn test_select_computes_bmi() {
        let rows = people()
            .select(
                &["name"],
                fields! { bmi: X.attr("weight") / (X.attr("height") / 100).pow(2) },
            )
            .to_list()
            .unwrap();

        assert_eq!(rows.len(), 2);
        let joe = rows[0].as_object().unwrap();
        assert_eq!(joe.keys().collect::<Vec<_>>(), vec!["name", "bmi"]);
        assert_eq!(joe["name"], json!("joe"));
        assert!((joe["bmi"].as_f64().unwrap() - 20.4152).abs() < 1e-3);
    }

    #[test]
    fn test_select_computed_wins_name_collision() {
        let rows = people()
            .select(&["name", "height"], fields! { height: X.attr("height") * 2 })
            .to_list()
            .unwrap();
        assert_eq!(rows[0], json!({"name": "joe", "height": 340}));
    }

    #[test]
    fn test_where_matches_filter() {
        let table = people().select(
            &["name"],
            fields! { bmi: X.attr("weight") / (X.attr("height") / 100).pow(2) },
        );
        let pred = X.attr("bmi").gt(20.5);

        assert_eq!(
            table.where_(&pred).to_list().unwrap(),
            table.filter(&pred).to_list().unwrap()
        );
        let names: Vec<_> = table
            .where_(&pred)
            .to_list()
            .unwrap()
            .into_iter()
            .map(|r| r["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("amy")]);
    }

    #[test]
    fn test_map_fields_keeps_rest() {
        let rows = people()
            .map_fields(fields! { height: X.attr("height") + 1 })
            .to_list()
            .unwrap();
        assert_eq!(
            rows[0],
            json!({"name": "joe", "height": 171, "weight": 59})
        );
    }

    #[test]
    fn test_explode() {
        let table = StreamTable::from_rows([
            row! { name: "a", nums: [1, 3] },
            row! { name: "b", nums: [2] },
        ]);
        assert_eq!(
            table.explode("nums").to_list().unwrap(),
            vec![
                json!({"name": "a", "nums": 1}),
                json!({"name": "a", "nums": 3}),
                json!({"name": "b", "nums": 2}),
            ]
        );
    }

    #[test]
    fn test_tabulate_alignment() {
        let table = StreamTable::from_rows([
            row! { name: "joe", height: 170 },
            row! { name: "amy", height: 9 },
        ]);
        let rendered = table.tabulate(10).unwrap();
        let expected = "\
| name | height |
|------+--------|
| joe  |    170 |
| amy  |      9 |
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_tabulate_first_seen_field_order() {
        let table = StreamTable::from_rows([
            row! { a: 1 },
            row! { a: 2, b: "x" },
        ]);
        let rendered = table.tabulate(10).unwrap();
        assert!(rendered.starts_with("| a | b"));
    }

    #[test]
    fn test_non_row_element_errors() {
        let table = StreamTable::new(Stream::new([1, 2]));
        assert!(table.select(&["x"], vec![]).to_list().is_err());
        assert!(table.tabulate(10).is_err());
    }
}
