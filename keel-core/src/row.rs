use crate::{AsValue, Error, Result, Value};
use std::{
    collections::HashMap,
    fmt::{self, Display},
    sync::Arc,
};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    /// Decodes a column into `T`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_column(name)
            .ok_or_else(|| Error::InvalidArgument(format!("no column named `{name}`")))?;
        T::try_from_value(value.clone())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter())
    }
}

/// Named record layout rows can be materialised into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowShape {
    pub name: String,
    pub fields: Vec<String>,
}

impl RowShape {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Shapes addressable by name when building a result iterator.
#[derive(Default, Debug, Clone)]
pub struct RowShapes {
    shapes: HashMap<String, Arc<RowShape>>,
}

impl RowShapes {
    pub fn register(&mut self, shape: RowShape) -> Arc<RowShape> {
        let shape = Arc::new(shape);
        self.shapes.insert(shape.name.clone(), shape.clone());
        shape
    }
    pub fn get(&self, name: &str) -> Option<Arc<RowShape>> {
        self.shapes.get(name).cloned()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }
}

/// Row instance of a [`RowShape`], fields missing from the fetched row are NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRow {
    pub shape: Arc<RowShape>,
    pub values: Row,
}

impl ShapedRow {
    pub fn from_labeled(shape: Arc<RowShape>, row: &RowLabeled) -> Self {
        let values = shape
            .fields
            .iter()
            .map(|field| row.get_column(field).cloned().unwrap_or_default())
            .collect();
        Self { shape, values }
    }
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.shape
            .fields
            .iter()
            .position(|v| v == field)
            .map(|i| &self.values[i])
    }
}

/// Item produced by the result iterator.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRow {
    /// Generic ordered column mapping.
    Object(RowLabeled),
    Shaped(ShapedRow),
}

impl ResultRow {
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            ResultRow::Object(row) => row.get_column(name),
            ResultRow::Shaped(row) => row.get(name),
        }
    }
    pub fn shape_name(&self) -> Option<&str> {
        match self {
            ResultRow::Object(..) => None,
            ResultRow::Shaped(row) => Some(&row.shape.name),
        }
    }
    pub fn into_labeled(self) -> RowLabeled {
        match self {
            ResultRow::Object(row) => row,
            ResultRow::Shaped(row) => RowLabeled::new(row.shape.fields.iter().cloned().collect(), row.values),
        }
    }
}

/// Types built from a fetched row.
pub trait FromRow {
    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized;
}

impl FromRow for RowLabeled {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row)
    }
}

/// Key of an iterated row: its ordinal or the value of the key column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Index(u64),
    Int(i64),
    Text(String),
}

impl From<&Value> for RowKey {
    fn from(value: &Value) -> Self {
        if let Some(v) = value.as_i64() {
            return RowKey::Int(v);
        }
        match value {
            Value::Varchar(Some(v)) => RowKey::Text(v.clone()),
            v => RowKey::Text(v.to_string()),
        }
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey::Text(value.to_owned())
    }
}

impl Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Index(v) => write!(f, "{v}"),
            RowKey::Int(v) => write!(f, "{v}"),
            RowKey::Text(v) => f.write_str(v),
        }
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RowLabeled {
        RowLabeled::new(
            ["id".to_string(), "title".to_string()].into(),
            [Value::Int32(Some(7)), Value::Varchar(Some("Row 7".into()))].into(),
        )
    }

    #[test]
    fn shaped_row_fills_missing_fields() {
        let shape = Arc::new(RowShape::new("Article", ["title", "hits"]));
        let shaped = ShapedRow::from_labeled(shape, &row());
        assert_eq!(shaped.get("title"), Some(&Value::Varchar(Some("Row 7".into()))));
        assert_eq!(shaped.get("hits"), Some(&Value::Null));
        assert_eq!(shaped.get("id"), None);
    }

    #[test]
    fn keys_from_values() {
        assert_eq!(RowKey::from(&Value::UInt8(Some(3))), RowKey::Int(3));
        assert_eq!(RowKey::from(&Value::Varchar(Some("Key 1".into()))), RowKey::from("Key 1"));
        assert_eq!(row().get::<i64>("id").unwrap(), 7);
    }
}
