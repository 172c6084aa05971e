use crate::{
    Error, FetchMode, FromRow, Result, ResultRow, RowKey, RowLabeled, RowShape, RowShapes,
    ShapedRow, StatementHandle,
};
use indexmap::{IndexMap, map::Entry};
use std::sync::Arc;

/// Lazy, single pass sequence of `(key, row)` over a statement handle.
///
/// The fetch mode is sent to the handle once, at construction. The handle is
/// closed when the rows run out, when a fetch fails and when the iterator is
/// dropped, whichever happens first.
pub struct DatabaseIterator {
    statement: Box<dyn StatementHandle>,
    key_column: Option<String>,
    shape: Option<Arc<RowShape>>,
    position: u64,
    closed: bool,
}

impl DatabaseIterator {
    /// Fails with [`Error::InvalidArgument`] when `class_name` is not a registered shape.
    /// The handle is closed when construction fails.
    pub fn new(
        mut statement: Box<dyn StatementHandle>,
        key_column: Option<&str>,
        class_name: Option<&str>,
        shapes: &RowShapes,
    ) -> Result<Self> {
        let shape = match class_name.map(|name| shapes.get(name).ok_or(name)) {
            Some(Err(name)) => {
                let error = Error::InvalidArgument(format!("row shape `{name}` is not registered"));
                log::error!("{:#}", error);
                close_statement(&mut *statement);
                return Err(error);
            }
            Some(Ok(shape)) => Some(shape),
            None => None,
        };
        let mode = match &shape {
            Some(shape) => FetchMode::CustomObject(shape.clone()),
            None => FetchMode::StandardObject,
        };
        if let Err(error) = statement.set_fetch_mode(mode) {
            log::error!("{:#}", error);
            close_statement(&mut *statement);
            return Err(error);
        }
        Ok(Self {
            statement,
            key_column: key_column.map(str::to_owned),
            shape,
            position: 0,
            closed: false,
        })
    }

    /// Plain rows keyed by ordinal.
    pub fn standard(statement: Box<dyn StatementHandle>) -> Result<Self> {
        Self::new(statement, None, None, &RowShapes::default())
    }

    /// Rows in the result set, without consuming any.
    pub fn row_count(&self) -> Result<u64> {
        self.statement.row_count()
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }

    /// Collects every row into an insertion ordered map, a repeated key fails.
    pub fn into_map(mut self) -> Result<IndexMap<RowKey, ResultRow>> {
        let mut result = IndexMap::new();
        for item in self.by_ref() {
            let (key, row) = item?;
            match result.entry(key) {
                Entry::Occupied(entry) => return Err(Error::DuplicateKey(entry.key().to_string())),
                Entry::Vacant(entry) => {
                    entry.insert(row);
                }
            }
        }
        Ok(result)
    }

    /// Maps every row into `T`.
    pub fn typed<T: FromRow>(self) -> impl Iterator<Item = Result<(RowKey, T)>> {
        self.map(|item| {
            let (key, row) = item?;
            Ok((key, T::from_row(row.into_labeled())?))
        })
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        close_statement(&mut *self.statement);
    }

    fn make_item(&self, row: RowLabeled) -> Result<(RowKey, ResultRow)> {
        let key = match &self.key_column {
            Some(column) => row
                .get_column(column)
                .map(RowKey::from)
                .ok_or_else(|| Error::KeyColumnNotFound(column.clone()))?,
            None => RowKey::Index(self.position),
        };
        let row = match &self.shape {
            Some(shape) => ResultRow::Shaped(ShapedRow::from_labeled(shape.clone(), &row)),
            None => ResultRow::Object(row),
        };
        Ok((key, row))
    }
}

fn close_statement(statement: &mut dyn StatementHandle) {
    if let Err(error) = statement.close() {
        log::error!("{:#}", error);
    }
}

impl Iterator for DatabaseIterator {
    type Item = Result<(RowKey, ResultRow)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.statement.fetch() {
            Ok(Some(row)) => {
                let item = self.make_item(row);
                self.position += 1;
                Some(item)
            }
            Ok(None) => {
                self.close();
                None
            }
            Err(error) => {
                log::error!("{:#}", error);
                self.close();
                Some(Err(error))
            }
        }
    }
}

impl Drop for DatabaseIterator {
    fn drop(&mut self) {
        self.close();
    }
}
