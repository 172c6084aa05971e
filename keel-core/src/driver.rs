use crate::{
    Connection, Connector, DatabaseIterator, Dialect, DriverOptions, Error, FromRow, Query,
    QueryMonitor, Result, ResultRow, RowKey, RowShape, RowShapes, RowsAffected, StatementHandle,
    TableColumn, Value, replace_prefix, truncate_long, writer::SharedWriter,
};
use indexmap::IndexMap;
use std::{
    cell::{Cell, RefCell},
    fmt::{self, Debug},
    rc::Rc,
    sync::Arc,
};

/// Marker replaced by the table prefix in every executed statement.
pub const PREFIX_MARKER: &str = "#__";

/// Statement a driver is about to execute.
#[derive(Debug, Clone)]
pub enum Sql {
    Raw(String),
    Built(Query),
}

impl From<&str> for Sql {
    fn from(value: &str) -> Self {
        Sql::Raw(value.to_owned())
    }
}

impl From<String> for Sql {
    fn from(value: String) -> Self {
        Sql::Raw(value)
    }
}

impl From<Query> for Sql {
    fn from(value: Query) -> Self {
        Sql::Built(value)
    }
}

impl From<&Query> for Sql {
    fn from(value: &Query) -> Self {
        Sql::Built(value.clone())
    }
}

/// Ties a dialect, a lazily opened connection and an optional monitor together.
///
/// Shared as `Rc<DatabaseDriver>`: every method takes `&self`, the mutable
/// state lives in cells.
pub struct DatabaseDriver {
    name: String,
    writer: SharedWriter,
    options: DriverOptions,
    connector: Option<Connector>,
    connection: RefCell<Option<Box<dyn Connection>>>,
    monitor: RefCell<Option<Rc<dyn QueryMonitor>>>,
    sql: RefCell<Option<Sql>>,
    shapes: RefCell<RowShapes>,
    count: Cell<u64>,
}

impl DatabaseDriver {
    pub fn new(
        name: impl Into<String>,
        writer: SharedWriter,
        options: DriverOptions,
        connector: Option<Connector>,
    ) -> Self {
        Self {
            name: name.into(),
            writer,
            options,
            connector,
            connection: RefCell::new(None),
            monitor: RefCell::new(None),
            sql: RefCell::new(None),
            shapes: RefCell::new(RowShapes::default()),
            count: Cell::new(0),
        }
    }

    pub fn for_dialect(dialect: Dialect, options: DriverOptions, connector: Option<Connector>) -> Self {
        Self::new(dialect.name, Arc::new(dialect), options, connector)
    }

    /// Canonical adapter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> &Dialect {
        self.writer.dialect()
    }

    pub fn writer(&self) -> SharedWriter {
        self.writer.clone()
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub fn prefix(&self) -> &str {
        &self.options.prefix
    }

    /// Statements executed so far.
    pub fn count(&self) -> u64 {
        self.count.get()
    }

    /// New empty query for this driver's dialect.
    pub fn get_query(&self) -> Query {
        Query::new(self.writer.clone())
    }

    pub fn set_query(&self, sql: impl Into<Sql>) -> &Self {
        *self.sql.borrow_mut() = Some(sql.into());
        self
    }

    /// Statement set by the last `set_query`.
    pub fn current_query(&self) -> Option<Sql> {
        self.sql.borrow().clone()
    }

    pub fn set_monitor(&self, monitor: Option<Rc<dyn QueryMonitor>>) -> &Self {
        *self.monitor.borrow_mut() = monitor;
        self
    }

    pub fn monitor(&self) -> Option<Rc<dyn QueryMonitor>> {
        self.monitor.borrow().clone()
    }

    pub fn register_shape(&self, shape: RowShape) -> Arc<RowShape> {
        self.shapes.borrow_mut().register(shape)
    }

    pub fn set_shapes(&self, shapes: RowShapes) {
        *self.shapes.borrow_mut() = shapes;
    }

    pub fn connected(&self) -> bool {
        self.connection.borrow().is_some()
    }

    /// Opens the connection unless already open.
    pub fn connect(&self) -> Result<()> {
        if self.connected() {
            return Ok(());
        }
        let Some(connector) = &self.connector else {
            let error = Error::connection_failure(
                format!("No connector is available for the `{}` adapter", self.name),
                None,
            );
            log::error!("{:#}", error);
            return Err(error);
        };
        let connection = connector(&self.options).inspect_err(|e| log::error!("{:#}", e))?;
        *self.connection.borrow_mut() = Some(connection);
        Ok(())
    }

    pub fn disconnect(&self) -> Result<()> {
        match self.connection.borrow_mut().take() {
            Some(mut connection) => connection.disconnect(),
            None => Ok(()),
        }
    }

    /// `sql` with the table prefix marker replaced outside of string literals.
    pub fn replace_prefix(&self, sql: &str) -> String {
        replace_prefix(sql, &self.options.prefix, PREFIX_MARKER)
    }

    pub fn quote(&self, text: &str) -> String {
        self.get_query().quote(text)
    }

    pub fn quote_name(&self, name: &str) -> String {
        self.get_query().quote_name(name)
    }

    pub fn escape(&self, text: &str, extra: bool) -> String {
        self.get_query().escape(text, extra)
    }

    /// Runs the current statement and returns its cursor.
    ///
    /// The monitor sees the final SQL text, after prefix replacement, and is
    /// stopped whether the statement succeeds or not.
    pub fn execute(&self) -> Result<Box<dyn StatementHandle>> {
        let Some(sql) = self.current_query() else {
            let error = Error::InvalidArgument("No statement was set on the driver".into());
            log::error!("{:#}", error);
            return Err(error);
        };
        let (text, parameters) = match &sql {
            Sql::Raw(text) => (text.clone(), Vec::new()),
            Sql::Built(query) => (query.render(), query.parameters()),
        };
        let text = self.replace_prefix(&text);
        self.connect()?;
        log::debug!("{}", truncate_long!(text));
        let monitor = self.monitor();
        if let Some(monitor) = &monitor {
            monitor.start_query(&text, &parameters);
        }
        let result = match self.connection.borrow_mut().as_mut() {
            Some(connection) => connection.execute(&text, &parameters),
            None => Err(Error::connection_failure("The connection is closed", None)),
        };
        if let Some(monitor) = &monitor {
            monitor.stop_query();
        }
        self.count.set(self.count.get() + 1);
        result.inspect_err(|e| log::error!("{:#}", e))
    }

    /// Sets the statement and executes it.
    pub fn run(&self, sql: impl Into<Sql>) -> Result<Box<dyn StatementHandle>> {
        self.set_query(sql);
        self.execute()
    }

    /// Executes a modify statement and reports its effect.
    pub fn execute_modify(&self) -> Result<RowsAffected> {
        let mut statement = self.execute()?;
        let rows_affected = statement.row_count();
        statement.close()?;
        Ok(RowsAffected {
            rows_affected: rows_affected?,
            last_affected_id: self.last_insert_id()?,
        })
    }

    pub fn last_insert_id(&self) -> Result<Option<i64>> {
        match self.connection.borrow_mut().as_mut() {
            Some(connection) => connection.last_insert_id(),
            None => Ok(None),
        }
    }

    /// Column structure of `table`, the prefix marker is replaced first.
    pub fn table_columns(&self, table: &str) -> Result<Vec<TableColumn>> {
        self.connect()?;
        let table = self.replace_prefix(table);
        match self.connection.borrow_mut().as_mut() {
            Some(connection) => connection.table_columns(&table),
            None => Err(Error::connection_failure("The connection is closed", None)),
        }
    }

    /// Executes the current statement and wraps the cursor in a result iterator.
    pub fn load_iterator(
        &self,
        key_column: Option<&str>,
        class_name: Option<&str>,
    ) -> Result<DatabaseIterator> {
        let statement = self.execute()?;
        DatabaseIterator::new(statement, key_column, class_name, &self.shapes.borrow())
    }

    pub fn load_objects(&self) -> Result<Vec<ResultRow>> {
        self.load_iterator(None, None)?
            .map(|item| item.map(|(_, row)| row))
            .collect()
    }

    /// Rows keyed by `key_column`, a repeated key fails.
    pub fn load_objects_keyed(&self, key_column: &str) -> Result<IndexMap<RowKey, ResultRow>> {
        self.load_iterator(Some(key_column), None)?.into_map()
    }

    /// First row of the result, `None` when empty.
    pub fn load_object(&self) -> Result<Option<ResultRow>> {
        self.load_iterator(None, None)?
            .next()
            .transpose()
            .map(|v| v.map(|(_, row)| row))
    }

    /// First column of the first row.
    pub fn load_result(&self) -> Result<Option<Value>> {
        Ok(self
            .load_object()?
            .map(ResultRow::into_labeled)
            .and_then(|row| row.values.into_vec().into_iter().next()))
    }

    /// Column at `offset` of every row.
    pub fn load_column(&self, offset: usize) -> Result<Vec<Value>> {
        self.load_iterator(None, None)?
            .map(|item| {
                let (_, row) = item?;
                Ok(row
                    .into_labeled()
                    .values
                    .into_vec()
                    .into_iter()
                    .nth(offset)
                    .unwrap_or_default())
            })
            .collect()
    }

    pub fn load_typed<T: FromRow>(&self) -> Result<Vec<T>> {
        self.load_iterator(None, None)?
            .typed::<T>()
            .map(|item| item.map(|(_, v)| v))
            .collect()
    }
}

impl Debug for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseDriver")
            .field("name", &self.name)
            .field("dialect", &self.dialect().name)
            .field("prefix", &self.options.prefix)
            .field("connected", &self.connected())
            .field("count", &self.count.get())
            .finish()
    }
}

impl Drop for DatabaseDriver {
    fn drop(&mut self) {
        if let Err(error) = self.disconnect() {
            log::error!("{:#}", error);
        }
    }
}
