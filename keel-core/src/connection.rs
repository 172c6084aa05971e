use crate::{BoundParameter, DriverOptions, Error, Result, StatementHandle, TableColumn};
use std::rc::Rc;

/// Live link to a database server, supplied by a connector.
///
/// Transport, authentication and transactions stay behind this trait: the
/// driver only hands it finished SQL text with the bound parameters.
pub trait Connection {
    /// Runs one statement and returns the cursor over its result.
    fn execute(
        &mut self,
        sql: &str,
        parameters: &[BoundParameter],
    ) -> Result<Box<dyn StatementHandle>>;

    /// Identifier generated by the last INSERT, when the backend reports one.
    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(None)
    }

    /// Column structure of a table.
    fn table_columns(&mut self, table: &str) -> Result<Vec<TableColumn>> {
        Err(Error::Driver(anyhow::anyhow!(
            "This connection cannot describe the structure of `{}`",
            table
        )))
    }

    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Opens a connection from the driver options.
pub type Connector = Rc<dyn Fn(&DriverOptions) -> Result<Box<dyn Connection>>>;
