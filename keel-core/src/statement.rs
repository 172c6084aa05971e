use crate::{Result, RowLabeled, RowShape};
use std::sync::Arc;

/// How the handle should materialise the rows it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    StandardObject,
    CustomObject(Arc<RowShape>),
}

/// Cursor over the result of one executed statement, provided by the connection.
pub trait StatementHandle {
    fn set_fetch_mode(&mut self, mode: FetchMode) -> Result<()>;

    /// Next row, `None` once the result set is exhausted.
    fn fetch(&mut self) -> Result<Option<RowLabeled>>;

    /// Rows in the result set, or rows affected by a modify statement.
    fn row_count(&self) -> Result<u64>;

    /// Releases the cursor. Called at most once by the iterator owning the handle.
    fn close(&mut self) -> Result<()>;
}
