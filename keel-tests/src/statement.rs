use keel_core::{
    Error, FetchMode, Result, RowLabeled, RowNames, StatementHandle, Value, anyhow::anyhow,
};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

/// What a [`ScriptedStatement`] went through, kept after the statement is gone.
#[derive(Default, Debug)]
pub struct StatementLog {
    pub fetch_modes: RefCell<Vec<FetchMode>>,
    pub fetches: Cell<usize>,
    pub closes: Cell<usize>,
}

impl StatementLog {
    pub fn fetch_modes(&self) -> Vec<FetchMode> {
        self.fetch_modes.borrow().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }

    pub fn closes(&self) -> usize {
        self.closes.get()
    }
}

/// Statement handle returning a fixed list of rows.
#[derive(Debug)]
pub struct ScriptedStatement {
    labels: RowNames,
    rows: VecDeque<Box<[Value]>>,
    row_count: u64,
    fail_at: Option<usize>,
    reject_fetch_mode: bool,
    log: Rc<StatementLog>,
}

impl ScriptedStatement {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len() as u64;
        Self {
            labels: columns.iter().map(|v| v.to_string()).collect(),
            rows: rows.into_iter().map(Vec::into_boxed_slice).collect(),
            row_count,
            fail_at: None,
            reject_fetch_mode: false,
            log: Default::default(),
        }
    }

    /// Statement of a modify query affecting `rows` rows.
    pub fn affected(rows: u64) -> Self {
        Self::new(&[], Vec::new()).with_row_count(rows)
    }

    /// Reports `count` from `row_count` whatever the rows are.
    pub fn with_row_count(mut self, count: u64) -> Self {
        self.row_count = count;
        self
    }

    /// The fetch with ordinal `index` fails instead of returning a row.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// `set_fetch_mode` fails, as with a client that cannot map rows.
    pub fn rejecting_fetch_mode(mut self) -> Self {
        self.reject_fetch_mode = true;
        self
    }

    pub fn log(&self) -> Rc<StatementLog> {
        self.log.clone()
    }
}

impl StatementHandle for ScriptedStatement {
    fn set_fetch_mode(&mut self, mode: FetchMode) -> Result<()> {
        self.log.fetch_modes.borrow_mut().push(mode);
        if self.reject_fetch_mode {
            return Err(Error::Driver(anyhow!("The fetch mode is not supported")));
        }
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<RowLabeled>> {
        let index = self.log.fetches.get();
        self.log.fetches.set(index + 1);
        if self.fail_at == Some(index) {
            return Err(Error::Driver(anyhow!("Lost the cursor while fetching row {index}")));
        }
        Ok(self
            .rows
            .pop_front()
            .map(|values| RowLabeled::new(self.labels.clone(), values)))
    }

    fn row_count(&self) -> Result<u64> {
        Ok(self.row_count)
    }

    fn close(&mut self) -> Result<()> {
        self.log.closes.set(self.log.closes.get() + 1);
        Ok(())
    }
}
