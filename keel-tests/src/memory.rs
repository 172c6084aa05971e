use crate::ScriptedStatement;
use keel_core::{
    BoundParameter, Connection, Connector, DriverOptions, Error, Result, StatementHandle,
    TableColumn,
};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    rc::Rc,
};

/// Outcome of the next statement run on a [`MemoryDatabase`].
#[derive(Debug)]
pub enum Scripted {
    Statement(ScriptedStatement),
    Failure(String),
}

/// A statement received by a [`MemoryConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub parameters: Vec<BoundParameter>,
}

#[derive(Default, Debug)]
struct State {
    results: RefCell<VecDeque<Scripted>>,
    executed: RefCell<Vec<Executed>>,
    tables: RefCell<HashMap<String, Vec<TableColumn>>>,
    last_insert_id: Cell<Option<i64>>,
    refuse: RefCell<Option<String>>,
    connects: Cell<usize>,
    disconnects: Cell<usize>,
    options: RefCell<Option<DriverOptions>>,
}

/// Scripted backend shared by every connection its connector opens.
///
/// Statements receive the queued results in order, an empty result once the
/// queue is exhausted.
#[derive(Default, Debug, Clone)]
pub struct MemoryDatabase {
    state: Rc<State>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> Connector {
        let state = self.state.clone();
        Rc::new(move |options: &DriverOptions| {
            if let Some(message) = state.refuse.borrow().clone() {
                return Err(Error::connection_failure(message, Some("2002".into())));
            }
            state.connects.set(state.connects.get() + 1);
            *state.options.borrow_mut() = Some(options.clone());
            Ok(Box::new(MemoryConnection {
                state: state.clone(),
            }) as Box<dyn Connection>)
        })
    }

    pub fn push(&self, result: Scripted) -> &Self {
        self.state.results.borrow_mut().push_back(result);
        self
    }

    pub fn push_rows(&self, statement: ScriptedStatement) -> &Self {
        self.push(Scripted::Statement(statement))
    }

    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.push(Scripted::Failure(message.into()))
    }

    /// Every new connection attempt fails with `message`.
    pub fn refuse_connections(&self, message: impl Into<String>) -> &Self {
        *self.state.refuse.borrow_mut() = Some(message.into());
        self
    }

    pub fn set_table(&self, name: impl Into<String>, columns: Vec<TableColumn>) -> &Self {
        self.state.tables.borrow_mut().insert(name.into(), columns);
        self
    }

    pub fn set_last_insert_id(&self, id: Option<i64>) -> &Self {
        self.state.last_insert_id.set(id);
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.state.executed.borrow().clone()
    }

    /// SQL text of every executed statement.
    pub fn statements(&self) -> Vec<String> {
        self.state
            .executed
            .borrow()
            .iter()
            .map(|v| v.sql.clone())
            .collect()
    }

    pub fn connects(&self) -> usize {
        self.state.connects.get()
    }

    pub fn disconnects(&self) -> usize {
        self.state.disconnects.get()
    }

    /// Options the last connection was opened with.
    pub fn options(&self) -> Option<DriverOptions> {
        self.state.options.borrow().clone()
    }
}

#[derive(Debug)]
pub struct MemoryConnection {
    state: Rc<State>,
}

impl Connection for MemoryConnection {
    fn execute(
        &mut self,
        sql: &str,
        parameters: &[BoundParameter],
    ) -> Result<Box<dyn StatementHandle>> {
        self.state.executed.borrow_mut().push(Executed {
            sql: sql.to_owned(),
            parameters: parameters.to_vec(),
        });
        let next = self.state.results.borrow_mut().pop_front();
        match next {
            Some(Scripted::Statement(statement)) => Ok(Box::new(statement)),
            Some(Scripted::Failure(message)) => Err(Error::Execution {
                sql: sql.to_owned(),
                code: Some("42000".into()),
                message,
            }),
            None => Ok(Box::new(ScriptedStatement::affected(0))),
        }
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(self.state.last_insert_id.get())
    }

    fn table_columns(&mut self, table: &str) -> Result<Vec<TableColumn>> {
        self.state
            .tables
            .borrow()
            .get(table)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("table `{table}` does not exist")))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.state.disconnects.set(self.state.disconnects.get() + 1);
        Ok(())
    }
}
