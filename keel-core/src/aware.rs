use crate::{DatabaseDriver, Error, Result};
use std::rc::Rc;

/// Optional driver slot for components that need a database to work.
#[derive(Default, Debug, Clone)]
pub struct DatabaseAware {
    database: Option<Rc<DatabaseDriver>>,
}

impl DatabaseAware {
    pub fn new(database: Option<Rc<DatabaseDriver>>) -> Self {
        Self { database }
    }

    /// The attached driver, [`Error::DatabaseNotFound`] when there is none.
    pub fn get_database(&self) -> Result<Rc<DatabaseDriver>> {
        self.database.clone().ok_or(Error::DatabaseNotFound)
    }

    pub fn set_database(&mut self, database: Rc<DatabaseDriver>) {
        self.database = Some(database);
    }

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }
}
