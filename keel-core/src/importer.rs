use crate::{DatabaseAware, DatabaseDriver, DatabaseDump, Error, Result};
use std::rc::Rc;

/// Loads the data of a [`DatabaseDump`] back into a database.
///
/// Only rows are written, the structure of the target tables is left untouched.
#[derive(Debug, Clone)]
pub struct DatabaseImporter {
    database: DatabaseAware,
    dump: Option<DatabaseDump>,
}

impl DatabaseImporter {
    pub fn new(database: Option<Rc<DatabaseDriver>>) -> Self {
        Self {
            database: DatabaseAware::new(database),
            dump: None,
        }
    }

    pub fn database(&self) -> Result<Rc<DatabaseDriver>> {
        self.database.get_database()
    }

    pub fn set_database(&mut self, database: Rc<DatabaseDriver>) -> &mut Self {
        self.database.set_database(database);
        self
    }

    pub fn from_dump(&mut self, dump: DatabaseDump) -> &mut Self {
        self.dump = Some(dump);
        self
    }

    /// Reads a dump written by the exporter in JSON format.
    pub fn from_json(&mut self, json: &str) -> Result<&mut Self> {
        let dump = serde_json::from_str(json).map_err(|e| {
            let error = Error::InvalidArgument(format!("The dump is not valid JSON: {e}"));
            log::error!("{:#}", error);
            error
        })?;
        Ok(self.from_dump(dump))
    }

    /// Inserts every row of the dump, one multi-row INSERT per table.
    /// Returns the number of rows written.
    pub fn import_data(&self) -> Result<u64> {
        let database = self.database()?;
        let Some(dump) = &self.dump else {
            let error = Error::InvalidArgument("No dump was loaded into the importer".into());
            log::error!("{:#}", error);
            return Err(error);
        };
        let mut total = 0;
        for table in dump.tables.iter().filter(|v| !v.rows.is_empty()) {
            let mut query = database.get_query();
            query
                .insert(database.quote_name(&table.name))?
                .columns(
                    table
                        .columns
                        .iter()
                        .map(|v| database.quote_name(v))
                        .collect::<Vec<_>>(),
                );
            for row in &table.rows {
                let values = row
                    .iter()
                    .map(|v| query.quote_value(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                query.values(values);
            }
            database.set_query(query);
            let affected = database.execute_modify()?;
            log::debug!(
                "Imported {} rows into {}",
                affected.rows_affected,
                table.name
            );
            total += table.rows.len() as u64;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_json() {
        let mut importer = DatabaseImporter::new(None);
        assert!(matches!(
            importer.from_json("<mysqldump/>"),
            Err(Error::InvalidArgument(..))
        ));
        assert!(matches!(importer.import_data(), Err(Error::DatabaseNotFound)));
    }
}
