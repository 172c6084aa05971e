use crate::{
    DatabaseAware, DatabaseDriver, DatabaseDump, Error, IntoElements, Result, TableDump,
};
use std::{fmt::Write, rc::Rc};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// `<mysqldump>` document.
    #[default]
    Xml,
    /// Serialized [`DatabaseDump`].
    Json,
}

/// Dumps the structure and the data of some tables.
///
/// Table names may use the `#__` prefix marker, the export keeps them as given.
#[derive(Debug, Clone)]
pub struct DatabaseExporter {
    database: DatabaseAware,
    tables: Vec<String>,
    with_structure: bool,
    with_data: bool,
    format: ExportFormat,
}

impl DatabaseExporter {
    pub fn new(database: Option<Rc<DatabaseDriver>>) -> Self {
        Self {
            database: DatabaseAware::new(database),
            tables: Vec::new(),
            with_structure: false,
            with_data: true,
            format: ExportFormat::default(),
        }
    }

    pub fn database(&self) -> Result<Rc<DatabaseDriver>> {
        self.database.get_database()
    }

    pub fn set_database(&mut self, database: Rc<DatabaseDriver>) -> &mut Self {
        self.database.set_database(database);
        self
    }

    pub fn from(&mut self, tables: impl IntoElements) -> &mut Self {
        self.tables.extend(tables.into_elements());
        self
    }

    pub fn with_structure(&mut self, value: bool) -> &mut Self {
        self.with_structure = value;
        self
    }

    pub fn with_data(&mut self, value: bool) -> &mut Self {
        self.with_data = value;
        self
    }

    pub fn as_xml(&mut self) -> &mut Self {
        self.format = ExportFormat::Xml;
        self
    }

    pub fn as_json(&mut self) -> &mut Self {
        self.format = ExportFormat::Json;
        self
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Reads every table through the attached driver.
    pub fn dump(&self) -> Result<DatabaseDump> {
        let database = self.database()?;
        if self.tables.is_empty() {
            let error = Error::InvalidArgument("No tables were specified for the export".into());
            log::error!("{:#}", error);
            return Err(error);
        }
        let mut dump = DatabaseDump::default();
        for table in &self.tables {
            let mut table_dump = TableDump::new(table.as_str());
            if self.with_structure {
                table_dump.structure = database.table_columns(table)?;
            }
            if self.with_data {
                let mut query = database.get_query();
                query.select("*")?.from(database.quote_name(table));
                database.set_query(query);
                for item in database.load_iterator(None, None)? {
                    let (_, row) = item?;
                    table_dump.push_row(row.into_labeled());
                }
            }
            dump.tables.push(table_dump);
        }
        Ok(dump)
    }

    /// The export document in the selected format.
    pub fn export(&self) -> Result<String> {
        let dump = self.dump()?;
        match self.format {
            ExportFormat::Xml => Ok(write_xml(&dump)),
            ExportFormat::Json => serde_json::to_string_pretty(&dump)
                .map_err(|e| Error::Driver(anyhow::Error::new(e).context("While serializing the dump"))),
        }
    }
}

fn write_xml_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

fn write_xml(dump: &DatabaseDump) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<?xml version=\"1.0\"?>\n");
    out.push_str("<mysqldump xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n");
    out.push_str(" <database name=\"\">\n");
    for table in &dump.tables {
        if !table.structure.is_empty() {
            out.push_str("  <table_structure name=\"");
            write_xml_escaped(&mut out, &table.name);
            out.push_str("\">\n");
            for column in &table.structure {
                out.push_str("   <field Field=\"");
                write_xml_escaped(&mut out, &column.name);
                out.push_str("\" Type=\"");
                write_xml_escaped(&mut out, &column.type_name);
                let _ = write!(
                    out,
                    "\" Null=\"{}\" Key=\"{}\" Default=\"",
                    if column.nullable { "YES" } else { "NO" },
                    if column.primary_key { "PRI" } else { "" },
                );
                write_xml_escaped(&mut out, column.default.as_deref().unwrap_or_default());
                out.push_str("\" />\n");
            }
            out.push_str("  </table_structure>\n");
        }
        out.push_str("  <table_data name=\"");
        write_xml_escaped(&mut out, &table.name);
        out.push_str("\">\n");
        for row in &table.rows {
            out.push_str("   <row>\n");
            for (column, value) in table.columns.iter().zip(row) {
                out.push_str("    <field name=\"");
                write_xml_escaped(&mut out, column);
                if value.is_null() {
                    out.push_str("\" xsi:nil=\"true\" />\n");
                    continue;
                }
                out.push_str("\">");
                write_xml_escaped(&mut out, &value.to_string());
                out.push_str("</field>\n");
            }
            out.push_str("   </row>\n");
        }
        out.push_str("  </table_data>\n");
    }
    out.push_str(" </database>\n");
    out.push_str("</mysqldump>\n");
    out
}
