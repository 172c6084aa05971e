use crate::{RowLabeled, Value};
use serde::{Deserialize, Serialize};

/// Column description reported by a connection able to describe tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
}

/// Contents of one exported table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableDump {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structure: Vec<TableColumn>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl TableDump {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends a fetched row, the first one fixes the column list.
    pub fn push_row(&mut self, row: RowLabeled) {
        if self.columns.is_empty() {
            self.columns = row.labels.to_vec();
        }
        self.rows.push(row.values.into_vec());
    }
}

/// Snapshot produced by the exporter and consumed by the importer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseDump {
    pub tables: Vec<TableDump>,
}

impl DatabaseDump {
    pub fn table(&self, name: &str) -> Option<&TableDump> {
        self.tables.iter().find(|v| v.name == name)
    }
}
