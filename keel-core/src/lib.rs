mod as_value;
mod aware;
mod condition;
mod connection;
pub mod dialect;
mod driver;
mod dump;
mod element;
mod error;
mod exporter;
mod factory;
mod importer;
mod iterator;
mod join;
mod monitor;
mod options;
mod parameter;
mod query;
mod row;
mod statement;
mod util;
mod value;
pub mod writer;

pub use ::anyhow;
pub use as_value::*;
pub use aware::*;
pub use condition::{Condition, Glue};
pub use connection::*;
pub use dialect::Dialect;
pub use driver::*;
pub use dump::*;
pub use element::*;
pub use error::*;
pub use exporter::*;
pub use factory::*;
pub use importer::*;
pub use iterator::*;
pub use join::*;
pub use monitor::*;
pub use options::*;
pub use parameter::*;
pub use query::*;
pub use row::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub use writer::SqlWriter;
