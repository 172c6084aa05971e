use crate::Role;
use thiserror::Error as ThisError;

/// Every failure surfaced by keel.
///
/// Each kind is its own variant so callers can tell an unsupported adapter
/// from a broken connection or a misused builder without matching on text.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The backing store cannot be reached or refused the credentials.
    ///
    /// `code` is kept as text: several clients report alphanumeric codes
    /// (SQLSTATE, `HY000`, ...).
    #[error("could not connect to the database: {message}{}", code_suffix(.code))]
    ConnectionFailure {
        message: String,
        code: Option<String>,
    },

    /// The adapter, or one of its roles, is not available in this runtime.
    #[error("{role} not found for the `{adapter}` adapter{}", reason_suffix(.reason))]
    UnsupportedAdapter {
        adapter: String,
        role: Role,
        reason: Option<String>,
    },

    /// The statement type of a query was already set to something else.
    #[error("cannot turn a {current} query into a {requested} query")]
    QueryTypeAlreadyDefined {
        current: &'static str,
        requested: &'static str,
    },

    /// A bound parameter data type the dialect has no mapping for.
    #[error("unknown parameter type `{tag}` for the {dialect} dialect")]
    UnknownType { tag: String, dialect: &'static str },

    /// No database driver was attached where one was required.
    #[error("no database driver is set")]
    DatabaseNotFound,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The configured key column is absent from a fetched row.
    #[error("key column `{0}` is missing from the fetched row")]
    KeyColumnNotFound(String),

    /// Two rows produced the same key while collecting into a map.
    #[error("duplicate key `{0}` in the result set")]
    DuplicateKey(String),

    /// The connection reported a failure while running a statement.
    #[error("error while running the query{}: {message}\n{sql}", code_suffix(.code))]
    Execution {
        sql: String,
        code: Option<String>,
        message: String,
    },

    /// A value could not be converted to the requested Rust type.
    #[error("{0}")]
    Conversion(String),

    /// Opaque failure from a connection collaborator.
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(" (code {code})"))
        .unwrap_or_default()
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|reason| format!(": {reason}"))
        .unwrap_or_default()
}

impl Error {
    pub fn connection_failure(message: impl Into<String>, code: Option<String>) -> Self {
        Error::ConnectionFailure {
            message: message.into(),
            code,
        }
    }

    pub fn unsupported(adapter: impl Into<String>, role: Role) -> Self {
        Error::UnsupportedAdapter {
            adapter: adapter.into(),
            role,
            reason: None,
        }
    }

    pub fn unsupported_because(
        adapter: impl Into<String>,
        role: Role,
        reason: impl Into<String>,
    ) -> Self {
        Error::UnsupportedAdapter {
            adapter: adapter.into(),
            role,
            reason: Some(reason.into()),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Error::Conversion(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
