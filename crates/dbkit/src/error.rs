//! Error types for dbkit

use crate::query::QueryKind;
use thiserror::Error;

/// Result type alias for dbkit operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// ORDER BY direction other than ASC/DESC
    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    /// `on()` and `using()` used on the same JOIN
    #[error("JOIN ... ON ... cannot be combined with JOIN ... USING ...")]
    IncompatibleJoinConditions,

    /// `on()`/`using()` called before any `join()`
    #[error("No JOIN has been added to attach conditions to")]
    NoJoin,

    /// INSERT target given as an alias pair
    #[error("INSERT INTO syntax does not allow table aliasing")]
    TableAliasNotAllowed,

    /// INSERT given both VALUES rows and a SELECT sub-query
    #[error("INSERT INTO ... SELECT statements cannot be combined with INSERT INTO ... VALUES")]
    IncompatibleValueSource,

    /// INSERT `select()` given a query that is not a SELECT
    #[error("Only SELECT queries can be combined with INSERT queries, got {0:?}")]
    NonSelectSubquery(QueryKind),

    /// INSERT/UPDATE/DELETE compiled without a target table (e.g. after `reset()`)
    #[error("{0:?} statement has no target table")]
    MissingTable(QueryKind),

    /// `union()` given something other than a table name or SELECT
    #[error("UNION requires a table name or a SELECT query, got {0:?}")]
    UnionArgumentInvalid(QueryKind),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error reported by tokio-postgres
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Generic execution failure reported by a driver
    #[error("Execution error{}: {message}", code_suffix(.code))]
    Execution {
        code: Option<String>,
        message: String,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" [{c}]"))
        .unwrap_or_default()
}

impl DbError {
    /// Create a generic execution error.
    pub fn execution(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error was raised while building or compiling a statement
    /// (as opposed to by the driver).
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSortDirection(_)
                | Self::IncompatibleJoinConditions
                | Self::NoJoin
                | Self::TableAliasNotAllowed
                | Self::IncompatibleValueSource
                | Self::NonSelectSubquery(_)
                | Self::MissingTable(_)
                | Self::UnionArgumentInvalid(_)
        )
    }

    /// The backend error code, if the driver reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Execution { code, .. } => code.as_deref(),
            #[cfg(feature = "postgres")]
            Self::Query(err) => err.code().map(|c| c.code()),
            _ => None,
        }
    }

    /// Parse a tokio_postgres error into a generic execution error
    /// carrying the SQLSTATE code and server message.
    #[cfg(feature = "postgres")]
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            return Self::execution(
                Some(db_err.code().code().to_string()),
                db_err.message().to_string(),
            );
        }
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::Query(err)
    }
}
