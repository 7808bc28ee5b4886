//! Convenient imports for typical `dbkit` usage.
//!
//! ```ignore
//! use dbkit::prelude::*;
//! ```

pub use crate::{
    Binding, Connection, Database, DatabaseConfig, DbError, DbResult, Dialect, Expression, Ident,
    QueryKind, Statement, Value, delete, expr, insert, query, raw, select, update,
};

#[cfg(feature = "postgres")]
pub use crate::PgConnection;
