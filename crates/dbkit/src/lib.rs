//! # dbkit
//!
//! A database access layer built around a fluent, dialect-aware SQL query
//! builder.
//!
//! ## Features
//!
//! - **Fluent builders**: `Select`, `Insert`, `Update`, `Delete` and `Join`
//!   with nested AND/OR condition groups, HAVING, UNION, ORDER BY and LIMIT
//! - **Deterministic compilation**: the same builder state always compiles to
//!   the same SQL string, quoted for the target backend
//! - **Named placeholders**: `:name` parameters, by value or bound to a shared
//!   cell read at compile time
//! - **Pluggable quoting**: the `Database` trait supplies the identifier quote,
//!   string escaping and table prefix
//! - **Result caching**: SELECT results can be cached per connection
//!
//! ## Example
//!
//! ```ignore
//! use dbkit::prelude::*;
//!
//! let mut q = select(["id", "name"]);
//! q.from("users")
//!     .where_open()
//!     .where_("role", "=", "admin")
//!     .or_where("id", "IN", vec![1, 2, 3])
//!     .where_close()
//!     .order_by("name", "ASC")
//!     .limit(10);
//!
//! assert_eq!(
//!     q.compile(&Dialect::Standard)?,
//!     r#"SELECT "id", "name" FROM "users" WHERE ("role" = 'admin' OR "id" IN (1, 2, 3)) ORDER BY "name" ASC LIMIT 10"#
//! );
//!
//! // With a live connection:
//! let conn = PgConnection::connect(&DatabaseConfig::new(url)).await?;
//! let users: Vec<User> = q.fetch_as(&conn).await?;
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod connection;
pub mod database;
pub mod db;
pub mod error;
pub mod expr;
pub mod ident;
pub mod param;
pub mod prelude;
pub mod query;
pub mod result;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use builder::{
    Condition, ConditionGroup, Delete, Insert, InsertSource, Join, Logic, Select, UnionSource,
    Update,
};
pub use cache::{MemoryCache, ResultCache, cache_key};
pub use config::DatabaseConfig;
pub use connection::{ColumnInfo, Connection, IsolationLevel};
pub use database::{Database, Dialect, Quoter};
pub use db::{delete, expr, insert, query, raw, select, update};
pub use error::{DbError, DbResult};
pub use expr::Expression;
pub use ident::Ident;
pub use param::{Binding, Params};
pub use query::{ExecOptions, Query, QueryKind, ResultShape, Statement};
pub use result::{QueryOutput, ResultSet, Row};
pub use value::Value;

#[cfg(feature = "postgres")]
pub use postgres::PgConnection;
