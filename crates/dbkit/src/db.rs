//! Shortcut constructors.
//!
//! ```ignore
//! use dbkit::{select, insert, update, delete, expr};
//!
//! let mut users = select(["id", "name"]);
//! users.from("users").where_("active", "=", true);
//!
//! let mut add = insert("users", ["name", "email"]);
//! add.values(["ann", "ann@example.com"])?;
//!
//! let mut touch = update("users");
//! touch.value("seen_at", expr("NOW()")).where_("id", "=", 1);
//!
//! let mut purge = delete("sessions");
//! purge.where_("expires_at", "<", expr("NOW()"));
//! ```

use crate::builder::{Delete, Insert, Select, Update};
use crate::expr::Expression;
use crate::ident::Ident;
use crate::query::{Query, QueryKind};

/// Create a [`Query`] of the given kind from raw SQL.
pub fn query(kind: QueryKind, sql: impl Into<String>) -> Query {
    Query::new(kind, sql)
}

/// Create a [`Query`], detecting its kind from the SQL text.
pub fn raw(sql: impl Into<String>) -> Query {
    Query::raw(sql)
}

/// Create a [`Select`] with the given columns (empty selects `*`).
pub fn select<I, C>(columns: I) -> Select
where
    I: IntoIterator<Item = C>,
    C: Into<Ident>,
{
    let mut q = Select::new();
    q.select(columns);
    q
}

/// Create an [`Insert`] into `table` with the given columns.
pub fn insert<I, C>(table: &str, columns: I) -> Insert
where
    I: IntoIterator<Item = C>,
    C: Into<Ident>,
{
    let mut q = Insert::new(table);
    q.columns(columns);
    q
}

/// Create an [`Update`] of `table`.
pub fn update(table: impl Into<Ident>) -> Update {
    Update::new(table)
}

/// Create a [`Delete`] from `table`.
pub fn delete(table: impl Into<Ident>) -> Delete {
    Delete::new(table)
}

/// Create a raw [`Expression`].
pub fn expr(value: impl Into<String>) -> Expression {
    Expression::new(value)
}
