//! Base query: raw SQL, named parameters, execution and result caching.
//!
//! Every statement type (raw [`Query`] and the builders in
//! [`builder`](crate::builder)) implements [`Statement`]. Compilation happens
//! in two steps:
//!
//! 1. [`Statement::build_sql`] renders the statement with quoted values,
//!    leaving registered placeholders untouched;
//! 2. [`Statement::to_sql`] substitutes every placeholder with its quoted value.
//!
//! [`Statement::execute`] compiles against the connection's quoting rules and
//! hands the SQL to the driver. It is the only point that awaits.

mod macros;

pub(crate) use macros::impl_query_methods;

use crate::cache::cache_key;
use crate::connection::Connection;
use crate::database::Database;
use crate::error::DbResult;
use crate::param::Params;
use crate::result::{QueryOutput, ResultSet};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Maximum number of bytes of SQL included in log events.
const LOG_SQL_MAX_BYTES: usize = 200;

/// The kind of SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g., DDL, transaction control)
    Other,
}

impl QueryKind {
    /// Detect the statement kind from SQL text.
    ///
    /// Leading whitespace, comments and parentheses are skipped.
    pub fn from_sql(sql: &str) -> Self {
        fn strip_sql_prefix(sql: &str) -> &str {
            let mut s = sql;
            loop {
                let before = s;
                s = s.trim_start();
                if s.starts_with("--") {
                    if let Some(pos) = s.find('\n') {
                        s = &s[pos + 1..];
                        continue;
                    }
                    return "";
                }
                if s.starts_with("/*") {
                    if let Some(pos) = s.find("*/") {
                        s = &s[pos + 2..];
                        continue;
                    }
                    return "";
                }
                if let Some(rest) = s.strip_prefix('(') {
                    s = rest;
                    continue;
                }
                if s == before {
                    break;
                }
            }
            s
        }

        fn starts_with_keyword(s: &str, keyword: &str) -> bool {
            match s.get(0..keyword.len()) {
                Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
                None => false,
            }
        }

        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") {
            QueryKind::Select
        } else if starts_with_keyword(trimmed, "WITH") {
            Self::cte_statement_kind(trimmed)
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryKind::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryKind::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryKind::Delete
        } else {
            QueryKind::Other
        }
    }

    /// Kind of the statement that follows the CTE definitions of a `WITH` query.
    ///
    /// The first SELECT/INSERT/UPDATE/DELETE keyword outside parentheses,
    /// string literals, quoted identifiers and line comments decides the kind.
    fn cte_statement_kind(sql: &str) -> Self {
        let bytes = sql.as_bytes();
        let mut depth = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                quote @ (b'\'' | b'"') => {
                    // a doubled quote reopens as a new literal right after
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                }
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b if depth == 0 && (b.is_ascii_alphabetic() || b == b'_') => {
                    let start = i;
                    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                        i += 1;
                    }
                    let word = &sql[start..i];
                    for (keyword, kind) in [
                        ("SELECT", QueryKind::Select),
                        ("INSERT", QueryKind::Insert),
                        ("UPDATE", QueryKind::Update),
                        ("DELETE", QueryKind::Delete),
                    ] {
                        if word.eq_ignore_ascii_case(keyword) {
                            return kind;
                        }
                    }
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
        QueryKind::Select
    }

    /// Upper-case keyword for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::Other => "OTHER",
        }
    }
}

/// How the driver should shape SELECT rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultShape {
    /// Column/value maps.
    #[default]
    Assoc,
    /// Rows destined for typed mapping.
    Object,
}

/// Execution options carried by every statement.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Requested row shape.
    pub shape: ResultShape,
    /// Result cache lifetime for SELECT queries.
    pub lifetime: Option<Duration>,
    /// Skip the cache lookup (results are still stored).
    pub force_execute: bool,
}

/// A compilable, executable SQL statement.
pub trait Statement: Send + Sync {
    /// The statement kind.
    fn kind(&self) -> QueryKind;

    /// Registered placeholders.
    fn params(&self) -> &Params;

    /// Execution options.
    fn options(&self) -> &ExecOptions;

    /// Render the statement with placeholders left in place.
    fn build_sql(&self, db: &dyn Database) -> DbResult<String>;

    /// Render the final SQL: [`build_sql`](Statement::build_sql) followed by
    /// placeholder substitution.
    fn to_sql(&self, db: &dyn Database) -> DbResult<String> {
        let sql = self.build_sql(db)?;
        self.params().substitute(&sql, db)
    }

    /// Compile and run the statement on `conn`.
    ///
    /// SELECT statements with a positive cache lifetime are answered from the
    /// connection's result cache when possible, unless `force_execute` is set.
    fn execute<C: Connection>(
        &self,
        conn: &C,
    ) -> impl std::future::Future<Output = DbResult<QueryOutput>> + Send {
        async move {
            let kind = self.kind();
            let options = self.options();
            let sql = self.to_sql(conn)?;

            let cache_lifetime = options
                .lifetime
                .filter(|lifetime| kind == QueryKind::Select && !lifetime.is_zero())
                .filter(|_| conn.cache().is_some());
            let key = cache_lifetime.map(|_| cache_key(conn.name(), &sql));

            if let (Some(key), Some(cache)) = (&key, conn.cache()) {
                if !options.force_execute {
                    if let Some(rows) = cache.get(key) {
                        tracing::debug!(
                            target: "dbkit.sql",
                            kind = kind.as_str(),
                            sql = %truncate_sql(&sql),
                            cached = true,
                            "serving query from result cache"
                        );
                        return Ok(QueryOutput::Rows(ResultSet::cached(rows)));
                    }
                }
            }

            tracing::debug!(
                target: "dbkit.sql",
                kind = kind.as_str(),
                sql = %truncate_sql(&sql),
                cached = false,
                "executing query"
            );

            let output = match conn.query(kind, &sql, options.shape).await {
                Ok(output) => output,
                Err(err) => {
                    tracing::warn!(
                        target: "dbkit.sql",
                        kind = kind.as_str(),
                        sql = %truncate_sql(&sql),
                        error = %err,
                        "query failed"
                    );
                    return Err(err);
                }
            };

            if let (Some(key), Some(lifetime), Some(cache), QueryOutput::Rows(rows)) =
                (key, cache_lifetime, conn.cache(), &output)
            {
                cache.set(&key, rows.rows().to_vec(), lifetime);
            }

            Ok(output)
        }
    }

    /// Execute and return the result rows.
    ///
    /// Fails for statements that do not produce rows.
    fn fetch_all<C: Connection>(
        &self,
        conn: &C,
    ) -> impl std::future::Future<Output = DbResult<ResultSet>> + Send {
        async move { self.execute(conn).await?.into_rows() }
    }

    /// Execute and map every row to `T`.
    fn fetch_as<T: DeserializeOwned, C: Connection>(
        &self,
        conn: &C,
    ) -> impl std::future::Future<Output = DbResult<Vec<T>>> + Send {
        async move { self.fetch_all(conn).await?.rows_as::<T>() }
    }
}

fn truncate_sql(sql: &str) -> &str {
    if sql.len() <= LOG_SQL_MAX_BYTES {
        return sql;
    }
    let mut end = LOG_SQL_MAX_BYTES;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A hand-written SQL statement with named placeholders.
///
/// # Example
///
/// ```ignore
/// use dbkit::{query, QueryKind, Statement};
///
/// let mut q = query(QueryKind::Select, "SELECT * FROM users WHERE id = :id");
/// q.param(":id", 5);
/// let rows = q.fetch_all(&conn).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    kind: QueryKind,
    sql: String,
    params: Params,
    options: ExecOptions,
    last_sql: Option<String>,
}

impl Query {
    /// Create a query of the given kind.
    pub fn new(kind: QueryKind, sql: impl Into<String>) -> Self {
        Self {
            kind,
            sql: sql.into(),
            params: Params::new(),
            options: ExecOptions::default(),
            last_sql: None,
        }
    }

    /// Create a query, detecting its kind from the SQL text.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self::new(QueryKind::from_sql(&sql), sql)
    }

    /// The statement kind.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// The SQL template, before substitution.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    impl_query_methods!();
}

impl Statement for Query {
    fn kind(&self) -> QueryKind {
        self.kind
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn options(&self) -> &ExecOptions {
        &self.options
    }

    fn build_sql(&self, _db: &dyn Database) -> DbResult<String> {
        Ok(self.sql.clone())
    }
}
