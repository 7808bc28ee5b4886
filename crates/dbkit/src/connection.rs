//! The driver execution contract.

use crate::cache::ResultCache;
use crate::database::Database;
use crate::error::DbResult;
use crate::query::{QueryKind, ResultShape};
use crate::result::QueryOutput;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// SQL that starts a transaction at `level`.
pub fn begin_sql(level: Option<IsolationLevel>) -> String {
    match level {
        Some(level) => format!("START TRANSACTION ISOLATION LEVEL {}", level.as_sql()),
        None => "START TRANSACTION".to_string(),
    }
}

/// A column as reported by [`Connection::list_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub ordinal_position: i64,
}

/// A live database connection.
///
/// Implementations execute fully compiled SQL (values are inlined by the
/// statement compilers) and report results as [`QueryOutput`]. Quoting comes
/// from the [`Database`] supertrait, so statements are always compiled with
/// the rules of the connection that runs them.
pub trait Connection: Database {
    /// Connection name, part of result cache keys.
    fn name(&self) -> &str;

    /// Execute compiled SQL.
    ///
    /// SELECT kinds return [`QueryOutput::Rows`], INSERT returns
    /// [`QueryOutput::Inserted`], everything else [`QueryOutput::Affected`].
    fn query(
        &self,
        kind: QueryKind,
        sql: &str,
        shape: ResultShape,
    ) -> impl std::future::Future<Output = DbResult<QueryOutput>> + Send;

    /// Start a transaction.
    fn begin(
        &self,
        level: Option<IsolationLevel>,
    ) -> impl std::future::Future<Output = DbResult<()>> + Send {
        async move {
            self.query(QueryKind::Other, &begin_sql(level), ResultShape::Assoc)
                .await?;
            Ok(())
        }
    }

    /// Commit the current transaction.
    fn commit(&self) -> impl std::future::Future<Output = DbResult<()>> + Send {
        async move {
            self.query(QueryKind::Other, "COMMIT", ResultShape::Assoc)
                .await?;
            Ok(())
        }
    }

    /// Roll back the current transaction.
    fn rollback(&self) -> impl std::future::Future<Output = DbResult<()>> + Send {
        async move {
            self.query(QueryKind::Other, "ROLLBACK", ResultShape::Assoc)
                .await?;
            Ok(())
        }
    }

    /// Table names, optionally filtered with a LIKE pattern.
    fn list_tables(
        &self,
        like: Option<&str>,
    ) -> impl std::future::Future<Output = DbResult<Vec<String>>> + Send;

    /// Columns of `table`, optionally filtered with a LIKE pattern.
    fn list_columns(
        &self,
        table: &str,
        like: Option<&str>,
    ) -> impl std::future::Future<Output = DbResult<Vec<ColumnInfo>>> + Send;

    /// The result cache used by `cached()` statements, if any.
    fn cache(&self) -> Option<&dyn ResultCache> {
        None
    }
}

/// Runs the given block inside a transaction on a [`Connection`].
///
/// - Starts the transaction (optionally at an isolation level).
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`.
///
/// The block must evaluate to `dbkit::DbResult<T>`.
///
/// # Example
///
/// ```ignore
/// dbkit::transaction!(&conn, {
///     let mut q = dbkit::update("accounts");
///     q.value("balance", dbkit::expr("balance - 10")).where_("id", "=", 1);
///     q.execute(&conn).await?;
///     Ok(())
/// })?;
///
/// dbkit::transaction!(&conn, Some(dbkit::IsolationLevel::Serializable), {
///     Ok(())
/// })?;
/// ```
#[macro_export]
macro_rules! transaction {
    ($conn:expr, $level:expr, $body:block) => {{
        let __dbkit_conn = $conn;
        $crate::Connection::begin(__dbkit_conn, $level).await?;

        let __dbkit_tx_result: $crate::DbResult<_> = async { $body }.await;
        match __dbkit_tx_result {
            Ok(value) => {
                $crate::Connection::commit(__dbkit_conn).await?;
                Ok(value)
            }
            Err(error) => match $crate::Connection::rollback(__dbkit_conn).await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::DbError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
    ($conn:expr, $body:block) => {{
        $crate::transaction!($conn, None, $body)
    }};
}
