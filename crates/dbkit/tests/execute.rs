//! Execution tests against an in-memory connection.

use dbkit::{
    ColumnInfo, Connection, Database, DbError, DbResult, Dialect, MemoryCache, QueryKind,
    QueryOutput, ResultCache, ResultSet, ResultShape, Row, Statement, Value, insert, raw, select,
    update,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every SQL string it receives and answers SELECTs with fixed rows.
struct MockConnection {
    log: Mutex<Vec<(QueryKind, String)>>,
    rows: Vec<Row>,
    cache: Option<MemoryCache>,
    fail: bool,
}

impl MockConnection {
    fn new() -> Self {
        let columns: Arc<[String]> = Arc::from(vec!["id".to_string(), "name".to_string()]);
        Self {
            log: Mutex::new(Vec::new()),
            rows: vec![
                Row::new(columns.clone(), vec![Value::Int(1), Value::from("ann")]),
                Row::new(columns, vec![Value::Int(2), Value::from("bob")]),
            ],
            cache: None,
            fail: false,
        }
    }

    fn with_cache(mut self) -> Self {
        self.cache = Some(MemoryCache::new(16));
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn executed(&self) -> Vec<(QueryKind, String)> {
        self.log.lock().unwrap().clone()
    }
}

impl Database for MockConnection {
    fn escape(&self, raw: &str) -> String {
        Dialect::Standard.escape(raw)
    }
}

impl Connection for MockConnection {
    fn name(&self) -> &str {
        "mock"
    }

    fn query(
        &self,
        kind: QueryKind,
        sql: &str,
        _shape: ResultShape,
    ) -> impl std::future::Future<Output = DbResult<QueryOutput>> + Send {
        let sql = sql.to_string();
        async move {
            self.log.lock().unwrap().push((kind, sql));
            if self.fail {
                return Err(DbError::execution(
                    Some("42601".into()),
                    "syntax error at or near \"FORM\"",
                ));
            }
            Ok(match kind {
                QueryKind::Select => QueryOutput::Rows(ResultSet::new(self.rows.clone())),
                QueryKind::Insert => QueryOutput::Inserted {
                    insert_id: Some(7),
                    affected_rows: 1,
                },
                _ => QueryOutput::Affected(2),
            })
        }
    }

    fn list_tables(
        &self,
        _like: Option<&str>,
    ) -> impl std::future::Future<Output = DbResult<Vec<String>>> + Send {
        async { Ok(vec!["users".to_string()]) }
    }

    fn list_columns(
        &self,
        _table: &str,
        _like: Option<&str>,
    ) -> impl std::future::Future<Output = DbResult<Vec<ColumnInfo>>> + Send {
        async { Ok(Vec::new()) }
    }

    fn cache(&self) -> Option<&dyn ResultCache> {
        self.cache.as_ref().map(|c| c as &dyn ResultCache)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: i64,
    name: String,
}

#[tokio::test]
async fn select_returns_rows() {
    let conn = MockConnection::new();
    let mut q = select(["id", "name"]);
    q.from("users").where_("id", ">", 0);

    let rows = q.fetch_all(&conn).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(!rows.is_cached());
    assert_eq!(
        conn.executed(),
        vec![(
            QueryKind::Select,
            r#"SELECT "id", "name" FROM "users" WHERE "id" > 0"#.to_string()
        )]
    );
}

#[tokio::test]
async fn fetch_as_maps_rows() {
    let conn = MockConnection::new();
    let mut q = select(["id", "name"]);
    q.from("users").as_object();

    let users: Vec<User> = q.fetch_as(&conn).await.unwrap();
    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                name: "ann".into()
            },
            User {
                id: 2,
                name: "bob".into()
            },
        ]
    );
}

#[tokio::test]
async fn insert_reports_id_and_count() {
    let conn = MockConnection::new();
    let mut q = insert("users", ["name"]);
    q.values(["carol"]).unwrap();

    let out = q.execute(&conn).await.unwrap();
    assert_eq!(out.insert_id(), Some(7));
    assert_eq!(out.affected_rows(), 1);
    assert!(q.fetch_all(&conn).await.is_err());
}

#[tokio::test]
async fn update_reports_affected_rows() {
    let conn = MockConnection::new();
    let mut q = update("users");
    q.value("name", "x").where_("id", "=", 1);
    assert_eq!(q.execute(&conn).await.unwrap().affected_rows(), 2);
}

#[tokio::test]
async fn cached_select_hits_cache() {
    let conn = MockConnection::new().with_cache();
    let mut q = select(["id"]);
    q.from("users").cached(Duration::from_secs(60));

    let first = q.fetch_all(&conn).await.unwrap();
    let second = q.fetch_all(&conn).await.unwrap();
    assert!(!first.is_cached());
    assert!(second.is_cached());
    assert_eq!(second.len(), 2);
    assert_eq!(conn.executed().len(), 1);
}

#[tokio::test]
async fn force_execute_bypasses_cache() {
    let conn = MockConnection::new().with_cache();
    let mut q = select(["id"]);
    q.from("users").cached(Duration::from_secs(60));
    q.fetch_all(&conn).await.unwrap();

    q.force_execute(true);
    let rows = q.fetch_all(&conn).await.unwrap();
    assert!(!rows.is_cached());
    assert_eq!(conn.executed().len(), 2);
}

#[tokio::test]
async fn zero_lifetime_is_not_cached() {
    let conn = MockConnection::new().with_cache();
    let mut q = select(["id"]);
    q.from("users").cached(Duration::ZERO);
    q.fetch_all(&conn).await.unwrap();
    q.fetch_all(&conn).await.unwrap();
    assert_eq!(conn.executed().len(), 2);
}

#[tokio::test]
async fn non_select_is_never_cached() {
    let conn = MockConnection::new().with_cache();
    let mut q = raw("DELETE FROM sessions");
    q.cached(Duration::from_secs(60));
    q.execute(&conn).await.unwrap();
    q.execute(&conn).await.unwrap();
    assert_eq!(conn.executed().len(), 2);
}

#[tokio::test]
async fn cte_delete_is_never_cached() {
    let conn = MockConnection::new().with_cache();
    let mut q = raw(
        "WITH stale AS (SELECT id FROM sessions WHERE expires_at < NOW()) \
         DELETE FROM sessions WHERE id IN (SELECT id FROM stale)",
    );
    q.cached(Duration::from_secs(60));
    assert_eq!(q.kind(), QueryKind::Delete);

    assert_eq!(q.execute(&conn).await.unwrap().affected_rows(), 2);
    assert_eq!(q.execute(&conn).await.unwrap().affected_rows(), 2);
    let kinds: Vec<QueryKind> = conn.executed().into_iter().map(|(kind, _)| kind).collect();
    assert_eq!(kinds, vec![QueryKind::Delete, QueryKind::Delete]);
}

#[tokio::test]
async fn driver_errors_propagate() {
    let conn = MockConnection::new().failing();
    let err = raw("SELECT * FORM users").execute(&conn).await.unwrap_err();
    assert_eq!(err.code(), Some("42601"));
    assert!(!err.is_compile_error());
}

#[tokio::test]
async fn compile_errors_skip_the_driver() {
    let conn = MockConnection::new();
    let mut q = select(["id"]);
    q.from("users").order_by("id", "sideways");
    let err = q.execute(&conn).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidSortDirection(_)));
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn transaction_commits_on_ok() {
    let conn = MockConnection::new();
    let result: DbResult<u64> = async {
        dbkit::transaction!(&conn, {
            let mut q = update("users");
            q.value("name", "x");
            Ok(q.execute(&conn).await?.affected_rows())
        })
    }
    .await;

    assert_eq!(result.unwrap(), 2);
    let sql: Vec<String> = conn.executed().into_iter().map(|(_, sql)| sql).collect();
    assert_eq!(
        sql,
        vec![
            "START TRANSACTION".to_string(),
            r#"UPDATE "users" SET "name" = 'x'"#.to_string(),
            "COMMIT".to_string(),
        ]
    );
}

#[tokio::test]
async fn transaction_rolls_back_on_err() {
    let conn = MockConnection::new();
    let result: DbResult<()> = async {
        dbkit::transaction!(&conn, Some(dbkit::IsolationLevel::Serializable), {
            Err(DbError::Other("abort".into()))
        })
    }
    .await;

    assert!(matches!(result, Err(DbError::Other(msg)) if msg == "abort"));
    let sql: Vec<String> = conn.executed().into_iter().map(|(_, sql)| sql).collect();
    assert_eq!(
        sql,
        vec![
            "START TRANSACTION ISOLATION LEVEL SERIALIZABLE".to_string(),
            "ROLLBACK".to_string(),
        ]
    );
}
