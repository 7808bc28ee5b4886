//! [`Connection`] adapter over `tokio_postgres`.
//!
//! Statements arrive fully compiled (values inlined), so they are sent
//! without bind parameters. SELECT rows travel over the simple-query
//! protocol, where every column arrives in Postgres' text format; the column
//! types come from preparing the statement. Booleans, integers and floats are
//! parsed, every other type (numeric, bytea, intervals, arrays, dates, json...)
//! is kept as its text form.

use crate::cache::{MemoryCache, ResultCache};
use crate::config::DatabaseConfig;
use crate::connection::{ColumnInfo, Connection};
use crate::database::{Database, Dialect};
use crate::error::{DbError, DbResult};
use crate::query::{Query, QueryKind, ResultShape, Statement};
use crate::result::{QueryOutput, ResultSet, Row};
use crate::value::Value;
use std::sync::Arc;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage, SimpleQueryRow};

/// A Postgres connection.
pub struct PgConnection {
    client: Client,
    name: String,
    table_prefix: String,
    cache: Option<MemoryCache>,
}

impl PgConnection {
    /// Connect with `NoTls` and spawn the connection task on the tokio runtime.
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let (client, connection) = tokio_postgres::connect(&config.url, NoTls)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let name = config.name.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "dbkit.sql", error = %e, "postgres connection task failed");
            }
        });

        tracing::info!(target: "dbkit.sql", name = %name, "connected to postgres");
        Ok(Self::from_client(client, config))
    }

    /// Wrap an already connected client (e.g. one using TLS).
    pub fn from_client(client: Client, config: &DatabaseConfig) -> Self {
        Self {
            client,
            name: config.name.clone(),
            table_prefix: config.table_prefix.clone(),
            cache: config
                .caching
                .then(|| MemoryCache::new(config.cache_capacity)),
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Database for PgConnection {
    fn escape(&self, raw: &str) -> String {
        Dialect::Standard.escape(raw)
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn quote_bool(&self, value: bool) -> String {
        if value { "TRUE" } else { "FALSE" }.to_string()
    }
}

impl Connection for PgConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(
        &self,
        kind: QueryKind,
        sql: &str,
        _shape: ResultShape,
    ) -> impl std::future::Future<Output = DbResult<QueryOutput>> + Send {
        async move {
            match kind {
                QueryKind::Select => {
                    let statement = self
                        .client
                        .prepare(sql)
                        .await
                        .map_err(DbError::from_db_error)?;
                    let messages = self
                        .client
                        .simple_query(sql)
                        .await
                        .map_err(DbError::from_db_error)?;

                    let columns: Arc<[String]> = statement
                        .columns()
                        .iter()
                        .map(|c| c.name().to_string())
                        .collect();
                    let types: Vec<Type> = statement
                        .columns()
                        .iter()
                        .map(|c| c.type_().clone())
                        .collect();

                    let rows = messages
                        .iter()
                        .filter_map(|message| match message {
                            SimpleQueryMessage::Row(row) => Some(row),
                            _ => None,
                        })
                        .map(|row| decode_row(&columns, &types, row))
                        .collect::<DbResult<Vec<_>>>()?;
                    Ok(QueryOutput::Rows(ResultSet::new(rows)))
                }
                QueryKind::Insert => {
                    let affected_rows = self
                        .client
                        .execute(sql, &[])
                        .await
                        .map_err(DbError::from_db_error)?;
                    Ok(QueryOutput::Inserted {
                        insert_id: None,
                        affected_rows,
                    })
                }
                QueryKind::Update | QueryKind::Delete => {
                    let affected = self
                        .client
                        .execute(sql, &[])
                        .await
                        .map_err(DbError::from_db_error)?;
                    Ok(QueryOutput::Affected(affected))
                }
                QueryKind::Other => {
                    self.client
                        .batch_execute(sql)
                        .await
                        .map_err(DbError::from_db_error)?;
                    Ok(QueryOutput::Affected(0))
                }
            }
        }
    }

    fn list_tables(
        &self,
        like: Option<&str>,
    ) -> impl std::future::Future<Output = DbResult<Vec<String>>> + Send {
        let mut q = Query::new(
            QueryKind::Select,
            "SELECT table_name::text AS table_name FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name::text LIKE :like \
             ORDER BY table_name",
        );
        q.param(":like", like.unwrap_or("%"));

        async move {
            let rows = q.fetch_all(self).await?;
            rows.iter()
                .map(|row| text_column(row, "table_name"))
                .collect()
        }
    }

    fn list_columns(
        &self,
        table: &str,
        like: Option<&str>,
    ) -> impl std::future::Future<Output = DbResult<Vec<ColumnInfo>>> + Send {
        let mut q = Query::new(
            QueryKind::Select,
            "SELECT column_name::text AS name, data_type::text AS data_type, \
             (is_nullable::text = 'YES') AS is_nullable, column_default::text AS column_default, \
             ordinal_position::int8 AS ordinal_position \
             FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name::text = :table \
             AND column_name::text LIKE :like ORDER BY ordinal_position",
        );
        q.param(":table", format!("{}{table}", self.table_prefix))
            .param(":like", like.unwrap_or("%"));

        async move {
            let rows = q.fetch_all(self).await?;
            rows.iter()
                .map(|row| {
                    Ok(ColumnInfo {
                        name: text_column(row, "name")?,
                        data_type: text_column(row, "data_type")?,
                        is_nullable: matches!(row.get("is_nullable"), Some(Value::Bool(true))),
                        default: row
                            .get("column_default")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        ordinal_position: row
                            .get("ordinal_position")
                            .and_then(Value::as_i64)
                            .unwrap_or_default(),
                    })
                })
                .collect()
        }
    }

    fn cache(&self) -> Option<&dyn ResultCache> {
        self.cache.as_ref().map(|c| c as &dyn ResultCache)
    }
}

fn text_column(row: &Row, column: &str) -> DbResult<String> {
    row.get(column)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DbError::decode(column, "expected a text value"))
}

fn decode_row(columns: &Arc<[String]>, types: &[Type], row: &SimpleQueryRow) -> DbResult<Row> {
    let values = types
        .iter()
        .enumerate()
        .map(|(idx, ty)| {
            let column = columns.get(idx).map(String::as_str).unwrap_or_default();
            let raw = row
                .try_get(idx)
                .map_err(|e| DbError::decode(column, e.to_string()))?;
            decode_text(column, ty, raw)
        })
        .collect::<DbResult<Vec<_>>>()?;
    Ok(Row::new(columns.clone(), values))
}

/// Convert one column from Postgres' text format.
fn decode_text(column: &str, ty: &Type, raw: Option<&str>) -> DbResult<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Null);
    };

    if *ty == Type::BOOL {
        match raw {
            "t" => Ok(Value::Bool(true)),
            "f" => Ok(Value::Bool(false)),
            other => Err(DbError::decode(column, format!("invalid bool {other:?}"))),
        }
    } else if [Type::INT2, Type::INT4, Type::INT8, Type::OID].contains(ty) {
        raw.parse::<i64>()
            .map(Value::Int)
            .map_err(|e| DbError::decode(column, format!("invalid {ty} {raw:?}: {e}")))
    } else if *ty == Type::FLOAT4 || *ty == Type::FLOAT8 {
        raw.parse::<f64>()
            .map(Value::Float)
            .map_err(|e| DbError::decode(column, format!("invalid {ty} {raw:?}: {e}")))
    } else {
        Ok(Value::Text(raw.to_string()))
    }
}
