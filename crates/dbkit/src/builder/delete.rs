use super::where_builder::{WhereState, impl_where_methods};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::param::Params;
use crate::query::{ExecOptions, QueryKind, Statement, impl_query_methods};

/// DELETE builder.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    table: Option<Ident>,
    where_state: WhereState,
    params: Params,
    options: ExecOptions,
    last_sql: Option<String>,
}

impl Delete {
    pub fn new(table: impl Into<Ident>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Set the target table.
    pub fn table(&mut self, table: impl Into<Ident>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    impl_where_methods!();
    impl_query_methods!();

    pub fn reset(&mut self) -> &mut Self {
        let options = std::mem::take(&mut self.options);
        *self = Self {
            options,
            ..Self::default()
        };
        self
    }
}

impl Statement for Delete {
    fn kind(&self) -> QueryKind {
        QueryKind::Delete
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn options(&self) -> &ExecOptions {
        &self.options
    }

    fn build_sql(&self, db: &dyn Database) -> DbResult<String> {
        let table = self
            .table
            .as_ref()
            .ok_or(DbError::MissingTable(QueryKind::Delete))?;

        let mut sql = format!("DELETE FROM {}", db.quote_table(table)?);
        self.where_state.push_where(&mut sql, db, &self.params)?;
        self.where_state.push_order_limit(&mut sql, db)?;
        Ok(sql)
    }
}
