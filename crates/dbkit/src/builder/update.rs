use super::clauses::compile_set;
use super::where_builder::{WhereState, impl_where_methods};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::param::Params;
use crate::query::{ExecOptions, QueryKind, Statement, impl_query_methods};
use crate::value::Value;

/// UPDATE builder.
///
/// ```ignore
/// let mut q = dbkit::update("t");
/// q.set([("a", 1)]).where_("id", "=", 5);
/// assert_eq!(q.compile(&db)?, r#"UPDATE "t" SET "a" = 1 WHERE "id" = 5"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Update {
    table: Option<Ident>,
    set: Vec<(Ident, Value)>,
    where_state: WhereState,
    params: Params,
    options: ExecOptions,
    last_sql: Option<String>,
}

impl Update {
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

    /// Append column/value assignments.
    pub fn set<I, C, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<Ident>,
        V: Into<Value>,
    {
        self.set
            .extend(pairs.into_iter().map(|(c, v)| (c.into(), v.into())));
        self
    }

    /// Append a single assignment.
    pub fn value(&mut self, column: impl Into<Ident>, value: impl Into<Value>) -> &mut Self {
        self.set.push((column.into(), value.into()));
        self
    }

    impl_where_methods!();
    impl_query_methods!();

    /// Clear all clause state, parameters and the last compiled SQL.
    pub fn reset(&mut self) -> &mut Self {
        let options = std::mem::take(&mut self.options);
        *self = Self {
            options,
            ..Self::default()
        };
        self
    }
}

impl Statement for Update {
    fn kind(&self) -> QueryKind {
        QueryKind::Update
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
            .ok_or(DbError::MissingTable(QueryKind::Update))?;

        let mut sql = format!(
            "UPDATE {} SET {}",
            db.quote_table(table)?,
            compile_set(db, &self.set, &self.params)?
        );
        self.where_state.push_where(&mut sql, db, &self.params)?;
        self.where_state.push_order_limit(&mut sql, db)?;
        Ok(sql)
    }
}
