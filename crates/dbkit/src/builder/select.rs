use super::clauses::compile_group_by;
use super::conditions::{ConditionGroup, Logic};
use super::join::Join;
use super::where_builder::{WhereState, impl_where_methods};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::param::Params;
use crate::query::{ExecOptions, Query, QueryKind, Statement, impl_query_methods};
use crate::value::Value;

/// A UNION branch: a table name (compiled as `SELECT * FROM table`), a
/// [`Select`] builder, or a raw [`Query`] of kind SELECT.
#[derive(Debug, Clone)]
pub enum UnionSource {
    Table(Ident),
    Select(Box<Select>),
    Query(Query),
}

impl From<&str> for UnionSource {
    fn from(table: &str) -> Self {
        UnionSource::Table(table.into())
    }
}

impl From<String> for UnionSource {
    fn from(table: String) -> Self {
        UnionSource::Table(table.into())
    }
}

impl From<Select> for UnionSource {
    fn from(select: Select) -> Self {
        UnionSource::Select(Box::new(select))
    }
}

impl From<Query> for UnionSource {
    fn from(query: Query) -> Self {
        UnionSource::Query(query)
    }
}

impl UnionSource {
    fn to_sql(&self, db: &dyn Database) -> DbResult<String> {
        match self {
            UnionSource::Table(table) => {
                let mut select = Select::new();
                select.from(table.clone());
                select.to_sql(db)
            }
            UnionSource::Select(select) => select.to_sql(db),
            UnionSource::Query(query) => query.to_sql(db),
        }
    }
}

/// SELECT builder.
///
/// # Example
///
/// ```ignore
/// use dbkit::{select, Dialect};
///
/// let mut q = select(["id", "name"]);
/// q.from("users").where_("id", "=", 5);
/// assert_eq!(
///     q.compile(&Dialect::Standard)?,
///     r#"SELECT "id", "name" FROM "users" WHERE "id" = 5"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Select {
    distinct: bool,
    columns: Vec<Ident>,
    from: Vec<Ident>,
    joins: Vec<Join>,
    where_state: WhereState,
    group_by: Vec<Ident>,
    having: ConditionGroup,
    offset: Option<u64>,
    unions: Vec<(UnionSource, bool)>,
    params: Params,
    options: ExecOptions,
    last_sql: Option<String>,
}

impl Select {
    /// Create an empty SELECT (compiles to `SELECT *` until columns are added).
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `SELECT DISTINCT`.
    pub fn distinct(&mut self, value: bool) -> &mut Self {
        self.distinct = value;
        self
    }

    /// Append columns to the select list.
    pub fn select<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Ident>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a single column.
    pub fn column(&mut self, column: impl Into<Ident>) -> &mut Self {
        self.columns.push(column.into());
        self
    }

    /// Replace the select list.
    pub fn columns<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Ident>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a table to the FROM list.
    pub fn from(&mut self, table: impl Into<Ident>) -> &mut Self {
        self.from.push(table.into());
        self
    }

    // ==================== Joins ====================

    /// Add a JOIN. Subsequent [`on`](Self::on)/[`using`](Self::using) calls
    /// apply to this join.
    pub fn join<'k>(&mut self, table: impl Into<Ident>, kind: impl Into<Option<&'k str>>) -> &mut Self {
        self.joins.push(Join::new(table, kind));
        self
    }

    pub fn left_join(&mut self, table: impl Into<Ident>) -> &mut Self {
        self.join(table, "LEFT")
    }

    pub fn inner_join(&mut self, table: impl Into<Ident>) -> &mut Self {
        self.join(table, "INNER")
    }

    /// Add an ON condition to the most recent join.
    pub fn on(
        &mut self,
        c1: impl Into<Ident>,
        op: &str,
        c2: impl Into<Ident>,
    ) -> DbResult<&mut Self> {
        self.last_join()?.on(c1, op, c2)?;
        Ok(self)
    }

    /// Add USING columns to the most recent join.
    pub fn using<I, C>(&mut self, columns: I) -> DbResult<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Ident>,
    {
        self.last_join()?.using(columns)?;
        Ok(self)
    }

    fn last_join(&mut self) -> DbResult<&mut Join> {
        self.joins.last_mut().ok_or(DbError::NoJoin)
    }

    // ==================== Grouping ====================

    /// Append GROUP BY columns.
    pub fn group_by<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Ident>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Alias of [`and_having`](Self::and_having).
    pub fn having(
        &mut self,
        column: impl Into<Ident>,
        op: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.and_having(column, op, value)
    }

    pub fn and_having(
        &mut self,
        column: impl Into<Ident>,
        op: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.having.push(Logic::And, column.into(), op, value.into());
        self
    }

    pub fn or_having(
        &mut self,
        column: impl Into<Ident>,
        op: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.having.push(Logic::Or, column.into(), op, value.into());
        self
    }

    pub fn having_open(&mut self) -> &mut Self {
        self.and_having_open()
    }

    pub fn and_having_open(&mut self) -> &mut Self {
        self.having.open(Logic::And);
        self
    }

    pub fn or_having_open(&mut self) -> &mut Self {
        self.having.open(Logic::Or);
        self
    }

    pub fn having_close(&mut self) -> &mut Self {
        self.and_having_close()
    }

    pub fn and_having_close(&mut self) -> &mut Self {
        self.having.close(Logic::And);
        self
    }

    pub fn or_having_close(&mut self) -> &mut Self {
        self.having.close(Logic::Or);
        self
    }

    /// Close the current HAVING group, or remove it if it is still empty.
    pub fn having_close_empty(&mut self) -> &mut Self {
        self.having.close_empty(Logic::And);
        self
    }

    // ==================== Union / paging ====================

    /// Append a `UNION [ALL]` branch.
    ///
    /// Raw queries must be SELECTs, otherwise `UnionArgumentInvalid` is returned.
    pub fn union(&mut self, source: impl Into<UnionSource>, all: bool) -> DbResult<&mut Self> {
        let source = source.into();
        if let UnionSource::Query(query) = &source {
            if query.kind() != QueryKind::Select {
                return Err(DbError::UnionArgumentInvalid(query.kind()));
            }
        }
        self.unions.push((source, all));
        Ok(self)
    }

    /// Set the OFFSET.
    pub fn offset(&mut self, number: u64) -> &mut Self {
        self.offset = Some(number);
        self
    }

    impl_where_methods!();
    impl_query_methods!();

    /// Clear all clause state, parameters and the last compiled SQL.
    ///
    /// Result shape and cache settings are kept.
    pub fn reset(&mut self) -> &mut Self {
        let options = std::mem::take(&mut self.options);
        *self = Self {
            options,
            ..Self::default()
        };
        self
    }
}

/// Quote every item and drop duplicates, keeping first occurrences.
fn quote_unique(
    items: &[Ident],
    quote: impl Fn(&Ident) -> DbResult<String>,
) -> DbResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let quoted = quote(item)?;
        if !out.contains(&quoted) {
            out.push(quoted);
        }
    }
    Ok(out)
}

impl Statement for Select {
    fn kind(&self) -> QueryKind {
        QueryKind::Select
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn options(&self) -> &ExecOptions {
        &self.options
    }

    fn build_sql(&self, db: &dyn Database) -> DbResult<String> {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&quote_unique(&self.columns, |c| db.quote_column(c))?.join(", "));
        }

        if !self.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&quote_unique(&self.from, |t| db.quote_table(t))?.join(", "));
        }

        if !self.joins.is_empty() {
            let joins = self
                .joins
                .iter()
                .map(|join| join.compile(db))
                .collect::<DbResult<Vec<_>>>()?;
            sql.push(' ');
            sql.push_str(&joins.join(" "));
        }

        self.where_state.push_where(&mut sql, db, &self.params)?;

        if !self.group_by.is_empty() {
            sql.push(' ');
            sql.push_str(&compile_group_by(db, &self.group_by)?);
        }

        if !self.having.is_empty() {
            let having = self.having.compile(db, &self.params)?;
            if !having.is_empty() {
                sql.push_str(" HAVING ");
                sql.push_str(&having);
            }
        }

        self.where_state.push_order_limit(&mut sql, db)?;

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        if !self.unions.is_empty() {
            sql = format!("({sql})");
            for (source, all) in &self.unions {
                sql.push_str(if *all { " UNION ALL " } else { " UNION " });
                sql.push('(');
                sql.push_str(&source.to_sql(db)?);
                sql.push(')');
            }
        }

        Ok(sql)
    }
}
