use super::conditions::quote_operand;
use super::select::Select;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::param::Params;
use crate::query::{ExecOptions, Query, QueryKind, Statement, impl_query_methods};
use crate::value::Value;

/// The SELECT feeding an `INSERT INTO ... SELECT`.
#[derive(Debug, Clone)]
pub enum InsertSource {
    Select(Box<Select>),
    Query(Query),
}

impl From<Select> for InsertSource {
    fn from(select: Select) -> Self {
        InsertSource::Select(Box::new(select))
    }
}

impl From<Query> for InsertSource {
    fn from(query: Query) -> Self {
        InsertSource::Query(query)
    }
}

impl InsertSource {
    fn to_sql(&self, db: &dyn Database) -> DbResult<String> {
        match self {
            InsertSource::Select(select) => select.to_sql(db),
            InsertSource::Query(query) => query.to_sql(db),
        }
    }
}

#[derive(Debug, Clone)]
enum Values {
    Rows(Vec<Vec<Value>>),
    Select(InsertSource),
}

impl Default for Values {
    fn default() -> Self {
        Values::Rows(Vec::new())
    }
}

/// INSERT builder.
///
/// Rows come either from [`values`](Insert::values) or from a single
/// [`select`](Insert::select), never both.
///
/// # Example
///
/// ```ignore
/// let mut q = dbkit::insert("t", ["a", "b"]);
/// q.values([1, 2])?;
/// assert_eq!(q.compile(&db)?, r#"INSERT INTO "t" ("a", "b") VALUES (1, 2)"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Insert {
    table: Option<Ident>,
    columns: Vec<Ident>,
    values: Values,
    params: Params,
    options: ExecOptions,
    last_sql: Option<String>,
}

impl Insert {
    /// Create an INSERT into `table`.
    pub fn new(table: &str) -> Self {
        Self {
            table: Some(Ident::from(table)),
            ..Self::default()
        }
    }

    /// Set the target table. Alias pairs are rejected.
    pub fn table(&mut self, table: impl Into<Ident>) -> DbResult<&mut Self> {
        let table = table.into();
        if table.is_aliased() {
            return Err(DbError::TableAliasNotAllowed);
        }
        self.table = Some(table);
        Ok(self)
    }

    /// Append target columns.
    pub fn columns<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Ident>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one row of values.
    pub fn values<I, V>(&mut self, row: I) -> DbResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        match &mut self.values {
            Values::Rows(rows) => rows.push(row.into_iter().map(Into::into).collect()),
            Values::Select(_) => return Err(DbError::IncompatibleValueSource),
        }
        Ok(self)
    }

    /// Use a SELECT as the row source.
    pub fn select(&mut self, source: impl Into<InsertSource>) -> DbResult<&mut Self> {
        let source = source.into();
        if let InsertSource::Query(query) = &source {
            if query.kind() != QueryKind::Select {
                return Err(DbError::NonSelectSubquery(query.kind()));
            }
        }
        match &self.values {
            Values::Rows(rows) if !rows.is_empty() => return Err(DbError::IncompatibleValueSource),
            _ => self.values = Values::Select(source),
        }
        Ok(self)
    }

    impl_query_methods!();

    /// Clear the table, columns, values, parameters and the last compiled SQL.
    pub fn reset(&mut self) -> &mut Self {
        let options = std::mem::take(&mut self.options);
        *self = Self {
            options,
            ..Self::default()
        };
        self
    }
}

impl Statement for Insert {
    fn kind(&self) -> QueryKind {
        QueryKind::Insert
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
            .ok_or(DbError::MissingTable(QueryKind::Insert))?;

        let mut sql = format!("INSERT INTO {} ", db.quote_table(table)?);
        if !self.columns.is_empty() {
            let columns = self
                .columns
                .iter()
                .map(|c| db.quote_column(c))
                .collect::<DbResult<Vec<_>>>()?;
            sql.push_str(&format!("({}) ", columns.join(", ")));
        }

        match &self.values {
            Values::Rows(rows) => {
                let mut groups = Vec::with_capacity(rows.len());
                for row in rows {
                    let row = row
                        .iter()
                        .map(|value| quote_operand(db, &self.params, value))
                        .collect::<DbResult<Vec<_>>>()?;
                    groups.push(format!("({})", row.join(", ")));
                }
                sql.push_str("VALUES ");
                sql.push_str(&groups.join(", "));
            }
            Values::Select(source) => sql.push_str(&source.to_sql(db)?),
        }

        Ok(sql)
    }
}
