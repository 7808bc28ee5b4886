//! A single JOIN clause.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;

#[derive(Debug, Clone, Default)]
enum JoinCondition {
    #[default]
    None,
    On(Vec<(Ident, String, Ident)>),
    Using(Vec<Ident>),
}

/// `[TYPE] JOIN table [ON (...) | USING (...)]`.
///
/// A join uses either ON conditions or USING columns, never both.
#[derive(Debug, Clone)]
pub struct Join {
    table: Ident,
    kind: Option<String>,
    condition: JoinCondition,
}

impl Join {
    /// Create a join. `kind` is e.g. `LEFT`, `INNER`; `None` emits a bare `JOIN`.
    pub fn new<'k>(table: impl Into<Ident>, kind: impl Into<Option<&'k str>>) -> Self {
        Self {
            table: table.into(),
            kind: kind.into().map(str::to_string),
            condition: JoinCondition::None,
        }
    }

    /// Add an `c1 op c2` ON condition, combined with AND.
    pub fn on(
        &mut self,
        c1: impl Into<Ident>,
        op: &str,
        c2: impl Into<Ident>,
    ) -> DbResult<&mut Self> {
        let entry = (c1.into(), op.to_string(), c2.into());
        match &mut self.condition {
            JoinCondition::Using(_) => return Err(DbError::IncompatibleJoinConditions),
            JoinCondition::On(conditions) => conditions.push(entry),
            JoinCondition::None => self.condition = JoinCondition::On(vec![entry]),
        }
        Ok(self)
    }

    /// Add USING columns.
    pub fn using<I, C>(&mut self, columns: I) -> DbResult<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Ident>,
    {
        let columns: Vec<Ident> = columns.into_iter().map(Into::into).collect();
        match &mut self.condition {
            JoinCondition::On(_) => return Err(DbError::IncompatibleJoinConditions),
            JoinCondition::Using(existing) => existing.extend(columns),
            JoinCondition::None => self.condition = JoinCondition::Using(columns),
        }
        Ok(self)
    }

    pub fn compile(&self, db: &dyn Database) -> DbResult<String> {
        let mut sql = match &self.kind {
            Some(kind) if !kind.is_empty() => format!("{} JOIN", kind.to_uppercase()),
            _ => "JOIN".to_string(),
        };
        sql.push(' ');
        sql.push_str(&db.quote_table(&self.table)?);

        match &self.condition {
            JoinCondition::None => {}
            JoinCondition::Using(columns) => {
                let columns = columns
                    .iter()
                    .map(|c| db.quote_column(c))
                    .collect::<DbResult<Vec<_>>>()?;
                sql.push_str(&format!(" USING ({})", columns.join(", ")));
            }
            JoinCondition::On(conditions) => {
                let mut parts = Vec::with_capacity(conditions.len());
                for (c1, op, c2) in conditions {
                    let op = if op.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", op.to_uppercase())
                    };
                    parts.push(format!(
                        "{}{op} {}",
                        db.quote_column(c1)?,
                        db.quote_column(c2)?
                    ));
                }
                sql.push_str(&format!(" ON ({})", parts.join(" AND ")));
            }
        }

        Ok(sql)
    }
}
