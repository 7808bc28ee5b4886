//! SET, GROUP BY and ORDER BY compilers.

use super::conditions::quote_operand;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::param::Params;
use crate::value::Value;

/// An ORDER BY entry: column and optional direction.
pub type OrderBy = (Ident, Option<String>);

/// Compile SET assignments into `"a" = 1, "b" = 2`.
///
/// Assignments are keyed by quoted column: a repeated column keeps the
/// position of its first assignment and takes the value of its last.
pub fn compile_set(db: &dyn Database, pairs: &[(Ident, Value)], params: &Params) -> DbResult<String> {
    let mut set: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (column, value) in pairs {
        let column = db.quote_column(column)?;
        let assignment = format!("{column} = {}", quote_operand(db, params, value)?);
        match set.iter_mut().find(|(key, _)| *key == column) {
            Some(existing) => existing.1 = assignment,
            None => set.push((column, assignment)),
        }
    }
    Ok(set
        .into_iter()
        .map(|(_, assignment)| assignment)
        .collect::<Vec<_>>()
        .join(", "))
}

/// Compile `GROUP BY ...`. Alias pairs group by their alias.
pub fn compile_group_by(db: &dyn Database, columns: &[Ident]) -> DbResult<String> {
    let columns = columns
        .iter()
        .map(|column| resolve_column(db, column))
        .collect::<DbResult<Vec<_>>>()?;
    Ok(format!("GROUP BY {}", columns.join(", ")))
}

/// Compile `ORDER BY ...`, validating every direction.
pub fn compile_order_by(db: &dyn Database, columns: &[OrderBy]) -> DbResult<String> {
    let mut sort = Vec::with_capacity(columns.len());
    for (column, direction) in columns {
        let mut entry = resolve_column(db, column)?;
        if let Some(direction) = direction.as_deref().filter(|d| !d.is_empty()) {
            let direction = direction.to_uppercase();
            if direction != "ASC" && direction != "DESC" {
                return Err(DbError::InvalidSortDirection(direction));
            }
            entry.push(' ');
            entry.push_str(&direction);
        }
        sort.push(entry);
    }
    Ok(format!("ORDER BY {}", sort.join(", ")))
}

fn resolve_column(db: &dyn Database, column: &Ident) -> DbResult<String> {
    match column.alias_target() {
        Some(alias) => db.quote_identifier(&Ident::alias(alias)),
        None => db.quote_column(column),
    }
}
