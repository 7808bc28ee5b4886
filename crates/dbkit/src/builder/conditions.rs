//! Condition groups and the WHERE/HAVING condition compiler.

use crate::database::Database;
use crate::error::DbResult;
use crate::ident::Ident;
use crate::param::Params;
use crate::value::Value;

/// Logical connector placed before a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

/// One entry of a condition group.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `(`
    Open,
    /// `)`
    Close,
    /// `column op value`
    Predicate {
        column: Ident,
        op: String,
        value: Value,
    },
}

/// An ordered, connector-tagged list of predicates and grouping markers.
///
/// Nesting is not validated: unbalanced markers compile to unbalanced SQL.
#[derive(Debug, Clone, Default)]
pub struct ConditionGroup {
    entries: Vec<(Logic, Condition)>,
}

impl ConditionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `column op value` predicate.
    pub fn push(&mut self, logic: Logic, column: Ident, op: &str, value: Value) {
        self.entries.push((
            logic,
            Condition::Predicate {
                column,
                op: op.to_string(),
                value,
            },
        ));
    }

    /// Open a nested group.
    pub fn open(&mut self, logic: Logic) {
        self.entries.push((logic, Condition::Open));
    }

    /// Close the current group.
    pub fn close(&mut self, logic: Logic) {
        self.entries.push((logic, Condition::Close));
    }

    /// Close the current group, or drop it if nothing was added since it was opened.
    pub fn close_empty(&mut self, logic: Logic) {
        if matches!(self.entries.last(), Some((_, Condition::Open))) {
            self.entries.pop();
        } else {
            self.close(logic);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[(Logic, Condition)] {
        &self.entries
    }

    /// Compile the group into a WHERE/HAVING fragment (without the keyword).
    ///
    /// Text values naming a key in `params` are left as placeholders; every
    /// other value is quoted.
    pub fn compile(&self, db: &dyn Database, params: &Params) -> DbResult<String> {
        let mut sql = String::new();
        let mut last: Option<&Condition> = None;

        for (logic, condition) in &self.entries {
            match condition {
                Condition::Close => sql.push(')'),
                Condition::Open | Condition::Predicate { .. } => {
                    if !sql.is_empty() && !matches!(last, Some(Condition::Open)) {
                        sql.push(' ');
                        sql.push_str(logic.as_str());
                        sql.push(' ');
                    }
                    match condition {
                        Condition::Predicate { column, op, value } => {
                            sql.push_str(&compile_predicate(db, params, column, op, value)?);
                        }
                        _ => sql.push('('),
                    }
                }
            }
            last = Some(condition);
        }

        Ok(sql)
    }
}

fn compile_predicate(
    db: &dyn Database,
    params: &Params,
    column: &Ident,
    op: &str,
    value: &Value,
) -> DbResult<String> {
    let op = match (value.is_null(), op) {
        (true, "=") => "IS".to_string(),
        (true, "!=" | "<>") => "IS NOT".to_string(),
        _ => op.to_uppercase(),
    };

    let value = match (op.as_str(), value) {
        ("BETWEEN", Value::Pair(min, max)) => format!(
            "{} AND {}",
            quote_operand(db, params, min)?,
            quote_operand(db, params, max)?
        ),
        ("BETWEEN", Value::List(bounds)) if bounds.len() == 2 => format!(
            "{} AND {}",
            quote_operand(db, params, &bounds[0])?,
            quote_operand(db, params, &bounds[1])?
        ),
        ("IN", v) if v.is_empty_list() => "(NULL)".to_string(),
        (_, v) => quote_operand(db, params, v)?,
    };

    let column = match column {
        // `where_("", "EXISTS", subquery)` has no left-hand side.
        Ident::Name(name) if name.is_empty() => String::new(),
        // A pair names a single identifier; no `AS` on a predicate's left side.
        Ident::Aliased(inner, _) => db.quote_identifier(inner)?,
        other => db.quote_column(other)?,
    };

    Ok(format!("{column} {op} {value}").trim().to_string())
}

/// Quote a value unless it is a registered placeholder.
pub(crate) fn quote_operand(db: &dyn Database, params: &Params, value: &Value) -> DbResult<String> {
    match value {
        Value::Text(key) if params.contains(key) => Ok(key.clone()),
        other => db.quote(other),
    }
}
