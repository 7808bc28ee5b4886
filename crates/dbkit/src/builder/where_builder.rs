//! Shared WHERE / ORDER BY / LIMIT state for SELECT, UPDATE and DELETE.

use super::clauses::{OrderBy, compile_order_by};
use super::conditions::ConditionGroup;
use crate::database::Database;
use crate::error::DbResult;
use crate::param::Params;

/// Filtering state common to every statement that accepts a WHERE clause.
#[derive(Debug, Clone, Default)]
pub struct WhereState {
    pub(crate) conditions: ConditionGroup,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
}

impl WhereState {
    /// Append ` WHERE ...` to `sql` when the conditions compile to anything.
    pub(crate) fn push_where(&self, sql: &mut String, db: &dyn Database, params: &Params) -> DbResult<()> {
        if !self.conditions.is_empty() {
            let conditions = self.conditions.compile(db, params)?;
            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions);
            }
        }
        Ok(())
    }

    /// Append ` ORDER BY ...` and ` LIMIT n` to `sql`.
    pub(crate) fn push_order_limit(&self, sql: &mut String, db: &dyn Database) -> DbResult<()> {
        if !self.order_by.is_empty() {
            sql.push(' ');
            sql.push_str(&compile_order_by(db, &self.order_by)?);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(())
    }
}

/// Generate the WHERE/ORDER BY/LIMIT mutators over a `where_state: WhereState` field.
///
/// Usage:
/// ```ignore
/// impl Delete {
///     impl_where_methods!();
/// }
/// ```
macro_rules! impl_where_methods {
    () => {
        /// Alias of [`and_where`](Self::and_where).
        pub fn where_(
            &mut self,
            column: impl Into<$crate::ident::Ident>,
            op: &str,
            value: impl Into<$crate::value::Value>,
        ) -> &mut Self {
            self.and_where(column, op, value)
        }

        /// Add `AND column op value`.
        pub fn and_where(
            &mut self,
            column: impl Into<$crate::ident::Ident>,
            op: &str,
            value: impl Into<$crate::value::Value>,
        ) -> &mut Self {
            self.where_state.conditions.push(
                $crate::builder::Logic::And,
                column.into(),
                op,
                value.into(),
            );
            self
        }

        /// Add `OR column op value`.
        pub fn or_where(
            &mut self,
            column: impl Into<$crate::ident::Ident>,
            op: &str,
            value: impl Into<$crate::value::Value>,
        ) -> &mut Self {
            self.where_state.conditions.push(
                $crate::builder::Logic::Or,
                column.into(),
                op,
                value.into(),
            );
            self
        }

        /// Alias of [`and_where_open`](Self::and_where_open).
        pub fn where_open(&mut self) -> &mut Self {
            self.and_where_open()
        }

        /// Open a nested `AND (` group.
        pub fn and_where_open(&mut self) -> &mut Self {
            self.where_state.conditions.open($crate::builder::Logic::And);
            self
        }

        /// Open a nested `OR (` group.
        pub fn or_where_open(&mut self) -> &mut Self {
            self.where_state.conditions.open($crate::builder::Logic::Or);
            self
        }

        /// Alias of [`and_where_close`](Self::and_where_close).
        pub fn where_close(&mut self) -> &mut Self {
            self.and_where_close()
        }

        pub fn and_where_close(&mut self) -> &mut Self {
            self.where_state.conditions.close($crate::builder::Logic::And);
            self
        }

        pub fn or_where_close(&mut self) -> &mut Self {
            self.where_state.conditions.close($crate::builder::Logic::Or);
            self
        }

        /// Close the current group, or remove it if it is still empty.
        pub fn where_close_empty(&mut self) -> &mut Self {
            self.where_state
                .conditions
                .close_empty($crate::builder::Logic::And);
            self
        }

        /// Add an ORDER BY column. `direction` must be `ASC` or `DESC`
        /// (any case); it is validated at compile time.
        pub fn order_by<'d>(
            &mut self,
            column: impl Into<$crate::ident::Ident>,
            direction: impl Into<Option<&'d str>>,
        ) -> &mut Self {
            self.where_state
                .order_by
                .push((column.into(), direction.into().map(str::to_string)));
            self
        }

        /// Set the LIMIT.
        pub fn limit(&mut self, number: u64) -> &mut Self {
            self.where_state.limit = Some(number);
            self
        }
    };
}

pub(crate) use impl_where_methods;
