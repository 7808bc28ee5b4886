//! Raw SQL expressions.

use crate::database::Database;
use crate::error::DbResult;
use crate::param::{Binding, Params};
use crate::value::Value;

/// An unescaped SQL fragment with optional named placeholders.
///
/// Expressions are emitted as-is wherever a builder accepts a value or a
/// column, which makes them the way to inject functions and operators:
///
/// ```ignore
/// use dbkit::{expr, update};
///
/// let mut q = update("users");
/// q.value("login_count", expr("login_count + :n").param(":n", 1));
/// ```
///
/// **Warning**: the fragment itself is never escaped. Only parameter values
/// are quoted.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    value: String,
    params: Params,
}

impl Expression {
    /// Create an expression from a raw fragment.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            params: Params::new(),
        }
    }

    /// Set a placeholder value.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Bind a placeholder to a shared cell.
    pub fn bind(mut self, key: impl Into<String>, binding: &Binding) -> Self {
        self.params.bind(key, binding);
        self
    }

    /// Add multiple placeholder values.
    pub fn parameters<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in params {
            self.params.set(k, v);
        }
        self
    }

    /// The raw, uncompiled fragment.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Registered placeholders.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Compile the fragment, substituting quoted parameter values.
    pub fn compile(&self, db: &dyn Database) -> DbResult<String> {
        self.params.substitute(&self.value, db)
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
