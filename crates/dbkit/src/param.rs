//! Named parameter storage for queries and expressions.

use crate::database::Database;
use crate::error::DbResult;
use crate::value::Value;
use std::sync::{Arc, PoisonError, RwLock};

/// A shared, mutable parameter cell ("bind by reference").
///
/// The value observed by a query is whatever the cell holds when the query is
/// compiled, not when it was bound.
///
/// # Example
/// ```ignore
/// let id = Binding::new(1);
/// let mut q = dbkit::select(["name"]).from("users").where_("id", "=", ":id");
/// q.bind(":id", &id);
/// id.set(42);
/// assert!(q.to_sql(&db)?.ends_with("WHERE \"id\" = 42"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Binding(Arc<RwLock<Value>>);

impl Binding {
    /// Create a new cell holding `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Binding(Arc::new(RwLock::new(value.into())))
    }

    /// Replace the held value.
    pub fn set(&self, value: impl Into<Value>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = value.into();
    }

    /// Read the current value.
    pub fn get(&self) -> Value {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A registered parameter: either a value captured at registration time or
/// a [`Binding`] resolved at compile time.
#[derive(Clone, Debug)]
pub enum ParamValue {
    Value(Value),
    Bound(Binding),
}

impl ParamValue {
    /// Resolve to the current value.
    pub fn resolve(&self) -> Value {
        match self {
            ParamValue::Value(v) => v.clone(),
            ParamValue::Bound(b) => b.get(),
        }
    }
}

/// An ordered mapping from placeholder token (conventionally `:name`) to value.
#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set a parameter by value, replacing any previous registration of `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.insert(key.into(), ParamValue::Value(value.into()));
    }

    /// Bind a parameter by reference, replacing any previous registration of `key`.
    pub fn bind(&mut self, key: impl Into<String>, binding: &Binding) {
        self.insert(key.into(), ParamValue::Bound(binding.clone()));
    }

    /// Merge another parameter set into this one; keys in `other` win.
    pub fn extend(&mut self, other: &Params) {
        for (key, value) in &other.entries {
            self.insert(key.clone(), value.clone());
        }
    }

    fn insert(&mut self, key: String, value: ParamValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Whether `key` is a registered placeholder.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Current value of `key`, if registered.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.resolve())
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no parameters are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all parameters.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Replace every placeholder in `sql` with its quoted value.
    ///
    /// Single left-to-right pass: at each position the longest matching key
    /// wins, and substituted text is never scanned again.
    pub fn substitute(&self, sql: &str, db: &dyn Database) -> DbResult<String> {
        if self.entries.is_empty() {
            return Ok(sql.to_string());
        }

        let mut replacements: Vec<(&str, String)> = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            if key.is_empty() {
                continue;
            }
            replacements.push((key.as_str(), db.quote(&value.resolve())?));
        }
        // Longest first so that `:idx` is tried before `:id`.
        replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut out = String::with_capacity(sql.len());
        let mut rest = sql;
        'scan: while let Some(ch) = rest.chars().next() {
            for (key, quoted) in &replacements {
                if rest.starts_with(key) {
                    out.push_str(quoted);
                    rest = &rest[key.len()..];
                    continue 'scan;
                }
            }
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Dialect;

    #[test]
    fn set_replaces_existing_key() {
        let mut params = Params::new();
        params.set(":a", 1);
        params.set(":a", 2);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(":a").and_then(|v| v.as_i64()), Some(2));
    }

    #[test]
    fn substitute_prefers_longest_key() {
        let mut params = Params::new();
        params.set(":id", 1);
        params.set(":idx", 2);
        let sql = params
            .substitute("a = :id AND b = :idx", &Dialect::Standard)
            .unwrap();
        assert_eq!(sql, "a = 1 AND b = 2");
    }

    #[test]
    fn substitute_does_not_rescan_replacements() {
        let mut params = Params::new();
        params.set(":a", ":b");
        params.set(":b", 7);
        let sql = params.substitute(":a :b", &Dialect::Standard).unwrap();
        assert_eq!(sql, "':b' 7");
    }

    #[test]
    fn binding_is_read_at_substitution_time() {
        let cell = Binding::new(1);
        let mut params = Params::new();
        params.bind(":v", &cell);
        cell.set("late");
        let sql = params.substitute("x = :v", &Dialect::Standard).unwrap();
        assert_eq!(sql, "x = 'late'");
    }
}
