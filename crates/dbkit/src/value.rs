//! Dynamically typed SQL values.
//!
//! Every value that reaches a compiled statement (condition operands, SET
//! assignments, INSERT rows, bound parameters) is a [`Value`]. Values are
//! quoted through the [`Database`](crate::Database) quoting contract at compile
//! time, with two exceptions handled by the compilers: raw [`Expression`]s are
//! compiled rather than quoted, and text that exactly matches a registered
//! parameter key is left in place as a placeholder.

use crate::builder::Select;
use crate::expr::Expression;
use crate::param::Params;

/// A SQL value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// Boolean, quoted by the dialect.
    Bool(bool),
    /// Integer, emitted verbatim.
    Int(i64),
    /// Float, emitted in fixed notation.
    Float(f64),
    /// Text, escaped by the dialect.
    Text(String),
    /// A list, emitted as `(a, b, ...)`.
    List(Vec<Value>),
    /// A pair of bounds, emitted as `a AND b` (used by BETWEEN).
    Pair(Box<Value>, Box<Value>),
    /// A raw SQL fragment.
    Expr(Expression),
    /// A sub-query, emitted as `(SELECT ...)`.
    Subquery(Box<Select>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns `true` if this is text naming a parameter registered in `params`.
    ///
    /// Such values are placeholders: they are left unquoted during clause
    /// compilation and substituted in the final pass.
    pub fn is_placeholder_in(&self, params: &Params) -> bool {
        match self {
            Value::Text(s) => params.contains(s),
            _ => false,
        }
    }

    /// Returns `true` for an empty [`Value::List`].
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Value::List(items) if items.is_empty())
    }

    /// Convert a scalar value to JSON, for typed row mapping.
    ///
    /// Expressions and sub-queries never appear in result rows and map to `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Expr(_) | Value::Subquery(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Pair(a, b) => serde_json::Value::Array(vec![a.to_json(), b.to_json()]),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Expression> for Value {
    fn from(v: Expression) -> Self {
        Value::Expr(v)
    }
}

impl From<Select> for Value {
    fn from(v: Select) -> Self {
        Value::Subquery(Box::new(v))
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Value::Text(v.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for Value
where
    Tz::Offset: std::fmt::Display,
{
    fn from(v: chrono::DateTime<Tz>) -> Self {
        Value::Text(v.to_rfc3339())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Pair(Box::new(a.into()), Box::new(b.into()))
    }
}
