//! The quoting contract every compiler depends on.
//!
//! A [`Database`] supplies the backend-specific pieces (identifier quote
//! character, string escaping, table prefix). The structural quoting rules
//! built on top of them (`quote`, `quote_column`, `quote_table`,
//! `quote_identifier`) are shared by every backend and live on
//! `dyn Database`.
//!
//! # Example
//! ```ignore
//! use dbkit::{Database, Dialect, Ident};
//!
//! let db: &dyn Database = &Dialect::Standard;
//! assert_eq!(db.quote_column(&Ident::from("users.id"))?, r#""users"."id""#);
//! assert_eq!(db.quote(&"it's".into())?, "'it''s'");
//! ```

use crate::error::DbResult;
use crate::ident::Ident;
use crate::query::Statement;
use crate::value::Value;
use serde::Deserialize;

/// Backend quoting rules.
pub trait Database: Send + Sync {
    /// Escape raw text and return a complete, quoted string literal.
    fn escape(&self, raw: &str) -> String;

    /// The identifier quote character.
    fn identifier(&self) -> &str {
        "\""
    }

    /// Prefix prepended to table names.
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Render a boolean literal.
    fn quote_bool(&self, value: bool) -> String {
        if value { "'1'" } else { "'0'" }.to_string()
    }

    /// Render a float literal (fixed notation, six decimals).
    fn quote_float(&self, value: f64) -> String {
        format!("{value:.6}")
    }
}

impl dyn Database + '_ {
    /// Quote a value for use in SQL.
    ///
    /// Expressions are compiled, sub-queries are compiled and parenthesized,
    /// lists become `(a, b, ...)`.
    pub fn quote(&self, value: &Value) -> DbResult<String> {
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.quote_bool(*b),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => self.quote_float(*f),
            Value::Text(s) => self.escape(s),
            Value::List(items) => {
                let quoted = items
                    .iter()
                    .map(|v| self.quote(v))
                    .collect::<DbResult<Vec<_>>>()?;
                format!("({})", quoted.join(", "))
            }
            Value::Pair(min, max) => format!("{} AND {}", self.quote(min)?, self.quote(max)?),
            Value::Expr(expr) => expr.compile(self)?,
            Value::Subquery(select) => format!("({})", select.to_sql(self)?),
        })
    }

    /// Quote a column reference.
    ///
    /// Dotted names are split and each part quoted; the table prefix is
    /// applied to the table segment (second to last). `*` is never quoted.
    pub fn quote_column(&self, column: &Ident) -> DbResult<String> {
        match column {
            Ident::Name(name) => {
                let name = self.strip_identifier(name);
                if name == "*" {
                    return Ok(name);
                }
                if !name.contains('.') {
                    return Ok(self.wrap(&name));
                }

                let mut parts: Vec<String> = name.split('.').map(str::to_string).collect();
                let prefix = self.table_prefix();
                if !prefix.is_empty() {
                    let offset = parts.len() - 2;
                    parts[offset] = format!("{prefix}{}", parts[offset]);
                }
                Ok(parts
                    .iter()
                    .map(|part| if part == "*" { part.clone() } else { self.wrap(part) })
                    .collect::<Vec<_>>()
                    .join("."))
            }
            Ident::Aliased(inner, alias) => Ok(format!(
                "{} AS {}",
                self.quote_column(inner)?,
                self.wrap(&self.strip_identifier(alias))
            )),
            Ident::Alias(_) => self.quote_identifier(column),
            Ident::Expr(expr) => expr.compile(self),
            Ident::Subquery(select) => Ok(format!("({})", select.to_sql(self)?)),
        }
    }

    /// Quote a table reference.
    ///
    /// The table prefix is applied to the last segment and to the alias.
    pub fn quote_table(&self, table: &Ident) -> DbResult<String> {
        let prefix = self.table_prefix();
        match table {
            Ident::Name(name) | Ident::Alias(name) => {
                let name = self.strip_identifier(name);
                if !name.contains('.') {
                    return Ok(self.wrap(&format!("{prefix}{name}")));
                }

                let mut parts: Vec<String> = name.split('.').map(str::to_string).collect();
                if let Some(last) = parts.last_mut() {
                    *last = format!("{prefix}{last}");
                }
                Ok(parts
                    .iter()
                    .map(|part| self.wrap(part))
                    .collect::<Vec<_>>()
                    .join("."))
            }
            Ident::Aliased(inner, alias) => Ok(format!(
                "{} AS {}",
                self.quote_table(inner)?,
                self.wrap(&format!("{prefix}{}", self.strip_identifier(alias)))
            )),
            Ident::Expr(expr) => expr.compile(self),
            Ident::Subquery(select) => Ok(format!("({})", select.to_sql(self)?)),
        }
    }

    /// Quote an identifier: every dotted part is quoted, no prefix is applied.
    pub fn quote_identifier(&self, ident: &Ident) -> DbResult<String> {
        match ident {
            Ident::Name(name) | Ident::Alias(name) => {
                let name = self.strip_identifier(name);
                Ok(name
                    .split('.')
                    .map(|part| self.wrap(part))
                    .collect::<Vec<_>>()
                    .join("."))
            }
            Ident::Aliased(inner, alias) => Ok(format!(
                "{} AS {}",
                self.quote_identifier(inner)?,
                self.wrap(&self.strip_identifier(alias))
            )),
            Ident::Expr(expr) => expr.compile(self),
            Ident::Subquery(select) => Ok(format!("({})", select.to_sql(self)?)),
        }
    }

    fn wrap(&self, name: &str) -> String {
        let q = self.identifier();
        format!("{q}{name}{q}")
    }

    /// Identifier characters inside names are dropped rather than escaped.
    fn strip_identifier(&self, name: &str) -> String {
        name.replace(self.identifier(), "")
    }
}

/// Built-in quoting dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// ANSI quoting: `"identifier"`, `'text'` with `'` doubled.
    #[default]
    Standard,
    /// MySQL quoting: `` `identifier` ``, `'text'` with backslash escapes.
    #[serde(rename = "mysql")]
    MySql,
}

impl Database for Dialect {
    fn escape(&self, raw: &str) -> String {
        match self {
            Dialect::Standard => format!("'{}'", raw.replace('\'', "''")),
            Dialect::MySql => {
                let mut out = String::with_capacity(raw.len() + 2);
                out.push('\'');
                for ch in raw.chars() {
                    match ch {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x1a' => out.push_str("\\Z"),
                        c => out.push(c),
                    }
                }
                out.push('\'');
                out
            }
        }
    }

    fn identifier(&self) -> &str {
        match self {
            Dialect::Standard => "\"",
            Dialect::MySql => "`",
        }
    }
}

/// A dialect combined with a table prefix.
#[derive(Debug, Clone, Default)]
pub struct Quoter {
    pub dialect: Dialect,
    pub prefix: String,
}

impl Quoter {
    /// Create a quoter for `dialect` with no table prefix.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            prefix: String::new(),
        }
    }

    /// Set the table prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Database for Quoter {
    fn escape(&self, raw: &str) -> String {
        self.dialect.escape(raw)
    }

    fn identifier(&self) -> &str {
        self.dialect.identifier()
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }
}
