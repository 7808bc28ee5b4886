//! Column and table references.
//!
//! An [`Ident`] is what the builders accept wherever SQL names a column or a
//! table:
//!
//! - a bare (possibly dotted) name: `"users"`, `"users.id"`, `"u.*"`
//! - an alias pair: `("users", "u")` compiles to `"users" AS "u"`
//! - an alias target: [`Ident::alias`], quoted as a plain identifier with no
//!   table prefix applied
//! - a raw [`Expression`] or a [`Select`] sub-query
//!
//! Quoting itself lives on the [`Database`](crate::Database) contract; this
//! module only models the reference.

use crate::builder::Select;
use crate::expr::Expression;

/// A reference to a column or table.
#[derive(Debug, Clone)]
pub enum Ident {
    /// A bare name, split on `.` when quoted.
    Name(String),
    /// `reference AS alias`.
    Aliased(Box<Ident>, String),
    /// An alias target, quoted as an identifier (no table prefix).
    Alias(String),
    /// A raw SQL fragment.
    Expr(Expression),
    /// A sub-query, wrapped in parentheses.
    Subquery(Box<Select>),
}

impl Ident {
    /// Create a bare name reference.
    pub fn name(name: impl Into<String>) -> Self {
        Ident::Name(name.into())
    }

    /// Create an alias-target reference.
    pub fn alias(name: impl Into<String>) -> Self {
        Ident::Alias(name.into())
    }

    /// Wrap this reference in `AS alias`.
    pub fn aliased(self, alias: impl Into<String>) -> Self {
        Ident::Aliased(Box::new(self), alias.into())
    }

    /// Returns `true` for `reference AS alias` pairs.
    pub fn is_aliased(&self) -> bool {
        matches!(self, Ident::Aliased(..))
    }

    /// The name used when this reference is the target of GROUP BY/ORDER BY:
    /// alias pairs resolve to their alias.
    pub(crate) fn alias_target(&self) -> Option<&str> {
        match self {
            Ident::Aliased(_, alias) => Some(alias),
            Ident::Alias(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident::Name(s.to_string())
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident::Name(s)
    }
}

impl From<&String> for Ident {
    fn from(s: &String) -> Self {
        Ident::Name(s.clone())
    }
}

impl From<Expression> for Ident {
    fn from(e: Expression) -> Self {
        Ident::Expr(e)
    }
}

impl From<Select> for Ident {
    fn from(q: Select) -> Self {
        Ident::Subquery(Box::new(q))
    }
}

impl<I: Into<Ident>> From<(I, &str)> for Ident {
    fn from((reference, alias): (I, &str)) -> Self {
        reference.into().aliased(alias)
    }
}

impl<I: Into<Ident>> From<(I, String)> for Ident {
    fn from((reference, alias): (I, String)) -> Self {
        reference.into().aliased(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_is_alias_pair() {
        let ident = Ident::from(("users", "u"));
        assert!(ident.is_aliased());
        assert_eq!(ident.alias_target(), Some("u"));
    }

    #[test]
    fn bare_name_has_no_alias_target() {
        let ident = Ident::from("users.id");
        assert!(!ident.is_aliased());
        assert_eq!(ident.alias_target(), None);
    }
}
