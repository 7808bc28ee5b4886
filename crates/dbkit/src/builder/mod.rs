//! Statement builders and the clause compilers they share.
//!
//! ## Design
//!
//! - Builders own their clause state and mutate it through `&mut self`
//!   methods that return `&mut Self` for chaining.
//! - Calls that can be rejected immediately (`on()` after `using()`,
//!   aliased INSERT targets, ...) return `DbResult<&mut Self>`.
//! - Values are quoted inline at compile time through the [`Database`]
//!   contract; text naming a registered parameter stays a placeholder until
//!   the final substitution pass.
//!
//! [`Database`]: crate::Database

pub mod clauses;
pub mod conditions;
pub mod delete;
pub mod insert;
pub mod join;
pub mod select;
pub mod update;
pub mod where_builder;

pub use clauses::{OrderBy, compile_group_by, compile_order_by, compile_set};
pub use conditions::{Condition, ConditionGroup, Logic};
pub use delete::Delete;
pub use insert::{Insert, InsertSource};
pub use join::Join;
pub use select::{Select, UnionSource};
pub use update::Update;
pub use where_builder::WhereState;

#[cfg(test)]
mod tests;
