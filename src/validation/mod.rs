//! Validation
//!
//! Engine invocation and normalization of its issues into a
//! [`ValidationResult`].

pub mod category;
pub mod invoker;
pub mod issue;
pub mod normalize;

pub use category::{CategoryRuleDef, CategoryTable};
pub use invoker::invoke;
pub use issue::{Category, Severity, ValidationIssue, ValidationResult};
pub use normalize::{Normalizer, map_severity};
