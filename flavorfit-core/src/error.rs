//! Caller-facing input errors shared by the derivation operations.

use thiserror::Error;

use crate::{ConditionCode, FoodId};

/// Input that the engine refuses to process.
///
/// These are never retried or defaulted; the caller must correct the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// An operation that needs health conditions received none.
    #[error("at least one health condition code is required")]
    EmptyConditionSet,
    /// A food identifier did not resolve in the catalogue.
    #[error("food {id} was not found in the catalogue")]
    UnknownFood {
        /// The unresolved identifier.
        id: FoodId,
    },
    /// A comparison named the same food twice.
    #[error("cannot compare food {id} with itself")]
    IdenticalFoods {
        /// The repeated identifier.
        id: FoodId,
    },
    /// No built-in nutrient rule exists for the condition.
    #[error("no nutrient rule is defined for condition {code}")]
    NoConditionRule {
        /// The condition without a rule.
        code: ConditionCode,
    },
}
