//! Contract/Filter Composer
//!
//! Contracts on one member are merged into a [`ContractAdvice`] and composed
//! into a single body: input checks, the original call, output checks. A
//! temporary is allocated only when some output check needs the result.
//! Fields and properties get a setter and a getter body instead.

mod composer;
mod domain;

pub use composer::{unique_temporary, validate_contract, ComposedBody, ContractComposer};
pub use domain::{Contract, ContractAdvice, ContractDirection, ContractTarget, ExecutionDirection};
