//! Advice application layer
//!
//! - factory: advice construction and builder allocation
//! - initialize / resolve: the two advice phases
//! - one module per family of advice kinds

mod attributes;
mod conflict;
mod context;
mod contracts;
mod factory;
mod initialize;
mod interface;
mod introduce;
mod overrides;
mod resolve;

pub use context::{Collaborators, ContractAccumulator, OrderAllocator, ResolveContext};
pub use contracts::resolve_deferred_contracts;
pub use factory::AdviceFactory;
