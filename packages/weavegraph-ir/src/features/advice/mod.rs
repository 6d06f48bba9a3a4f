//! Advice layer
//!
//! An advice is one intent of an aspect (introduce a member, override one,
//! implement an interface, add an attribute or a contract, ...). Its
//! lifecycle:
//! 1. construction through [`AdviceFactory`], allocating builders so other
//!    advices can refer to the members it will introduce
//! 2. [`Advice::initialize`]: shape validation, diagnostics only
//! 3. [`Advice::resolve`]: conflict resolution against the current model,
//!    yielding transformations or diagnostics
//!
//! An advice never mutates a model; the pipeline folds its output.

pub mod application;
pub mod domain;

pub use application::{
    resolve_deferred_contracts, AdviceFactory, Collaborators, ContractAccumulator, OrderAllocator,
    ResolveContext,
};
pub use domain::{
    Advice, AdviceKind, AdviceOutput, AdviceResult, InitializerPosition, InterfaceMemberSpec,
    InterfaceOverrideStrategy, OverrideStrategy,
};
