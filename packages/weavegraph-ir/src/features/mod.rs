//! Feature modules - each feature is a vertical slice
//!
//! Layout per feature (where it applies):
//! - domain/          - Pure data and invariants
//! - ports/           - Collaborator traits (type system, templates, pull strategy)
//! - infrastructure/  - Implementations
//! - application/     - Entry points used by the pipeline

// Identity & reference layer
pub mod references;

// Declaration model and builders (Original + Built)
pub mod declarations;

// Snapshot / overlay store
pub mod compilation;

// Type system collaborator port + structural reference implementation
pub mod type_system;

// Template expansion collaborator port + text reference implementation
pub mod templates;

// Contract/filter composer
pub mod contracts;

// Constructor-pull resolver
pub mod constructor_pull;

// Advice layer: intents, conflict policy, resolution
pub mod advice;
