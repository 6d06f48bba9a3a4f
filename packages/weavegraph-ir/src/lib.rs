/*
 * Weavegraph IR - Advice Resolution & Declaration Overlay Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (ids, types, modifiers, diagnostics)
 * - features/    : Vertical slices (references → declarations → compilation
 *                  → type_system/templates → contracts/constructor_pull → advice)
 * - pipeline/    : Layered weaving with per-aspect rollback
 * - config/      : WeaverConfig (YAML)
 *
 * The engine never generates source text: it records transformations over an
 * immutable baseline and lets an emitter expand templates afterwards.
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Resolution steps thread model, context and output
#![allow(clippy::type_complexity)] // Interface binding tables
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (references → declarations → compilation → advice)
pub mod features;

/// Layered weaving pipeline
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::WeaverConfig;
pub use errors::{Result, WeaveError};
pub use features::advice::{
    Advice, AdviceFactory, AdviceKind, AdviceOutput, AdviceResult, InitializerPosition,
    InterfaceOverrideStrategy, OverrideStrategy,
};
pub use features::compilation::{
    BaselineBuilder, CodeModel, CompilationModel, MutableCompilationModel, Transformation,
    TransformationKind,
};
pub use features::declarations::DeclarationData;
pub use features::references::DeclRef;
pub use features::templates::{TemplateMember, TemplateRef};
pub use pipeline::{Aspect, AspectApplication, FnAspect, WeaveResult, Weaver};
pub use shared::models::{Diagnostic, DiagnosticKind, LayerId, TypeRef};
