//! Shared models
//!
//! Identifiers, type expressions, modifiers and the diagnostic taxonomy used by
//! every feature slice.

pub mod diagnostic;
mod ids;
mod modifiers;
pub mod types;

pub use diagnostic::{Diagnostic, DiagnosticBag, DiagnosticKind, Severity};
pub use ids::{AdviceId, AspectInstanceId, BuilderId, DeclId, LayerId, TransformationOrder};
pub use modifiers::{Accessibility, Modifiers, RefKind, Writeability};
pub use types::{GenericOwnerKind, SpecialType, TypeRef};

/// Free-form tag bag carried by advices and contracts
pub type Tags = std::collections::BTreeMap<String, serde_json::Value>;
