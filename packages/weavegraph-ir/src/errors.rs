//! Error types for weavegraph-ir
//!
//! Hard errors only. Policy conflicts (member already exists, sealed override,
//! ...) are reported as [`Diagnostic`](crate::shared::models::Diagnostic)s and
//! never travel through this type.

use crate::config::ConfigError;
use crate::features::references::DanglingReferenceError;
use crate::shared::models::AdviceId;
use thiserror::Error;

/// Main error type for weaving operations
#[derive(Debug, Error)]
pub enum WeaveError {
    /// A reference no longer resolves in the model it was used against
    #[error(transparent)]
    DanglingReference(#[from] DanglingReferenceError),

    /// Template does not fit the declaration it is applied to
    #[error("Template '{template}' cannot be applied to {target}: {reason}")]
    TemplateShape {
        template: String,
        target: String,
        reason: String,
    },

    /// Contract direction is incompatible with its filter target
    #[error("Invalid contract on {target}: {reason}")]
    InvalidContract { target: String, reason: String },

    /// Malformed advice construction
    #[error("Invalid {advice}: {reason}")]
    InvalidAdvice { advice: AdviceId, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl WeaveError {
    pub fn template_shape(
        template: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        WeaveError::TemplateShape {
            template: template.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_contract(target: impl Into<String>, reason: impl Into<String>) -> Self {
        WeaveError::InvalidContract {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_advice(advice: AdviceId, reason: impl Into<String>) -> Self {
        WeaveError::InvalidAdvice {
            advice,
            reason: reason.into(),
        }
    }
}

/// Result type alias for weaving operations
pub type Result<T> = std::result::Result<T, WeaveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::references::DeclRef;
    use crate::shared::models::DeclId;

    #[test]
    fn test_error_display() {
        let err = WeaveError::template_shape("LogTemplate", "field 'C._x'", "expected a method");
        let msg = err.to_string();
        assert!(msg.contains("LogTemplate"));
        assert!(msg.contains("C._x"));
        assert!(msg.contains("expected a method"));
    }

    #[test]
    fn test_dangling_reference_converts() {
        let err: WeaveError = DanglingReferenceError::new(DeclRef::Original(DeclId(9))).into();
        assert!(matches!(err, WeaveError::DanglingReference(_)));
        assert!(err.to_string().contains("decl#9"));
    }
}
