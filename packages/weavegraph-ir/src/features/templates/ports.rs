use super::domain::TemplateRef;
use crate::features::compilation::CodeModel;
use crate::features::references::DeclRef;
use crate::shared::models::{Tags, TypeRef};
use thiserror::Error;

/// What a template is bound against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingShape {
    /// Name the template's value placeholder resolves to
    pub value_name: String,
    pub value_type: TypeRef,
    /// Template runs after the original call
    pub is_output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundTemplate {
    pub template: TemplateRef,
    pub shape: BindingShape,
}

pub struct ExpansionContext<'a> {
    pub model: &'a CodeModel,
    pub target: &'a DeclRef,
    pub tags: &'a Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template '{0}' is not registered")]
    NotFound(String),

    #[error("template '{template}' expects a value of type {expected}, found {found}")]
    TypeMismatch {
        template: String,
        expected: String,
        found: String,
    },

    #[error("template '{template}' failed to expand: {reason}")]
    Expansion { template: String, reason: String },
}

/// Template-expansion collaborator
pub trait TemplateExpander: Send + Sync {
    fn try_bind(
        &self,
        template: &TemplateRef,
        shape: &BindingShape,
    ) -> Result<BoundTemplate, TemplateError>;

    fn expand(
        &self,
        bound: &BoundTemplate,
        context: &ExpansionContext<'_>,
    ) -> Result<String, TemplateError>;
}
