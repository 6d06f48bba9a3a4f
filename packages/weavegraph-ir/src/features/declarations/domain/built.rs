use super::data::{AttributeData, DeclarationData};
use crate::features::references::DeclRef;
use crate::shared::models::{AdviceId, BuilderId};

/// A sealed builder
///
/// Immutable once it is part of a model. A built declaration is its own
/// definition and its own original declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltDeclaration {
    pub id: BuilderId,
    /// Advice that owns the builder
    pub advice: AdviceId,
    pub data: DeclarationData,
    pub overridden_member: Option<DeclRef>,
    /// Declaration this one stands in for (materialized implicit
    /// constructor, promoted field)
    pub replaces: Option<DeclRef>,
    /// Interface member this declaration implements
    pub interface_member: Option<DeclRef>,
    /// Attributes forwarded from the source template
    pub attributes: Vec<AttributeData>,
}

impl BuiltDeclaration {
    pub fn builder_ref(&self) -> DeclRef {
        DeclRef::Built(self.id)
    }

    /// Logical identity: the replaced declaration's ref when this one
    /// replaces another, so refs taken before and after the replacement agree
    pub fn logical_ref(&self) -> DeclRef {
        self.replaces.clone().unwrap_or(DeclRef::Built(self.id))
    }

    pub fn definition(&self) -> DeclRef {
        self.builder_ref()
    }

    pub fn original_declaration(&self) -> DeclRef {
        self.builder_ref()
    }

    pub fn is_new(&self) -> bool {
        self.data.modifiers.is_new
    }

    pub fn is_override(&self) -> bool {
        self.data.modifiers.is_override
    }
}
