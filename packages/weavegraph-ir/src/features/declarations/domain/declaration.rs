//! Resolved declaration view
//!
//! What `DeclRef::resolve` returns. Cheap to clone: Original and Built data
//! are shared through `Arc`.

use super::built::BuiltDeclaration;
use super::data::{DeclarationData, ParameterData};
use super::kind::DeclarationKind;
use crate::features::references::DeclRef;
use crate::shared::models::{Accessibility, DeclId, GenericOwnerKind, Modifiers, TypeRef};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Declaration {
    Original {
        id: DeclId,
        data: Arc<DeclarationData>,
    },
    Built(Arc<BuiltDeclaration>),
    Parameter {
        member: DeclRef,
        index: u16,
        data: ParameterData,
        /// Appended by a transformation rather than declared
        introduced: bool,
    },
    TypeParameter {
        owner: DeclRef,
        owner_kind: GenericOwnerKind,
        position: u16,
        name: String,
    },
}

impl Declaration {
    /// MakeRef: snapshot-independent handle to this declaration
    pub fn to_ref(&self) -> DeclRef {
        match self {
            Declaration::Original { id, .. } => DeclRef::Original(*id),
            Declaration::Built(built) => built.logical_ref(),
            Declaration::Parameter { member, index, .. } => DeclRef::parameter(member.clone(), *index),
            Declaration::TypeParameter {
                owner,
                owner_kind,
                position,
                ..
            } => DeclRef::type_parameter(owner.clone(), *owner_kind, *position),
        }
    }

    /// Declaration-level data for Original and Built declarations
    pub fn data(&self) -> Option<&DeclarationData> {
        match self {
            Declaration::Original { data, .. } => Some(data),
            Declaration::Built(built) => Some(&built.data),
            _ => None,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Original { data, .. } => data.kind,
            Declaration::Built(built) => built.data.kind,
            Declaration::Parameter { .. } => DeclarationKind::Parameter,
            Declaration::TypeParameter { .. } => DeclarationKind::TypeParameter,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Original { data, .. } => &data.name,
            Declaration::Built(built) => &built.data.name,
            Declaration::Parameter { data, .. } => &data.name,
            Declaration::TypeParameter { name, .. } => name,
        }
    }

    pub fn containing(&self) -> Option<DeclRef> {
        match self {
            Declaration::Original { data, .. } => data.containing.clone(),
            Declaration::Built(built) => built.data.containing.clone(),
            Declaration::Parameter { member, .. } => Some(member.clone()),
            Declaration::TypeParameter { owner, .. } => Some(owner.clone()),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.data().map(|d| d.modifiers).unwrap_or_default()
    }

    pub fn accessibility(&self) -> Accessibility {
        self.data()
            .map(|d| d.accessibility)
            .unwrap_or(Accessibility::Public)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers().is_static
    }

    /// Return type, field/property/event type, or parameter type
    pub fn member_type(&self) -> Option<&TypeRef> {
        match self {
            Declaration::Parameter { data, .. } => Some(&data.ty),
            _ => self.data().and_then(|d| d.member_type.as_ref()),
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, Declaration::Built(_))
    }

    pub fn as_built(&self) -> Option<&Arc<BuiltDeclaration>> {
        match self {
            Declaration::Built(built) => Some(built),
            _ => None,
        }
    }

    pub fn parameter_data(&self) -> Option<&ParameterData> {
        match self {
            Declaration::Parameter { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Generic definition: Built declarations are their own definition
    pub fn definition(&self) -> DeclRef {
        match self {
            Declaration::Built(built) => built.definition(),
            _ => self.to_ref(),
        }
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Declaration::Original { id: a, .. }, Declaration::Original { id: b, .. }) => a == b,
            (Declaration::Built(a), Declaration::Built(b)) => Arc::ptr_eq(a, b) || a.id == b.id,
            (
                Declaration::Parameter {
                    member: ma,
                    index: ia,
                    data: da,
                    ..
                },
                Declaration::Parameter {
                    member: mb,
                    index: ib,
                    data: db,
                    ..
                },
            ) => ma == mb && ia == ib && da == db,
            (Declaration::TypeParameter { .. }, Declaration::TypeParameter { .. }) => {
                self.to_ref() == other.to_ref()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{AdviceId, BuilderId};

    fn built(replaces: Option<DeclRef>) -> Declaration {
        Declaration::Built(Arc::new(BuiltDeclaration {
            id: BuilderId::new(0, 0),
            advice: AdviceId(1),
            data: DeclarationData::property("X", TypeRef::int32()),
            overridden_member: None,
            replaces,
            interface_member: None,
            attributes: Vec::new(),
        }))
    }

    #[test]
    fn test_built_declaration_is_its_own_definition() {
        let decl = built(None);
        assert_eq!(decl.to_ref(), DeclRef::Built(BuilderId::new(0, 0)));
        assert_eq!(decl.definition(), decl.to_ref());
    }

    #[test]
    fn test_replacement_keeps_logical_ref() {
        let decl = built(Some(DeclRef::Original(DeclId(5))));
        assert_eq!(decl.to_ref(), DeclRef::Original(DeclId(5)));
        assert_eq!(decl.definition(), DeclRef::Built(BuilderId::new(0, 0)));
    }

    #[test]
    fn test_parameter_view() {
        let p = Declaration::Parameter {
            member: DeclRef::Original(DeclId(3)),
            index: 1,
            data: ParameterData::new("x", TypeRef::int32()),
            introduced: false,
        };
        assert_eq!(p.kind(), DeclarationKind::Parameter);
        assert_eq!(p.name(), "x");
        assert_eq!(p.member_type(), Some(&TypeRef::int32()));
        assert_eq!(p.containing(), Some(DeclRef::Original(DeclId(3))));
    }
}
