//! Structural type system over the code model

use super::ports::TypeSystem;
use crate::features::compilation::CodeModel;
use crate::features::declarations::{Declaration, DeclarationData, DeclarationKind, TypeKind};
use crate::shared::models::{RefKind, SpecialType, TypeRef};

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralTypeSystem;

impl StructuralTypeSystem {
    pub fn new() -> Self {
        Self
    }

    fn is_value_type(model: &CodeModel, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Special(special) => special.is_value_type(),
            TypeRef::Named { definition, .. } => model
                .data(definition)
                .and_then(|d| d.type_kind())
                .map_or(false, |k| matches!(k, TypeKind::Struct | TypeKind::Enum)),
            _ => false,
        }
    }

    /// Types `ty` converts to by reference: bases and interfaces
    fn supertypes(model: &CodeModel, ty: &TypeRef) -> Vec<TypeRef> {
        let Some(definition) = ty.definition() else {
            return Vec::new();
        };
        let mut out: Vec<TypeRef> = model
            .base_chain(definition)
            .into_iter()
            .map(TypeRef::named)
            .collect();
        out.extend(model.interfaces(definition));
        out
    }

    fn numeric_widening(from: &TypeRef, to: &TypeRef) -> bool {
        use SpecialType::*;
        matches!(
            (from, to),
            (TypeRef::Special(Int32), TypeRef::Special(Int64 | Double))
                | (TypeRef::Special(Int64), TypeRef::Special(Double))
        )
    }
}

impl TypeSystem for StructuralTypeSystem {
    fn signatures_equal(&self, a: &DeclarationData, b: &DeclarationData) -> bool {
        let same_name = a.kind == DeclarationKind::Indexer && b.kind == DeclarationKind::Indexer
            || a.name == b.name;
        same_name
            && a.type_parameters.len() == b.type_parameters.len()
            && a.parameters.len() == b.parameters.len()
            && a.parameters.iter().zip(&b.parameters).all(|(p, q)| {
                // in/ref/out differ by modifier only
                p.ty == q.ty && (p.ref_kind == RefKind::None) == (q.ref_kind == RefKind::None)
            })
    }

    fn is_implicitly_convertible(&self, model: &CodeModel, from: &TypeRef, to: &TypeRef) -> bool {
        if self.is_reference_convertible(model, from, to) || Self::numeric_widening(from, to) {
            return true;
        }
        // boxing
        matches!(to, TypeRef::Special(SpecialType::Object))
            && !from.is_void()
            && Self::is_value_type(model, from)
    }

    fn is_reference_convertible(&self, model: &CodeModel, from: &TypeRef, to: &TypeRef) -> bool {
        if from == to {
            return true;
        }
        if from.is_void() || to.is_void() || Self::is_value_type(model, from) {
            return false;
        }
        match to {
            TypeRef::Special(SpecialType::Object) => true,
            TypeRef::Named { .. } => Self::supertypes(model, from).iter().any(|s| {
                // non-generic target matches any instantiation of the same definition
                s == to
                    || (to.definition() == s.definition()
                        && matches!(to, TypeRef::Named { arguments, .. } if arguments.is_empty()))
            }),
            _ => false,
        }
    }

    fn is_overridable(&self, member: &Declaration) -> bool {
        member.modifiers().is_overridable()
    }
}
