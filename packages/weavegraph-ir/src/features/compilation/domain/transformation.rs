//! Transformations: materialized effects of advices

use super::statement::{Accessor, InsertPosition, Statement};
use crate::features::declarations::{ArgumentValue, BuiltDeclaration, ParameterData};
use crate::features::references::DeclRef;
use crate::features::templates::TemplateRef;
use crate::shared::models::{AdviceId, TransformationOrder, TypeRef};
use std::sync::Arc;

/// Whether a transformation changes what enumeration sees
///
/// Removals count: dropping attributes changes what `attributes()` and
/// attribute member queries return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observability {
    Observable,
    NonObservable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformationKind {
    /// New built declaration, or a replacement when it `replaces` another
    IntroduceDeclaration { declaration: Arc<BuiltDeclaration> },

    /// Trailing parameter appended to a method, indexer or constructor
    IntroduceParameter {
        member: DeclRef,
        parameter: ParameterData,
    },

    /// Interface added to a type's implemented list
    IntroduceInterface {
        target_type: DeclRef,
        interface: TypeRef,
        /// (interface member, implementing member)
        implementations: Vec<(DeclRef, DeclRef)>,
    },

    /// Body of `target` replaced by a template (or kept as is when `None`)
    OverrideMember {
        target: DeclRef,
        body: Option<TemplateRef>,
    },

    /// Attributes of the given type dropped from `target`
    RemoveAttributes {
        target: DeclRef,
        attribute_type: TypeRef,
    },

    /// Argument added to a constructor's `base(...)`/`this(...)` call
    IntroduceConstructorInitializerArgument {
        constructor: DeclRef,
        parameter_index: u16,
        value: ArgumentValue,
    },

    InsertStatements {
        target: DeclRef,
        position: InsertPosition,
        statements: Vec<Statement>,
    },

    /// Composed contract body wrapping the original implementation
    ///
    /// `accessor` is `None` for a method-style body; fields and properties
    /// get one body per accessor.
    ApplyContracts {
        target: DeclRef,
        accessor: Option<Accessor>,
        body: Vec<Statement>,
    },
}

impl TransformationKind {
    pub fn observability(&self) -> Observability {
        match self {
            TransformationKind::IntroduceDeclaration { .. }
            | TransformationKind::IntroduceParameter { .. }
            | TransformationKind::IntroduceInterface { .. }
            | TransformationKind::RemoveAttributes { .. } => Observability::Observable,
            _ => Observability::NonObservable,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransformationKind::IntroduceDeclaration { .. } => "IntroduceDeclaration",
            TransformationKind::IntroduceParameter { .. } => "IntroduceParameter",
            TransformationKind::IntroduceInterface { .. } => "IntroduceInterface",
            TransformationKind::OverrideMember { .. } => "OverrideMember",
            TransformationKind::RemoveAttributes { .. } => "RemoveAttributes",
            TransformationKind::IntroduceConstructorInitializerArgument { .. } => {
                "IntroduceConstructorInitializerArgument"
            }
            TransformationKind::InsertStatements { .. } => "InsertStatements",
            TransformationKind::ApplyContracts { .. } => "ApplyContracts",
        }
    }

    /// Declaration the transformation is about
    pub fn target(&self) -> DeclRef {
        match self {
            TransformationKind::IntroduceDeclaration { declaration } => declaration.logical_ref(),
            TransformationKind::IntroduceParameter { member, .. } => member.clone(),
            TransformationKind::IntroduceInterface { target_type, .. } => target_type.clone(),
            TransformationKind::OverrideMember { target, .. }
            | TransformationKind::RemoveAttributes { target, .. }
            | TransformationKind::InsertStatements { target, .. }
            | TransformationKind::ApplyContracts { target, .. } => target.clone(),
            TransformationKind::IntroduceConstructorInitializerArgument { constructor, .. } => {
                constructor.clone()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    /// Strictly increasing, assigned at creation
    pub order: TransformationOrder,
    pub advice: AdviceId,
    pub kind: TransformationKind,
}

impl Transformation {
    pub fn new(order: TransformationOrder, advice: AdviceId, kind: TransformationKind) -> Self {
        Self {
            order,
            advice,
            kind,
        }
    }

    pub fn observability(&self) -> Observability {
        self.kind.observability()
    }

    pub fn is_observable(&self) -> bool {
        self.observability() == Observability::Observable
    }
}
