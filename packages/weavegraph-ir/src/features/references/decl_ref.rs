//! Snapshot-independent declaration references

use crate::features::compilation::CodeModel;
use crate::features::declarations::Declaration;
use crate::shared::models::{BuilderId, DeclId, GenericOwnerKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Weak, non-owning identity of a declaration
///
/// Equality is logical identity: two refs are equal when they designate the
/// same member in every model derived from the same baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclRef {
    /// Declaration of the baseline codebase
    Original(DeclId),
    /// Declaration produced by a builder
    Built(BuilderId),
    /// Parameter of a method, indexer or constructor (original or introduced)
    Parameter(ParameterRef),
    /// Type parameter of a generic type or method
    TypeParameter(TypeParameterRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterRef {
    pub member: Box<DeclRef>,
    pub index: u16,
}

/// Reference to a generic parameter
///
/// Compares by owner kind and position only. The owner is kept so the ref can
/// still be resolved, but two refs obtained from different instantiations of
/// the same generic definition are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeParameterRef {
    pub owner: Box<DeclRef>,
    pub owner_kind: GenericOwnerKind,
    pub position: u16,
}

impl PartialEq for TypeParameterRef {
    fn eq(&self, other: &Self) -> bool {
        self.owner_kind == other.owner_kind && self.position == other.position
    }
}

impl Eq for TypeParameterRef {}

impl Hash for TypeParameterRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner_kind.hash(state);
        self.position.hash(state);
    }
}

impl DeclRef {
    pub fn parameter(member: DeclRef, index: u16) -> Self {
        DeclRef::Parameter(ParameterRef {
            member: Box::new(member),
            index,
        })
    }

    pub fn type_parameter(owner: DeclRef, owner_kind: GenericOwnerKind, position: u16) -> Self {
        DeclRef::TypeParameter(TypeParameterRef {
            owner: Box::new(owner),
            owner_kind,
            position,
        })
    }

    /// Resolve against a model
    ///
    /// Yields the Original declaration, or the most recent Built declaration
    /// that replaced it in `model`.
    pub fn resolve(&self, model: &CodeModel) -> Result<Declaration, DanglingReferenceError> {
        model.resolve(self)
    }

    pub fn is_built(&self) -> bool {
        matches!(self, DeclRef::Built(_))
    }

    pub fn as_original(&self) -> Option<DeclId> {
        match self {
            DeclRef::Original(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_built(&self) -> Option<BuilderId> {
        match self {
            DeclRef::Built(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<DeclId> for DeclRef {
    fn from(id: DeclId) -> Self {
        DeclRef::Original(id)
    }
}

impl From<BuilderId> for DeclRef {
    fn from(id: BuilderId) -> Self {
        DeclRef::Built(id)
    }
}

impl fmt::Display for DeclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclRef::Original(id) => write!(f, "{}", id),
            DeclRef::Built(id) => write!(f, "{}", id),
            DeclRef::Parameter(p) => write!(f, "{}/param#{}", p.member, p.index),
            DeclRef::TypeParameter(tp) => write!(f, "{}/T#{}", tp.owner, tp.position),
        }
    }
}

/// The logical member behind a ref was removed and never replaced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Reference {reference} does not resolve in this model")]
pub struct DanglingReferenceError {
    pub reference: DeclRef,
}

impl DanglingReferenceError {
    pub fn new(reference: DeclRef) -> Self {
        Self { reference }
    }
}
