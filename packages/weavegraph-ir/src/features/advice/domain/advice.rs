use super::strategy::{InterfaceOverrideStrategy, OverrideStrategy};
use crate::features::contracts::Contract;
use crate::features::declarations::AttributeData;
use crate::features::references::DeclRef;
use crate::features::templates::{TemplateMember, TemplateRef};
use crate::shared::models::{AdviceId, AspectInstanceId, BuilderId, LayerId, Tags, TypeRef};
use serde::{Deserialize, Serialize};

/// Which constructors an initializer advice runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitializerPosition {
    /// Every instance constructor not chaining to `this(...)`
    BeforeInstanceConstructor,
    /// The static constructor, introduced when missing
    BeforeTypeConstructor,
}

/// Aspect member introduced as part of an interface implementation
#[derive(Debug, Clone)]
pub struct InterfaceMemberSpec {
    pub template: TemplateMember,
    pub builder: BuilderId,
}

/// Intent of one advice
#[derive(Debug, Clone)]
pub enum AdviceKind {
    /// Method, field, property, indexer or event
    IntroduceMember {
        template: TemplateMember,
        strategy: OverrideStrategy,
        builder: BuilderId,
        /// Pull the member's value through constructor parameters
        pull: bool,
    },
    /// Nested type
    IntroduceType {
        template: TemplateMember,
        strategy: OverrideStrategy,
        builder: BuilderId,
    },
    OverrideMember {
        body: Option<TemplateRef>,
        /// Property standing in for a field target
        promotion: Option<BuilderId>,
    },
    ImplementInterface {
        interface: TypeRef,
        strategy: InterfaceOverrideStrategy,
        members: Vec<InterfaceMemberSpec>,
    },
    AddAttribute {
        attribute: AttributeData,
        strategy: OverrideStrategy,
        builder: BuilderId,
    },
    RemoveAttributes {
        attribute_type: TypeRef,
    },
    AddContract {
        contract: Contract,
        promotion: Option<BuilderId>,
    },
    AddInitializer {
        position: InitializerPosition,
        template: TemplateRef,
    },
}

impl AdviceKind {
    pub fn name(&self) -> &'static str {
        match self {
            AdviceKind::IntroduceMember { .. } => "IntroduceMember",
            AdviceKind::IntroduceType { .. } => "IntroduceType",
            AdviceKind::OverrideMember { .. } => "OverrideMember",
            AdviceKind::ImplementInterface { .. } => "ImplementInterface",
            AdviceKind::AddAttribute { .. } => "AddAttribute",
            AdviceKind::RemoveAttributes { .. } => "RemoveAttributes",
            AdviceKind::AddContract { .. } => "AddContract",
            AdviceKind::AddInitializer { .. } => "AddInitializer",
        }
    }
}

/// One intent of an aspect instance against one target
#[derive(Debug, Clone)]
pub struct Advice {
    pub id: AdviceId,
    pub aspect: AspectInstanceId,
    /// Short name used in diagnostics
    pub aspect_name: String,
    pub layer: LayerId,
    pub target: DeclRef,
    pub tags: Tags,
    pub kind: AdviceKind,
}

impl Advice {
    /// Builders allocated for this advice at construction
    pub fn builders(&self) -> Vec<BuilderId> {
        match &self.kind {
            AdviceKind::IntroduceMember { builder, .. }
            | AdviceKind::IntroduceType { builder, .. }
            | AdviceKind::AddAttribute { builder, .. } => vec![*builder],
            AdviceKind::OverrideMember { promotion, .. }
            | AdviceKind::AddContract { promotion, .. } => promotion.iter().copied().collect(),
            AdviceKind::ImplementInterface { members, .. } => {
                members.iter().map(|m| m.builder).collect()
            }
            AdviceKind::RemoveAttributes { .. } | AdviceKind::AddInitializer { .. } => Vec::new(),
        }
    }

    /// Ref of the declaration this advice introduces, if any
    pub fn introduced(&self) -> Option<DeclRef> {
        match &self.kind {
            AdviceKind::IntroduceMember { builder, .. }
            | AdviceKind::IntroduceType { builder, .. } => Some(DeclRef::Built(*builder)),
            _ => None,
        }
    }
}
