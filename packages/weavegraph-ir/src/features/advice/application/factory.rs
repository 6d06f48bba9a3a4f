//! Advice construction
//!
//! Used by an aspect while it builds. Targets and template shapes are checked
//! here (hard errors); builders are allocated with the advice so their refs
//! are stable before anything is resolved.

use crate::errors::{Result, WeaveError};
use crate::features::advice::domain::{
    Advice, AdviceKind, InitializerPosition, InterfaceMemberSpec, InterfaceOverrideStrategy,
    OverrideStrategy,
};
use crate::features::compilation::CodeModel;
use crate::features::contracts::{Contract, ContractDirection, ContractTarget};
use crate::features::declarations::{
    AttributeBuilder, AttributeData, Builder, BuilderArena, DeclarationData, DeclarationKind,
    EventBuilder, FieldBuilder, MethodBuilder, NamedTypeBuilder, PropertyBuilder,
};
use crate::features::references::DeclRef;
use crate::features::templates::{TemplateMember, TemplateRef};
use crate::shared::models::{AdviceId, AspectInstanceId, BuilderId, LayerId, Tags, TypeRef};
use tracing::trace;

pub struct AdviceFactory<'a> {
    model: &'a CodeModel,
    arena: &'a mut BuilderArena,
    aspect: AspectInstanceId,
    aspect_name: String,
    layer: LayerId,
    next_advice: &'a mut u32,
    tags: Tags,
    advices: Vec<Advice>,
    /// Including builders of advices that failed construction
    allocated: Vec<BuilderId>,
}

impl<'a> AdviceFactory<'a> {
    pub fn new(
        model: &'a CodeModel,
        arena: &'a mut BuilderArena,
        aspect: AspectInstanceId,
        aspect_name: impl Into<String>,
        layer: LayerId,
        next_advice: &'a mut u32,
    ) -> Self {
        Self {
            model,
            arena,
            aspect,
            aspect_name: aspect_name.into(),
            layer,
            next_advice,
            tags: Tags::new(),
            advices: Vec::new(),
            allocated: Vec::new(),
        }
    }

    /// Model the aspect builds against
    pub fn model(&self) -> &CodeModel {
        self.model
    }

    pub fn aspect_name(&self) -> &str {
        &self.aspect_name
    }

    /// Tags attached to advices created from now on
    pub fn set_tags(&mut self, tags: Tags) -> &mut Self {
        self.tags = tags;
        self
    }

    /// Advices created so far, in registration order
    pub fn advices(&self) -> &[Advice] {
        &self.advices
    }

    /// Every builder allocated by this factory
    pub fn builders(&self) -> &[BuilderId] {
        &self.allocated
    }

    pub fn into_advices(self) -> Vec<Advice> {
        self.advices
    }

    /// Advices and every allocated builder
    pub fn into_parts(self) -> (Vec<Advice>, Vec<BuilderId>) {
        (self.advices, self.allocated)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Introductions
    // ═══════════════════════════════════════════════════════════════════════

    /// Introduce a method, field, property, indexer or event into `target`
    ///
    /// Returns the ref of the member being introduced.
    pub fn introduce_member(
        &mut self,
        target: &DeclRef,
        template: TemplateMember,
        strategy: OverrideStrategy,
    ) -> Result<DeclRef> {
        self.introduce(target, template, strategy, false)
    }

    /// Introduce an instance field or property whose value is pulled from
    /// constructor parameters
    pub fn introduce_pulled_member(
        &mut self,
        target: &DeclRef,
        template: TemplateMember,
        strategy: OverrideStrategy,
    ) -> Result<DeclRef> {
        if !matches!(
            template.kind(),
            DeclarationKind::Field | DeclarationKind::Property
        ) {
            return Err(WeaveError::template_shape(
                template.name(),
                self.model.display_name(target),
                format!("a pulled member must be a field or property, not a {}", template.kind()),
            ));
        }
        self.introduce(target, template, strategy, true)
    }

    fn introduce(
        &mut self,
        target: &DeclRef,
        template: TemplateMember,
        strategy: OverrideStrategy,
        pull: bool,
    ) -> Result<DeclRef> {
        self.require_type(target)?;
        let id = self.peek_id();
        let container = self.model.logical(target);
        let name = template.name().to_string();

        let builder = match template.kind() {
            DeclarationKind::Method => self.allocate(|b| MethodBuilder::new(b, id, container, name)),
            DeclarationKind::Field => self.allocate(|b| FieldBuilder::new(b, id, container, name)),
            DeclarationKind::Property => self.allocate(|b| PropertyBuilder::new(b, id, container, name)),
            DeclarationKind::Indexer => self.allocate(|b| PropertyBuilder::indexer(b, id, container)),
            DeclarationKind::Event => self.allocate(|b| EventBuilder::new(b, id, container, name)),
            other => {
                return Err(WeaveError::template_shape(
                    template.name(),
                    self.model.display_name(target),
                    format!("a {} cannot be introduced as a member", other),
                ))
            }
        };

        self.push(
            target,
            AdviceKind::IntroduceMember {
                template,
                strategy,
                builder,
                pull,
            },
        );
        Ok(DeclRef::Built(builder))
    }

    /// Introduce a nested type into a type or namespace
    pub fn introduce_type(
        &mut self,
        target: &DeclRef,
        template: TemplateMember,
        strategy: OverrideStrategy,
    ) -> Result<DeclRef> {
        let container = self.model.resolve(target)?;
        if !matches!(
            container.kind(),
            DeclarationKind::NamedType | DeclarationKind::Namespace
        ) {
            return Err(WeaveError::invalid_advice(
                self.peek_id(),
                format!("cannot introduce a type into a {}", container.kind()),
            ));
        }
        if template.kind() != DeclarationKind::NamedType {
            return Err(WeaveError::template_shape(
                template.name(),
                self.model.display_name(target),
                format!("expected a type, found a {}", template.kind()),
            ));
        }

        let id = self.peek_id();
        let container = container.to_ref();
        let name = template.name().to_string();
        let builder = self.allocate(|b| NamedTypeBuilder::new(b, id, container, name));
        self.push(
            target,
            AdviceKind::IntroduceType {
                template,
                strategy,
                builder,
            },
        );
        Ok(DeclRef::Built(builder))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Overrides, interfaces, attributes
    // ═══════════════════════════════════════════════════════════════════════

    /// Replace the body of a method, property, indexer, event or field
    pub fn override_member(&mut self, target: &DeclRef, body: Option<TemplateRef>) -> Result<AdviceId> {
        let decl = self.model.resolve(target)?;
        let kind = decl.kind();
        if !kind.is_member() || kind == DeclarationKind::Constructor {
            return Err(WeaveError::invalid_advice(
                self.peek_id(),
                format!("a {} cannot be overridden", kind),
            ));
        }
        let promotion = self.promotion_for(target)?;
        Ok(self.push(target, AdviceKind::OverrideMember { body, promotion }))
    }

    /// Make `target` implement `interface`, with `members` supplying the
    /// implementations (declarative or explicit)
    pub fn implement_interface(
        &mut self,
        target: &DeclRef,
        interface: TypeRef,
        strategy: InterfaceOverrideStrategy,
        members: Vec<TemplateMember>,
    ) -> Result<AdviceId> {
        self.require_type(target)?;
        let is_interface = interface
            .definition()
            .and_then(|d| self.model.data(d))
            .map_or(false, |d| d.is_interface());
        if !is_interface {
            return Err(WeaveError::invalid_advice(
                self.peek_id(),
                format!("'{}' is not an interface", self.model.display_type(&interface)),
            ));
        }

        let id = self.peek_id();
        let container = self.model.logical(target);
        let mut specs = Vec::with_capacity(members.len());
        for template in members {
            if template.interface_member.is_none() {
                return Err(WeaveError::template_shape(
                    template.name(),
                    self.model.display_name(target),
                    "interface members must be declarative or explicit",
                ));
            }
            let name = template.name().to_string();
            let container = container.clone();
            let builder = match template.kind() {
                DeclarationKind::Method => self.allocate(|b| MethodBuilder::new(b, id, container, name)),
                DeclarationKind::Property => self.allocate(|b| PropertyBuilder::new(b, id, container, name)),
                DeclarationKind::Indexer => self.allocate(|b| PropertyBuilder::indexer(b, id, container)),
                DeclarationKind::Event => self.allocate(|b| EventBuilder::new(b, id, container, name)),
                other => {
                    return Err(WeaveError::template_shape(
                        template.name(),
                        self.model.display_name(target),
                        format!("a {} cannot implement an interface member", other),
                    ))
                }
            };
            specs.push(InterfaceMemberSpec { template, builder });
        }

        Ok(self.push(
            target,
            AdviceKind::ImplementInterface {
                interface,
                strategy,
                members: specs,
            },
        ))
    }

    pub fn add_attribute(
        &mut self,
        target: &DeclRef,
        attribute: AttributeData,
        strategy: OverrideStrategy,
    ) -> Result<AdviceId> {
        let target_ref = self.model.resolve(target)?.to_ref();
        let id = self.peek_id();
        let data = attribute.clone();
        let builder = self.allocate(|b| AttributeBuilder::new(b, id, target_ref, data));
        Ok(self.push(
            target,
            AdviceKind::AddAttribute {
                attribute,
                strategy,
                builder,
            },
        ))
    }

    pub fn remove_attributes(&mut self, target: &DeclRef, attribute_type: TypeRef) -> Result<AdviceId> {
        self.model.resolve(target)?;
        Ok(self.push(target, AdviceKind::RemoveAttributes { attribute_type }))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Contracts and initializers
    // ═══════════════════════════════════════════════════════════════════════

    /// Add a contract on a member
    ///
    /// A parameter ref targets that parameter of its member; any other ref
    /// uses `target` as given.
    pub fn add_contract(
        &mut self,
        member: &DeclRef,
        target: ContractTarget,
        direction: ContractDirection,
        template: TemplateRef,
    ) -> Result<AdviceId> {
        let (member, target) = match member {
            DeclRef::Parameter(p) => ((*p.member).clone(), ContractTarget::Parameter(p.index)),
            other => (other.clone(), target),
        };
        self.model.resolve(&member)?;

        let contract = Contract {
            advice: self.peek_id(),
            aspect: self.aspect_name.clone(),
            direction,
            target,
            template,
            tags: self.tags.clone(),
        };
        let promotion = self.promotion_for(&member)?;
        Ok(self.push(&member, AdviceKind::AddContract { contract, promotion }))
    }

    pub fn add_initializer(
        &mut self,
        target: &DeclRef,
        position: InitializerPosition,
        template: TemplateRef,
    ) -> Result<AdviceId> {
        let data = self.require_type(target)?;
        let instance_less = data.is_interface() || data.is_static();
        if position == InitializerPosition::BeforeInstanceConstructor && instance_less {
            return Err(WeaveError::invalid_advice(
                self.peek_id(),
                format!(
                    "'{}' has no instance constructors",
                    self.model.display_name(target)
                ),
            ));
        }
        Ok(self.push(target, AdviceKind::AddInitializer { position, template }))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════

    fn allocate<B, F>(&mut self, make: F) -> BuilderId
    where
        B: Into<Builder>,
        F: FnOnce(BuilderId) -> B,
    {
        let builder = self.arena.allocate(make);
        self.allocated.push(builder);
        builder
    }

    fn peek_id(&self) -> AdviceId {
        AdviceId(*self.next_advice)
    }

    fn push(&mut self, target: &DeclRef, kind: AdviceKind) -> AdviceId {
        let id = self.peek_id();
        *self.next_advice += 1;
        trace!(
            advice = %id,
            aspect = %self.aspect_name,
            kind = kind.name(),
            target = %target,
            "advice created"
        );
        self.advices.push(Advice {
            id,
            aspect: self.aspect,
            aspect_name: self.aspect_name.clone(),
            layer: self.layer,
            target: self.model.logical(target),
            tags: self.tags.clone(),
            kind,
        });
        id
    }

    /// Target must be a class, struct or interface
    fn require_type(&self, target: &DeclRef) -> Result<DeclarationData> {
        let decl = self.model.resolve(target)?;
        match decl.data() {
            Some(data) if data.kind == DeclarationKind::NamedType => Ok(data.clone()),
            _ => Err(WeaveError::invalid_advice(
                self.peek_id(),
                format!(
                    "target '{}' is a {}, not a type",
                    self.model.display_name(target),
                    decl.kind()
                ),
            )),
        }
    }

    /// Property builder standing in for a field target
    fn promotion_for(&mut self, target: &DeclRef) -> Result<Option<BuilderId>> {
        let decl = self.model.resolve(target)?;
        if decl.kind() != DeclarationKind::Field {
            return Ok(None);
        }
        let id = self.peek_id();
        let builder = self.allocate(|b| PropertyBuilder::promoting_field(b, id, &decl));
        Ok(Some(builder))
    }
}
