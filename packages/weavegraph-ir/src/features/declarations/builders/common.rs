use crate::errors::Result;
use crate::features::compilation::CodeModel;
use crate::features::declarations::domain::{
    AttributeData, BuiltDeclaration, DeclarationData, DeclarationKind,
};
use crate::features::references::DeclRef;
use crate::features::templates::{InterfaceMemberMark, TemplateMember};
use crate::shared::models::{
    Accessibility, AdviceId, BuilderId, Diagnostic, DiagnosticBag, DiagnosticKind,
};

/// What a builder may look at while initializing
pub struct BuilderInitContext<'a> {
    pub model: &'a CodeModel,
    /// Aspect-side member the builder copies its shape from
    pub template: Option<&'a TemplateMember>,
    /// Aspect short name, for diagnostics
    pub aspect_name: &'a str,
}

impl<'a> BuilderInitContext<'a> {
    pub fn new(model: &'a CodeModel, aspect_name: &'a str) -> Self {
        Self {
            model,
            template: None,
            aspect_name,
        }
    }

    pub fn with_template(mut self, template: &'a TemplateMember) -> Self {
        self.template = Some(template);
        self
    }
}

/// State shared by every builder kind
#[derive(Debug, Clone)]
pub struct BuilderCore {
    pub id: BuilderId,
    /// Owning advice
    pub advice: AdviceId,
    pub data: DeclarationData,
    pub overridden_member: Option<DeclRef>,
    pub replaces: Option<DeclRef>,
    pub interface_member: Option<DeclRef>,
    pub attributes: Vec<AttributeData>,
    initialized: bool,
}

impl BuilderCore {
    pub fn new(
        id: BuilderId,
        advice: AdviceId,
        kind: DeclarationKind,
        name: impl Into<String>,
        container: DeclRef,
    ) -> Self {
        let mut data = DeclarationData::new(kind, name);
        data.containing = Some(container);
        Self::from_data(id, advice, data)
    }

    pub fn from_data(id: BuilderId, advice: AdviceId, data: DeclarationData) -> Self {
        Self {
            id,
            advice,
            data,
            overridden_member: None,
            replaces: None,
            interface_member: None,
            attributes: Vec::new(),
            initialized: false,
        }
    }

    pub fn to_ref(&self) -> DeclRef {
        DeclRef::Built(self.id)
    }

    pub fn container(&self) -> Option<&DeclRef> {
        self.data.containing.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_static(&self) -> bool {
        self.data.modifiers.is_static
    }

    /// Hide an inherited member (`new` modifier)
    pub fn mark_new(&mut self) {
        self.data.modifiers.is_new = true;
        self.data.modifiers.is_override = false;
    }

    /// Override `overridden`, which must be virtual in a base type
    pub fn mark_override(&mut self, overridden: DeclRef) {
        self.data.modifiers.is_override = true;
        self.data.modifiers.is_new = false;
        self.data.modifiers.is_virtual = false;
        self.overridden_member = Some(overridden);
    }

    /// Copy the template's shape: signature, accessibility, staticity and
    /// forwarded attributes. The builder keeps its own name and container.
    pub(super) fn copy_from_template(&mut self, template: &TemplateMember) {
        let source = &template.declaration;

        self.data.accessibility = source.accessibility;
        self.data.modifiers.is_static = source.modifiers.is_static;
        self.data.modifiers.is_virtual = source.modifiers.is_virtual;
        self.data.modifiers.is_readonly = source.modifiers.is_readonly;
        self.data.member_type = source.member_type.clone();
        self.data.parameters = source.parameters.clone();
        self.data.type_parameters = source.type_parameters.clone();
        self.data.writeability = source.writeability;
        self.attributes = template.attributes.clone();

        match &template.interface_member {
            Some(InterfaceMemberMark::Declarative) => {
                self.data.accessibility = Accessibility::Public;
            }
            Some(InterfaceMemberMark::Explicit { interface }) => {
                self.data.accessibility = Accessibility::Private;
                self.data.modifiers.is_virtual = false;
                self.data.explicit_interface = Some(interface.clone());
            }
            None => {
                self.data.explicit_interface = source.explicit_interface.clone();
            }
        }
    }

    /// Container must resolve; instance members cannot go into static types
    pub(super) fn check_container(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        if let Some(container) = self.data.containing.clone() {
            let target = ctx.model.resolve(&container)?;
            let is_type = target.kind() == DeclarationKind::NamedType;
            if is_type && target.is_static() && !self.is_static() && self.data.kind.is_member() {
                diagnostics.report(Diagnostic::at(
                    DiagnosticKind::CannotIntroduceInstanceMemberIntoStaticType {
                        aspect: ctx.aspect_name.to_string(),
                        member: ctx.model.display_data(&self.data),
                        target_type: ctx.model.display_name(&container),
                    },
                    self.to_ref(),
                ));
            }
        }
        self.initialized = true;
        Ok(())
    }

    pub fn build(self) -> BuiltDeclaration {
        BuiltDeclaration {
            id: self.id,
            advice: self.advice,
            data: self.data,
            overridden_member: self.overridden_member,
            replaces: self.replaces,
            interface_member: self.interface_member,
            attributes: self.attributes,
        }
    }
}
