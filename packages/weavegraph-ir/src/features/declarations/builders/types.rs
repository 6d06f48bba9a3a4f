//! Attribute and nested-type builders

use super::common::{BuilderCore, BuilderInitContext};
use crate::errors::Result;
use crate::features::declarations::domain::{AttributeData, DeclarationData, DeclarationKind};
use crate::features::references::DeclRef;
use crate::shared::models::{AdviceId, BuilderId, DiagnosticBag, TypeRef};

#[derive(Debug, Clone)]
pub struct AttributeBuilder {
    pub core: BuilderCore,
}

impl AttributeBuilder {
    pub fn new(id: BuilderId, advice: AdviceId, target: DeclRef, attribute: AttributeData) -> Self {
        let mut data = DeclarationData::attribute(attribute);
        data.containing = Some(target);
        Self {
            core: BuilderCore::from_data(id, advice, data),
        }
    }

    pub fn attribute_type(&self) -> Option<&TypeRef> {
        self.core.data.attribute.as_ref().map(|a| &a.attribute_type)
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        self.core.check_container(ctx, diagnostics)
    }
}

#[derive(Debug, Clone)]
pub struct NamedTypeBuilder {
    pub core: BuilderCore,
}

impl NamedTypeBuilder {
    pub fn new(id: BuilderId, advice: AdviceId, container: DeclRef, name: impl Into<String>) -> Self {
        Self {
            core: BuilderCore::new(id, advice, DeclarationKind::NamedType, name, container),
        }
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        if let Some(template) = ctx.template {
            let source = &template.declaration;
            self.core.data.accessibility = source.accessibility;
            self.core.data.modifiers = source.modifiers;
            self.core.data.type_shape = source.type_shape.clone();
            self.core.data.type_parameters = source.type_parameters.clone();
            self.core.attributes = template.attributes.clone();
        }
        self.core.check_container(ctx, diagnostics)
    }
}
