//! Member builders: methods, fields, properties/indexers, events, constructors

use super::common::{BuilderCore, BuilderInitContext};
use crate::errors::Result;
use crate::features::declarations::domain::{Declaration, DeclarationData, DeclarationKind};
use crate::features::references::DeclRef;
use crate::features::templates::TemplateRef;
use crate::shared::models::{AdviceId, BuilderId, DiagnosticBag, TypeRef};

// ═══════════════════════════════════════════════════════════════════════════
// Method
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct MethodBuilder {
    pub core: BuilderCore,
}

impl MethodBuilder {
    pub fn new(id: BuilderId, advice: AdviceId, container: DeclRef, name: impl Into<String>) -> Self {
        Self {
            core: BuilderCore::new(id, advice, DeclarationKind::Method, name, container),
        }
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        if let Some(template) = ctx.template {
            self.core.copy_from_template(template);
        }
        if self.core.data.member_type.is_none() {
            self.core.data.member_type = Some(TypeRef::void());
        }
        self.core.check_container(ctx, diagnostics)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Field
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct FieldBuilder {
    pub core: BuilderCore,
    /// Initializer expression template
    pub initializer: Option<TemplateRef>,
}

impl FieldBuilder {
    pub fn new(id: BuilderId, advice: AdviceId, container: DeclRef, name: impl Into<String>) -> Self {
        Self {
            core: BuilderCore::new(id, advice, DeclarationKind::Field, name, container),
            initializer: None,
        }
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        if let Some(template) = ctx.template {
            self.core.copy_from_template(template);
            self.initializer = template.initializer.clone();
        }
        self.core.check_container(ctx, diagnostics)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Property / Indexer
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    pub core: BuilderCore,
}

impl PropertyBuilder {
    pub fn new(id: BuilderId, advice: AdviceId, container: DeclRef, name: impl Into<String>) -> Self {
        Self {
            core: BuilderCore::new(id, advice, DeclarationKind::Property, name, container),
        }
    }

    pub fn indexer(id: BuilderId, advice: AdviceId, container: DeclRef) -> Self {
        Self {
            core: BuilderCore::new(id, advice, DeclarationKind::Indexer, "this[]", container),
        }
    }

    /// Property standing in for `field`
    ///
    /// Keeps the field's name, type, staticity and writeability. The built
    /// declaration replaces the field, so refs to the field resolve to it.
    pub fn promoting_field(id: BuilderId, advice: AdviceId, field: &Declaration) -> Self {
        let mut data = DeclarationData::new(DeclarationKind::Property, field.name());
        if let Some(source) = field.data() {
            data.containing = source.containing.clone();
            data.accessibility = source.accessibility;
            data.modifiers.is_static = source.modifiers.is_static;
            data.member_type = source.member_type.clone();
            data.writeability = source.writeability;
        }
        let mut core = BuilderCore::from_data(id, advice, data);
        core.replaces = Some(field.to_ref());
        Self { core }
    }

    pub fn is_indexer(&self) -> bool {
        self.core.data.kind == DeclarationKind::Indexer
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        if let Some(template) = ctx.template {
            self.core.copy_from_template(template);
        }
        self.core.check_container(ctx, diagnostics)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Event
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct EventBuilder {
    pub core: BuilderCore,
}

impl EventBuilder {
    pub fn new(id: BuilderId, advice: AdviceId, container: DeclRef, name: impl Into<String>) -> Self {
        Self {
            core: BuilderCore::new(id, advice, DeclarationKind::Event, name, container),
        }
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        if let Some(template) = ctx.template {
            self.core.copy_from_template(template);
        }
        self.core.check_container(ctx, diagnostics)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Constructor
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ConstructorBuilder {
    pub core: BuilderCore,
}

impl ConstructorBuilder {
    /// Static constructor introduced into `container`
    pub fn type_constructor(id: BuilderId, advice: AdviceId, container: DeclRef) -> Self {
        let mut data = DeclarationData::type_constructor();
        data.containing = Some(container);
        Self {
            core: BuilderCore::from_data(id, advice, data),
        }
    }

    /// Explicit copy of a compiler-provided constructor
    ///
    /// The built constructor replaces `implicit`, so parameters can be
    /// appended to it and refs to the implicit constructor stay valid.
    pub fn materializing(id: BuilderId, advice: AdviceId, implicit: &Declaration) -> Self {
        let mut data = implicit
            .data()
            .cloned()
            .unwrap_or_else(DeclarationData::constructor);
        data.modifiers.is_implicit = false;
        let mut core = BuilderCore::from_data(id, advice, data);
        core.replaces = Some(implicit.to_ref());
        Self { core }
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        self.core.check_container(ctx, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::declarations::domain::InitializerKind;
    use crate::shared::models::{DeclId, Modifiers, Writeability};
    use std::sync::Arc;

    fn id() -> BuilderId {
        BuilderId::new(0, 0)
    }

    #[test]
    fn test_promoting_field_keeps_identity() {
        let field = Declaration::Original {
            id: DeclId(7),
            data: Arc::new({
                let mut d = DeclarationData::field("count", TypeRef::int32()).as_readonly();
                d.containing = Some(DeclRef::Original(DeclId(2)));
                d
            }),
        };
        let builder = PropertyBuilder::promoting_field(id(), AdviceId(1), &field);
        let built = builder.core.build();

        assert_eq!(built.data.kind, DeclarationKind::Property);
        assert_eq!(built.data.name, "count");
        assert_eq!(built.data.writeability, Writeability::ConstructorOnly);
        assert_eq!(built.logical_ref(), DeclRef::Original(DeclId(7)));
    }

    #[test]
    fn test_materialized_constructor_is_explicit() {
        let implicit = Declaration::Original {
            id: DeclId(3),
            data: Arc::new(DeclarationData::implicit_constructor()),
        };
        let builder = ConstructorBuilder::materializing(id(), AdviceId(1), &implicit);
        assert!(!builder.core.data.modifiers.is_implicit);
        assert_eq!(builder.core.replaces, Some(DeclRef::Original(DeclId(3))));

        // parameters are introduced by transformations, not on the builder
        let built = builder.core.build();
        assert!(built.data.parameters.is_empty());
        let init = built.data.initializer.as_ref().unwrap();
        assert_eq!(init.kind, InitializerKind::Base);
        assert!(init.arguments.is_empty());
    }

    #[test]
    fn test_mark_override_clears_new() {
        let mut builder =
            MethodBuilder::new(id(), AdviceId(1), DeclRef::Original(DeclId(1)), "Foo");
        builder.core.mark_new();
        builder.core.mark_override(DeclRef::Original(DeclId(9)));
        let Modifiers {
            is_new,
            is_override,
            ..
        } = builder.core.data.modifiers;
        assert!(!is_new);
        assert!(is_override);
        assert_eq!(
            builder.core.overridden_member,
            Some(DeclRef::Original(DeclId(9)))
        );
    }
}
