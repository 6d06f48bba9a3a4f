//! Initialize phase: builder initialization and shape validation

use super::interface::interface_closure;
use crate::errors::{Result, WeaveError};
use crate::features::advice::domain::{Advice, AdviceKind};
use crate::features::compilation::CodeModel;
use crate::features::contracts::validate_contract;
use crate::features::declarations::{BuilderArena, BuilderInitContext, DeclarationKind};
use crate::features::references::{DanglingReferenceError, DeclRef};
use crate::features::templates::{InterfaceMemberMark, TemplateMember};
use crate::shared::models::{BuilderId, DiagnosticBag};
use tracing::trace;

impl Advice {
    /// Initialize the advice's builders and validate its shape
    ///
    /// Invalid combinations go to `diagnostics`; malformed advices and
    /// dangling refs are hard errors.
    pub fn initialize(
        &self,
        model: &CodeModel,
        arena: &mut BuilderArena,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        trace!(advice = %self.id, kind = self.kind.name(), "initializing advice");
        model.resolve(&self.target)?;

        match &self.kind {
            AdviceKind::IntroduceMember {
                template,
                builder,
                pull,
                ..
            } => {
                if *pull && template.declaration.is_static() {
                    return Err(WeaveError::invalid_advice(
                        self.id,
                        format!("static member '{}' cannot be pulled", template.name()),
                    ));
                }
                self.initialize_builder(model, arena, *builder, Some(template), diagnostics)
            }
            AdviceKind::IntroduceType {
                template, builder, ..
            } => self.initialize_builder(model, arena, *builder, Some(template), diagnostics),
            AdviceKind::OverrideMember { promotion, .. } => match promotion {
                Some(builder) => self.initialize_builder(model, arena, *builder, None, diagnostics),
                None => Ok(()),
            },
            AdviceKind::AddContract {
                contract,
                promotion,
            } => {
                validate_contract(model, &self.target, contract)?;
                match promotion {
                    Some(builder) => {
                        self.initialize_builder(model, arena, *builder, None, diagnostics)
                    }
                    None => Ok(()),
                }
            }
            AdviceKind::ImplementInterface {
                interface, members, ..
            } => {
                let closure = interface_closure(model, interface);
                for member in members {
                    if let Some(InterfaceMemberMark::Explicit { interface: explicit }) =
                        &member.template.interface_member
                    {
                        if !closure.contains(explicit) {
                            return Err(WeaveError::template_shape(
                                member.template.name(),
                                model.display_name(&self.target),
                                format!(
                                    "explicit implementation of '{}', which '{}' does not extend",
                                    model.display_type(explicit),
                                    model.display_type(interface)
                                ),
                            ));
                        }
                    }
                    self.initialize_builder(
                        model,
                        arena,
                        member.builder,
                        Some(&member.template),
                        diagnostics,
                    )?;
                }
                Ok(())
            }
            AdviceKind::AddAttribute { builder, .. } => {
                self.initialize_builder(model, arena, *builder, None, diagnostics)
            }
            AdviceKind::RemoveAttributes { .. } => Ok(()),
            AdviceKind::AddInitializer { .. } => {
                let data = model.data(&self.target);
                if data.map_or(true, |d| d.kind != DeclarationKind::NamedType) {
                    return Err(WeaveError::invalid_advice(
                        self.id,
                        "initializers need a type target",
                    ));
                }
                Ok(())
            }
        }
    }

    fn initialize_builder(
        &self,
        model: &CodeModel,
        arena: &mut BuilderArena,
        id: BuilderId,
        template: Option<&TemplateMember>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        let builder = arena
            .get_mut(id)
            .ok_or_else(|| DanglingReferenceError::new(DeclRef::Built(id)))?;
        let mut ctx = BuilderInitContext::new(model, &self.aspect_name);
        if let Some(template) = template {
            ctx = ctx.with_template(template);
        }
        builder.initialize(&ctx, diagnostics)
    }
}
