//! Member overrides, field promotion and initializers

use super::context::ResolveContext;
use super::resolve::Pending;
use crate::errors::Result;
use crate::features::advice::domain::{Advice, InitializerPosition};
use crate::features::compilation::{CodeModel, InsertPosition, Statement, TransformationKind};
use crate::features::declarations::{
    BuilderInitContext, ConstructorBuilder, Declaration, DeclarationKind, InitializerKind,
};
use crate::features::references::DeclRef;
use crate::features::templates::TemplateRef;
use crate::shared::models::BuilderId;
use std::sync::Arc;
use tracing::{debug, trace};

/// Introduce the property standing in for a field target
///
/// A no-op when the target is no longer a field, e.g. promoted by an earlier
/// advice; the unused builder is released with the advice's leftovers.
pub(super) fn promote_if_field(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    promotion: Option<BuilderId>,
) -> Result<()> {
    let Some(builder) = promotion else {
        return Ok(());
    };
    let is_field = model
        .data(&advice.target)
        .map_or(false, |d| d.kind == DeclarationKind::Field);
    if !is_field {
        trace!(advice = %advice.id, "target already promoted");
        return Ok(());
    }

    let declaration = ctx.arena.seal(builder)?;
    debug!(
        advice = %advice.id,
        field = %advice.target,
        property = %declaration.builder_ref(),
        "field promoted to property"
    );
    pending
        .kinds
        .push(TransformationKind::IntroduceDeclaration { declaration });
    Ok(())
}

pub(super) fn resolve_override(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    body: Option<&TemplateRef>,
    promotion: Option<BuilderId>,
) -> Result<()> {
    promote_if_field(advice, model, ctx, pending, promotion)?;
    pending.kinds.push(TransformationKind::OverrideMember {
        target: model.logical(&advice.target),
        body: body.cloned(),
    });
    Ok(())
}

pub(super) fn resolve_initializer(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    position: InitializerPosition,
    template: &TemplateRef,
) -> Result<()> {
    let target_type = model.logical(&advice.target);
    let targets = match position {
        InitializerPosition::BeforeInstanceConstructor => {
            instance_targets(advice, model, ctx, pending, &target_type)?
        }
        InitializerPosition::BeforeTypeConstructor => {
            vec![type_constructor(advice, model, ctx, pending, &target_type)?]
        }
    };

    debug!(
        advice = %advice.id,
        constructors = targets.len(),
        template = %template,
        "initializer inserted"
    );
    for target in targets {
        pending.kinds.push(TransformationKind::InsertStatements {
            target,
            position: InsertPosition::BeforeBody,
            statements: vec![Statement::Template(template.clone())],
        });
    }
    Ok(())
}

/// Instance constructors that start an initialization: those chaining to
/// `this(...)` run the initializer through their target already
fn instance_targets(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    target_type: &DeclRef,
) -> Result<Vec<DeclRef>> {
    let mut targets = Vec::new();
    for constructor in model.constructors(target_type) {
        let decl = model.resolve(&constructor)?;
        let Some(data) = decl.data() else {
            continue;
        };
        if data.initializer_kind() == InitializerKind::This {
            continue;
        }
        if data.modifiers.is_implicit {
            targets.push(materialize(advice, ctx, pending, &decl)?);
        } else {
            targets.push(constructor);
        }
    }
    Ok(targets)
}

fn materialize(
    advice: &Advice,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    implicit: &Declaration,
) -> Result<DeclRef> {
    let id = ctx
        .arena
        .allocate(|id| ConstructorBuilder::materializing(id, advice.id, implicit));
    let declaration = ctx.arena.seal(id)?;
    let reference = declaration.logical_ref();
    trace!(advice = %advice.id, constructor = %reference, "materialized implicit constructor");
    pending.kinds.push(TransformationKind::IntroduceDeclaration {
        declaration: Arc::clone(&declaration),
    });
    Ok(reference)
}

fn type_constructor(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    target_type: &DeclRef,
) -> Result<DeclRef> {
    if let Some(existing) = model.static_constructor(target_type) {
        return Ok(existing);
    }

    let id = ctx
        .arena
        .allocate(|id| ConstructorBuilder::type_constructor(id, advice.id, target_type.clone()));
    if let Some(builder) = ctx.arena.get_mut(id) {
        let init = BuilderInitContext::new(model, &advice.aspect_name);
        builder.initialize(&init, &mut pending.diagnostics)?;
    }
    let declaration = ctx.arena.seal(id)?;
    let reference = declaration.builder_ref();
    trace!(advice = %advice.id, constructor = %reference, "introduced static constructor");
    pending
        .kinds
        .push(TransformationKind::IntroduceDeclaration { declaration });
    Ok(reference)
}
