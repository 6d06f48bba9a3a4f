//! Member and nested-type introduction with the conflict policy
//!
//! 1. no existing member: introduce the builder and bind its body
//! 2. staticity mismatch: always an error
//! 3. otherwise by strategy:
//!    - Fail: `MemberAlreadyExists`
//!    - Ignore: nothing
//!    - New: same type overrides the existing member; else hide it
//!    - Override: same type overrides the existing member; else the inherited
//!      one must be overridable with a convertible type

use super::conflict::{find_existing, Existing};
use super::context::ResolveContext;
use super::resolve::Pending;
use crate::errors::Result;
use crate::features::advice::domain::{Advice, OverrideStrategy};
use crate::features::compilation::{CodeModel, TransformationKind};
use crate::features::constructor_pull::{ConstructorPullResolver, PullContext};
use crate::features::declarations::{
    Builder, BuilderCore, BuiltDeclaration, DeclarationData,
};
use crate::features::references::{DanglingReferenceError, DeclRef};
use crate::features::templates::{TemplateMember, TemplateRef};
use crate::shared::models::{BuilderId, Diagnostic, DiagnosticKind, TypeRef};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of the conflict policy
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Decision {
    Introduce,
    /// Existing member in the target type takes the body instead
    OverrideExisting(DeclRef),
    Skip,
}

pub(super) fn builder_data(ctx: &ResolveContext<'_>, builder: BuilderId) -> Result<DeclarationData> {
    ctx.arena
        .get(builder)
        .map(|b| b.core().data.clone())
        .ok_or_else(|| DanglingReferenceError::new(DeclRef::Built(builder)).into())
}

/// Apply the strategy to `builder` against the member it collides with
pub(super) fn decide(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    target_type: &DeclRef,
    builder: BuilderId,
    strategy: OverrideStrategy,
) -> Result<Decision> {
    let data = builder_data(ctx, builder)?;
    let Some(existing) = find_existing(model, ctx.type_system(), target_type, &data) else {
        return Ok(Decision::Introduce);
    };
    trace!(
        advice = %advice.id,
        existing = %existing.reference,
        strategy = strategy.as_str(),
        "introduction collides with existing member"
    );

    let report = |pending: &mut Pending, kind: DiagnosticKind| {
        pending
            .diagnostics
            .report(Diagnostic::at(kind, DeclRef::Built(builder)));
    };
    let aspect = advice.aspect_name.clone();
    let member = model.display_data(&data);
    let target_name = model.display_name(target_type);
    let declaring = model.display_name(&existing.declaring_type);

    if existing.is_static() != data.is_static() {
        report(
            pending,
            DiagnosticKind::CannotIntroduceWithDifferentStaticity {
                aspect,
                member,
                target_type: target_name,
                declaring_type: declaring,
            },
        );
        return Ok(Decision::Skip);
    }

    let same_type = existing.declaring_type == *target_type;
    match strategy {
        OverrideStrategy::Fail => {
            report(
                pending,
                DiagnosticKind::MemberAlreadyExists {
                    aspect,
                    member,
                    target_type: target_name,
                    declaring_type: declaring,
                },
            );
            Ok(Decision::Skip)
        }
        OverrideStrategy::Ignore => Ok(Decision::Skip),
        OverrideStrategy::New | OverrideStrategy::Override if same_type => {
            Ok(Decision::OverrideExisting(existing.reference))
        }
        OverrideStrategy::New => {
            core_mut(ctx, builder)?.mark_new();
            Ok(Decision::Introduce)
        }
        OverrideStrategy::Override => {
            if !ctx.type_system().is_overridable(&existing.declaration) {
                report(
                    pending,
                    DiagnosticKind::CannotIntroduceOverrideOfSealed {
                        aspect,
                        member,
                        target_type: target_name,
                        declaring_type: declaring,
                    },
                );
                return Ok(Decision::Skip);
            }
            if let Some((existing_type, introduced_type)) = incompatible_type(model, ctx, &existing, &data) {
                report(
                    pending,
                    DiagnosticKind::CannotIntroduceDifferentExistingReturnType {
                        aspect,
                        member,
                        target_type: target_name,
                        declaring_type: declaring,
                        existing_type: model.display_type(&existing_type),
                        introduced_type: model.display_type(&introduced_type),
                    },
                );
                return Ok(Decision::Skip);
            }
            core_mut(ctx, builder)?.mark_override(existing.reference);
            Ok(Decision::Introduce)
        }
    }
}

/// Introduced type must convert by reference to the overridden member's type
fn incompatible_type(
    model: &CodeModel,
    ctx: &ResolveContext<'_>,
    existing: &Existing,
    introduced: &DeclarationData,
) -> Option<(TypeRef, TypeRef)> {
    let existing_type = existing.declaration.member_type()?.clone();
    let introduced_type = introduced.member_type.clone().unwrap_or_else(TypeRef::void);
    (!ctx
        .type_system()
        .is_reference_convertible(model, &introduced_type, &existing_type))
    .then(|| (existing_type, introduced_type))
}

fn core_mut<'c>(
    ctx: &'c mut ResolveContext<'_>,
    builder: BuilderId,
) -> Result<&'c mut BuilderCore> {
    ctx.arena
        .get_mut(builder)
        .map(Builder::core_mut)
        .ok_or_else(|| DanglingReferenceError::new(DeclRef::Built(builder)).into())
}

/// Body template bound to an introduced member: a field's initializer, the
/// template body otherwise
pub(super) fn body_of(ctx: &ResolveContext<'_>, builder: BuilderId, template: &TemplateMember) -> Option<TemplateRef> {
    match ctx.arena.get(builder) {
        Some(Builder::Field(field)) => field.initializer.clone(),
        _ => template.body.clone(),
    }
}

/// Seal `builder` and, for members, bind its body
pub(super) fn introduce(
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    builder: BuilderId,
    body: Option<TemplateRef>,
) -> Result<Arc<BuiltDeclaration>> {
    let declaration = ctx.arena.seal(builder)?;
    let reference = declaration.builder_ref();
    let kind = declaration.data.kind;
    pending.kinds.push(TransformationKind::IntroduceDeclaration {
        declaration: Arc::clone(&declaration),
    });
    if kind.is_member() {
        pending.kinds.push(TransformationKind::OverrideMember {
            target: reference,
            body,
        });
    }
    Ok(declaration)
}

pub(super) fn resolve_member(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    template: &TemplateMember,
    strategy: OverrideStrategy,
    builder: BuilderId,
    pull: bool,
) -> Result<()> {
    let target_type = model.logical(&advice.target);
    let body = body_of(ctx, builder, template);

    match decide(advice, model, ctx, pending, &target_type, builder, strategy)? {
        Decision::Introduce => {
            let declaration = introduce(ctx, pending, builder, body)?;
            debug!(
                advice = %advice.id,
                member = %declaration.builder_ref(),
                is_new = declaration.is_new(),
                is_override = declaration.is_override(),
                "member introduced"
            );
            if pull {
                pull_member(advice, model, ctx, pending, &declaration, &target_type)?;
            }
        }
        Decision::OverrideExisting(existing) => {
            debug!(advice = %advice.id, member = %existing, "existing member overridden in place");
            pending
                .kinds
                .push(TransformationKind::OverrideMember { target: existing, body });
        }
        Decision::Skip => {}
    }
    Ok(())
}

pub(super) fn resolve_type(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    strategy: OverrideStrategy,
    builder: BuilderId,
) -> Result<()> {
    let container = model.logical(&advice.target);
    match decide(advice, model, ctx, pending, &container, builder, strategy)? {
        Decision::Introduce => {
            introduce(ctx, pending, builder, None)?;
        }
        // a type has no body to take over
        Decision::OverrideExisting(_) | Decision::Skip => {}
    }
    Ok(())
}

fn pull_member(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    member: &BuiltDeclaration,
    owner: &DeclRef,
) -> Result<()> {
    let member_type = member.data.member_type.clone().unwrap_or_else(TypeRef::object);
    let mut pull_ctx = PullContext {
        model,
        arena: &mut *ctx.arena,
        advice: advice.id,
        aspect: &advice.aspect_name,
        strategy: ctx.collaborators.pull_strategy.as_ref(),
        max_depth: ctx.config.max_pull_depth,
    };
    let kinds = ConstructorPullResolver::resolve(
        &mut pull_ctx,
        &member.builder_ref(),
        &member.data.name,
        &member_type,
        owner,
        &mut pending.diagnostics,
    )?;
    pending.kinds.extend(kinds);
    Ok(())
}
