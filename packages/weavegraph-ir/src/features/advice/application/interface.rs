//! Interface implementation
//!
//! The requested interface and every interface it extends form the closure;
//! interfaces the target already implements drop out of it. Each member of
//! each remaining interface is bound to an aspect member:
//! 1. an explicit implementation for that interface with the same signature
//! 2. otherwise a declarative member of the same kind and signature, which
//!    must then match the member type exactly
//!
//! Every aspect member is introduced, matched or not.

use super::context::ResolveContext;
use super::introduce::{builder_data, decide, introduce, Decision};
use super::resolve::Pending;
use crate::errors::Result;
use crate::features::advice::domain::{
    Advice, InterfaceMemberSpec, InterfaceOverrideStrategy, OverrideStrategy,
};
use crate::features::compilation::{CodeModel, TransformationKind};
use crate::features::declarations::DeclarationData;
use crate::features::references::{DanglingReferenceError, DeclRef};
use crate::features::templates::InterfaceMemberMark;
use crate::shared::models::{Diagnostic, DiagnosticKind, TypeRef};
use tracing::debug;

/// `interface` followed by every interface it extends
pub(super) fn interface_closure(model: &CodeModel, interface: &TypeRef) -> Vec<TypeRef> {
    let mut closure = vec![interface.clone()];
    if let Some(definition) = interface.definition() {
        for parent in model.interfaces(definition) {
            if !closure.contains(&parent) {
                closure.push(parent);
            }
        }
    }
    closure
}

/// Members an implementation must provide
fn interface_members(model: &CodeModel, interface: &TypeRef) -> Vec<(DeclRef, DeclarationData)> {
    let Some(definition) = interface.definition() else {
        return Vec::new();
    };
    model
        .children(definition)
        .into_iter()
        .filter_map(|r| model.data(&r).map(|d| (r, d)))
        .filter(|(_, d)| d.kind.is_member())
        .collect()
}

pub(super) fn resolve_interface(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    interface: &TypeRef,
    strategy: InterfaceOverrideStrategy,
    members: &[InterfaceMemberSpec],
) -> Result<()> {
    let target_type = model.logical(&advice.target);

    if model.implements(&target_type, interface) {
        match strategy {
            InterfaceOverrideStrategy::Fail => {
                pending.diagnostics.report(Diagnostic::at(
                    DiagnosticKind::InterfaceIsAlreadyImplemented {
                        aspect: advice.aspect_name.clone(),
                        interface: model.display_type(interface),
                        target_type: model.display_name(&target_type),
                    },
                    target_type,
                ));
            }
            InterfaceOverrideStrategy::Ignore => {
                debug!(advice = %advice.id, "interface already implemented, ignored");
            }
        }
        return Ok(());
    }

    let closure: Vec<TypeRef> = interface_closure(model, interface)
        .into_iter()
        .filter(|i| !model.implements(&target_type, i))
        .collect();

    let mut specs = Vec::with_capacity(members.len());
    for spec in members {
        specs.push((spec, builder_data(ctx, spec.builder)?));
    }

    // 1. bind interface members to aspect members
    let mut bindings: Vec<(TypeRef, Vec<(DeclRef, DeclRef)>)> = Vec::with_capacity(closure.len());
    for current in &closure {
        let mut implementations = Vec::new();
        for (member_ref, member) in interface_members(model, current) {
            let explicit = specs.iter().find(|(spec, data)| {
                matches!(
                    &spec.template.interface_member,
                    Some(InterfaceMemberMark::Explicit { interface }) if interface == current
                ) && data.kind == member.kind
                    && data.name == member.name
                    && ctx.type_system().signatures_equal(data, &member)
            });
            // overloads share a name, so the signature selects the candidate
            let declarative = || {
                specs.iter().find(|(spec, data)| {
                    spec.template.interface_member == Some(InterfaceMemberMark::Declarative)
                        && data.kind == member.kind
                        && ctx.type_system().signatures_equal(data, &member)
                })
            };

            let bound = match explicit.or_else(declarative) {
                Some((spec, data)) => {
                    let is_explicit = matches!(
                        spec.template.interface_member,
                        Some(InterfaceMemberMark::Explicit { .. })
                    );
                    if !is_explicit && data.member_type != member.member_type {
                        pending.diagnostics.report(Diagnostic::at(
                            DiagnosticKind::DeclarativeInterfaceMemberDoesNotMatch {
                                aspect: advice.aspect_name.clone(),
                                aspect_member: spec.template.name().to_string(),
                                interface_member: model.display_data(&member),
                                target_type: model.display_name(&target_type),
                            },
                            DeclRef::Built(spec.builder),
                        ));
                        continue;
                    }
                    spec.builder
                }
                None => {
                    pending.diagnostics.report(Diagnostic::at(
                        DiagnosticKind::MissingDeclarativeInterfaceMember {
                            aspect: advice.aspect_name.clone(),
                            interface_member: model.display_data(&member),
                            interface: model.display_type(current),
                            target_type: model.display_name(&target_type),
                        },
                        target_type.clone(),
                    ));
                    continue;
                }
            };

            let core = ctx
                .arena
                .get_mut(bound)
                .map(|b| b.core_mut())
                .ok_or_else(|| DanglingReferenceError::new(DeclRef::Built(bound)))?;
            if core.interface_member.is_none() {
                core.interface_member = Some(member_ref.clone());
            }
            implementations.push((member_ref, DeclRef::Built(bound)));
        }
        bindings.push((current.clone(), implementations));
    }

    // 2. introduce every aspect member; declarative ones must not collide
    for (spec, _) in &specs {
        let is_explicit = matches!(
            spec.template.interface_member,
            Some(InterfaceMemberMark::Explicit { .. })
        );
        let decision = if is_explicit {
            Decision::Introduce
        } else {
            decide(
                advice,
                model,
                ctx,
                pending,
                &target_type,
                spec.builder,
                OverrideStrategy::Fail,
            )?
        };
        if decision == Decision::Introduce {
            introduce(ctx, pending, spec.builder, spec.template.body.clone())?;
        }
    }

    // 3. one introduction per interface of the closure
    for (current, implementations) in bindings {
        debug!(
            advice = %advice.id,
            interface = %model.display_type(&current),
            members = implementations.len(),
            "interface introduced"
        );
        pending.kinds.push(TransformationKind::IntroduceInterface {
            target_type: target_type.clone(),
            interface: current,
            implementations,
        });
    }
    Ok(())
}
