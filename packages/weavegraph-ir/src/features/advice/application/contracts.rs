//! Contract advices
//!
//! Contracts accumulate per member for the whole weave. Composition always
//! covers every contract of the member, so the latest `ApplyContracts` of a
//! member (per accessor, for fields and properties) is the complete body. Composition runs either per advice or, when
//! deferred, once per touched member at the end of the layer.

use super::context::ResolveContext;
use super::overrides::promote_if_field;
use super::resolve::Pending;
use crate::errors::Result;
use crate::features::advice::domain::{Advice, AdviceOutput, AdviceResult};
use crate::features::compilation::{CodeModel, TransformationKind};
use crate::features::contracts::{ComposedBody, Contract, ContractComposer};
use crate::features::references::DeclRef;
use crate::shared::models::{AdviceId, BuilderId, DiagnosticBag};
use tracing::{debug, warn};

pub(super) fn resolve_contract(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    contract: &Contract,
    promotion: Option<BuilderId>,
) -> Result<()> {
    promote_if_field(advice, model, ctx, pending, promotion)?;

    let member = model.logical(&advice.target);
    ctx.contracts.add(member.clone(), contract.clone());
    if ctx.config.defer_contracts_to_layer_end {
        return Ok(());
    }

    if let Some(bodies) = compose(model, ctx, &member, &mut pending.diagnostics)? {
        pending.kinds.extend(apply(&member, bodies));
    }
    Ok(())
}

/// Compose `member` and commit or roll back its contracts
fn compose(
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    member: &DeclRef,
    diagnostics: &mut DiagnosticBag,
) -> Result<Option<Vec<ComposedBody>>> {
    let Some(advice) = ctx.contracts.get(member) else {
        return Ok(None);
    };
    let composer = ContractComposer::new(
        ctx.collaborators.expander.as_ref(),
        &ctx.config.return_value_name,
    );
    let body = composer.compose(model, advice, diagnostics)?;
    match &body {
        Some(_) => ctx.contracts.commit(member),
        None => ctx.contracts.rollback(member),
    }
    Ok(body)
}

/// Compose every member whose contracts changed since its last composition
///
/// Each result is attributed to the advice of the member's latest contract.
pub fn resolve_deferred_contracts(
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
) -> Result<Vec<AdviceResult>> {
    let members = ctx.contracts.take_dirty();
    let mut results = Vec::with_capacity(members.len());

    for member in members {
        let Some(owner) = latest_advice(ctx, &member) else {
            continue;
        };
        let mut diagnostics = DiagnosticBag::new();
        match compose(model, ctx, &member, &mut diagnostics)? {
            Some(bodies) => {
                debug!(member = %member, advice = %owner, "deferred contracts composed");
                let mut output = AdviceOutput::new(owner);
                for kind in apply(&member, bodies) {
                    output.transformations.push(ctx.emit(owner, kind));
                }
                output.warnings = diagnostics.into_vec();
                results.push(Ok(output));
            }
            None => {
                warn!(member = %member, advice = %owner, "deferred contracts rolled back");
                results.push(Err(diagnostics.into_vec()));
            }
        }
    }
    Ok(results)
}

fn apply(member: &DeclRef, bodies: Vec<ComposedBody>) -> Vec<TransformationKind> {
    bodies
        .into_iter()
        .map(|b| TransformationKind::ApplyContracts {
            target: member.clone(),
            accessor: b.accessor,
            body: b.statements,
        })
        .collect()
}

fn latest_advice(ctx: &ResolveContext<'_>, member: &DeclRef) -> Option<AdviceId> {
    ctx.contracts
        .get(member)?
        .contracts()
        .last()
        .map(|c| c.advice)
}
