//! Attribute introduction and removal

use super::context::ResolveContext;
use super::introduce::introduce;
use super::resolve::Pending;
use crate::errors::Result;
use crate::features::advice::domain::{Advice, OverrideStrategy};
use crate::features::compilation::{CodeModel, TransformationKind};
use crate::features::declarations::AttributeData;
use crate::shared::models::{BuilderId, Diagnostic, DiagnosticKind, TypeRef};
use tracing::debug;

pub(super) fn resolve_add(
    advice: &Advice,
    model: &CodeModel,
    ctx: &mut ResolveContext<'_>,
    pending: &mut Pending,
    attribute: &AttributeData,
    strategy: OverrideStrategy,
    builder: BuilderId,
) -> Result<()> {
    let target = model.logical(&advice.target);
    let present = model.has_attribute(&target, &attribute.attribute_type);

    if present {
        match strategy {
            OverrideStrategy::Fail => {
                pending.diagnostics.report(Diagnostic::at(
                    DiagnosticKind::AttributeAlreadyPresent {
                        aspect: advice.aspect_name.clone(),
                        attribute_type: model.display_type(&attribute.attribute_type),
                        target: model.display_name(&target),
                    },
                    target,
                ));
                return Ok(());
            }
            OverrideStrategy::Ignore => return Ok(()),
            OverrideStrategy::New => {}
            OverrideStrategy::Override => {
                pending.kinds.push(TransformationKind::RemoveAttributes {
                    target: target.clone(),
                    attribute_type: attribute.attribute_type.clone(),
                });
            }
        }
    }

    introduce(ctx, pending, builder, None)?;
    debug!(
        advice = %advice.id,
        target = %target,
        replaced = present && strategy == OverrideStrategy::Override,
        "attribute introduced"
    );
    Ok(())
}

/// Removal is a no-op when nothing matches
pub(super) fn resolve_remove(
    advice: &Advice,
    model: &CodeModel,
    pending: &mut Pending,
    attribute_type: &TypeRef,
) {
    let target = model.logical(&advice.target);
    if model.has_attribute(&target, attribute_type) {
        pending.kinds.push(TransformationKind::RemoveAttributes {
            target,
            attribute_type: attribute_type.clone(),
        });
    }
}
