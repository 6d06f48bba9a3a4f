//! Resolve phase: one advice against the current model

use super::attributes::{resolve_add, resolve_remove};
use super::context::ResolveContext;
use super::contracts::resolve_contract;
use super::interface::resolve_interface;
use super::introduce::{resolve_member, resolve_type};
use super::overrides::{resolve_initializer, resolve_override};
use crate::errors::Result;
use crate::features::advice::domain::{Advice, AdviceKind, AdviceOutput, AdviceResult};
use crate::features::compilation::{CodeModel, TransformationKind};
use crate::shared::models::DiagnosticBag;
use tracing::{debug, trace};

/// Transformations and diagnostics gathered before orders are assigned
#[derive(Debug, Default)]
pub(super) struct Pending {
    pub kinds: Vec<TransformationKind>,
    pub diagnostics: DiagnosticBag,
}

impl Advice {
    /// Resolve against `model`
    ///
    /// Yields the advice's transformations, stamped with fresh orders, or the
    /// diagnostics that failed it. A failed advice leaves nothing behind: its
    /// builders and anything it sealed are released. Hard errors (dangling
    /// refs, malformed templates) abort the weave.
    pub fn resolve(&self, model: &CodeModel, ctx: &mut ResolveContext<'_>) -> Result<AdviceResult> {
        trace!(advice = %self.id, kind = self.kind.name(), target = %self.target, "resolving advice");
        model.resolve(&self.target)?;
        let mut pending = Pending::default();

        match &self.kind {
            AdviceKind::IntroduceMember {
                template,
                strategy,
                builder,
                pull,
            } => resolve_member(self, model, ctx, &mut pending, template, *strategy, *builder, *pull)?,
            AdviceKind::IntroduceType {
                strategy, builder, ..
            } => resolve_type(self, model, ctx, &mut pending, *strategy, *builder)?,
            AdviceKind::OverrideMember { body, promotion } => {
                resolve_override(self, model, ctx, &mut pending, body.as_ref(), *promotion)?
            }
            AdviceKind::ImplementInterface {
                interface,
                strategy,
                members,
            } => resolve_interface(self, model, ctx, &mut pending, interface, *strategy, members)?,
            AdviceKind::AddAttribute {
                attribute,
                strategy,
                builder,
            } => resolve_add(self, model, ctx, &mut pending, attribute, *strategy, *builder)?,
            AdviceKind::RemoveAttributes { attribute_type } => {
                resolve_remove(self, model, &mut pending, attribute_type)
            }
            AdviceKind::AddContract {
                contract,
                promotion,
            } => resolve_contract(self, model, ctx, &mut pending, contract, *promotion)?,
            AdviceKind::AddInitializer { position, template } => {
                resolve_initializer(self, model, ctx, &mut pending, *position, template)?
            }
        }

        if pending.diagnostics.has_blocking(ctx.config.warnings_as_errors) {
            self.release_all(ctx, &pending);
            debug!(
                advice = %self.id,
                diagnostics = pending.diagnostics.len(),
                "advice failed"
            );
            return Ok(Err(pending.diagnostics.into_vec()));
        }

        // builders the policy decided not to use
        for id in self.builders() {
            if ctx.arena.is_pending(id) {
                ctx.arena.release(id);
            }
        }

        let mut output = AdviceOutput::new(self.id);
        for kind in pending.kinds {
            output.transformations.push(ctx.emit(self.id, kind));
        }
        output.warnings = pending.diagnostics.into_vec();
        debug!(
            advice = %self.id,
            transformations = output.len(),
            warnings = output.warnings.len(),
            "advice resolved"
        );
        Ok(Ok(output))
    }

    fn release_all(&self, ctx: &mut ResolveContext<'_>, pending: &Pending) {
        let sealed = pending.kinds.iter().filter_map(|k| match k {
            TransformationKind::IntroduceDeclaration { declaration } => Some(declaration.id),
            _ => None,
        });
        for id in self.builders().into_iter().chain(sealed) {
            ctx.arena.release(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeaverConfig;
    use crate::features::advice::application::{
        AdviceFactory, Collaborators, ContractAccumulator, OrderAllocator,
    };
    use crate::features::advice::domain::OverrideStrategy;
    use crate::features::compilation::BaselineBuilder;
    use crate::features::declarations::{BuilderArena, DeclarationData};
    use crate::features::references::DeclRef;
    use crate::features::templates::TemplateMember;
    use crate::shared::models::{AspectInstanceId, DiagnosticKind, LayerId, TypeRef};

    struct Fixture {
        model: CodeModel,
        class: DeclRef,
        arena: BuilderArena,
        orders: OrderAllocator,
        collaborators: Collaborators,
        config: WeaverConfig,
        contracts: ContractAccumulator,
        next_advice: u32,
    }

    impl Fixture {
        fn new() -> Self {
            let mut b = BaselineBuilder::new();
            let c = b.add(DeclarationData::class("C"));
            b.add_in(c, DeclarationData::method("Foo", TypeRef::void()).public());
            Self {
                model: CodeModel::new(b.build()),
                class: DeclRef::Original(c),
                arena: BuilderArena::new(),
                orders: OrderAllocator::new(),
                collaborators: Collaborators::default(),
                config: WeaverConfig::default(),
                contracts: ContractAccumulator::new(),
                next_advice: 0,
            }
        }

        fn introduce(&mut self, name: &str, strategy: OverrideStrategy) -> Advice {
            let mut factory = AdviceFactory::new(
                &self.model,
                &mut self.arena,
                AspectInstanceId(0),
                "Logging",
                LayerId(0),
                &mut self.next_advice,
            );
            let template = TemplateMember::new(DeclarationData::method(name, TypeRef::void()).public())
                .with_body("Log");
            factory
                .introduce_member(&self.class, template, strategy)
                .unwrap();
            factory.into_advices().remove(0)
        }

        fn resolve(&mut self, advice: &Advice) -> AdviceResult {
            let mut diagnostics = DiagnosticBag::new();
            advice
                .initialize(&self.model, &mut self.arena, &mut diagnostics)
                .unwrap();
            let mut ctx = ResolveContext {
                arena: &mut self.arena,
                orders: &mut self.orders,
                collaborators: &self.collaborators,
                config: &self.config,
                contracts: &mut self.contracts,
            };
            advice.resolve(&self.model, &mut ctx).unwrap()
        }
    }

    #[test]
    fn test_fresh_member_introduced_with_body() {
        let mut fx = Fixture::new();
        let advice = fx.introduce("Bar", OverrideStrategy::Fail);
        let output = fx.resolve(&advice).unwrap();

        let names: Vec<&str> = output.transformations.iter().map(|t| t.kind.name()).collect();
        assert_eq!(names, vec!["IntroduceDeclaration", "OverrideMember"]);
        assert!(output.transformations[0].order < output.transformations[1].order);
    }

    #[test]
    fn test_fail_strategy_releases_builder() {
        let mut fx = Fixture::new();
        let advice = fx.introduce("Foo", OverrideStrategy::Fail);
        let builder = advice.builders()[0];
        let diagnostics = fx.resolve(&advice).unwrap_err();

        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0].kind,
            DiagnosticKind::MemberAlreadyExists { .. }
        ));
        assert!(!fx.arena.is_pending(builder));
        assert!(fx.arena.sealed(builder).is_none());
    }

    #[test]
    fn test_same_type_override_targets_existing_member() {
        let mut fx = Fixture::new();
        let advice = fx.introduce("Foo", OverrideStrategy::Override);
        let output = fx.resolve(&advice).unwrap();

        assert_eq!(output.len(), 1);
        match &output.transformations[0].kind {
            TransformationKind::OverrideMember { target, body } => {
                assert!(matches!(target, DeclRef::Original(_)));
                assert_eq!(body.as_ref().map(|b| b.name.as_str()), Some("Log"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fx.arena.pending_count(), 0);
    }

    #[test]
    fn test_ignore_yields_nothing() {
        let mut fx = Fixture::new();
        let advice = fx.introduce("Foo", OverrideStrategy::Ignore);
        let output = fx.resolve(&advice).unwrap();
        assert!(output.is_empty());
        assert_eq!(fx.arena.pending_count(), 0);
    }
}
