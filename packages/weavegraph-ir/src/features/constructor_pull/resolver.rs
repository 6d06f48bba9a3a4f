//! Constructor-pull propagation
//!
//! Works against the model as it was before the advice: everything this
//! resolution changes (materialized constructors, appended parameters) is
//! tracked locally so parameter positions stay consistent within one run.

use super::graph::DelegationGraph;
use super::ports::{ForwardedParameter, PullAction, PullRequest, PullSink, PullStrategy};
use crate::errors::Result;
use crate::features::compilation::{CodeModel, InsertPosition, Statement, TransformationKind};
use crate::features::declarations::{
    ArgumentValue, BuilderArena, ConstructorBuilder, InitializerKind, ParameterData,
};
use crate::features::references::DeclRef;
use crate::shared::models::{AdviceId, Diagnostic, DiagnosticBag, DiagnosticKind, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Everything a pull resolution needs from its advice
pub struct PullContext<'a> {
    pub model: &'a CodeModel,
    pub arena: &'a mut BuilderArena,
    pub advice: AdviceId,
    pub aspect: &'a str,
    pub strategy: &'a dyn PullStrategy,
    pub max_depth: usize,
}

/// Per-run bookkeeping
#[derive(Default)]
struct RunState {
    appended: FxHashMap<DeclRef, Vec<ParameterData>>,
    materialized: FxHashSet<DeclRef>,
    modified: FxHashSet<DeclRef>,
    output: Vec<TransformationKind>,
}

pub struct ConstructorPullResolver;

impl ConstructorPullResolver {
    /// Pull `member` into the constructors of its type and down their chains
    ///
    /// Returns transformations in creation order. Problems go to
    /// `diagnostics`; the caller fails the advice when errors were reported.
    pub fn resolve(
        ctx: &mut PullContext<'_>,
        member: &DeclRef,
        member_decl_name: &str,
        member_type: &TypeRef,
        owner: &DeclRef,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<Vec<TransformationKind>> {
        let model = ctx.model;
        let graph = DelegationGraph::build(model, owner);
        let mut state = RunState::default();
        let mut queue: VecDeque<(DeclRef, ForwardedParameter, usize)> = VecDeque::new();

        // 1. Constructors of the member's own type that run field initializers
        for ctor in model.constructors(owner) {
            let delegates_to_this = model
                .initializer(&ctor)
                .map_or(false, |i| i.kind == InitializerKind::This);
            if delegates_to_this || Self::already_pulled(model, &ctor, member) {
                continue;
            }

            let mut sink = PullSink::new(diagnostics, ctx.aspect, model.display_name(&ctor));
            let action = ctx.strategy.decide(
                &PullRequest {
                    model,
                    constructor: &ctor,
                    member,
                    member_name: member_decl_name,
                    member_type,
                    forwarded: None,
                    depth: 0,
                },
                &mut sink,
            );
            trace!(constructor = %ctor, ?action, "pull decision");

            match action {
                PullAction::DoNotPull => {}
                PullAction::UseExistingParameter { index } => {
                    let Some(parameter) = Self::parameter_at(model, &state, &ctor, index) else {
                        sink.error(format!("no parameter at position {}", index));
                        continue;
                    };
                    state.output.push(Self::assignment(&ctor, member, &parameter.name));
                }
                PullAction::AppendParameterAndPull {
                    name,
                    ty,
                    default_value,
                } => {
                    let Some(index) = Self::append(
                        ctx,
                        &mut state,
                        &ctor,
                        ParameterData {
                            name: name.clone(),
                            ty: ty.clone(),
                            ref_kind: Default::default(),
                            default_value: default_value.clone(),
                            pulled_for: Some(member.clone()),
                        },
                        diagnostics,
                    )?
                    else {
                        continue;
                    };
                    state.output.push(Self::assignment(&ctor, member, &name));
                    queue.push_back((
                        ctor.clone(),
                        ForwardedParameter {
                            constructor: ctor.clone(),
                            index,
                            name,
                            ty,
                            default_value,
                        },
                        1,
                    ));
                }
            }
        }

        // 2. Breadth-first over constructors delegating to modified ones
        let mut depth_reported = false;
        while let Some((modified, forwarded, depth)) = queue.pop_front() {
            for delegator in graph.delegators(&modified) {
                if state.modified.contains(&delegator)
                    || Self::already_pulled(model, &delegator, member)
                {
                    continue;
                }
                if depth > ctx.max_depth {
                    if !depth_reported {
                        diagnostics.report(Diagnostic::at(
                            DiagnosticKind::PullDepthExceeded {
                                aspect: ctx.aspect.to_string(),
                                member: model.display_name(member),
                                max_depth: ctx.max_depth,
                            },
                            member.clone(),
                        ));
                        depth_reported = true;
                    }
                    continue;
                }

                let mut sink =
                    PullSink::new(diagnostics, ctx.aspect, model.display_name(&delegator));
                let action = ctx.strategy.decide(
                    &PullRequest {
                        model,
                        constructor: &delegator,
                        member,
                        member_name: member_decl_name,
                        member_type,
                        forwarded: Some(&forwarded),
                        depth,
                    },
                    &mut sink,
                );
                trace!(constructor = %delegator, depth, ?action, "forward decision");

                let argument = match action {
                    PullAction::DoNotPull => ArgumentValue::Default,
                    PullAction::UseExistingParameter { index } => {
                        match Self::parameter_at(model, &state, &delegator, index) {
                            Some(p) => ArgumentValue::Parameter(p.name),
                            None => {
                                sink.error(format!("no parameter at position {}", index));
                                continue;
                            }
                        }
                    }
                    PullAction::AppendParameterAndPull {
                        name,
                        ty,
                        default_value,
                    } => {
                        let Some(index) = Self::append(
                            ctx,
                            &mut state,
                            &delegator,
                            ParameterData {
                                name: name.clone(),
                                ty: ty.clone(),
                                ref_kind: Default::default(),
                                default_value: default_value.clone(),
                                pulled_for: Some(member.clone()),
                            },
                            diagnostics,
                        )?
                        else {
                            continue;
                        };
                        queue.push_back((
                            delegator.clone(),
                            ForwardedParameter {
                                constructor: delegator.clone(),
                                index,
                                name: name.clone(),
                                ty,
                                default_value,
                            },
                            depth + 1,
                        ));
                        ArgumentValue::Parameter(name)
                    }
                };

                // omitted optional arguments leave a gap: bind by name instead
                let positional = model
                    .initializer(&delegator)
                    .map_or(0, |init| init.positional_len());
                let value = if forwarded.index as usize > positional {
                    ArgumentValue::Named {
                        parameter: forwarded.name.clone(),
                        value: Box::new(argument),
                    }
                } else {
                    argument
                };

                state.modified.insert(delegator.clone());
                state
                    .output
                    .push(TransformationKind::IntroduceConstructorInitializerArgument {
                        constructor: delegator,
                        parameter_index: forwarded.index,
                        value,
                    });
            }
        }

        debug!(
            member = %member,
            transformations = state.output.len(),
            materialized = state.materialized.len(),
            "constructor pull resolved"
        );
        Ok(state.output)
    }

    fn already_pulled(model: &CodeModel, ctor: &DeclRef, member: &DeclRef) -> bool {
        model
            .parameters(ctor)
            .iter()
            .any(|p| p.pulled_for.as_ref() == Some(member))
    }

    fn parameter_at(
        model: &CodeModel,
        state: &RunState,
        ctor: &DeclRef,
        index: u16,
    ) -> Option<ParameterData> {
        let mut parameters = model.parameters(ctor);
        if let Some(appended) = state.appended.get(ctor) {
            parameters.extend(appended.iter().cloned());
        }
        parameters.into_iter().nth(index as usize)
    }

    fn assignment(ctor: &DeclRef, member: &DeclRef, parameter: &str) -> TransformationKind {
        TransformationKind::InsertStatements {
            target: ctor.clone(),
            position: InsertPosition::BeforeBody,
            statements: vec![Statement::AssignFromParameter {
                member: member.clone(),
                parameter: parameter.to_string(),
            }],
        }
    }

    /// Append a trailing parameter, materializing an implicit constructor
    /// first. `None` when the name is taken by an unrelated parameter.
    fn append(
        ctx: &mut PullContext<'_>,
        state: &mut RunState,
        ctor: &DeclRef,
        parameter: ParameterData,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<Option<u16>> {
        let model = ctx.model;
        let mut existing = model.parameters(ctor);
        if let Some(appended) = state.appended.get(ctor) {
            existing.extend(appended.iter().cloned());
        }

        if existing.iter().any(|p| p.name == parameter.name) {
            diagnostics.report(Diagnostic::at(
                DiagnosticKind::PulledParameterNameConflict {
                    aspect: ctx.aspect.to_string(),
                    parameter: parameter.name.clone(),
                    constructor: model.display_name(ctor),
                },
                ctor.clone(),
            ));
            return Ok(None);
        }

        let decl = model.resolve(ctor)?;
        if decl.modifiers().is_implicit && state.materialized.insert(ctor.clone()) {
            let advice = ctx.advice;
            let id = ctx
                .arena
                .allocate(|id| ConstructorBuilder::materializing(id, advice, &decl));
            let declaration = ctx.arena.seal(id)?;
            trace!(constructor = %ctor, builder = %id, "materialized implicit constructor");
            state
                .output
                .push(TransformationKind::IntroduceDeclaration { declaration });
        }

        let index = existing.len() as u16;
        state
            .appended
            .entry(ctor.clone())
            .or_default()
            .push(parameter.clone());
        state.modified.insert(ctor.clone());
        state.output.push(TransformationKind::IntroduceParameter {
            member: ctor.clone(),
            parameter,
        });
        Ok(Some(index))
    }
}
