//! Layering, rollback and initializers

mod common;

use common::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use weavegraph_ir::features::advice::Collaborators;
use weavegraph_ir::features::compilation::{
    BaselineBuilder, CompilationModel, Statement, TransformationKind,
};
use weavegraph_ir::features::constructor_pull::{
    AppendParameterStrategy, PullAction, PullRequest, PullSink, PullStrategy,
};
use weavegraph_ir::features::declarations::{ArgumentValue, DeclarationData, DeclarationKind};
use weavegraph_ir::features::references::DeclRef;
use weavegraph_ir::features::templates::{TemplateMember, TemplateRef};
use weavegraph_ir::pipeline::{RollbackReason, Weaver};
use weavegraph_ir::shared::models::{DiagnosticKind, LayerId, TypeRef};
use weavegraph_ir::{InitializerPosition, OverrideStrategy, WeaverConfig};

fn method(name: &str) -> TemplateMember {
    TemplateMember::new(DeclarationData::method(name, TypeRef::void()).public()).with_body(name)
}

/// `class Host { void Run(); }`
fn host() -> (CompilationModel, DeclRef, DeclRef) {
    let mut b = BaselineBuilder::new();
    let host = b.add(DeclarationData::class("Host"));
    let run = b.add_in(host, DeclarationData::method("Run", TypeRef::void()).public());
    (CompilationModel::new(b.build()), original(host), original(run))
}

#[test]
fn test_construction_error_rolls_back_only_that_aspect() {
    let (model, host, run) = host();
    let (h1, h2) = (host.clone(), host.clone());

    let result = weave(
        &model,
        vec![
            aspect("Broken", 0, move |f| {
                f.introduce_member(&h1, method("Log"), OverrideStrategy::Fail)?;
                // a method is not a type
                f.introduce_member(&run, method("Nested"), OverrideStrategy::Fail)?;
                Ok(())
            }),
            aspect("Trace", 0, move |f| {
                f.introduce_member(&h2, method("Trace"), OverrideStrategy::Fail)?;
                Ok(())
            }),
        ],
    );

    assert_eq!(result.rolled_back.len(), 1);
    assert_eq!(result.rolled_back[0].aspect, "Broken");
    assert_eq!(result.rolled_back[0].layer, LayerId(0));
    assert!(matches!(result.rolled_back[0].reason, RollbackReason::Error(_)));
    assert_eq!(result.applied, 1);

    let methods: Vec<String> = result
        .model
        .declared_members(&host, DeclarationKind::Method)
        .iter()
        .filter_map(|m| result.model.data(m))
        .map(|d| d.name)
        .collect();
    assert_eq!(methods, vec!["Run", "Trace"]);
}

#[test]
fn test_instance_member_into_static_type_rolls_back() {
    let mut b = BaselineBuilder::new();
    let s = b.add(DeclarationData::class("Helpers").as_static());
    let model = CompilationModel::new(b.build());
    let target = original(s);

    let result = weave(
        &model,
        vec![aspect("Logging", 0, move |f| {
            f.introduce_member(&target, method("Log"), OverrideStrategy::Fail)?;
            Ok(())
        })],
    );

    assert_eq!(result.rolled_back.len(), 1);
    let RollbackReason::Diagnostics(diagnostics) = &result.rolled_back[0].reason else {
        panic!("expected diagnostics, got {:?}", result.rolled_back[0].reason);
    };
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        diagnostics[0].kind,
        DiagnosticKind::CannotIntroduceInstanceMemberIntoStaticType { .. }
    ));
    assert!(matches!(
        single_diagnostic(&result),
        DiagnosticKind::CannotIntroduceInstanceMemberIntoStaticType { .. }
    ));
    assert!(result.model.log().is_empty());
    assert!(result.has_errors());
}

#[test]
fn test_later_layer_sees_introduced_type() {
    let (model, host, _) = host();

    let result = weave(
        &model,
        vec![
            aspect("Types", 0, move |f| {
                f.introduce_type(
                    &host,
                    TemplateMember::new(DeclarationData::class("Nested")),
                    OverrideStrategy::Fail,
                )?;
                Ok(())
            }),
            aspect("Members", 1, |f| {
                let nested = f.model().find_type("Nested").expect("introduced in layer 0");
                f.introduce_member(&nested, method("Describe"), OverrideStrategy::Fail)?;
                Ok(())
            }),
        ],
    );
    assert_clean(&result);

    let log = result.model.log();
    assert_eq!(
        kind_names(log),
        vec!["IntroduceDeclaration", "IntroduceDeclaration", "OverrideMember"]
    );
    assert_strictly_ordered(log);

    let nested = result.model.find_type("Nested").expect("introduced");
    assert!(nested.is_built());
    assert_eq!(
        result
            .model
            .members_named(&nested, Some(DeclarationKind::Method), "Describe")
            .len(),
        1
    );
    assert_eq!(result.model.display_name(&nested), "Host.Nested");
}

#[test]
fn test_weaving_continues_orders_of_previous_log() {
    let (model, host, _) = host();
    let h = host.clone();
    let first = weave(
        &model,
        vec![aspect("First", 0, move |f| {
            f.introduce_member(&h, method("A"), OverrideStrategy::Fail)?;
            Ok(())
        })],
    );
    let second = weave(
        &first.model,
        vec![aspect("Second", 0, move |f| {
            f.introduce_member(&host, method("B"), OverrideStrategy::Fail)?;
            Ok(())
        })],
    );
    assert_clean(&second);

    let log = second.model.log();
    assert_eq!(log.len(), 4);
    assert_strictly_ordered(log);
    // builders of the first weave stay distinct
    let built: Vec<DeclRef> = of_kind(log, "IntroduceDeclaration")
        .into_iter()
        .map(|k| k.target())
        .collect();
    assert_ne!(built[0], built[1]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Initializers
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_instance_initializer_skips_chained_constructors() {
    let mut b = BaselineBuilder::new();
    let c = b.add(DeclarationData::class("Widget"));
    let primary = b.add_in(
        c,
        DeclarationData::constructor().with_parameter("size", TypeRef::int32()),
    );
    let chained = b.add_in(
        c,
        DeclarationData::constructor()
            .delegating_to_this(original(primary), vec![ArgumentValue::Expression("0".into())]),
    );
    let model = CompilationModel::new(b.build());
    let target = original(c);

    let result = weave(
        &model,
        vec![aspect("Init", 0, move |f| {
            f.add_initializer(
                &target,
                InitializerPosition::BeforeInstanceConstructor,
                TemplateRef::new("Register"),
            )?;
            Ok(())
        })],
    );
    assert_clean(&result);

    assert_eq!(
        result.model.inserted_statements(&original(primary)),
        vec![Statement::Template(TemplateRef::new("Register"))]
    );
    assert!(result.model.inserted_statements(&original(chained)).is_empty());
}

#[test]
fn test_instance_initializer_materializes_implicit_constructor() {
    let mut b = BaselineBuilder::new();
    let c = b.add(DeclarationData::class("Widget"));
    let model = CompilationModel::new(b.build());
    let implicit = model.constructors(&original(c)).pop().expect("implicit");
    let target = original(c);

    let result = weave(
        &model,
        vec![aspect("Init", 0, move |f| {
            f.add_initializer(
                &target,
                InitializerPosition::BeforeInstanceConstructor,
                TemplateRef::new("Register"),
            )?;
            Ok(())
        })],
    );
    assert_clean(&result);
    assert_eq!(
        kind_names(result.model.log()),
        vec!["IntroduceDeclaration", "InsertStatements"]
    );
    assert_eq!(result.model.inserted_statements(&implicit).len(), 1);
}

#[test]
fn test_type_initializer_introduces_static_constructor() {
    let (model, host, _) = host();
    let target = host.clone();

    let result = weave(
        &model,
        vec![aspect("Init", 0, move |f| {
            f.add_initializer(
                &target,
                InitializerPosition::BeforeTypeConstructor,
                TemplateRef::new("Warmup"),
            )?;
            Ok(())
        })],
    );
    assert_clean(&result);

    let log = result.model.log();
    let TransformationKind::IntroduceDeclaration { declaration } = &log[0].kind else {
        panic!("expected a static constructor");
    };
    assert_eq!(declaration.data.kind, DeclarationKind::Constructor);
    assert!(declaration.data.is_static());

    let cctor = result.model.static_constructor(&host).expect("introduced");
    assert_eq!(
        result.model.inserted_statements(&cctor),
        vec![Statement::Template(TemplateRef::new("Warmup"))]
    );
}

#[test]
fn test_instance_initializer_on_static_type_is_invalid() {
    let mut b = BaselineBuilder::new();
    let s = b.add(DeclarationData::class("Helpers").as_static());
    let model = CompilationModel::new(b.build());
    let target = original(s);

    let result = weave(
        &model,
        vec![aspect("Init", 0, move |f| {
            f.add_initializer(
                &target,
                InitializerPosition::BeforeInstanceConstructor,
                TemplateRef::new("Register"),
            )?;
            Ok(())
        })],
    );
    assert_eq!(result.rolled_back.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Warnings
// ═══════════════════════════════════════════════════════════════════════════

/// Appends like the default strategy, warning on every decision
struct NoisyStrategy;

impl PullStrategy for NoisyStrategy {
    fn decide(&self, request: &PullRequest<'_>, sink: &mut PullSink<'_>) -> PullAction {
        sink.warning("pulled by a test strategy");
        AppendParameterStrategy::new().decide(request, sink)
    }
}

fn pull_with(config: WeaverConfig) -> weavegraph_ir::WeaveResult {
    let chain = fixture_constructor_chain();
    let a = chain.types[0].clone();
    Weaver::new(config)
        .with_collaborators(Collaborators::default().with_pull_strategy(Arc::new(NoisyStrategy)))
        .weave(
            &chain.model,
            &[aspect("Logging", 0, move |f| {
                f.introduce_pulled_member(
                    &a,
                    TemplateMember::new(DeclarationData::field("_logger", TypeRef::string())),
                    OverrideStrategy::Fail,
                )?;
                Ok(())
            })],
        )
        .expect("weave should not abort")
}

#[test]
fn test_warnings_surface_without_failing() {
    let result = pull_with(WeaverConfig::default());
    assert_eq!(result.applied, 1);
    assert_eq!(result.diagnostics.len(), 3);
    assert!(!result.has_errors());
    assert!(!result.model.log().is_empty());
}

#[test]
fn test_warnings_as_errors_fail_the_advice() {
    let result = pull_with(WeaverConfig::default().with_warnings_as_errors(true));
    assert_eq!(result.applied, 0);
    assert_eq!(result.diagnostics.len(), 3);
    assert!(result.model.log().is_empty());
}

/// Appends everywhere except on one constructor, which it refuses
struct RefusingStrategy {
    refused: DeclRef,
}

impl PullStrategy for RefusingStrategy {
    fn decide(&self, request: &PullRequest<'_>, sink: &mut PullSink<'_>) -> PullAction {
        if *request.constructor == self.refused {
            sink.error("constructor is generated elsewhere");
            return PullAction::DoNotPull;
        }
        AppendParameterStrategy::new().decide(request, sink)
    }
}

#[test]
fn test_strategy_error_fails_only_that_advice() {
    let chain = fixture_constructor_chain();
    let a = chain.types[0].clone();
    let refused = chain.constructors[2].clone();

    let result = Weaver::new(WeaverConfig::default())
        .with_collaborators(
            Collaborators::default().with_pull_strategy(Arc::new(RefusingStrategy { refused })),
        )
        .weave(
            &chain.model,
            &[aspect("Logging", 0, move |f| {
                f.introduce_pulled_member(
                    &a,
                    TemplateMember::new(DeclarationData::field("_logger", TypeRef::string())),
                    OverrideStrategy::Fail,
                )?;
                f.introduce_member(&a, method("Describe"), OverrideStrategy::Fail)?;
                Ok(())
            })],
        )
        .expect("weave should not abort");

    match single_diagnostic(&result) {
        DiagnosticKind::PullStrategyError {
            aspect, message, ..
        } => {
            assert_eq!(aspect, "Logging");
            assert_eq!(message, "constructor is generated elsewhere");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(result.has_errors());
    assert!(result.rolled_back.is_empty());
    assert_eq!(result.applied, 1);

    // only the sibling introduction was folded
    let log = result.model.log();
    assert_eq!(kind_names(log), vec!["IntroduceDeclaration", "OverrideMember"]);
    assert!(of_kind(log, "IntroduceParameter").is_empty());
    for ctor in &chain.constructors {
        assert!(result.model.parameters(ctor).iter().all(|p| p.name != "logger"));
    }
    let described = result
        .model
        .members_named(&chain.types[0], Some(DeclarationKind::Method), "Describe");
    assert_eq!(described.len(), 1);
}
