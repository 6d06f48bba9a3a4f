//! Attribute introduction and removal

mod common;

use common::*;
use pretty_assertions::assert_eq;
use weavegraph_ir::features::compilation::{BaselineBuilder, CompilationModel};
use weavegraph_ir::features::declarations::{AttributeData, DeclarationData, DeclarationKind};
use weavegraph_ir::features::references::DeclRef;
use weavegraph_ir::features::templates::TemplateMember;
use weavegraph_ir::shared::models::{DiagnosticKind, TypeRef};
use weavegraph_ir::{OverrideStrategy, WeaveResult};

/// `class Service { [Obsolete("old")] public void Run(); }`
struct Fixture {
    model: CompilationModel,
    service: DeclRef,
    run: DeclRef,
    obsolete: TypeRef,
    trace: TypeRef,
}

fn fixture() -> Fixture {
    let mut b = BaselineBuilder::new();
    let obsolete = TypeRef::named(b.add(DeclarationData::class("ObsoleteAttribute")));
    let trace = TypeRef::named(b.add(DeclarationData::class("TraceAttribute")));
    let service = b.add(DeclarationData::class("Service"));
    let run = b.add_in(service, DeclarationData::method("Run", TypeRef::void()).public());
    b.add_in(
        run,
        DeclarationData::attribute(AttributeData::new(obsolete.clone()).with_argument("\"old\"")),
    );
    Fixture {
        model: CompilationModel::new(b.build()),
        service: original(service),
        run: original(run),
        obsolete,
        trace,
    }
}

fn add(fx: &Fixture, attribute: AttributeData, strategy: OverrideStrategy) -> WeaveResult {
    let run = fx.run.clone();
    weave(
        &fx.model,
        vec![aspect("Tagging", 0, move |f| {
            f.add_attribute(&run, attribute.clone(), strategy)?;
            Ok(())
        })],
    )
}

fn attribute_arguments(result: &WeaveResult, target: &DeclRef, ty: &TypeRef) -> Vec<Vec<String>> {
    result
        .model
        .attributes(target)
        .into_iter()
        .filter(|a| a.attribute_type == *ty)
        .map(|a| a.arguments)
        .collect()
}

fn obsolete(fx: &Fixture, reason: &str) -> AttributeData {
    AttributeData::new(fx.obsolete.clone()).with_argument(format!("\"{}\"", reason))
}

#[test]
fn test_fail_on_present_attribute() {
    let fx = fixture();
    let result = add(&fx, obsolete(&fx, "new"), OverrideStrategy::Fail);

    match single_diagnostic(&result) {
        DiagnosticKind::AttributeAlreadyPresent {
            aspect,
            attribute_type,
            ..
        } => {
            assert_eq!(aspect, "Tagging");
            assert_eq!(attribute_type, "ObsoleteAttribute");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(result.model.log().is_empty());
    assert_eq!(
        attribute_arguments(&result, &fx.run, &fx.obsolete),
        vec![vec!["\"old\"".to_string()]]
    );
}

#[test]
fn test_absent_attribute_is_added_under_fail() {
    let fx = fixture();
    let result = add(&fx, AttributeData::new(fx.trace.clone()), OverrideStrategy::Fail);
    assert_clean(&result);

    assert_eq!(kind_names(result.model.log()), vec!["IntroduceDeclaration"]);
    let types: Vec<TypeRef> = result
        .model
        .attributes(&fx.run)
        .into_iter()
        .map(|a| a.attribute_type)
        .collect();
    assert_eq!(types, vec![fx.obsolete.clone(), fx.trace.clone()]);
}

#[test]
fn test_ignore_keeps_existing_attribute() {
    let fx = fixture();
    let result = add(&fx, obsolete(&fx, "new"), OverrideStrategy::Ignore);
    assert_clean(&result);

    assert!(result.model.log().is_empty());
    assert_eq!(
        attribute_arguments(&result, &fx.run, &fx.obsolete),
        vec![vec!["\"old\"".to_string()]]
    );
}

#[test]
fn test_new_adds_alongside_existing() {
    let fx = fixture();
    let result = add(&fx, obsolete(&fx, "new"), OverrideStrategy::New);
    assert_clean(&result);

    assert_eq!(kind_names(result.model.log()), vec!["IntroduceDeclaration"]);
    assert_eq!(
        attribute_arguments(&result, &fx.run, &fx.obsolete),
        vec![vec!["\"old\"".to_string()], vec!["\"new\"".to_string()]]
    );
}

#[test]
fn test_override_removes_then_adds() {
    let fx = fixture();
    let result = add(&fx, obsolete(&fx, "new"), OverrideStrategy::Override);
    assert_clean(&result);

    let log = result.model.log();
    assert_eq!(kind_names(log), vec!["RemoveAttributes", "IntroduceDeclaration"]);
    assert_strictly_ordered(log);
    assert_eq!(
        attribute_arguments(&result, &fx.run, &fx.obsolete),
        vec![vec!["\"new\"".to_string()]]
    );
    assert_eq!(
        result
            .model
            .declared_members(&fx.run, DeclarationKind::Attribute)
            .len(),
        1
    );
}

#[test]
fn test_remove_attributes() {
    let fx = fixture();
    let (run, ty) = (fx.run.clone(), fx.obsolete.clone());
    let result = weave(
        &fx.model,
        vec![aspect("Cleanup", 0, move |f| {
            f.remove_attributes(&run, ty.clone())?;
            Ok(())
        })],
    );
    assert_clean(&result);

    assert_eq!(kind_names(result.model.log()), vec!["RemoveAttributes"]);
    assert!(result.model.attributes(&fx.run).is_empty());
    assert!(!result.model.has_attribute(&fx.run, &fx.obsolete));
}

#[test]
fn test_remove_of_absent_attribute_is_noop() {
    let fx = fixture();
    let (run, ty) = (fx.run.clone(), fx.trace.clone());
    let result = weave(
        &fx.model,
        vec![aspect("Cleanup", 0, move |f| {
            f.remove_attributes(&run, ty.clone())?;
            Ok(())
        })],
    );
    assert_clean(&result);
    assert!(result.model.log().is_empty());
    assert_eq!(result.model.attributes(&fx.run).len(), 1);
}

#[test]
fn test_forwarded_attributes_on_built_member() {
    let fx = fixture();
    let (service, forwarded) = (fx.service.clone(), AttributeData::new(fx.trace.clone()));
    let (retag_service, strip_service) = (fx.service.clone(), fx.service.clone());
    let trace = fx.trace.clone();
    let replaced = AttributeData::new(fx.trace.clone()).with_argument("\"verbose\"");

    let result = weave(
        &fx.model,
        vec![
            aspect("Logging", 0, move |f| {
                f.introduce_member(
                    &service,
                    TemplateMember::new(DeclarationData::method("Log", TypeRef::void()).public())
                        .with_attribute(forwarded.clone()),
                    OverrideStrategy::Fail,
                )?;
                Ok(())
            }),
            aspect("Retag", 1, move |f| {
                let log = f
                    .model()
                    .members_named(&retag_service, Some(DeclarationKind::Method), "Log")
                    .pop()
                    .expect("introduced in layer 0");
                f.add_attribute(&log, replaced.clone(), OverrideStrategy::Override)?;
                Ok(())
            }),
            aspect("Strip", 2, move |f| {
                let log = f
                    .model()
                    .members_named(&strip_service, Some(DeclarationKind::Method), "Log")
                    .pop()
                    .expect("introduced in layer 0");
                f.remove_attributes(&log, trace.clone())?;
                Ok(())
            }),
        ],
    );
    assert_clean(&result);

    let log = result
        .model
        .members_named(&fx.service, Some(DeclarationKind::Method), "Log")
        .pop()
        .expect("introduced");
    assert!(log.is_built());
    assert_eq!(
        kind_names(result.model.log()),
        vec![
            "IntroduceDeclaration",
            "OverrideMember",
            "RemoveAttributes",
            "IntroduceDeclaration",
            "RemoveAttributes",
        ]
    );
    assert!(result.model.attributes(&log).is_empty());
}
