//! Contract composition through the weaver

mod common;

use common::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use weavegraph_ir::features::advice::Collaborators;
use weavegraph_ir::features::compilation::{Accessor, BaselineBuilder, CompilationModel, Statement};
use weavegraph_ir::features::contracts::{ContractDirection, ContractTarget};
use weavegraph_ir::features::declarations::{DeclarationData, DeclarationKind};
use weavegraph_ir::features::references::DeclRef;
use weavegraph_ir::features::templates::{TemplateRef, TextTemplateExpander};
use weavegraph_ir::pipeline::{AspectApplication, RollbackReason, WeaveResult, Weaver};
use weavegraph_ir::shared::models::{DiagnosticKind, TypeRef};
use weavegraph_ir::WeaverConfig;

/// `class Repo { string Get(string key); string Lookup(string returnValue); int _count; }`
struct Repo {
    model: CompilationModel,
    get: DeclRef,
    lookup: DeclRef,
    count: DeclRef,
}

fn repo() -> Repo {
    let mut b = BaselineBuilder::new();
    let repo = b.add(DeclarationData::class("Repo"));
    let get = b.add_in(
        repo,
        DeclarationData::method("Get", TypeRef::string())
            .public()
            .with_parameter("key", TypeRef::string()),
    );
    let lookup = b.add_in(
        repo,
        DeclarationData::method("Lookup", TypeRef::string())
            .public()
            .with_parameter("returnValue", TypeRef::string()),
    );
    let count = b.add_in(repo, DeclarationData::field("_count", TypeRef::int32()));
    Repo {
        model: CompilationModel::new(b.build()),
        get: original(get),
        lookup: original(lookup),
        count: original(count),
    }
}

fn weave_contracts(
    config: WeaverConfig,
    model: &CompilationModel,
    applications: Vec<AspectApplication>,
) -> WeaveResult {
    let expander = TextTemplateExpander::new()
        .with("NotNull", "if ({value} == null) throw;")
        .with("NotEmpty", "if ({value}.Length == 0) throw;")
        .with("Positive", "if ({value} <= 0) throw;");
    Weaver::new(config)
        .with_collaborators(Collaborators::default().with_expander(Arc::new(expander)))
        .weave(model, &applications)
        .expect("weave should not abort")
}

fn contract(
    name: &str,
    layer: u32,
    member: &DeclRef,
    target: ContractTarget,
    direction: ContractDirection,
    template: &str,
) -> AspectApplication {
    let member = member.clone();
    let template = template.to_string();
    aspect(name, layer, move |f| {
        f.add_contract(&member, target, direction, TemplateRef::new(template.clone()))?;
        Ok(())
    })
}

fn snippet(text: &str) -> Statement {
    Statement::Snippet(text.to_string())
}

#[test]
fn test_input_only_has_no_temporary() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &repo.get,
            ContractTarget::Parameter(0),
            ContractDirection::Input,
            "NotNull",
        )],
    );
    assert_clean(&result);

    assert_eq!(
        result.model.contract_body(&repo.get),
        Some(vec![
            snippet("if (key == null) throw;"),
            Statement::InvokeOriginal { tail_return: true },
        ])
    );
}

#[test]
fn test_output_captures_into_temporary() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &repo.get,
            ContractTarget::ReturnValue,
            ContractDirection::Output,
            "NotNull",
        )],
    );
    assert_clean(&result);

    assert_eq!(
        result.model.contract_body(&repo.get),
        Some(vec![
            Statement::CaptureOriginal {
                temporary: "returnValue".to_string(),
                ty: TypeRef::string(),
            },
            snippet("if (returnValue == null) throw;"),
            Statement::ReturnTemporary("returnValue".to_string()),
        ])
    );
}

#[test]
fn test_temporary_avoids_parameter_names() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default().with_return_value_name("returnValue"),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &repo.lookup,
            ContractTarget::ReturnValue,
            ContractDirection::Output,
            "NotNull",
        )],
    );
    assert_clean(&result);

    let body = result.model.contract_body(&repo.lookup).expect("composed");
    assert_eq!(body[1], snippet("if (returnValue1 == null) throw;"));
}

#[test]
fn test_deferred_contracts_compose_once_per_layer() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![
            contract(
                "NotNull",
                0,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "NotNull",
            ),
            contract(
                "NotEmpty",
                0,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "NotEmpty",
            ),
        ],
    );
    assert_clean(&result);

    let log = result.model.log();
    assert_eq!(kind_names(log), vec!["ApplyContracts"]);
    // attributed to the latest contract's advice
    assert_eq!(log[0].advice.0, 1);
    assert_eq!(
        result.model.contract_body(&repo.get),
        Some(vec![
            snippet("if (key == null) throw;"),
            snippet("if (key.Length == 0) throw;"),
            Statement::InvokeOriginal { tail_return: true },
        ])
    );
}

#[test]
fn test_immediate_contracts_latest_body_is_complete() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default().with_deferred_contracts(false),
        &repo.model,
        vec![
            contract(
                "NotNull",
                0,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "NotNull",
            ),
            contract(
                "NotEmpty",
                0,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "NotEmpty",
            ),
        ],
    );
    assert_clean(&result);

    let log = result.model.log();
    assert_eq!(kind_names(log), vec!["ApplyContracts", "ApplyContracts"]);
    assert_strictly_ordered(log);
    let latest = result.model.contract_body(&repo.get).expect("composed");
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0], snippet("if (key == null) throw;"));
    assert_eq!(latest[1], snippet("if (key.Length == 0) throw;"));
}

#[test]
fn test_failed_composition_keeps_committed_contracts() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![
            contract(
                "NotNull",
                0,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "NotNull",
            ),
            contract(
                "Broken",
                1,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "Unregistered",
            ),
            contract(
                "NotEmpty",
                2,
                &repo.get,
                ContractTarget::Parameter(0),
                ContractDirection::Input,
                "NotEmpty",
            ),
        ],
    );

    match single_diagnostic(&result) {
        DiagnosticKind::ContractBindingFailed { aspect, template, .. } => {
            assert_eq!(aspect, "Broken");
            assert_eq!(template, "Unregistered");
        }
        other => panic!("unexpected {:?}", other),
    }
    // layer 0 and layer 2 composed; layer 1 left nothing
    assert_eq!(kind_names(result.model.log()), vec!["ApplyContracts", "ApplyContracts"]);
    assert_eq!(
        result.model.contract_body(&repo.get),
        Some(vec![
            snippet("if (key == null) throw;"),
            snippet("if (key.Length == 0) throw;"),
            Statement::InvokeOriginal { tail_return: true },
        ])
    );
}

#[test]
fn test_field_contract_promotes_to_property() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &repo.count,
            ContractTarget::Member,
            ContractDirection::Input,
            "Positive",
        )],
    );
    assert_clean(&result);

    assert_eq!(
        kind_names(result.model.log()),
        vec!["IntroduceDeclaration", "ApplyContracts"]
    );
    let data = result.model.data(&repo.count).expect("field still resolves");
    assert_eq!(data.kind, DeclarationKind::Property);
    assert_eq!(data.name, "_count");
    // input checks guard the setter only
    assert_eq!(
        result.model.accessor_contract_body(&repo.count, Accessor::Set),
        Some(vec![
            snippet("if (value <= 0) throw;"),
            Statement::InvokeOriginal { tail_return: false },
        ])
    );
    assert_eq!(result.model.accessor_contract_body(&repo.count, Accessor::Get), None);
    assert_eq!(result.model.contract_body(&repo.count), None);
}

#[test]
fn test_property_contracts_compose_per_accessor() {
    let mut b = BaselineBuilder::new();
    let person = b.add(DeclarationData::class("Person"));
    let name = original(b.add_in(person, DeclarationData::property("Name", TypeRef::string()).public()));
    let model = CompilationModel::new(b.build());

    let result = weave_contracts(
        WeaverConfig::default().with_deferred_contracts(false),
        &model,
        vec![
            contract(
                "Validate",
                0,
                &name,
                ContractTarget::Member,
                ContractDirection::Input,
                "NotNull",
            ),
            contract(
                "Audit",
                0,
                &name,
                ContractTarget::Member,
                ContractDirection::Output,
                "NotEmpty",
            ),
        ],
    );
    assert_clean(&result);

    // first the setter alone, then both accessors again
    assert_eq!(
        kind_names(result.model.log()),
        vec!["ApplyContracts", "ApplyContracts", "ApplyContracts"]
    );
    assert_eq!(
        result.model.accessor_contract_body(&name, Accessor::Set),
        Some(vec![
            snippet("if (value == null) throw;"),
            Statement::InvokeOriginal { tail_return: false },
        ])
    );
    assert_eq!(
        result.model.accessor_contract_body(&name, Accessor::Get),
        Some(vec![
            Statement::CaptureOriginal {
                temporary: "returnValue".to_string(),
                ty: TypeRef::string(),
            },
            snippet("if (returnValue.Length == 0) throw;"),
            Statement::ReturnTemporary("returnValue".to_string()),
        ])
    );
}

#[test]
fn test_input_contract_on_return_value_rolls_back() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &repo.get,
            ContractTarget::ReturnValue,
            ContractDirection::Input,
            "NotNull",
        )],
    );
    assert_eq!(result.rolled_back.len(), 1);
    assert!(result.model.log().is_empty());
}

#[test]
fn test_parameter_ref_targets_its_member() {
    let repo = repo();
    let key = DeclRef::parameter(repo.get.clone(), 0);
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &key,
            ContractTarget::Member,
            ContractDirection::Input,
            "NotNull",
        )],
    );
    assert_clean(&result);
    assert!(result.model.contract_body(&repo.get).is_some());
}

#[test]
fn test_contract_on_missing_parameter_rolls_back() {
    let repo = repo();
    let result = weave_contracts(
        WeaverConfig::default(),
        &repo.model,
        vec![contract(
            "Validate",
            0,
            &repo.get,
            ContractTarget::Parameter(3),
            ContractDirection::Input,
            "NotNull",
        )],
    );

    assert_eq!(result.rolled_back.len(), 1);
    match &result.rolled_back[0].reason {
        RollbackReason::Error(message) => assert!(message.contains("no parameter at position 3")),
        other => panic!("unexpected {:?}", other),
    }
}
