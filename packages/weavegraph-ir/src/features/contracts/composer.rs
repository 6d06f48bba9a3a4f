//! Contract composition
//!
//! Layout of a composed method body:
//! 1. input checks, in registration order
//! 2. with output checks: `var t = <original>;`, output checks, `return t;`
//! 3. without: `return <original>;` and no temporary
//!
//! A void member has no result to capture; its output checks (on `ref`/`out`
//! parameters) follow a plain call.
//!
//! Fields and properties split by accessor: input checks guard the setter
//! (`value`, then `<original>;`), output checks wrap the getter (capture,
//! checks, return).

use super::domain::{Contract, ContractAdvice, ContractTarget, ExecutionDirection};
use crate::errors::{Result, WeaveError};
use crate::features::compilation::{Accessor, CodeModel, Statement};
use crate::features::declarations::{DeclarationKind, ParameterData};
use crate::features::references::DeclRef;
use crate::features::templates::{BindingShape, ExpansionContext, TemplateExpander};
use crate::shared::models::{Diagnostic, DiagnosticBag, DiagnosticKind, RefKind, TypeRef};
use tracing::debug;

/// `base`, or `base1`, `base2`, ... when a parameter already uses the name
pub fn unique_temporary(base: &str, parameters: &[ParameterData]) -> String {
    let taken = |name: &str| parameters.iter().any(|p| p.name == name);
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|name| !taken(name))
        .unwrap_or_else(|| base.to_string())
}

/// Shape checks done when the contract is added
///
/// Direction and target must agree: nothing flows into a return value, out of
/// a by-value parameter, or into an `out` parameter.
pub fn validate_contract(model: &CodeModel, member: &DeclRef, contract: &Contract) -> Result<()> {
    let decl = model.resolve(member)?;
    let display = || model.display_name(member);
    let kind = decl.kind();
    let writes_input = contract.direction.includes(ExecutionDirection::Input);
    let reads_output = contract.direction.includes(ExecutionDirection::Output);

    match contract.target {
        ContractTarget::Parameter(index) => {
            if !kind.has_signature() {
                return Err(WeaveError::invalid_contract(
                    display(),
                    format!("a {} has no parameters", kind),
                ));
            }
            let parameters = model.parameters(member);
            let Some(parameter) = parameters.get(index as usize) else {
                return Err(WeaveError::invalid_contract(
                    display(),
                    format!("no parameter at position {}", index),
                ));
            };
            if reads_output && !parameter.ref_kind.is_by_ref_writable() {
                return Err(WeaveError::invalid_contract(
                    display(),
                    format!(
                        "output contract on by-value parameter '{}'",
                        parameter.name
                    ),
                ));
            }
            if writes_input && parameter.ref_kind == RefKind::Out {
                return Err(WeaveError::invalid_contract(
                    display(),
                    format!("input contract on out parameter '{}'", parameter.name),
                ));
            }
        }
        ContractTarget::ReturnValue => {
            if !matches!(kind, DeclarationKind::Method | DeclarationKind::Indexer) {
                return Err(WeaveError::invalid_contract(
                    display(),
                    format!("a {} has no return value", kind),
                ));
            }
            if writes_input {
                return Err(WeaveError::invalid_contract(
                    display(),
                    "input contract on a return value",
                ));
            }
        }
        ContractTarget::Member => {
            if !matches!(kind, DeclarationKind::Field | DeclarationKind::Property) {
                return Err(WeaveError::invalid_contract(
                    display(),
                    format!("member contracts apply to fields and properties, not a {}", kind),
                ));
            }
        }
    }
    Ok(())
}

/// One composed body, with the accessor it replaces for fields and properties
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedBody {
    pub accessor: Option<Accessor>,
    pub statements: Vec<Statement>,
}

pub struct ContractComposer<'a> {
    expander: &'a dyn TemplateExpander,
    return_value_name: &'a str,
}

impl<'a> ContractComposer<'a> {
    pub fn new(expander: &'a dyn TemplateExpander, return_value_name: &'a str) -> Self {
        Self {
            expander,
            return_value_name,
        }
    }

    /// Compose every contract of `advice`
    ///
    /// Methods, indexers and constructors get one body; fields and properties
    /// one per accessor with checks. Binding failures are reported to
    /// `diagnostics` and yield `None`: the member gets no partial body.
    pub fn compose(
        &self,
        model: &CodeModel,
        advice: &ContractAdvice,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<Option<Vec<ComposedBody>>> {
        let decl = model.resolve(&advice.member)?;
        let by_accessor = matches!(decl.kind(), DeclarationKind::Field | DeclarationKind::Property);
        let result_type = decl.member_type().cloned().unwrap_or_else(TypeRef::void);
        let has_result = !result_type.is_void();
        let parameters = model.parameters(&advice.member);
        let temporary = unique_temporary(self.return_value_name, &parameters);

        let mut failures = Vec::new();
        let mut input = Vec::new();
        let mut output = Vec::new();

        for (direction, out) in [
            (ExecutionDirection::Input, &mut input),
            (ExecutionDirection::Output, &mut output),
        ] {
            for contract in advice.in_direction(direction) {
                let binding = match contract.target {
                    ContractTarget::Parameter(index) => parameters
                        .get(index as usize)
                        .map(|p| (p.name.clone(), p.ty.clone())),
                    ContractTarget::ReturnValue => match direction {
                        ExecutionDirection::Output if has_result => {
                            Some((temporary.clone(), result_type.clone()))
                        }
                        _ => continue,
                    },
                    ContractTarget::Member => match direction {
                        ExecutionDirection::Input => Some(("value".to_string(), result_type.clone())),
                        ExecutionDirection::Output if has_result => {
                            Some((temporary.clone(), result_type.clone()))
                        }
                        ExecutionDirection::Output => continue,
                    },
                };

                let Some((value_name, value_type)) = binding else {
                    failures.push(self.failure(model, advice, contract, "target parameter does not exist"));
                    continue;
                };

                let shape = BindingShape {
                    value_name,
                    value_type,
                    is_output: direction == ExecutionDirection::Output,
                };
                let expanded = self
                    .expander
                    .try_bind(&contract.template, &shape)
                    .and_then(|bound| {
                        self.expander.expand(
                            &bound,
                            &ExpansionContext {
                                model,
                                target: &advice.member,
                                tags: &contract.tags,
                            },
                        )
                    });
                match expanded {
                    Ok(text) => out.push(Statement::Snippet(text)),
                    Err(e) => failures.push(self.failure(model, advice, contract, &e.to_string())),
                }
            }
        }

        if !failures.is_empty() {
            debug!(
                member = %advice.member,
                failures = failures.len(),
                "contract composition failed"
            );
            diagnostics.extend(failures);
            return Ok(None);
        }

        let bodies = if by_accessor {
            let mut bodies = Vec::with_capacity(2);
            if !input.is_empty() {
                let mut setter = input;
                setter.push(Statement::InvokeOriginal { tail_return: false });
                bodies.push(ComposedBody {
                    accessor: Some(Accessor::Set),
                    statements: setter,
                });
            }
            if !output.is_empty() {
                bodies.push(ComposedBody {
                    accessor: Some(Accessor::Get),
                    statements: capture_and_return(output, temporary, result_type),
                });
            }
            bodies
        } else {
            let mut body = input;
            if output.is_empty() {
                body.push(Statement::InvokeOriginal {
                    tail_return: has_result,
                });
            } else if has_result {
                body.extend(capture_and_return(output, temporary, result_type));
            } else {
                body.push(Statement::InvokeOriginal { tail_return: false });
                body.extend(output);
            }
            vec![ComposedBody {
                accessor: None,
                statements: body,
            }]
        };

        debug!(
            member = %advice.member,
            contracts = advice.len(),
            bodies = bodies.len(),
            "composed contracts"
        );
        Ok(Some(bodies))
    }

    fn failure(
        &self,
        model: &CodeModel,
        advice: &ContractAdvice,
        contract: &Contract,
        reason: &str,
    ) -> Diagnostic {
        Diagnostic::at(
            DiagnosticKind::ContractBindingFailed {
                aspect: contract.aspect.clone(),
                template: contract.template.name.clone(),
                target: model.display_name(&advice.member),
                reason: reason.to_string(),
            },
            advice.member.clone(),
        )
    }
}

/// `var t = <original>;`, the checks, `return t;`
fn capture_and_return(checks: Vec<Statement>, temporary: String, ty: TypeRef) -> Vec<Statement> {
    let mut body = Vec::with_capacity(checks.len() + 2);
    body.push(Statement::CaptureOriginal {
        temporary: temporary.clone(),
        ty,
    });
    body.extend(checks);
    body.push(Statement::ReturnTemporary(temporary));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::compilation::BaselineBuilder;
    use crate::features::contracts::ContractDirection;
    use crate::features::declarations::DeclarationData;
    use crate::features::templates::{TemplateRef, TextTemplateExpander};
    use crate::shared::models::{AdviceId, DeclId, Tags};
    use pretty_assertions::assert_eq;

    fn contract(direction: ContractDirection, target: ContractTarget, template: &str) -> Contract {
        Contract {
            advice: AdviceId(0),
            aspect: "Validate".to_string(),
            direction,
            target,
            template: TemplateRef::new(template),
            tags: Tags::new(),
        }
    }

    fn model_with(method: DeclarationData) -> (CodeModel, DeclRef) {
        let mut b = BaselineBuilder::new();
        let c = b.add(DeclarationData::class("C"));
        let m = b.add_in(c, method);
        (CodeModel::new(b.build()), DeclRef::Original(m))
    }

    fn expander() -> TextTemplateExpander {
        TextTemplateExpander::new()
            .with("NotNull", "if ({value} == null) throw;")
            .with("Positive", "if ({value} <= 0) throw;")
    }

    #[test]
    fn test_unique_temporary_avoids_parameters() {
        let params = vec![
            ParameterData::new("returnValue", TypeRef::int32()),
            ParameterData::new("returnValue1", TypeRef::int32()),
        ];
        assert_eq!(unique_temporary("returnValue", &params), "returnValue2");
        assert_eq!(unique_temporary("result", &params), "result");
    }

    #[test]
    fn test_input_only_is_tail_call() {
        let (model, m) = model_with(
            DeclarationData::method("Get", TypeRef::string()).with_parameter("key", TypeRef::string()),
        );
        let mut advice = ContractAdvice::new(m);
        advice.add(contract(ContractDirection::Input, ContractTarget::Parameter(0), "NotNull"));

        let expander = expander();
        let composer = ContractComposer::new(&expander, "returnValue");
        let mut diagnostics = DiagnosticBag::new();
        let bodies = composer.compose(&model, &advice, &mut diagnostics).unwrap().unwrap();

        assert_eq!(
            bodies,
            vec![ComposedBody {
                accessor: None,
                statements: vec![
                    Statement::Snippet("if (key == null) throw;".to_string()),
                    Statement::InvokeOriginal { tail_return: true },
                ],
            }]
        );
    }

    #[test]
    fn test_property_checks_split_by_accessor() {
        let (model, name) = model_with(DeclarationData::property("Name", TypeRef::string()).public());
        let mut advice = ContractAdvice::new(name);
        advice.add(contract(ContractDirection::Both, ContractTarget::Member, "NotNull"));

        let expander = expander();
        let composer = ContractComposer::new(&expander, "returnValue");
        let mut diagnostics = DiagnosticBag::new();
        let bodies = composer.compose(&model, &advice, &mut diagnostics).unwrap().unwrap();

        assert_eq!(
            bodies,
            vec![
                ComposedBody {
                    accessor: Some(Accessor::Set),
                    statements: vec![
                        Statement::Snippet("if (value == null) throw;".to_string()),
                        Statement::InvokeOriginal { tail_return: false },
                    ],
                },
                ComposedBody {
                    accessor: Some(Accessor::Get),
                    statements: vec![
                        Statement::CaptureOriginal {
                            temporary: "returnValue".to_string(),
                            ty: TypeRef::string(),
                        },
                        Statement::Snippet("if (returnValue == null) throw;".to_string()),
                        Statement::ReturnTemporary("returnValue".to_string()),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_binding_failure_is_atomic() {
        let (model, m) = model_with(
            DeclarationData::method("Get", TypeRef::string()).with_parameter("key", TypeRef::string()),
        );
        let mut advice = ContractAdvice::new(m);
        advice.add(contract(ContractDirection::Input, ContractTarget::Parameter(0), "NotNull"));
        advice.add(contract(ContractDirection::Output, ContractTarget::ReturnValue, "Missing"));

        let expander = expander();
        let composer = ContractComposer::new(&expander, "returnValue");
        let mut diagnostics = DiagnosticBag::new();
        let body = composer.compose(&model, &advice, &mut diagnostics).unwrap();

        assert!(body.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.as_slice()[0].code(), "WEAVE0401");
    }

    #[test]
    fn test_validate_rejects_input_on_return_value() {
        let (model, m) = model_with(DeclarationData::method("Get", TypeRef::string()));
        let c = contract(ContractDirection::Both, ContractTarget::ReturnValue, "NotNull");
        let err = validate_contract(&model, &m, &c).unwrap_err();
        assert!(matches!(err, WeaveError::InvalidContract { .. }));
    }

    #[test]
    fn test_validate_rejects_output_on_by_value_parameter() {
        let (model, m) = model_with(
            DeclarationData::method("Set", TypeRef::void()).with_parameter("x", TypeRef::int32()),
        );
        let c = contract(ContractDirection::Output, ContractTarget::Parameter(0), "Positive");
        assert!(validate_contract(&model, &m, &c).is_err());

        let dangling = DeclRef::Original(DeclId(99));
        assert!(matches!(
            validate_contract(&model, &dangling, &c),
            Err(WeaveError::DanglingReference(_))
        ));
    }
}
