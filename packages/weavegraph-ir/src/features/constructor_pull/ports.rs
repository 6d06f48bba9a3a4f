use crate::features::compilation::CodeModel;
use crate::features::references::DeclRef;
use crate::shared::models::{Diagnostic, DiagnosticBag, DiagnosticKind, TypeRef};

/// Parameter appended to a constructor the requesting one delegates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedParameter {
    pub constructor: DeclRef,
    pub index: u16,
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<String>,
}

/// One question to the strategy: how does `constructor` supply the value?
pub struct PullRequest<'a> {
    pub model: &'a CodeModel,
    pub constructor: &'a DeclRef,
    /// Pulled field or property
    pub member: &'a DeclRef,
    pub member_name: &'a str,
    pub member_type: &'a TypeRef,
    /// `None` for constructors of the member's own type that assign it;
    /// `Some` for constructors forwarding to a modified constructor
    pub forwarded: Option<&'a ForwardedParameter>,
    /// Delegation distance from the first modified constructor
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullAction {
    /// Leave the constructor alone; forwarders pass `default`
    DoNotPull,
    /// Use a parameter the constructor already declares
    UseExistingParameter { index: u16 },
    /// Append a trailing parameter and pull it further down the chain
    AppendParameterAndPull {
        name: String,
        ty: TypeRef,
        default_value: Option<String>,
    },
}

/// Where a strategy reports problems
///
/// Errors fail the advice; warnings are surfaced only.
pub struct PullSink<'a> {
    diagnostics: &'a mut DiagnosticBag,
    aspect: &'a str,
    constructor: String,
}

impl<'a> PullSink<'a> {
    pub fn new(diagnostics: &'a mut DiagnosticBag, aspect: &'a str, constructor: String) -> Self {
        Self {
            diagnostics,
            aspect,
            constructor,
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.report(Diagnostic::new(DiagnosticKind::PullStrategyError {
            aspect: self.aspect.to_string(),
            constructor: self.constructor.clone(),
            message: message.into(),
        }));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.diagnostics.report(Diagnostic::new(DiagnosticKind::PullStrategyWarning {
            aspect: self.aspect.to_string(),
            constructor: self.constructor.clone(),
            message: message.into(),
        }));
    }
}

pub trait PullStrategy: Send + Sync {
    fn decide(&self, request: &PullRequest<'_>, sink: &mut PullSink<'_>) -> PullAction;
}
