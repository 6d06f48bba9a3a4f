//! Diagnostic taxonomy
//!
//! Every policy conflict the engine can report is one variant of
//! [`DiagnosticKind`] with a typed argument tuple. Severity is fixed per kind;
//! callers never choose it.
//!
//! Message arguments are pre-rendered display names (aspect short name,
//! member, target type, declaring type) so the message is reproducible from the
//! diagnostic alone, without access to the model that produced it.

use crate::features::references::DeclRef;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Diagnostic kind with its typed arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum DiagnosticKind {
    MemberAlreadyExists {
        aspect: String,
        member: String,
        target_type: String,
        declaring_type: String,
    },
    CannotIntroduceWithDifferentStaticity {
        aspect: String,
        member: String,
        target_type: String,
        declaring_type: String,
    },
    CannotIntroduceOverrideOfSealed {
        aspect: String,
        member: String,
        target_type: String,
        declaring_type: String,
    },
    CannotIntroduceDifferentExistingReturnType {
        aspect: String,
        member: String,
        target_type: String,
        declaring_type: String,
        existing_type: String,
        introduced_type: String,
    },
    CannotIntroduceInstanceMemberIntoStaticType {
        aspect: String,
        member: String,
        target_type: String,
    },
    InterfaceIsAlreadyImplemented {
        aspect: String,
        interface: String,
        target_type: String,
    },
    MissingDeclarativeInterfaceMember {
        aspect: String,
        interface_member: String,
        interface: String,
        target_type: String,
    },
    DeclarativeInterfaceMemberDoesNotMatch {
        aspect: String,
        aspect_member: String,
        interface_member: String,
        target_type: String,
    },
    AttributeAlreadyPresent {
        aspect: String,
        attribute_type: String,
        target: String,
    },
    ContractBindingFailed {
        aspect: String,
        template: String,
        target: String,
        reason: String,
    },
    PulledParameterNameConflict {
        aspect: String,
        parameter: String,
        constructor: String,
    },
    PullDepthExceeded {
        aspect: String,
        member: String,
        max_depth: usize,
    },
    PullStrategyError {
        aspect: String,
        constructor: String,
        message: String,
    },
    PullStrategyWarning {
        aspect: String,
        constructor: String,
        message: String,
    },
}

impl DiagnosticKind {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::MemberAlreadyExists { .. } => "WEAVE0101",
            DiagnosticKind::CannotIntroduceWithDifferentStaticity { .. } => "WEAVE0102",
            DiagnosticKind::CannotIntroduceOverrideOfSealed { .. } => "WEAVE0103",
            DiagnosticKind::CannotIntroduceDifferentExistingReturnType { .. } => "WEAVE0104",
            DiagnosticKind::CannotIntroduceInstanceMemberIntoStaticType { .. } => "WEAVE0105",
            DiagnosticKind::InterfaceIsAlreadyImplemented { .. } => "WEAVE0201",
            DiagnosticKind::MissingDeclarativeInterfaceMember { .. } => "WEAVE0202",
            DiagnosticKind::DeclarativeInterfaceMemberDoesNotMatch { .. } => "WEAVE0203",
            DiagnosticKind::AttributeAlreadyPresent { .. } => "WEAVE0301",
            DiagnosticKind::ContractBindingFailed { .. } => "WEAVE0401",
            DiagnosticKind::PulledParameterNameConflict { .. } => "WEAVE0501",
            DiagnosticKind::PullDepthExceeded { .. } => "WEAVE0502",
            DiagnosticKind::PullStrategyError { .. } => "WEAVE0503",
            DiagnosticKind::PullStrategyWarning { .. } => "WEAVE0504",
        }
    }

    /// Variant name, useful for assertions and logs
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::MemberAlreadyExists { .. } => "MemberAlreadyExists",
            DiagnosticKind::CannotIntroduceWithDifferentStaticity { .. } => {
                "CannotIntroduceWithDifferentStaticity"
            }
            DiagnosticKind::CannotIntroduceOverrideOfSealed { .. } => {
                "CannotIntroduceOverrideOfSealed"
            }
            DiagnosticKind::CannotIntroduceDifferentExistingReturnType { .. } => {
                "CannotIntroduceDifferentExistingReturnType"
            }
            DiagnosticKind::CannotIntroduceInstanceMemberIntoStaticType { .. } => {
                "CannotIntroduceInstanceMemberIntoStaticType"
            }
            DiagnosticKind::InterfaceIsAlreadyImplemented { .. } => "InterfaceIsAlreadyImplemented",
            DiagnosticKind::MissingDeclarativeInterfaceMember { .. } => {
                "MissingDeclarativeInterfaceMember"
            }
            DiagnosticKind::DeclarativeInterfaceMemberDoesNotMatch { .. } => {
                "DeclarativeInterfaceMemberDoesNotMatch"
            }
            DiagnosticKind::AttributeAlreadyPresent { .. } => "AttributeAlreadyPresent",
            DiagnosticKind::ContractBindingFailed { .. } => "ContractBindingFailed",
            DiagnosticKind::PulledParameterNameConflict { .. } => "PulledParameterNameConflict",
            DiagnosticKind::PullDepthExceeded { .. } => "PullDepthExceeded",
            DiagnosticKind::PullStrategyError { .. } => "PullStrategyError",
            DiagnosticKind::PullStrategyWarning { .. } => "PullStrategyWarning",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::PullStrategyWarning { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MemberAlreadyExists {
                aspect,
                member,
                target_type,
                declaring_type,
            } => write!(
                f,
                "The aspect '{}' cannot introduce member '{}' into type '{}' because it is already defined in type '{}'.",
                aspect, member, target_type, declaring_type
            ),
            DiagnosticKind::CannotIntroduceWithDifferentStaticity {
                aspect,
                member,
                target_type,
                declaring_type,
            } => write!(
                f,
                "The aspect '{}' cannot introduce member '{}' into type '{}' because a member with the same signature but different staticity is defined in type '{}'.",
                aspect, member, target_type, declaring_type
            ),
            DiagnosticKind::CannotIntroduceOverrideOfSealed {
                aspect,
                member,
                target_type,
                declaring_type,
            } => write!(
                f,
                "The aspect '{}' cannot introduce member '{}' into type '{}' as an override because the member in '{}' is sealed or not virtual.",
                aspect, member, target_type, declaring_type
            ),
            DiagnosticKind::CannotIntroduceDifferentExistingReturnType {
                aspect,
                member,
                target_type,
                declaring_type,
                existing_type,
                introduced_type,
            } => write!(
                f,
                "The aspect '{}' cannot introduce member '{}' into type '{}' as an override because the member in '{}' has type '{}', which is not implicitly convertible from '{}'.",
                aspect, member, target_type, declaring_type, existing_type, introduced_type
            ),
            DiagnosticKind::CannotIntroduceInstanceMemberIntoStaticType {
                aspect,
                member,
                target_type,
            } => write!(
                f,
                "The aspect '{}' cannot introduce instance member '{}' into static type '{}'.",
                aspect, member, target_type
            ),
            DiagnosticKind::InterfaceIsAlreadyImplemented {
                aspect,
                interface,
                target_type,
            } => write!(
                f,
                "The aspect '{}' cannot implement interface '{}' on type '{}' because the type already implements it.",
                aspect, interface, target_type
            ),
            DiagnosticKind::MissingDeclarativeInterfaceMember {
                aspect,
                interface_member,
                interface,
                target_type,
            } => write!(
                f,
                "The aspect '{}' cannot implement interface '{}' on type '{}' because it does not provide a member implementing '{}'.",
                aspect, interface, target_type, interface_member
            ),
            DiagnosticKind::DeclarativeInterfaceMemberDoesNotMatch {
                aspect,
                aspect_member,
                interface_member,
                target_type,
            } => write!(
                f,
                "The aspect '{}' member '{}' does not match the signature of interface member '{}' implemented on type '{}'.",
                aspect, aspect_member, interface_member, target_type
            ),
            DiagnosticKind::AttributeAlreadyPresent {
                aspect,
                attribute_type,
                target,
            } => write!(
                f,
                "The aspect '{}' cannot add attribute '{}' to '{}' because it is already present.",
                aspect, attribute_type, target
            ),
            DiagnosticKind::ContractBindingFailed {
                aspect,
                template,
                target,
                reason,
            } => write!(
                f,
                "The aspect '{}' contract template '{}' cannot be applied to '{}': {}.",
                aspect, template, target, reason
            ),
            DiagnosticKind::PulledParameterNameConflict {
                aspect,
                parameter,
                constructor,
            } => write!(
                f,
                "The aspect '{}' cannot append parameter '{}' to constructor '{}' because a parameter with that name already exists.",
                aspect, parameter, constructor
            ),
            DiagnosticKind::PullDepthExceeded {
                aspect,
                member,
                max_depth,
            } => write!(
                f,
                "The aspect '{}' cannot pull '{}' through more than {} chained constructors.",
                aspect, member, max_depth
            ),
            DiagnosticKind::PullStrategyError {
                aspect,
                constructor,
                message,
            }
            | DiagnosticKind::PullStrategyWarning {
                aspect,
                constructor,
                message,
            } => write!(
                f,
                "The aspect '{}' pull strategy reported for constructor '{}': {}",
                aspect, constructor, message
            ),
        }
    }
}

/// A reported diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Declaration the diagnostic is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DeclRef>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    pub fn at(kind: DiagnosticKind, location: DeclRef) -> Self {
        Self {
            kind,
            location: Some(location),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.severity().as_str(),
            self.code(),
            self.kind
        )
    }
}

/// Ordered diagnostic sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Error check honoring `warnings_as_errors`
    pub fn has_blocking(&self, warnings_as_errors: bool) -> bool {
        if warnings_as_errors {
            !self.items.is_empty()
        } else {
            self.has_errors()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
