//! Aspect-side template declarations

use crate::features::declarations::{AttributeData, DeclarationData, DeclarationKind};
use crate::shared::models::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a runtime-body or contract template
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateRef {
    pub name: String,
}

impl TemplateRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How an aspect member takes part in an interface implementation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceMemberMark {
    /// Introduced as a public member; matched by name and signature
    Declarative,
    /// Explicit implementation of a member of `interface`
    Explicit { interface: TypeRef },
}

/// Member declared on the aspect and used as the source of an introduction
///
/// `declaration` carries the signature, staticity and accessibility the
/// builder copies during initialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMember {
    pub declaration: DeclarationData,
    /// Runtime body (method body, accessor bodies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<TemplateRef>,
    /// Field/property initializer expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<TemplateRef>,
    /// Attributes forwarded to the introduced declaration
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_member: Option<InterfaceMemberMark>,
}

impl TemplateMember {
    pub fn new(declaration: DeclarationData) -> Self {
        Self {
            declaration,
            body: None,
            initializer: None,
            attributes: Vec::new(),
            interface_member: None,
        }
    }

    pub fn with_body(mut self, template: impl Into<String>) -> Self {
        self.body = Some(TemplateRef::new(template));
        self
    }

    pub fn with_initializer(mut self, template: impl Into<String>) -> Self {
        self.initializer = Some(TemplateRef::new(template));
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn declarative(mut self) -> Self {
        self.interface_member = Some(InterfaceMemberMark::Declarative);
        self
    }

    pub fn explicit_for(mut self, interface: TypeRef) -> Self {
        self.declaration.explicit_interface = Some(interface.clone());
        self.interface_member = Some(InterfaceMemberMark::Explicit { interface });
        self
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn kind(&self) -> DeclarationKind {
        self.declaration.kind
    }
}
