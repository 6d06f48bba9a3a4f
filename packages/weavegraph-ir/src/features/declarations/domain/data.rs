//! Declaration data shared by Original and Built declarations
//!
//! `DeclarationData` is deliberately flat: kind-specific fields are optional
//! or empty when they do not apply. The chained constructors below are the
//! way baselines and templates are described in code and tests.

use super::kind::{DeclarationKind, TypeKind};
use crate::features::references::DeclRef;
use crate::shared::models::{Accessibility, Modifiers, RefKind, TypeRef, Writeability};
use serde::{Deserialize, Serialize};

/// Parameter of a method, indexer or constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterData {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub ref_kind: RefKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Member whose value this parameter was appended to pull
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulled_for: Option<DeclRef>,
}

impl ParameterData {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind: RefKind::None,
            default_value: None,
            pulled_for: None,
        }
    }

    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Base type and implemented interfaces of a named type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeShape {
    pub type_kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
}

/// Attribute instance: attribute type plus constructor arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeData {
    pub attribute_type: TypeRef,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl AttributeData {
    pub fn new(attribute_type: TypeRef) -> Self {
        Self {
            attribute_type,
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitializerKind {
    /// No initializer (root of a struct, or static constructor)
    None,
    /// `: base(...)`, explicit or implicit
    Base,
    /// `: this(...)`
    This,
}

/// Argument passed through a constructor initializer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgumentValue {
    Parameter(String),
    Expression(String),
    Default,
    /// `parameter: value`, for a parameter past the positional arguments
    Named {
        parameter: String,
        value: Box<ArgumentValue>,
    },
}

impl std::fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentValue::Parameter(name) => write!(f, "{}", name),
            ArgumentValue::Expression(expr) => write!(f, "{}", expr),
            ArgumentValue::Default => write!(f, "default"),
            ArgumentValue::Named { parameter, value } => write!(f, "{}: {}", parameter, value),
        }
    }
}

/// Constructor delegation: which constructor is chained to, with which args
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorInitializer {
    pub kind: InitializerKind,
    /// Delegated-to constructor; `None` until resolved, or for `object`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<DeclRef>,
    #[serde(default)]
    pub arguments: Vec<ArgumentValue>,
}

impl ConstructorInitializer {
    pub fn none() -> Self {
        Self {
            kind: InitializerKind::None,
            target: None,
            arguments: Vec::new(),
        }
    }

    pub fn implicit_base() -> Self {
        Self {
            kind: InitializerKind::Base,
            target: None,
            arguments: Vec::new(),
        }
    }

    /// Arguments bound by position; named ones always follow them
    pub fn positional_len(&self) -> usize {
        self.arguments
            .iter()
            .take_while(|a| !matches!(a, ArgumentValue::Named { .. }))
            .count()
    }
}

/// Declaration data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationData {
    pub kind: DeclarationKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing: Option<DeclRef>,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Return type of methods, value type of fields/properties/indexers/events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<TypeRef>,
    #[serde(default)]
    pub parameters: Vec<ParameterData>,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub writeability: Writeability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_shape: Option<TypeShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<AttributeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<ConstructorInitializer>,
    /// Interface of an explicit interface implementation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_interface: Option<TypeRef>,
}

impl DeclarationData {
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            containing: None,
            accessibility: Accessibility::Private,
            modifiers: Modifiers::default(),
            member_type: None,
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            writeability: Writeability::All,
            type_shape: None,
            attribute: None,
            initializer: None,
            explicit_interface: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Kind constructors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn namespace(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Namespace, name).public()
    }

    fn named_type(name: impl Into<String>, type_kind: TypeKind) -> Self {
        let mut data = Self::new(DeclarationKind::NamedType, name).public();
        data.type_shape = Some(TypeShape {
            type_kind,
            base_type: None,
            interfaces: Vec::new(),
        });
        data
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::named_type(name, TypeKind::Class)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::named_type(name, TypeKind::Struct)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        let mut data = Self::named_type(name, TypeKind::Interface);
        data.modifiers.is_abstract = true;
        data
    }

    pub fn method(name: impl Into<String>, return_type: TypeRef) -> Self {
        let mut data = Self::new(DeclarationKind::Method, name);
        data.member_type = Some(return_type);
        data
    }

    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut data = Self::new(DeclarationKind::Field, name);
        data.member_type = Some(ty);
        data
    }

    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut data = Self::new(DeclarationKind::Property, name);
        data.member_type = Some(ty);
        data
    }

    pub fn indexer(ty: TypeRef) -> Self {
        let mut data = Self::new(DeclarationKind::Indexer, "this[]");
        data.member_type = Some(ty);
        data
    }

    pub fn event(name: impl Into<String>, handler_type: TypeRef) -> Self {
        let mut data = Self::new(DeclarationKind::Event, name);
        data.member_type = Some(handler_type);
        data
    }

    /// Explicit instance constructor chaining implicitly to `base()`
    pub fn constructor() -> Self {
        let mut data = Self::new(DeclarationKind::Constructor, ".ctor").public();
        data.member_type = Some(TypeRef::void());
        data.initializer = Some(ConstructorInitializer::implicit_base());
        data
    }

    /// Static constructor
    pub fn type_constructor() -> Self {
        let mut data = Self::new(DeclarationKind::Constructor, ".cctor").as_static();
        data.accessibility = Accessibility::Private;
        data.member_type = Some(TypeRef::void());
        data.initializer = Some(ConstructorInitializer::none());
        data
    }

    /// Compiler-provided parameterless constructor
    pub fn implicit_constructor() -> Self {
        let mut data = Self::constructor();
        data.modifiers.is_implicit = true;
        data
    }

    pub fn attribute(data: AttributeData) -> Self {
        let mut decl = Self::new(DeclarationKind::Attribute, "attribute").public();
        decl.attribute = Some(data);
        decl
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Chained modifiers
    // ═══════════════════════════════════════════════════════════════════════

    pub fn public(mut self) -> Self {
        self.accessibility = Accessibility::Public;
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    pub fn as_virtual(mut self) -> Self {
        self.modifiers.is_virtual = true;
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.modifiers.is_abstract = true;
        self
    }

    pub fn as_sealed(mut self) -> Self {
        self.modifiers.is_sealed = true;
        self
    }

    pub fn as_override(mut self) -> Self {
        self.modifiers.is_override = true;
        self
    }

    pub fn as_readonly(mut self) -> Self {
        self.modifiers.is_readonly = true;
        self.writeability = Writeability::ConstructorOnly;
        self
    }

    pub fn with_writeability(mut self, writeability: Writeability) -> Self {
        self.writeability = writeability;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(ParameterData::new(name, ty));
        self
    }

    pub fn with_parameter_data(mut self, parameter: ParameterData) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_type_parameters(mut self, names: &[&str]) -> Self {
        self.type_parameters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn extends(mut self, base: TypeRef) -> Self {
        if let Some(shape) = self.type_shape.as_mut() {
            shape.base_type = Some(base);
        }
        self
    }

    pub fn implements(mut self, interface: TypeRef) -> Self {
        if let Some(shape) = self.type_shape.as_mut() {
            shape.interfaces.push(interface);
        }
        self
    }

    pub fn delegating_to_base(mut self, target: DeclRef, arguments: Vec<ArgumentValue>) -> Self {
        self.initializer = Some(ConstructorInitializer {
            kind: InitializerKind::Base,
            target: Some(target),
            arguments,
        });
        self
    }

    pub fn delegating_to_this(mut self, target: DeclRef, arguments: Vec<ArgumentValue>) -> Self {
        self.initializer = Some(ConstructorInitializer {
            kind: InitializerKind::This,
            target: Some(target),
            arguments,
        });
        self
    }

    pub fn with_explicit_interface(mut self, interface: TypeRef) -> Self {
        self.explicit_interface = Some(interface);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    pub fn type_kind(&self) -> Option<TypeKind> {
        self.type_shape.as_ref().map(|s| s.type_kind)
    }

    pub fn is_interface(&self) -> bool {
        self.type_kind() == Some(TypeKind::Interface)
    }

    pub fn initializer_kind(&self) -> InitializerKind {
        self.initializer
            .as_ref()
            .map(|i| i.kind)
            .unwrap_or(InitializerKind::None)
    }

    pub fn parameter_types(&self) -> Vec<&TypeRef> {
        self.parameters.iter().map(|p| &p.ty).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::DeclId;

    #[test]
    fn test_constructor_defaults_to_implicit_base() {
        let ctor = DeclarationData::constructor();
        assert_eq!(ctor.kind, DeclarationKind::Constructor);
        assert_eq!(ctor.initializer_kind(), InitializerKind::Base);
        assert!(ctor.initializer.as_ref().unwrap().target.is_none());
    }

    #[test]
    fn test_type_shape_chain() {
        let c = DeclarationData::class("D")
            .extends(TypeRef::named(DeclId(1)))
            .implements(TypeRef::named(DeclId(2)));
        let shape = c.type_shape.unwrap();
        assert_eq!(shape.base_type, Some(TypeRef::named(DeclId(1))));
        assert_eq!(shape.interfaces.len(), 1);
    }

    #[test]
    fn test_readonly_field_is_constructor_writable() {
        let f = DeclarationData::field("_x", TypeRef::int32()).as_readonly();
        assert!(f.modifiers.is_readonly);
        assert_eq!(f.writeability, Writeability::ConstructorOnly);
    }
}
