//! Type expressions
//!
//! `TypeRef` is the engine's view of a type usage (return type, field type,
//! parameter type, base type). It never owns a type declaration; named types
//! point at their definition through a [`DeclRef`].

use crate::features::references::DeclRef;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in types the engine reasons about without a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialType {
    Void,
    Object,
    Boolean,
    Int32,
    Int64,
    Double,
    String,
}

static SPECIAL_TYPES_BY_NAME: Lazy<FxHashMap<&'static str, SpecialType>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for special in SpecialType::ALL {
        map.insert(special.as_str(), special);
    }
    // Keyword aliases
    map.insert("bool", SpecialType::Boolean);
    map.insert("int", SpecialType::Int32);
    map.insert("long", SpecialType::Int64);
    map.insert("double", SpecialType::Double);
    map
});

impl SpecialType {
    pub const ALL: [SpecialType; 7] = [
        SpecialType::Void,
        SpecialType::Object,
        SpecialType::Boolean,
        SpecialType::Int32,
        SpecialType::Int64,
        SpecialType::Double,
        SpecialType::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialType::Void => "void",
            SpecialType::Object => "object",
            SpecialType::Boolean => "Boolean",
            SpecialType::Int32 => "Int32",
            SpecialType::Int64 => "Int64",
            SpecialType::Double => "Double",
            SpecialType::String => "string",
        }
    }

    /// Look up a special type by name or keyword alias
    pub fn from_name(name: &str) -> Option<Self> {
        SPECIAL_TYPES_BY_NAME.get(name).copied()
    }

    /// Value types never take part in implicit reference conversions
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            SpecialType::Boolean | SpecialType::Int32 | SpecialType::Int64 | SpecialType::Double
        )
    }
}

/// Which kind of generic declaration owns a type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenericOwnerKind {
    Type,
    Method,
}

/// A type usage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Special(SpecialType),
    /// A named type (class, struct, interface) with its type arguments
    Named {
        definition: DeclRef,
        arguments: Vec<TypeRef>,
    },
    /// Compared by position only, so `T` of `List<T>` and `T` of a
    /// substituted instantiation are the same parameter
    GenericParameter {
        owner: GenericOwnerKind,
        position: u16,
    },
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn void() -> Self {
        TypeRef::Special(SpecialType::Void)
    }

    pub fn object() -> Self {
        TypeRef::Special(SpecialType::Object)
    }

    pub fn int32() -> Self {
        TypeRef::Special(SpecialType::Int32)
    }

    pub fn string() -> Self {
        TypeRef::Special(SpecialType::String)
    }

    pub fn boolean() -> Self {
        TypeRef::Special(SpecialType::Boolean)
    }

    /// Non-generic usage of a named type
    pub fn named(definition: impl Into<DeclRef>) -> Self {
        TypeRef::Named {
            definition: definition.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(definition: impl Into<DeclRef>, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            definition: definition.into(),
            arguments,
        }
    }

    pub fn type_parameter(position: u16) -> Self {
        TypeRef::GenericParameter {
            owner: GenericOwnerKind::Type,
            position,
        }
    }

    pub fn method_type_parameter(position: u16) -> Self {
        TypeRef::GenericParameter {
            owner: GenericOwnerKind::Method,
            position,
        }
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Special(SpecialType::Void))
    }

    /// Definition of a named type, if this is one
    pub fn definition(&self) -> Option<&DeclRef> {
        match self {
            TypeRef::Named { definition, .. } => Some(definition),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Special(special) => write!(f, "{}", special.as_str()),
            TypeRef::Named {
                definition,
                arguments,
            } => {
                write!(f, "{}", definition)?;
                if !arguments.is_empty() {
                    let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            TypeRef::GenericParameter { owner, position } => match owner {
                GenericOwnerKind::Type => write!(f, "!{}", position),
                GenericOwnerKind::Method => write!(f, "!!{}", position),
            },
            TypeRef::Array(element) => write!(f, "{}[]", element),
        }
    }
}

impl From<SpecialType> for TypeRef {
    fn from(special: SpecialType) -> Self {
        TypeRef::Special(special)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::DeclId;

    #[test]
    fn test_special_type_lookup_accepts_keywords() {
        assert_eq!(SpecialType::from_name("int"), Some(SpecialType::Int32));
        assert_eq!(SpecialType::from_name("Int32"), Some(SpecialType::Int32));
        assert_eq!(SpecialType::from_name("void"), Some(SpecialType::Void));
        assert_eq!(SpecialType::from_name("Widget"), None);
    }

    #[test]
    fn test_generic_parameters_compare_by_position() {
        assert_eq!(TypeRef::type_parameter(0), TypeRef::type_parameter(0));
        assert_ne!(TypeRef::type_parameter(0), TypeRef::type_parameter(1));
        assert_ne!(TypeRef::type_parameter(0), TypeRef::method_type_parameter(0));
    }

    #[test]
    fn test_named_type_definition() {
        let ty = TypeRef::named(DeclId(4));
        assert_eq!(ty.definition(), Some(&DeclRef::Original(DeclId(4))));
        assert!(TypeRef::void().definition().is_none());
        assert!(TypeRef::void().is_void());
    }
}
