use serde::{Deserialize, Serialize};

/// Declaration kinds known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Namespace,
    NamedType,
    Method,
    Field,
    Property,
    Indexer,
    Event,
    Constructor,
    Parameter,
    TypeParameter,
    Attribute,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Namespace => "namespace",
            DeclarationKind::NamedType => "type",
            DeclarationKind::Method => "method",
            DeclarationKind::Field => "field",
            DeclarationKind::Property => "property",
            DeclarationKind::Indexer => "indexer",
            DeclarationKind::Event => "event",
            DeclarationKind::Constructor => "constructor",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::TypeParameter => "type parameter",
            DeclarationKind::Attribute => "attribute",
        }
    }

    /// Members of a named type
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Method
                | DeclarationKind::Field
                | DeclarationKind::Property
                | DeclarationKind::Indexer
                | DeclarationKind::Event
                | DeclarationKind::Constructor
        )
    }

    /// Kinds that share one name space: a field, property and event of the
    /// same name conflict with each other
    pub fn is_uniquely_named(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Field | DeclarationKind::Property | DeclarationKind::Event
        )
    }

    /// Kinds whose identity includes the parameter list
    pub fn has_signature(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Method | DeclarationKind::Indexer | DeclarationKind::Constructor
        )
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_space_groups() {
        assert!(DeclarationKind::Field.is_uniquely_named());
        assert!(DeclarationKind::Event.is_uniquely_named());
        assert!(!DeclarationKind::Method.is_uniquely_named());
        assert!(DeclarationKind::Indexer.has_signature());
        assert!(!DeclarationKind::Attribute.is_member());
    }
}
