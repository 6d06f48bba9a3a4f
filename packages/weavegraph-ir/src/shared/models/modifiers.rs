//! Accessibility and modifier flags shared by Original and Built declarations

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Private,
    PrivateProtected,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Accessibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessibility::Private => "private",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Protected => "protected",
            Accessibility::Internal => "internal",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Public => "public",
        }
    }
}

impl Default for Accessibility {
    fn default() -> Self {
        Accessibility::Private
    }
}

/// Modifier flags
///
/// Not every flag is meaningful for every declaration kind; `is_readonly` only
/// applies to fields, `is_implicit` to compiler-provided constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_new: bool,
    pub is_readonly: bool,
    pub is_implicit: bool,
}

impl Modifiers {
    /// Whether a derived type may override the member
    ///
    /// A member is overridable when it is virtual, abstract or itself an
    /// override, and not sealed.
    pub fn is_overridable(&self) -> bool {
        (self.is_virtual || self.is_abstract || self.is_override) && !self.is_sealed
    }
}

/// Who may assign a field or property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Writeability {
    None,
    ConstructorOnly,
    InitOnly,
    All,
}

impl Default for Writeability {
    fn default() -> Self {
        Writeability::All
    }
}

/// Parameter passing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    None,
    In,
    Ref,
    Out,
}

impl RefKind {
    /// Caller observes writes to the parameter
    pub fn is_by_ref_writable(&self) -> bool {
        matches!(self, RefKind::Ref | RefKind::Out)
    }

    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            RefKind::None => None,
            RefKind::In => Some("in"),
            RefKind::Ref => Some("ref"),
            RefKind::Out => Some("out"),
        }
    }
}

impl Default for RefKind {
    fn default() -> Self {
        RefKind::None
    }
}
