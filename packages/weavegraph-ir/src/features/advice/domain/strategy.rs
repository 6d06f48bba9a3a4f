use serde::{Deserialize, Serialize};

/// What to do when the introduced member already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideStrategy {
    /// Report `MemberAlreadyExists`
    #[default]
    Fail,
    /// Keep the existing member, introduce nothing
    Ignore,
    /// Hide an inherited member; override one declared in the target type
    New,
    /// Override a virtual inherited member, or one declared in the target type
    Override,
}

impl OverrideStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideStrategy::Fail => "fail",
            OverrideStrategy::Ignore => "ignore",
            OverrideStrategy::New => "new",
            OverrideStrategy::Override => "override",
        }
    }
}

/// Conflict strategy for an interface the target already implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceOverrideStrategy {
    #[default]
    Fail,
    Ignore,
}
