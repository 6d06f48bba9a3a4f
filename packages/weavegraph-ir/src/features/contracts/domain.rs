use crate::features::references::DeclRef;
use crate::features::templates::TemplateRef;
use crate::shared::models::{AdviceId, Tags};
use serde::{Deserialize, Serialize};

/// When a contract runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractDirection {
    Input,
    Output,
    Both,
}

/// One pass of composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionDirection {
    Input,
    Output,
}

impl ContractDirection {
    pub fn includes(&self, direction: ExecutionDirection) -> bool {
        matches!(
            (self, direction),
            (ContractDirection::Both, _)
                | (ContractDirection::Input, ExecutionDirection::Input)
                | (ContractDirection::Output, ExecutionDirection::Output)
        )
    }
}

/// What the contract validates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractTarget {
    Parameter(u16),
    ReturnValue,
    /// The field or property itself
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub advice: AdviceId,
    /// Aspect short name, for diagnostics
    pub aspect: String,
    pub direction: ContractDirection,
    pub target: ContractTarget,
    pub template: TemplateRef,
    #[serde(default)]
    pub tags: Tags,
}

/// Contracts collected for one member, in registration order
#[derive(Debug, Clone, PartialEq)]
pub struct ContractAdvice {
    pub member: DeclRef,
    contracts: Vec<Contract>,
}

impl ContractAdvice {
    pub fn new(member: DeclRef) -> Self {
        Self {
            member,
            contracts: Vec::new(),
        }
    }

    pub fn add(&mut self, contract: Contract) {
        self.contracts.push(contract);
    }

    /// Keep the first `len` contracts
    pub fn truncate(&mut self, len: usize) {
        self.contracts.truncate(len);
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn in_direction(&self, direction: ExecutionDirection) -> impl Iterator<Item = &Contract> {
        self.contracts
            .iter()
            .filter(move |c| c.direction.includes(direction))
    }
}
