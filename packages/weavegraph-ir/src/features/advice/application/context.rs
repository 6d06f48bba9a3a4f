//! Resolution context shared by every advice of one weave

use crate::config::WeaverConfig;
use crate::features::compilation::{Transformation, TransformationKind};
use crate::features::constructor_pull::{AppendParameterStrategy, PullStrategy};
use crate::features::contracts::{Contract, ContractAdvice};
use crate::features::declarations::BuilderArena;
use crate::features::references::DeclRef;
use crate::features::templates::{TemplateExpander, TextTemplateExpander};
use crate::features::type_system::{StructuralTypeSystem, TypeSystem};
use crate::shared::models::{AdviceId, TransformationOrder};
use std::sync::Arc;

/// Hands out transformation orders at creation time
///
/// Orders of a failed advice are never reused, so the log may have gaps;
/// it never has repeats.
#[derive(Debug, Clone)]
pub struct OrderAllocator {
    next: TransformationOrder,
}

impl OrderAllocator {
    pub fn new() -> Self {
        Self {
            next: TransformationOrder(1),
        }
    }

    /// Continue after the last order of an existing log
    pub fn starting_after(last: Option<TransformationOrder>) -> Self {
        Self {
            next: last.map_or(TransformationOrder(1), TransformationOrder::next),
        }
    }

    pub fn allocate(&mut self) -> TransformationOrder {
        let order = self.next;
        self.next = order.next();
        order
    }

    pub fn peek(&self) -> TransformationOrder {
        self.next
    }
}

impl Default for OrderAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// External collaborators (ports)
#[derive(Clone)]
pub struct Collaborators {
    pub type_system: Arc<dyn TypeSystem>,
    pub expander: Arc<dyn TemplateExpander>,
    pub pull_strategy: Arc<dyn PullStrategy>,
}

impl Collaborators {
    pub fn with_type_system(mut self, type_system: Arc<dyn TypeSystem>) -> Self {
        self.type_system = type_system;
        self
    }

    pub fn with_expander(mut self, expander: Arc<dyn TemplateExpander>) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_pull_strategy(mut self, strategy: Arc<dyn PullStrategy>) -> Self {
        self.pull_strategy = strategy;
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            type_system: Arc::new(StructuralTypeSystem::new()),
            expander: Arc::new(TextTemplateExpander::new()),
            pull_strategy: Arc::new(AppendParameterStrategy::new()),
        }
    }
}

#[derive(Debug)]
struct AccumulatedContracts {
    advice: ContractAdvice,
    /// Contracts covered by the last successfully composed body
    committed: usize,
}

/// Contracts per target member, in registration order
///
/// A member's body is always recomposed from every contract registered on
/// it, so the most recent `ApplyContracts` is complete.
#[derive(Debug, Default)]
pub struct ContractAccumulator {
    entries: Vec<AccumulatedContracts>,
    /// Members with contracts not yet composed
    dirty: Vec<DeclRef>,
}

impl ContractAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, member: DeclRef, contract: Contract) {
        match self.entries.iter_mut().find(|e| e.advice.member == member) {
            Some(entry) => entry.advice.add(contract),
            None => {
                let mut advice = ContractAdvice::new(member.clone());
                advice.add(contract);
                self.entries.push(AccumulatedContracts {
                    advice,
                    committed: 0,
                });
            }
        }
        if !self.dirty.contains(&member) {
            self.dirty.push(member);
        }
    }

    pub fn get(&self, member: &DeclRef) -> Option<&ContractAdvice> {
        self.entries
            .iter()
            .find(|e| &e.advice.member == member)
            .map(|e| &e.advice)
    }

    /// The composed body now covers every contract of `member`
    pub fn commit(&mut self, member: &DeclRef) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.advice.member == member) {
            entry.committed = entry.advice.len();
        }
        self.dirty.retain(|m| m != member);
    }

    /// Drop contracts added since the last commit
    pub fn rollback(&mut self, member: &DeclRef) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.advice.member == member) {
            entry.advice.truncate(entry.committed);
        }
        self.entries.retain(|e| !e.advice.is_empty());
        self.dirty.retain(|m| m != member);
    }

    /// Members awaiting composition, in the order they were first touched
    pub fn take_dirty(&mut self) -> Vec<DeclRef> {
        std::mem::take(&mut self.dirty)
    }

    pub fn pending_len(&self) -> usize {
        self.dirty.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything resolution needs besides the model
pub struct ResolveContext<'a> {
    pub arena: &'a mut BuilderArena,
    pub orders: &'a mut OrderAllocator,
    pub collaborators: &'a Collaborators,
    pub config: &'a WeaverConfig,
    pub contracts: &'a mut ContractAccumulator,
}

impl<'a> ResolveContext<'a> {
    /// Stamp a transformation with the next order
    pub fn emit(&mut self, advice: AdviceId, kind: TransformationKind) -> Transformation {
        Transformation::new(self.orders.allocate(), advice, kind)
    }

    pub fn type_system(&self) -> &dyn TypeSystem {
        self.collaborators.type_system.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::contracts::{ContractDirection, ContractTarget};
    use crate::features::templates::TemplateRef;
    use crate::shared::models::{DeclId, Tags};

    fn contract(advice: u32) -> Contract {
        Contract {
            advice: AdviceId(advice),
            aspect: "Validate".to_string(),
            direction: ContractDirection::Input,
            target: ContractTarget::Parameter(0),
            template: TemplateRef::new("NotNull"),
            tags: Tags::new(),
        }
    }

    #[test]
    fn test_orders_are_strictly_increasing() {
        let mut orders = OrderAllocator::starting_after(Some(TransformationOrder(7)));
        let a = orders.allocate();
        let b = orders.allocate();
        assert_eq!(a, TransformationOrder(8));
        assert!(b > a);
    }

    #[test]
    fn test_accumulator_rollback_keeps_committed() {
        let member = DeclRef::Original(DeclId(3));
        let mut acc = ContractAccumulator::new();
        acc.add(member.clone(), contract(1));
        acc.commit(&member);
        acc.add(member.clone(), contract(2));
        assert_eq!(acc.pending_len(), 1);

        acc.rollback(&member);
        assert_eq!(acc.get(&member).unwrap().len(), 1);
        assert_eq!(acc.pending_len(), 0);
    }

    #[test]
    fn test_accumulator_dirty_in_first_touch_order() {
        let a = DeclRef::Original(DeclId(1));
        let b = DeclRef::Original(DeclId(2));
        let mut acc = ContractAccumulator::new();
        acc.add(b.clone(), contract(1));
        acc.add(a.clone(), contract(2));
        acc.add(b.clone(), contract(3));
        assert_eq!(acc.take_dirty(), vec![b, a]);
        assert_eq!(acc.pending_len(), 0);
        assert_eq!(acc.len(), 2);
    }
}
