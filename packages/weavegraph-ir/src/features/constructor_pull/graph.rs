//! Constructor delegation graph
//!
//! Nodes are the instance constructors of a type and of every type derived
//! from it; an edge runs from a constructor to the one its `base(...)` or
//! `this(...)` initializer calls.

use crate::features::compilation::CodeModel;
use crate::features::references::DeclRef;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;

pub struct DelegationGraph {
    graph: DiGraph<DeclRef, ()>,
    nodes: FxHashMap<DeclRef, NodeIndex>,
}

impl DelegationGraph {
    /// Graph over `root_type` and its derived types, as seen by `model`
    pub fn build(model: &CodeModel, root_type: &DeclRef) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = FxHashMap::default();

        // 1. Collect the hierarchy below root_type
        let mut types = vec![model.logical(root_type)];
        let mut i = 0;
        while i < types.len() {
            for derived in model.derived_types(&types[i]) {
                if !types.contains(&derived) {
                    types.push(derived);
                }
            }
            i += 1;
        }

        // 2. One node per instance constructor
        let constructors: Vec<DeclRef> =
            types.iter().flat_map(|t| model.constructors(t)).collect();
        for ctor in &constructors {
            let node = graph.add_node(ctor.clone());
            nodes.insert(ctor.clone(), node);
        }

        // 3. Edge: delegator -> delegated-to
        for ctor in &constructors {
            let target = model
                .initializer(ctor)
                .and_then(|init| init.target)
                .map(|t| model.logical(&t));
            if let Some(target) = target {
                if let (Some(&from), Some(&to)) = (nodes.get(ctor), nodes.get(&target)) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, nodes }
    }

    pub fn contains(&self, constructor: &DeclRef) -> bool {
        self.nodes.contains_key(constructor)
    }

    /// Constructors calling `constructor` directly
    pub fn delegators(&self, constructor: &DeclRef) -> Vec<DeclRef> {
        let Some(&node) = self.nodes.get(constructor) else {
            return Vec::new();
        };
        let mut out: Vec<(NodeIndex, DeclRef)> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).map(|r| (n, r.clone())))
            .collect();
        // neighbors come back most-recent-edge first
        out.sort_by_key(|(n, _)| n.index());
        out.into_iter().map(|(_, r)| r).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::compilation::BaselineBuilder;
    use crate::features::declarations::DeclarationData;
    use crate::shared::models::TypeRef;

    #[test]
    fn test_graph_over_three_levels() {
        let mut b = BaselineBuilder::new();
        let a = b.add(DeclarationData::class("A"));
        let a0 = b.add_in(a, DeclarationData::constructor());
        let bb = b.add(DeclarationData::class("B").extends(TypeRef::named(a)));
        let b0 = b.add_in(bb, DeclarationData::constructor());
        let b1 = b.add_in(
            bb,
            DeclarationData::constructor()
                .with_parameter("x", TypeRef::int32())
                .delegating_to_this(DeclRef::Original(b0), vec![]),
        );
        let c = b.add(DeclarationData::class("C").extends(TypeRef::named(bb)));
        let model = CodeModel::new(b.build());

        let graph = DelegationGraph::build(&model, &DeclRef::Original(a));
        // a0, b0, b1, implicit C ctor
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.delegators(&DeclRef::Original(a0)), vec![DeclRef::Original(b0)]);

        let b0_delegators = graph.delegators(&DeclRef::Original(b0));
        assert_eq!(b0_delegators.len(), 2);
        assert_eq!(b0_delegators[0], DeclRef::Original(b1));
        let c_ctor = model.constructors(&DeclRef::Original(c))[0].clone();
        assert_eq!(b0_delegators[1], c_ctor);
    }
}
