//! The distance graph: an arena of typed edges with per-edge provenance.

pub(crate) mod builder;
mod edge;
pub(crate) mod spfa;

pub(crate) use edge::DistanceGraphEdge;
pub(crate) use edge::EdgeId;
pub(crate) use edge::EdgeKind;

use std::ops::Index;

use crate::basic_types::LinearExpression;
use crate::containers::KeyedVec;
use crate::stnu_assert_moderate;

/// Provenance of an edge: either directly generated from constraint bounds,
/// or derived by reducing two existing edges.
#[derive(Clone, Debug)]
pub(crate) enum EdgeSupport {
    /// The expression ties the edge to zero, one or two original constraint
    /// bounds.
    Base(LinearExpression),
    /// Produced by reducing two parent edges; the expression is the
    /// coefficient-wise sum of the parents' expressions, computed lazily
    /// during conflict extraction.
    Derived(EdgeId, EdgeId),
}

/// Arena of distance graph edges.
///
/// Every edge is paired with exactly one [`EdgeSupport`] record, created at
/// the moment the edge is generated. The arena is private to one
/// controllability check and is rebuilt from scratch for the next one.
#[derive(Debug, Default)]
pub(crate) struct DistanceGraph {
    edges: KeyedVec<EdgeId, DistanceGraphEdge>,
    supports: KeyedVec<EdgeId, EdgeSupport>,
}

impl DistanceGraph {
    /// Add a directly-generated edge with its base expression.
    pub(crate) fn add_base(
        &mut self,
        edge: DistanceGraphEdge,
        expression: LinearExpression,
    ) -> EdgeId {
        let id = self.edges.push(edge);
        let support_id = self.supports.push(EdgeSupport::Base(expression));
        stnu_assert_moderate!(id == support_id);
        id
    }

    /// Add an edge derived by reducing `parent1` with `parent2`.
    pub(crate) fn add_derived(
        &mut self,
        edge: DistanceGraphEdge,
        parent1: EdgeId,
        parent2: EdgeId,
    ) -> EdgeId {
        let id = self.edges.push(edge);
        let support_id = self.supports.push(EdgeSupport::Derived(parent1, parent2));
        stnu_assert_moderate!(id == support_id);
        id
    }

    pub(crate) fn support(&self, id: EdgeId) -> &EdgeSupport {
        &self.supports[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.edges.len()
    }
}

impl Index<EdgeId> for DistanceGraph {
    type Output = DistanceGraphEdge;

    fn index(&self, id: EdgeId) -> &DistanceGraphEdge {
        &self.edges[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::BoundRef;
    use crate::network::ConstraintId;

    #[test]
    fn tuple_equal_edges_keep_distinct_provenance() {
        let mut graph = DistanceGraph::default();
        let c1 = ConstraintId::new(1);

        let edge = DistanceGraphEdge::new(1, 2, 5.0, EdgeKind::Ordinary);
        let first = graph.add_base(edge, [(BoundRef::upper(c1), 1)].into_iter().collect());
        let second = graph.add_base(edge, LinearExpression::new());

        assert_ne!(first, second);
        assert_eq!(graph[first], graph[second]);
        assert!(matches!(
            graph.support(second),
            EdgeSupport::Base(expression) if expression.is_empty()
        ));
    }
}
