//! Conflict extraction: mapping a negative cycle of derived edges back to a
//! linear combination of original constraint bounds.

use fnv::FnvHashMap;
use fnv::FnvHashSet;

use crate::basic_types::LinearExpression;
use crate::graph::DistanceGraph;
use crate::graph::EdgeId;
use crate::graph::EdgeSupport;

/// Walk the provenance of every edge in `cycle_edges` and produce the
/// conflict expressions.
///
/// A derived edge's expression is the coefficient-wise sum of its parents'
/// expressions; the walk is iterative and memoized per edge id, so shared
/// sub-derivations are combined once instead of exponentially often. Any moat
/// edge encountered anywhere in the provenance contributes its own expression
/// as a standalone conflict when `include_reduction_cycles` is set, which
/// lets downstream resolution pick the tightest single moat instead of the
/// whole cycle.
///
/// `include_combined` distinguishes the allmax-cycle path (the combined
/// expression spans the cycle) from the negative-self-loop path.
pub(crate) fn extract_conflicts(
    graph: &DistanceGraph,
    cycle_edges: &[EdgeId],
    moat_edges: &FnvHashSet<EdgeId>,
    include_combined: bool,
    include_reduction_cycles: bool,
) -> Vec<LinearExpression> {
    let mut extractor = Extractor {
        graph,
        moat_edges,
        memo: FnvHashMap::default(),
        moat_conflicts: Vec::new(),
    };

    let mut combined = LinearExpression::new();
    for &id in cycle_edges {
        combined.add_expression(extractor.expression(id));
    }

    let mut conflicts = extractor.moat_conflicts;
    if !include_reduction_cycles {
        conflicts.clear();
        conflicts.push(combined);
    } else if include_combined {
        conflicts.push(combined);
    }

    conflicts
}

struct Extractor<'a> {
    graph: &'a DistanceGraph,
    moat_edges: &'a FnvHashSet<EdgeId>,
    memo: FnvHashMap<EdgeId, LinearExpression>,
    moat_conflicts: Vec<LinearExpression>,
}

impl Extractor<'_> {
    /// The expression of `id`, computing ancestors with an explicit stack so
    /// long reduction chains cannot overflow the call stack.
    fn expression(&mut self, id: EdgeId) -> &LinearExpression {
        let mut stack = vec![id];

        while let Some(&top) = stack.last() {
            if self.memo.contains_key(&top) {
                let _ = stack.pop();
                continue;
            }

            let expression = match self.graph.support(top) {
                EdgeSupport::Base(expression) => expression.clone(),
                EdgeSupport::Derived(parent1, parent2) => {
                    let (parent1, parent2) = (*parent1, *parent2);
                    let mut missing = false;
                    for parent in [parent1, parent2] {
                        if !self.memo.contains_key(&parent) {
                            stack.push(parent);
                            missing = true;
                        }
                    }
                    if missing {
                        continue;
                    }
                    let mut expression = self.memo[&parent1].clone();
                    expression.add_expression(&self.memo[&parent2]);
                    expression
                }
            };

            // Each edge is memoized exactly once, so a moat contributes its
            // standalone conflict exactly once even when the provenance walk
            // reaches it along several paths.
            if self.moat_edges.contains(&top) {
                self.moat_conflicts.push(expression.clone());
            }
            let _ = self.memo.insert(top, expression);
            let _ = stack.pop();
        }

        &self.memo[&id]
    }
}
