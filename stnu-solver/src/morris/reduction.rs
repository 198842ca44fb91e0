//! The algebraic edge reduction rules of the Morris algorithm.

use crate::graph::DistanceGraph;
use crate::graph::DistanceGraphEdge;
use crate::graph::EdgeId;
use crate::graph::EdgeKind;
use crate::stnu_assert_simple;

/// Combine two adjacent edges (`edge2` starts where `edge1` ends) into one
/// derived edge, or return `None` when no reduction rule applies.
///
/// The rules, first match wins:
///
/// * upper-case:  ordinary + upper-case, keeping the second label;
/// * lower-case:  lower-case + negative ordinary, giving an ordinary edge;
/// * cross-case:  lower-case + negative upper-case with a different label,
///   keeping the second label;
/// * no-case:     ordinary + ordinary.
///
/// An upper-case result with non-negative combined weight is downgraded to an
/// ordinary edge (label removal): it can never be tighter than the ordinary
/// edge of the same weight.
pub(crate) fn reduce(graph: &mut DistanceGraph, edge1: EdgeId, edge2: EdgeId) -> Option<EdgeId> {
    let first = graph[edge1];
    let second = graph[edge2];
    stnu_assert_simple!(second.from == first.to);

    let weight = first.weight + second.weight;

    let kind = match (first.kind, second.kind) {
        (EdgeKind::Ordinary, EdgeKind::UpperCase(label)) => EdgeKind::UpperCase(label),
        (EdgeKind::LowerCase(_), EdgeKind::Ordinary) if second.weight < 0.0 => EdgeKind::Ordinary,
        (EdgeKind::LowerCase(first_label), EdgeKind::UpperCase(second_label))
            if second.weight < 0.0 && first_label != second_label =>
        {
            EdgeKind::UpperCase(second_label)
        }
        (EdgeKind::Ordinary, EdgeKind::Ordinary) => EdgeKind::Ordinary,
        _ => return None,
    };

    // Label removal.
    let kind = match kind {
        EdgeKind::UpperCase(_) if weight >= 0.0 => EdgeKind::Ordinary,
        kind => kind,
    };

    let edge = DistanceGraphEdge::new(first.from, second.to, weight, kind);
    Some(graph.add_derived(edge, edge1, edge2))
}
