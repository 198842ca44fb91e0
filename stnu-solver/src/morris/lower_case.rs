//! Lower-case edge elimination: the Dijkstra-like scan that discovers moats.
//!
//! For one lower-case edge `L = (A, c)` the scan runs from `c` over the graph
//! without lower-case edges and without upper-case edges labeled by `c` (a
//! path through those would "breach" the assumption that the contingent
//! duration is still pending). Johnson potentials from the all-max projection
//! shift every traversed weight to be non-negative, so a priority queue
//! suffices despite originally negative weights.
//!
//! Removing edges from the graph the potentials were computed on does not
//! invalidate them: the defining inequality of a potential holds per edge.

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fnv::FnvHashSet;
use log::trace;

use crate::graph::DistanceGraph;
use crate::graph::EdgeId;
use crate::graph::EdgeKind;
use crate::morris::reduction::reduce;
use crate::network::NodeId;
use crate::stnu_assert_simple;

/// Outcome of eliminating a single lower-case edge.
#[derive(Debug)]
pub(crate) enum Elimination {
    /// Newly derived moat edges (possibly none) to feed into the next
    /// fixpoint round.
    NewEdges(Vec<EdgeId>),
    /// A negative self-loop: by itself a negative cycle, so the network is
    /// immediately not dynamically controllable.
    NegativeSelfLoop(EdgeId),
}

#[derive(Debug, PartialEq)]
struct QueueEntry {
    distance: f64,
    node: NodeId,
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Run the elimination scan for `lc_edge`.
///
/// Every moat found is recorded in `moat_edges` so that conflict extraction
/// can later report it as a standalone conflict in addition to the combined
/// cycle expression.
pub(crate) fn eliminate(
    num_nodes: u32,
    edges: &[EdgeId],
    graph: &mut DistanceGraph,
    potentials: &[Option<f64>],
    lc_edge: EdgeId,
    moat_edges: &mut FnvHashSet<EdgeId>,
    epsilon: f64,
) -> Elimination {
    let lc = graph[lc_edge];
    let lc_label = lc.kind.label();
    stnu_assert_simple!(matches!(lc.kind, EdgeKind::LowerCase(_)));

    let mut outgoing: Vec<Vec<EdgeId>> = vec![Vec::new(); num_nodes as usize + 1];
    for &id in edges {
        let edge = graph[id];
        let breaches = match edge.kind {
            EdgeKind::LowerCase(_) => true,
            EdgeKind::UpperCase(label) => Some(label) == lc_label,
            EdgeKind::Ordinary => false,
        };
        // Nodes without a potential are unreachable in the all-max projection
        // and cannot contribute to any negative reduced path.
        let unreachable = potentials[edge.from as usize].is_none()
            || potentials[edge.to as usize].is_none();
        if !breaches && !unreachable {
            outgoing[edge.from as usize].push(id);
        }
    }

    let mut new_edges = Vec::new();

    // The best chain of reductions reaching each node, as one equivalent edge
    // starting at the scan source.
    let mut reduced_edge: Vec<Option<EdgeId>> = vec![None; num_nodes as usize + 1];
    let mut distance: Vec<Option<f64>> = vec![None; num_nodes as usize + 1];
    let mut visited = vec![false; num_nodes as usize + 1];

    let source = lc.to;
    distance[source as usize] = Some(0.0);
    let source_potential = match potentials[source as usize] {
        Some(potential) => potential,
        // The scan source itself is unreachable in the projection; nothing to
        // derive.
        None => return Elimination::NewEdges(new_edges),
    };

    let mut queue = BinaryHeap::new();
    queue.push(Reverse(QueueEntry {
        distance: 0.0,
        node: source,
    }));

    while let Some(Reverse(QueueEntry { node, .. })) = queue.pop() {
        if visited[node as usize] {
            continue;
        }
        visited[node as usize] = true;

        for edge_index in 0..outgoing[node as usize].len() {
            let id = outgoing[node as usize][edge_index];
            let edge = graph[id];
            let neighbour = edge.to;

            // Safe: edges touching potential-less nodes were filtered out.
            let shifted_weight = edge.weight
                + potentials[edge.from as usize].unwrap_or_default()
                - potentials[edge.to as usize].unwrap_or_default();

            let node_distance = match distance[node as usize] {
                Some(d) => d,
                None => continue,
            };
            let candidate = node_distance + shifted_weight;
            let improves = match distance[neighbour as usize] {
                None => true,
                Some(current) => current > candidate,
            };
            if !improves {
                continue;
            }

            // Chain the reduction that brought us here.
            let chained = match reduced_edge[node as usize] {
                None => Some(id),
                Some(chain) => reduce(graph, chain, id),
            };
            let Some(chained) = chained else {
                // No rule combines the chain with this edge.
                continue;
            };
            distance[neighbour as usize] = Some(candidate);
            let chained_weight = graph[chained].weight;

            // The distance along the real (unshifted) weights.
            let real_reduced_distance =
                candidate + potentials[neighbour as usize].unwrap_or_default() - source_potential;

            if chained_weight >= 0.0 {
                reduced_edge[neighbour as usize] = Some(chained);
                queue.push(Reverse(QueueEntry {
                    distance: candidate,
                    node: neighbour,
                }));
            }

            let is_moat = real_reduced_distance < -epsilon
                && lc.from != graph[chained].to
                && edge.weight < 0.0;
            if is_moat {
                if let Some(moat) = reduce(graph, lc_edge, chained) {
                    trace!("moat found: {}", graph[moat]);
                    new_edges.push(moat);
                    let _ = moat_edges.insert(moat);

                    let moat_edge = graph[moat];
                    if moat_edge.from == moat_edge.to && moat_edge.weight < 0.0 {
                        return Elimination::NegativeSelfLoop(moat);
                    }
                }
            }
        }
    }

    Elimination::NewEdges(new_edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::LinearExpression;
    use crate::graph::DistanceGraphEdge;
    use crate::graph::EdgeSupport;
    use crate::morris::allmax::allmax;

    const EPSILON: f64 = 1e-4;

    fn add(graph: &mut DistanceGraph, from: u32, to: u32, weight: f64, kind: EdgeKind) -> EdgeId {
        graph.add_base(
            DistanceGraphEdge::new(from, to, weight, kind),
            LinearExpression::new(),
        )
    }

    /// A contingent link 1 ~~> 2 of span [0, 10] together with a requirement
    /// that node 3 sits exactly one time unit before 2. Scheduling 3 would
    /// require foresight of the contingent duration, which surfaces as a moat
    /// from the lower-case edge.
    #[test]
    fn squeezed_wait_produces_a_moat() {
        let mut graph = DistanceGraph::default();
        let edges = vec![
            add(&mut graph, 1, 2, 10.0, EdgeKind::Ordinary),
            add(&mut graph, 2, 1, 0.0, EdgeKind::Ordinary),
            add(&mut graph, 2, 1, -10.0, EdgeKind::UpperCase(2)),
            add(&mut graph, 1, 2, 0.0, EdgeKind::LowerCase(2)),
            add(&mut graph, 3, 2, 1.0, EdgeKind::Ordinary),
            add(&mut graph, 2, 3, -1.0, EdgeKind::Ordinary),
        ];
        let lc_edge = edges[3];

        let projection = allmax(3, &edges, &graph, None, EPSILON);
        assert!(projection.negative_cycle.is_none());

        let mut moats = FnvHashSet::default();
        let result = eliminate(
            3,
            &edges,
            &mut graph,
            &projection.potentials,
            lc_edge,
            &mut moats,
            EPSILON,
        );

        let new_edges = match result {
            Elimination::NewEdges(new_edges) => new_edges,
            Elimination::NegativeSelfLoop(_) => panic!("no negative self-loop exists here"),
        };
        assert_eq!(new_edges.len(), 1);

        let moat = new_edges[0];
        assert_eq!(graph[moat], DistanceGraphEdge::new(1, 3, -1.0, EdgeKind::Ordinary));
        assert!(moats.contains(&moat));
        assert!(matches!(
            graph.support(moat),
            EdgeSupport::Derived(p1, _) if *p1 == lc_edge
        ));
    }

    #[test]
    fn breach_edges_are_excluded_from_the_scan() {
        let mut graph = DistanceGraph::default();
        // The upper-case edge labeled 2 is the only negative edge out of the
        // scan source; excluding it leaves nothing to derive.
        let edges = vec![
            add(&mut graph, 1, 2, 10.0, EdgeKind::Ordinary),
            add(&mut graph, 2, 1, 0.0, EdgeKind::Ordinary),
            add(&mut graph, 2, 1, -10.0, EdgeKind::UpperCase(2)),
            add(&mut graph, 1, 2, 0.0, EdgeKind::LowerCase(2)),
        ];
        let lc_edge = edges[3];

        let projection = allmax(2, &edges, &graph, None, EPSILON);
        let mut moats = FnvHashSet::default();
        let result = eliminate(
            2,
            &edges,
            &mut graph,
            &projection.potentials,
            lc_edge,
            &mut moats,
            EPSILON,
        );

        match result {
            Elimination::NewEdges(new_edges) => assert!(new_edges.is_empty()),
            Elimination::NegativeSelfLoop(_) => panic!("no moat should be derivable"),
        }
        assert!(moats.is_empty());
    }
}
