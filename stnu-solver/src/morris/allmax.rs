//! The all-max projection: consistency of the distance graph when every
//! contingent duration takes its maximum.

use fnv::FnvHashMap;
use itertools::Itertools;
use log::debug;

use crate::graph::spfa::spfa;
use crate::graph::spfa::AdjacencyGraph;
use crate::graph::DistanceGraph;
use crate::graph::EdgeId;
use crate::network::NodeId;
use crate::network::SOURCE_NODE;
use crate::stnu_assert_simple;

/// Outcome of projecting and running the shortest-path engine.
#[derive(Debug)]
pub(crate) struct AllmaxProjection {
    /// Johnson potentials for the subsequent lower-case eliminations; `None`
    /// for nodes unreachable from the artificial source.
    pub(crate) potentials: Vec<Option<f64>>,
    /// A negative cycle, as edges of the distance graph in traversal order.
    /// Definitive proof of non-controllability when present.
    pub(crate) negative_cycle: Option<Vec<EdgeId>>,
}

/// Project every non-lower-case edge (minimum weight per ordered pair), hook
/// up the artificial super-source and run SPFA from it.
///
/// With a designated start node the source connects only to it; otherwise the
/// source connects to every node with weight zero, as in Johnson's algorithm.
pub(crate) fn allmax(
    num_nodes: u32,
    edges: &[EdgeId],
    graph: &DistanceGraph,
    start_node: Option<NodeId>,
    epsilon: f64,
) -> AllmaxProjection {
    let mut projection = AdjacencyGraph::new(num_nodes + 1);
    let mut projected_edges: FnvHashMap<(NodeId, NodeId), EdgeId> = FnvHashMap::default();

    for &id in edges {
        let edge = graph[id];
        if edge.is_lower_case() {
            continue;
        }
        if projection.tighten(edge.from, edge.to, edge.weight) {
            let _ = projected_edges.insert((edge.from, edge.to), id);
        }
    }

    match start_node {
        Some(start) => {
            let _ = projection.tighten(SOURCE_NODE, start, 0.0);
        }
        None => {
            for node in 1..=num_nodes {
                let _ = projection.tighten(SOURCE_NODE, node, 0.0);
            }
        }
    }

    let result = spfa(SOURCE_NODE, &projection, epsilon);

    let negative_cycle = result.negative_cycle.map(|cycle| {
        stnu_assert_simple!(
            !cycle.contains(&SOURCE_NODE),
            "the artificial source cannot lie on a cycle"
        );

        let mut total_weight = 0.0;
        let edges_on_cycle: Vec<EdgeId> = cycle
            .iter()
            .copied()
            .circular_tuple_windows()
            .map(|(from, to)| {
                let id = projected_edges[&(from, to)];
                total_weight += graph[id].weight;
                id
            })
            .collect();

        debug!(
            "allmax cycle of {} edges with weight {total_weight}",
            edges_on_cycle.len()
        );
        stnu_assert_simple!(
            total_weight < 0.0,
            "detected cycle has non-negative weight {total_weight}"
        );

        edges_on_cycle
    });

    AllmaxProjection {
        potentials: result.distances,
        negative_cycle,
    }
}
