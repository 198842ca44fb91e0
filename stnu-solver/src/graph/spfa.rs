//! Queue-based Bellman-Ford (SPFA) with negative cycle extraction.

use std::collections::VecDeque;

use fnv::FnvHashMap;

use crate::network::NodeId;

/// A directed graph with at most one (minimum-weight) edge per ordered node
/// pair, over nodes `0..num_nodes`.
///
/// Parallel edges between the same ordered pair collapse to the minimum
/// weight, which is the behavior the distance-graph projections rely on.
#[derive(Debug)]
pub(crate) struct AdjacencyGraph {
    num_nodes: u32,
    weights: FnvHashMap<(NodeId, NodeId), f64>,
    neighbours: Vec<Vec<NodeId>>,
}

impl AdjacencyGraph {
    pub(crate) fn new(num_nodes: u32) -> Self {
        AdjacencyGraph {
            num_nodes,
            weights: FnvHashMap::default(),
            neighbours: vec![Vec::new(); num_nodes as usize],
        }
    }

    pub(crate) fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    /// Insert the edge `(from, to, weight)`, keeping the minimum weight on
    /// parallel edges. Returns true if this call tightened (or created) the
    /// stored weight.
    pub(crate) fn tighten(&mut self, from: NodeId, to: NodeId, weight: f64) -> bool {
        match self.weights.get_mut(&(from, to)) {
            Some(stored) if *stored <= weight => false,
            Some(stored) => {
                *stored = weight;
                true
            }
            None => {
                let _ = self.weights.insert((from, to), weight);
                self.neighbours[from as usize].push(to);
                true
            }
        }
    }

    pub(crate) fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.weights.get(&(from, to)).copied()
    }

    fn neighbours(&self, node: NodeId) -> &[NodeId] {
        &self.neighbours[node as usize]
    }
}

/// Result of a single-source shortest path computation.
#[derive(Debug)]
pub(crate) struct ShortestPaths {
    /// Distance from the source per node; `None` for unreachable nodes. On
    /// negative cycle detection these are the partial distances computed so
    /// far.
    pub(crate) distances: Vec<Option<f64>>,
    /// When present, a cyclic node sequence in edge-traversal order whose
    /// consecutive (wrap-around) pairs are all edges of the graph and whose
    /// summed weight is strictly negative.
    pub(crate) negative_cycle: Option<Vec<NodeId>>,
}

/// Shortest Path Faster Algorithm: Bellman-Ford with a FIFO queue of active
/// nodes.
///
/// Relaxations only fire when they improve a distance by more than `epsilon`,
/// which stops floating-point noise from producing endless relaxation rounds.
/// A node enqueued more than `num_nodes` times certifies a negative cycle,
/// which is then extracted from the predecessor graph: any cycle among the
/// predecessor links can only exist because of a genuine negative cycle in
/// the input.
pub(crate) fn spfa(source: NodeId, graph: &AdjacencyGraph, epsilon: f64) -> ShortestPaths {
    let num_nodes = graph.num_nodes() as usize;

    let mut distance: Vec<Option<f64>> = vec![None; num_nodes];
    let mut currently_in_queue = vec![false; num_nodes];
    let mut times_in_queue = vec![0_u32; num_nodes];
    let mut predecessor: Vec<Option<NodeId>> = vec![None; num_nodes];
    let mut queue = VecDeque::new();

    distance[source as usize] = Some(0.0);
    currently_in_queue[source as usize] = true;
    times_in_queue[source as usize] = 1;
    queue.push_back(source);

    let mut negative_cycle_exists = false;

    'relaxation: while let Some(node) = queue.pop_front() {
        currently_in_queue[node as usize] = false;
        let node_distance = distance[node as usize]
            .expect("nodes in the queue always have a finite distance");

        for &neighbour in graph.neighbours(node) {
            let weight = graph
                .weight(node, neighbour)
                .expect("declared neighbours always have a stored weight");
            let candidate = node_distance + weight;

            let improves = match distance[neighbour as usize] {
                None => true,
                Some(current) => current > candidate + epsilon,
            };
            if !improves {
                continue;
            }

            predecessor[neighbour as usize] = Some(node);
            distance[neighbour as usize] = Some(candidate);

            if !currently_in_queue[neighbour as usize] {
                currently_in_queue[neighbour as usize] = true;
                times_in_queue[neighbour as usize] += 1;
                if times_in_queue[neighbour as usize] > num_nodes as u32 {
                    negative_cycle_exists = true;
                    break 'relaxation;
                }
                queue.push_back(neighbour);
            }
        }
    }

    if !negative_cycle_exists {
        return ShortestPaths {
            distances: distance,
            negative_cycle: None,
        };
    }

    ShortestPaths {
        negative_cycle: Some(extract_cycle(&predecessor, num_nodes)),
        distances: distance,
    }
}

/// Walk the predecessor graph from every unvisited node; the first repeated
/// node bounds the cycle. Returned in edge-traversal order.
fn extract_cycle(predecessor: &[Option<NodeId>], num_nodes: usize) -> Vec<NodeId> {
    let mut visited = vec![false; num_nodes];

    for node in 0..num_nodes as u32 {
        if visited[node as usize] {
            continue;
        }

        let mut walk_node = node;
        let mut walk = Vec::new();
        while let Some(pred) = predecessor[walk_node as usize] {
            if visited[pred as usize] {
                break;
            }
            walk_node = pred;
            walk.push(walk_node);
            visited[walk_node as usize] = true;
        }

        // If the predecessor of the last node on the walk was already seen on
        // this walk, the walk closed on itself. The prefix before the repeat
        // is a simple path that merely entered the cycle.
        if let Some(pred) = predecessor[walk_node as usize] {
            if let Some(start) = walk.iter().position(|&n| n == pred) {
                let mut cycle: Vec<NodeId> = walk[start..].to_vec();
                cycle.reverse();
                return cycle;
            }
        }
        visited[node as usize] = true;
    }

    unreachable!("over-enqueue detection always leaves a cycle in the predecessor graph")
}
