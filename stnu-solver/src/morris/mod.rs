//! Dynamic controllability checking with the Morris reduction algorithm.
//!
//! Implementation based on the paper "A Structural Characterization of
//! Temporal Dynamic Controllability" by Paul Morris.

pub(crate) mod allmax;
pub(crate) mod conflict;
pub(crate) mod lower_case;
pub(crate) mod reduction;

use fnv::FnvHashSet;
use log::debug;
use log::trace;

use crate::basic_types::Controllability;
use crate::basic_types::NetworkError;
use crate::graph::builder;
use crate::graph::DistanceGraph;
use crate::graph::DistanceGraphEdge;
use crate::graph::EdgeId;
use crate::graph::EdgeKind;
use crate::morris::allmax::allmax;
use crate::morris::conflict::extract_conflicts;
use crate::morris::lower_case::eliminate;
use crate::morris::lower_case::Elimination;
use crate::network::EventNames;
use crate::network::NodeId;
use crate::network::TemporalNetwork;
use crate::stnu_assert_simple;

/// Options for [`MorrisN4Dc`].
#[derive(Clone, Copy, Debug)]
pub struct DcOptions {
    /// Tolerance used both for shortest-path relaxation and for the moat
    /// test, guarding against floating-point noise.
    pub epsilon: f64,
    /// When set, every moat edge reachable from a conflict's provenance is
    /// reported as a standalone conflict alongside the combined one.
    pub include_reduction_cycles: bool,
}

impl Default for DcOptions {
    fn default() -> Self {
        DcOptions {
            epsilon: 1e-4,
            include_reduction_cycles: false,
        }
    }
}

/// The Morris N⁴ dynamic controllability checker.
///
/// A checker instance holds the edge arena, provenance and moat registry of
/// exactly one check; [`MorrisN4Dc::check`] consumes the instance so state
/// can never leak into a later check.
#[derive(Debug, Default)]
pub struct MorrisN4Dc {
    options: DcOptions,
    graph: DistanceGraph,
    moat_edges: FnvHashSet<EdgeId>,
    event_names: EventNames,
}

impl MorrisN4Dc {
    pub fn new(options: DcOptions) -> Self {
        MorrisN4Dc {
            options,
            ..MorrisN4Dc::default()
        }
    }

    /// Check whether `network` is dynamically controllable.
    ///
    /// Returns the verdict, or a [`NetworkError`] when the input network is
    /// malformed. Internal invariant violations (a detected cycle with
    /// non-negative weight, or the fixpoint running past its proven iteration
    /// bound) panic: they indicate a bug in the checker, and must never be
    /// mistaken for an uncontrollable network.
    pub fn check(mut self, network: &TemporalNetwork) -> Result<Controllability, NetworkError> {
        self.event_names = network.event_names.clone();
        let built = builder::build(network, &mut self.graph, &mut self.event_names)?;

        let num_nodes = built.num_nodes;
        let iteration_bound = built.uncontrollable_count + 1;
        let mut new_edges = built.edges;
        let mut all_edges: Vec<EdgeId> = Vec::new();
        let mut iterations = 0;

        // Elimination can re-derive an edge tuple-equal to one the graph
        // already contains (typically the same moat in consecutive passes).
        // Such an edge adds nothing to the closure and must not count as new,
        // otherwise the pass over the lower-case edges never comes up empty.
        let mut seen_tuples: FnvHashSet<(NodeId, NodeId, u64, EdgeKind)> = new_edges
            .iter()
            .map(|&id| edge_tuple(&self.graph[id]))
            .collect();

        loop {
            if new_edges.is_empty() {
                return Ok(Controllability::Controllable);
            }
            all_edges.append(&mut new_edges);

            let projection = allmax(
                num_nodes,
                &all_edges,
                &self.graph,
                network.start_node,
                self.options.epsilon,
            );

            if let Some(cycle) = projection.negative_cycle {
                debug!("allmax projection is inconsistent; extracting conflicts");
                let conflicts = extract_conflicts(
                    &self.graph,
                    &cycle,
                    &self.moat_edges,
                    true,
                    self.options.include_reduction_cycles,
                );
                return Ok(Controllability::Uncontrollable(conflicts));
            }

            let lower_case_edges: Vec<EdgeId> = all_edges
                .iter()
                .copied()
                .filter(|&id| self.graph[id].is_lower_case())
                .collect();

            for lc_edge in lower_case_edges {
                trace!(
                    "reducing lower-case edge {}",
                    self.graph[lc_edge].display(&self.event_names)
                );
                let result = eliminate(
                    num_nodes,
                    &all_edges,
                    &mut self.graph,
                    &projection.potentials,
                    lc_edge,
                    &mut self.moat_edges,
                    self.options.epsilon,
                );
                match result {
                    Elimination::NegativeSelfLoop(loop_edge) => {
                        debug!("negative self-loop {}", self.graph[loop_edge]);
                        let conflicts = extract_conflicts(
                            &self.graph,
                            &[loop_edge],
                            &self.moat_edges,
                            false,
                            self.options.include_reduction_cycles,
                        );
                        return Ok(Controllability::Uncontrollable(conflicts));
                    }
                    Elimination::NewEdges(edges) => {
                        for id in edges {
                            if seen_tuples.insert(edge_tuple(&self.graph[id])) {
                                new_edges.push(id);
                            }
                        }
                    }
                }
            }

            iterations += 1;
            // One pass per contingent link plus a final pass which confirms
            // that no edge was added; anything beyond that contradicts the
            // termination proof.
            stnu_assert_simple!(
                iterations <= iteration_bound,
                "fixpoint exceeded the proven bound of {iteration_bound} iterations"
            );
        }
    }
}

/// The value identity of an edge. `-0.0` weights arise from negated zero
/// bounds and must collapse onto `0.0`.
fn edge_tuple(edge: &DistanceGraphEdge) -> (NodeId, NodeId, u64, EdgeKind) {
    let weight = if edge.weight == 0.0 { 0.0 } else { edge.weight };
    (edge.from, edge.to, weight.to_bits(), edge.kind)
}
