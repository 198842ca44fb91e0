//! Translation of a temporal network into the distance graph.
//!
//! Requirement constraints become pairs of ordinary edges. Contingent
//! constraints become the four-edge Morris encoding, normalized through a
//! synthetic intermediate node when the contingent lower bound is positive so
//! that the conditional part always spans a zero lower bound. Every generated
//! edge records which original constraint bounds it derives from.

use fnv::FnvHashSet;

use crate::basic_types::BoundRef;
use crate::basic_types::LinearExpression;
use crate::basic_types::NetworkError;
use crate::graph::DistanceGraph;
use crate::graph::DistanceGraphEdge;
use crate::graph::EdgeId;
use crate::graph::EdgeKind;
use crate::network::ConstraintId;
use crate::network::EventNames;
use crate::network::NodeId;
use crate::network::TemporalNetwork;
use crate::stnu_assert_simple;

/// The distance graph derived from a network.
#[derive(Debug)]
pub(crate) struct BuiltGraph {
    /// Effective node count, including nodes synthesized for normalization.
    pub(crate) num_nodes: u32,
    pub(crate) edges: Vec<EdgeId>,
    /// The number of contingent constraints processed; bounds the outer
    /// fixpoint iteration of the checker.
    pub(crate) uncontrollable_count: u32,
}

/// Reject malformed networks before any edge is built.
pub(crate) fn validate(network: &TemporalNetwork) -> Result<(), NetworkError> {
    if let Some(start) = network.start_node {
        // Start node 0 would make the artificial source its own start, so
        // the projection reaches nothing and every network looks consistent.
        if start == 0 || start > network.num_nodes {
            return Err(NetworkError::StartNodeOutOfRange {
                start_node: start,
                num_nodes: network.num_nodes,
            });
        }
    }

    for constraint in network.constraints().filter(|c| c.activated) {
        if constraint.fro == 0 || constraint.to == 0 {
            return Err(NetworkError::ReservedNodeZero {
                constraint: constraint.id,
            });
        }
        for node in [constraint.fro, constraint.to] {
            if node > network.num_nodes {
                return Err(NetworkError::NodeOutOfRange {
                    constraint: constraint.id,
                    node,
                    num_nodes: network.num_nodes,
                });
            }
        }
        if !constraint.controllable {
            let lower = constraint.lower_bound();
            let upper = constraint.upper_bound();
            if !(0.0 <= lower && lower <= upper) || !upper.is_finite() {
                return Err(NetworkError::InvalidContingentBounds {
                    constraint: constraint.id,
                    lower,
                    upper,
                });
            }
        }
    }
    Ok(())
}

/// Build the distance graph for all activated constraints of `network`.
///
/// `names` receives primed names for any synthesized normalization node.
pub(crate) fn build(
    network: &TemporalNetwork,
    graph: &mut DistanceGraph,
    names: &mut EventNames,
) -> Result<BuiltGraph, NetworkError> {
    validate(network)?;

    let mut builder = Builder {
        graph,
        edges: Vec::new(),
    };
    let mut num_nodes = network.num_nodes;
    let mut uncontrollable_count = 0;
    let mut encoded_pairs: FnvHashSet<(NodeId, NodeId)> = FnvHashSet::default();

    for constraint in network.constraints().filter(|c| c.activated) {
        let lb = constraint.lower_bound();
        let ub = constraint.upper_bound();

        if constraint.controllable {
            if encoded_pairs.insert((constraint.fro, constraint.to)) {
                builder.add_controllable(constraint.fro, constraint.to, lb, ub, Some(constraint.id));
            } else {
                // A second constraint between the same ordered pair is routed
                // through a fresh node so the projection graphs never see
                // duplicate ordered pairs they would collapse incorrectly.
                num_nodes += 1;
                names.set_primed(num_nodes, constraint.to);
                builder.add_controllable(constraint.fro, num_nodes, lb, ub, Some(constraint.id));
                builder.add_controllable(num_nodes, constraint.to, 0.0, 0.0, None);
            }
        } else {
            uncontrollable_count += 1;
            if lb == 0.0 {
                builder.add_contingent(constraint.fro, None, constraint.to, lb, ub, constraint.id);
                let _ = encoded_pairs.insert((constraint.fro, constraint.to));
            } else {
                // Normalize [lb, ub] into a fixed [lb, lb] segment followed
                // by a zero-lower-bound contingent segment of span ub - lb.
                num_nodes += 1;
                names.set_primed(num_nodes, constraint.fro);
                builder.add_contingent(
                    constraint.fro,
                    Some(num_nodes),
                    constraint.to,
                    lb,
                    ub,
                    constraint.id,
                );
            }
        }
    }

    Ok(BuiltGraph {
        num_nodes,
        edges: builder.edges,
        uncontrollable_count,
    })
}

struct Builder<'a> {
    graph: &'a mut DistanceGraph,
    edges: Vec<EdgeId>,
}

impl Builder<'_> {
    fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: f64,
        kind: EdgeKind,
        expression: LinearExpression,
    ) {
        let id = self
            .graph
            .add_base(DistanceGraphEdge::new(from, to, weight, kind), expression);
        self.edges.push(id);
    }

    /// Encode `[lb, ub]` from `fro` to `to` as two ordinary edges. Infinite
    /// bounds suppress the corresponding edge instead of materializing an
    /// infinite weight. `id` is `None` for synthetic zero-length helper
    /// segments, which carry no provenance.
    fn add_controllable(
        &mut self,
        fro: NodeId,
        to: NodeId,
        lb: f64,
        ub: f64,
        id: Option<ConstraintId>,
    ) {
        if ub.is_finite() {
            let expression = id
                .map(|id| [(BoundRef::upper(id), 1)].into_iter().collect())
                .unwrap_or_default();
            self.add_edge(fro, to, ub, EdgeKind::Ordinary, expression);
        }
        if lb.is_finite() {
            let expression = id
                .map(|id| [(BoundRef::lower(id), -1)].into_iter().collect())
                .unwrap_or_default();
            self.add_edge(to, fro, -lb, EdgeKind::Ordinary, expression);
        }
    }

    /// Encode a contingent constraint. With `new_node` present, the fixed
    /// `[lb, lb]` prefix lands between `fro` and `new_node` and the
    /// conditional encoding spans `new_node -> to`; otherwise `lb` is zero
    /// and the conditional encoding attaches to `fro` directly.
    fn add_contingent(
        &mut self,
        fro: NodeId,
        new_node: Option<NodeId>,
        to: NodeId,
        lb: f64,
        ub: f64,
        id: ConstraintId,
    ) {
        stnu_assert_simple!(lb <= ub && 0.0 <= lb && ub.is_finite());

        let inner_from = match new_node {
            Some(node) => {
                self.add_edge(
                    fro,
                    node,
                    lb,
                    EdgeKind::Ordinary,
                    [(BoundRef::lower(id), 1)].into_iter().collect(),
                );
                self.add_edge(
                    node,
                    fro,
                    -lb,
                    EdgeKind::Ordinary,
                    [(BoundRef::lower(id), -1)].into_iter().collect(),
                );
                node
            }
            None => fro,
        };

        self.add_edge(
            inner_from,
            to,
            ub - lb,
            EdgeKind::Ordinary,
            [(BoundRef::lower(id), -1), (BoundRef::upper(id), 1)]
                .into_iter()
                .collect(),
        );
        self.add_edge(to, inner_from, 0.0, EdgeKind::Ordinary, LinearExpression::new());
        self.add_edge(
            to,
            inner_from,
            lb - ub,
            EdgeKind::UpperCase(to),
            [(BoundRef::lower(id), 1), (BoundRef::upper(id), -1)]
                .into_iter()
                .collect(),
        );
        self.add_edge(
            inner_from,
            to,
            0.0,
            EdgeKind::LowerCase(to),
            LinearExpression::new(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::BoundKind;
    use crate::graph::EdgeSupport;
    use crate::network::TemporalConstraint;

    fn build_network(network: &TemporalNetwork) -> (DistanceGraph, BuiltGraph) {
        let mut graph = DistanceGraph::default();
        let mut names = network.event_names.clone();
        let built = build(network, &mut graph, &mut names).expect("valid network");
        (graph, built)
    }

    fn base_expression(graph: &DistanceGraph, id: EdgeId) -> &LinearExpression {
        match graph.support(id) {
            EdgeSupport::Base(expression) => expression,
            EdgeSupport::Derived(_, _) => panic!("builder edges are always base-supported"),
        }
    }

    #[test]
    fn requirement_becomes_two_ordinary_edges() {
        let mut network = TemporalNetwork::new(2);
        let c1 = ConstraintId::new(1);
        network.add_constraint(TemporalConstraint::requirement(c1, 1, 2, 3.0, 7.0));

        let (graph, built) = build_network(&network);

        assert_eq!(built.num_nodes, 2);
        assert_eq!(built.uncontrollable_count, 0);
        assert_eq!(built.edges.len(), 2);

        let ub_edge = built.edges[0];
        assert_eq!(graph[ub_edge], DistanceGraphEdge::new(1, 2, 7.0, EdgeKind::Ordinary));
        let expected: LinearExpression = [(BoundRef::upper(c1), 1)].into_iter().collect();
        assert_eq!(*base_expression(&graph, ub_edge), expected);

        let lb_edge = built.edges[1];
        assert_eq!(graph[lb_edge], DistanceGraphEdge::new(2, 1, -3.0, EdgeKind::Ordinary));
        let expected: LinearExpression = [(BoundRef::lower(c1), -1)].into_iter().collect();
        assert_eq!(*base_expression(&graph, lb_edge), expected);
    }

    #[test]
    fn infinite_bounds_suppress_edges() {
        let mut network = TemporalNetwork::new(2);
        network.add_constraint(TemporalConstraint::requirement(
            ConstraintId::new(1),
            1,
            2,
            f64::NEG_INFINITY,
            f64::INFINITY,
        ));

        let (_, built) = build_network(&network);

        assert!(built.edges.is_empty());
    }

    #[test]
    fn zero_lower_bound_contingent_uses_four_edge_encoding() {
        let mut network = TemporalNetwork::new(2);
        let c1 = ConstraintId::new(1);
        network.add_constraint(TemporalConstraint::contingent(c1, 1, 2, 0.0, 10.0));

        let (graph, built) = build_network(&network);

        assert_eq!(built.num_nodes, 2);
        assert_eq!(built.uncontrollable_count, 1);
        assert_eq!(built.edges.len(), 4);

        assert_eq!(graph[built.edges[0]], DistanceGraphEdge::new(1, 2, 10.0, EdgeKind::Ordinary));
        assert_eq!(graph[built.edges[1]], DistanceGraphEdge::new(2, 1, 0.0, EdgeKind::Ordinary));
        assert_eq!(
            graph[built.edges[2]],
            DistanceGraphEdge::new(2, 1, -10.0, EdgeKind::UpperCase(2))
        );
        assert_eq!(
            graph[built.edges[3]],
            DistanceGraphEdge::new(1, 2, 0.0, EdgeKind::LowerCase(2))
        );

        let expected: LinearExpression =
            [(BoundRef::lower(c1), -1), (BoundRef::upper(c1), 1)].into_iter().collect();
        assert_eq!(*base_expression(&graph, built.edges[0]), expected);
        assert!(base_expression(&graph, built.edges[1]).is_empty());
        let expected: LinearExpression =
            [(BoundRef::lower(c1), 1), (BoundRef::upper(c1), -1)].into_iter().collect();
        assert_eq!(*base_expression(&graph, built.edges[2]), expected);
        assert!(base_expression(&graph, built.edges[3]).is_empty());
    }

    #[test]
    fn positive_lower_bound_contingent_is_normalized_through_a_split_node() {
        let mut network = TemporalNetwork::new(2);
        let c1 = ConstraintId::new(1);
        network.add_constraint(TemporalConstraint::contingent(c1, 1, 2, 1.0, 10.0));

        let (graph, built) = build_network(&network);

        // The contingent part is rebased onto the synthesized node 3.
        assert_eq!(built.num_nodes, 3);
        assert_eq!(built.edges.len(), 6);

        assert_eq!(graph[built.edges[0]], DistanceGraphEdge::new(1, 3, 1.0, EdgeKind::Ordinary));
        assert_eq!(graph[built.edges[1]], DistanceGraphEdge::new(3, 1, -1.0, EdgeKind::Ordinary));
        assert_eq!(graph[built.edges[2]], DistanceGraphEdge::new(3, 2, 9.0, EdgeKind::Ordinary));
        assert_eq!(graph[built.edges[3]], DistanceGraphEdge::new(2, 3, 0.0, EdgeKind::Ordinary));
        assert_eq!(
            graph[built.edges[4]],
            DistanceGraphEdge::new(2, 3, -9.0, EdgeKind::UpperCase(2))
        );
        assert_eq!(
            graph[built.edges[5]],
            DistanceGraphEdge::new(3, 2, 0.0, EdgeKind::LowerCase(2))
        );

        let expected: LinearExpression = [(BoundRef::lower(c1), 1)].into_iter().collect();
        assert_eq!(*base_expression(&graph, built.edges[0]), expected);
    }

    #[test]
    fn duplicate_ordered_pair_is_redirected_through_a_fresh_node() {
        let mut network = TemporalNetwork::new(2);
        network.add_constraint(TemporalConstraint::requirement(ConstraintId::new(1), 1, 2, 1.0, 4.0));
        network.add_constraint(TemporalConstraint::requirement(ConstraintId::new(2), 1, 2, 2.0, 3.0));

        let (graph, built) = build_network(&network);

        assert_eq!(built.num_nodes, 3);
        // Two edges for the first constraint, two for the redirected second
        // constraint, two for the zero-cost helper segment.
        assert_eq!(built.edges.len(), 6);
        assert_eq!(graph[built.edges[2]], DistanceGraphEdge::new(1, 3, 3.0, EdgeKind::Ordinary));
        assert_eq!(graph[built.edges[4]], DistanceGraphEdge::new(3, 2, 0.0, EdgeKind::Ordinary));
        assert!(base_expression(&graph, built.edges[4]).is_empty());
    }

    #[test]
    fn synthesized_nodes_get_primed_names() {
        let mut network = TemporalNetwork::new(2);
        network.event_names.set(1, "start");
        network.add_constraint(TemporalConstraint::contingent(ConstraintId::new(1), 1, 2, 2.0, 5.0));

        let mut graph = DistanceGraph::default();
        let mut names = network.event_names.clone();
        let _ = build(&network, &mut graph, &mut names).expect("valid network");

        assert_eq!(names.get(3), Some("start'"));
    }

    #[test]
    fn deactivated_constraints_are_skipped() {
        let mut network = TemporalNetwork::new(2);
        let mut constraint = TemporalConstraint::requirement(ConstraintId::new(1), 1, 2, 0.0, 5.0);
        constraint.activated = false;
        network.add_constraint(constraint);

        let (_, built) = build_network(&network);

        assert!(built.edges.is_empty());
    }

    #[test]
    fn node_zero_is_rejected_before_building() {
        let mut network = TemporalNetwork::new(2);
        let c1 = ConstraintId::new(1);
        network.add_constraint(TemporalConstraint::requirement(c1, 0, 1, 1.0, 2.0));

        let mut graph = DistanceGraph::default();
        let mut names = EventNames::default();
        let result = build(&network, &mut graph, &mut names);

        assert_eq!(result.unwrap_err(), NetworkError::ReservedNodeZero { constraint: c1 });
        assert_eq!(graph.len(), 0);
    }

    #[test]
    fn out_of_range_node_is_rejected() {
        let mut network = TemporalNetwork::new(2);
        let c1 = ConstraintId::new(1);
        network.add_constraint(TemporalConstraint::requirement(c1, 1, 5, 1.0, 2.0));

        let mut graph = DistanceGraph::default();
        let mut names = EventNames::default();
        let result = build(&network, &mut graph, &mut names);

        assert_eq!(
            result.unwrap_err(),
            NetworkError::NodeOutOfRange {
                constraint: c1,
                node: 5,
                num_nodes: 2
            }
        );
    }

    #[test]
    fn start_node_outside_the_network_is_rejected() {
        for start in [0, 7] {
            let mut network = TemporalNetwork::new(2);
            network.add_constraint(TemporalConstraint::requirement(
                ConstraintId::new(1),
                1,
                2,
                1.0,
                2.0,
            ));
            network.start_node = Some(start);

            let mut graph = DistanceGraph::default();
            let mut names = EventNames::default();
            let result = build(&network, &mut graph, &mut names);

            assert_eq!(
                result.unwrap_err(),
                NetworkError::StartNodeOutOfRange {
                    start_node: start,
                    num_nodes: 2
                }
            );
            assert_eq!(graph.len(), 0);
        }
    }

    #[test]
    fn malformed_contingent_bounds_are_rejected() {
        for (lb, ub) in [(-1.0, 5.0), (6.0, 5.0), (0.0, f64::INFINITY)] {
            let mut network = TemporalNetwork::new(2);
            let c1 = ConstraintId::new(1);
            network.add_constraint(TemporalConstraint::contingent(c1, 1, 2, lb, ub));

            let mut graph = DistanceGraph::default();
            let mut names = EventNames::default();
            let result = build(&network, &mut graph, &mut names);

            assert_eq!(
                result.unwrap_err(),
                NetworkError::InvalidContingentBounds {
                    constraint: c1,
                    lower: lb,
                    upper: ub
                }
            );
        }
    }
}
