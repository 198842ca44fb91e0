use crate::network::ConstraintId;
use crate::network::NodeId;

/// Errors raised for malformed input networks, before any graph construction
/// takes place.
///
/// These are caller errors and are distinct from both the
/// [`Controllability::Uncontrollable`](crate::Controllability::Uncontrollable)
/// verdict (a normal result) and internal invariant violations (which panic).
#[derive(Clone, Copy, Debug, thiserror::Error, PartialEq)]
pub enum NetworkError {
    /// Node id 0 is reserved for the artificial super-source.
    #[error("constraint {constraint} uses the reserved node id 0")]
    ReservedNodeZero { constraint: ConstraintId },

    /// A constraint endpoint outside `1..=num_nodes`.
    #[error("constraint {constraint} refers to node {node} outside the network (num_nodes = {num_nodes})")]
    NodeOutOfRange {
        constraint: ConstraintId,
        node: NodeId,
        num_nodes: u32,
    },

    /// A contingent constraint requires `0 <= lb <= ub` with a finite upper
    /// bound.
    #[error("contingent constraint {constraint} has invalid bounds [{lower}, {upper}]")]
    InvalidContingentBounds {
        constraint: ConstraintId,
        lower: f64,
        upper: f64,
    },

    /// The designated start node must be an event of the network; node 0 is
    /// the artificial super-source.
    #[error("start node {start_node} is outside the network (num_nodes = {num_nodes})")]
    StartNodeOutOfRange { start_node: NodeId, num_nodes: u32 },
}
