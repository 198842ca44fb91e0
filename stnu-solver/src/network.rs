//! The input data model: temporal networks with controllable and contingent
//! constraints.

use std::fmt::Display;

use fnv::FnvHashMap;

/// Identifier of a temporal event.
///
/// Events are numbered `1..=num_nodes`; the id `0` is reserved for the
/// artificial super-source used by the shortest-path machinery and is rejected
/// in input constraints. The checker may allocate ids above `num_nodes` for
/// normalization splits.
pub type NodeId = u32;

/// The reserved super-source node.
pub(crate) const SOURCE_NODE: NodeId = 0;

/// Identifier of a [`TemporalConstraint`], assigned by the caller.
///
/// Conflict expressions refer back to constraint bounds through these ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(u32);

impl ConstraintId {
    pub fn new(id: u32) -> Self {
        ConstraintId(id)
    }
}

impl Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single temporal constraint between two events.
///
/// A *controllable* (requirement) constraint states that the scheduler must
/// place `to` within `[lower_bound, upper_bound]` of `fro`. An uncontrollable
/// (*contingent*) constraint states that the environment chooses the duration
/// from that interval, outside the scheduler's control.
///
/// The effective bounds are read through [`TemporalConstraint::lower_bound`]
/// and [`TemporalConstraint::upper_bound`], which return the relaxed override
/// when one is present. The surrounding relaxation search installs overrides
/// to re-check a network with loosened bounds without rebuilding it.
#[derive(Clone, Debug)]
pub struct TemporalConstraint {
    pub id: ConstraintId,
    pub fro: NodeId,
    pub to: NodeId,
    raw_lower_bound: f64,
    raw_upper_bound: f64,
    pub controllable: bool,
    pub activated: bool,
    relaxed_lower_bound: Option<f64>,
    relaxed_upper_bound: Option<f64>,
}

impl TemporalConstraint {
    /// Create a requirement (controllable) constraint.
    pub fn requirement(id: ConstraintId, fro: NodeId, to: NodeId, lb: f64, ub: f64) -> Self {
        TemporalConstraint {
            id,
            fro,
            to,
            raw_lower_bound: lb,
            raw_upper_bound: ub,
            controllable: true,
            activated: true,
            relaxed_lower_bound: None,
            relaxed_upper_bound: None,
        }
    }

    /// Create a contingent (uncontrollable) constraint.
    pub fn contingent(id: ConstraintId, fro: NodeId, to: NodeId, lb: f64, ub: f64) -> Self {
        TemporalConstraint {
            controllable: false,
            ..TemporalConstraint::requirement(id, fro, to, lb, ub)
        }
    }

    /// The effective lower bound: the relaxed override if present, otherwise
    /// the raw bound.
    pub fn lower_bound(&self) -> f64 {
        self.relaxed_lower_bound.unwrap_or(self.raw_lower_bound)
    }

    /// The effective upper bound: the relaxed override if present, otherwise
    /// the raw bound.
    pub fn upper_bound(&self) -> f64 {
        self.relaxed_upper_bound.unwrap_or(self.raw_upper_bound)
    }

    /// Override the lower bound without losing the raw value.
    pub fn relax_lower_bound(&mut self, lb: f64) {
        self.relaxed_lower_bound = Some(lb);
    }

    /// Override the upper bound without losing the raw value.
    pub fn relax_upper_bound(&mut self, ub: f64) {
        self.relaxed_upper_bound = Some(ub);
    }

    /// Remove any relaxed overrides.
    pub fn clear_relaxations(&mut self) {
        self.relaxed_lower_bound = None;
        self.relaxed_upper_bound = None;
    }
}

/// Human-readable names for events, used only when rendering edges and
/// conflicts for diagnostics. Never consulted by the algorithm.
#[derive(Clone, Debug, Default)]
pub struct EventNames {
    names: FnvHashMap<NodeId, String>,
}

impl EventNames {
    pub fn set(&mut self, node: NodeId, name: impl Into<String>) {
        let _ = self.names.insert(node, name.into());
    }

    pub fn get(&self, node: NodeId) -> Option<&str> {
        self.names.get(&node).map(String::as_str)
    }

    /// Name a node synthesized by splitting `base` during normalization.
    pub(crate) fn set_primed(&mut self, node: NodeId, base: NodeId) {
        let name = match self.get(base) {
            Some(base_name) => format!("{base_name}'"),
            None => format!("{base}'"),
        };
        self.set(node, name);
    }
}

/// A temporal network: events `1..=num_nodes` connected by
/// [`TemporalConstraint`]s.
///
/// Only activated constraints participate in controllability checking. When
/// `start_node` is absent, the artificial super-source is connected to every
/// event instead of only the designated start.
#[derive(Clone, Debug, Default)]
pub struct TemporalNetwork {
    pub num_nodes: u32,
    pub start_node: Option<NodeId>,
    constraints: Vec<TemporalConstraint>,
    pub event_names: EventNames,
}

impl TemporalNetwork {
    pub fn new(num_nodes: u32) -> Self {
        TemporalNetwork {
            num_nodes,
            ..TemporalNetwork::default()
        }
    }

    pub fn add_constraint(&mut self, constraint: TemporalConstraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> impl Iterator<Item = &'_ TemporalConstraint> {
        self.constraints.iter()
    }

    pub fn constraints_mut(&mut self) -> impl Iterator<Item = &'_ mut TemporalConstraint> {
        self.constraints.iter_mut()
    }

    /// Look up a constraint by id.
    pub fn constraint(&self, id: ConstraintId) -> Option<&TemporalConstraint> {
        self.constraints.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_bounds_shadow_raw_bounds() {
        let mut constraint = TemporalConstraint::requirement(ConstraintId::new(1), 1, 2, 3.0, 7.0);
        assert_eq!(constraint.lower_bound(), 3.0);
        assert_eq!(constraint.upper_bound(), 7.0);

        constraint.relax_lower_bound(1.0);
        constraint.relax_upper_bound(9.0);
        assert_eq!(constraint.lower_bound(), 1.0);
        assert_eq!(constraint.upper_bound(), 9.0);

        constraint.clear_relaxations();
        assert_eq!(constraint.lower_bound(), 3.0);
        assert_eq!(constraint.upper_bound(), 7.0);
    }

    #[test]
    fn primed_names_fall_back_to_node_numbers() {
        let mut names = EventNames::default();
        names.set(2, "rendezvous");

        names.set_primed(5, 2);
        names.set_primed(6, 3);

        assert_eq!(names.get(5), Some("rendezvous'"));
        assert_eq!(names.get(6), Some("3'"));
    }
}
