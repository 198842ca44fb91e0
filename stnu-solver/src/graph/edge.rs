use std::fmt::Display;

use crate::containers::StorageKey;
use crate::network::EventNames;
use crate::network::NodeId;

/// Identifier of an edge in a [`DistanceGraph`](crate::graph::DistanceGraph).
///
/// Two edges with identical endpoints, weight and kind are still distinct
/// edges with distinct ids; provenance is attached per id, never per value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EdgeId {
    id: u32,
}

impl StorageKey for EdgeId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        EdgeId { id: index as u32 }
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.id)
    }
}

/// The kind of a distance graph edge in Morris' terminology.
///
/// Labeled kinds carry the contingent event conditioning the edge, so an
/// upper-case edge without a label (or an ordinary edge with one) cannot be
/// represented at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum EdgeKind {
    /// An unconditional requirement edge.
    Ordinary,
    /// Holds only when the labeled contingent duration takes its maximum.
    UpperCase(NodeId),
    /// Holds only when the labeled contingent duration takes its minimum.
    LowerCase(NodeId),
}

impl EdgeKind {
    pub(crate) fn label(&self) -> Option<NodeId> {
        match self {
            EdgeKind::Ordinary => None,
            EdgeKind::UpperCase(label) | EdgeKind::LowerCase(label) => Some(*label),
        }
    }
}

/// A weighted directed edge of the distance graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DistanceGraphEdge {
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) weight: f64,
    pub(crate) kind: EdgeKind,
}

impl DistanceGraphEdge {
    pub(crate) fn new(from: NodeId, to: NodeId, weight: f64, kind: EdgeKind) -> Self {
        DistanceGraphEdge {
            from,
            to,
            weight,
            kind,
        }
    }

    pub(crate) fn is_lower_case(&self) -> bool {
        matches!(self.kind, EdgeKind::LowerCase(_))
    }

    /// Render the edge with event names substituted for node numbers.
    pub(crate) fn display<'a>(&'a self, names: &'a EventNames) -> impl Display + 'a {
        NamedEdge { edge: self, names }
    }
}

impl Display for DistanceGraphEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            EdgeKind::Ordinary => String::new(),
            EdgeKind::UpperCase(label) => format!("UC({label}):"),
            EdgeKind::LowerCase(label) => format!("LC({label}):"),
        };
        write!(f, "{} ---[{}{:.1}]---> {}", self.from, kind, self.weight, self.to)
    }
}

struct NamedEdge<'a> {
    edge: &'a DistanceGraphEdge,
    names: &'a EventNames,
}

impl Display for NamedEdge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = |node: NodeId| match self.names.get(node) {
            Some(name) => name.to_owned(),
            None => node.to_string(),
        };
        let kind = match self.edge.kind {
            EdgeKind::Ordinary => String::new(),
            EdgeKind::UpperCase(label) => format!("UC({}):", name(label)),
            EdgeKind::LowerCase(label) => format!("LC({}):", name(label)),
        };
        write!(
            f,
            "{} ---[{}{:.1}]---> {}",
            name(self.edge.from),
            kind,
            self.edge.weight,
            name(self.edge.to)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_labeled_edges() {
        let edge = DistanceGraphEdge::new(2, 1, -10.0, EdgeKind::UpperCase(2));
        assert_eq!(edge.to_string(), "2 ---[UC(2):-10.0]---> 1");

        let edge = DistanceGraphEdge::new(1, 2, 5.0, EdgeKind::Ordinary);
        assert_eq!(edge.to_string(), "1 ---[5.0]---> 2");
    }

    #[test]
    fn named_display_substitutes_event_names() {
        let mut names = EventNames::default();
        names.set(1, "launch");
        names.set(2, "landing");

        let edge = DistanceGraphEdge::new(1, 2, 0.0, EdgeKind::LowerCase(2));
        assert_eq!(
            edge.display(&names).to_string(),
            "launch ---[LC(landing):0.0]---> landing"
        );
    }
}
