use crate::basic_types::LinearExpression;

/// The verdict of a dynamic controllability check.
#[derive(Clone, Debug, PartialEq)]
pub enum Controllability {
    /// An execution strategy exists which satisfies all constraints no matter
    /// how the contingent durations resolve.
    Controllable,
    /// No such strategy exists. The conflicts are linear combinations of
    /// original constraint bounds which provably sum to a negative quantity.
    Uncontrollable(Vec<LinearExpression>),
}

impl Controllability {
    pub fn is_controllable(&self) -> bool {
        matches!(self, Controllability::Controllable)
    }

    /// The conflict explanations, if the network is uncontrollable.
    pub fn conflicts(&self) -> Option<&[LinearExpression]> {
        match self {
            Controllability::Controllable => None,
            Controllability::Uncontrollable(conflicts) => Some(conflicts),
        }
    }
}
