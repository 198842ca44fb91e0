use std::fmt::Display;

use fnv::FnvHashMap;

use crate::network::ConstraintId;

/// Which bound of a constraint a conflict term refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Lower,
    Upper,
}

/// A reference to one bound of one original constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundRef {
    pub kind: BoundKind,
    pub constraint: ConstraintId,
}

impl BoundRef {
    pub fn lower(constraint: ConstraintId) -> Self {
        BoundRef {
            kind: BoundKind::Lower,
            constraint,
        }
    }

    pub fn upper(constraint: ConstraintId) -> Self {
        BoundRef {
            kind: BoundKind::Upper,
            constraint,
        }
    }
}

/// A linear combination of original constraint bounds with integer
/// coefficients.
///
/// Conflicts are reported as such expressions: substituting every referenced
/// bound's actual value yields a strictly negative sum, which is the proof
/// that the network is not dynamically controllable. Terms whose coefficients
/// cancel to zero are dropped, so every stored coefficient is non-zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearExpression {
    terms: FnvHashMap<BoundRef, i32>,
}

impl LinearExpression {
    pub fn new() -> Self {
        LinearExpression::default()
    }

    /// Add `coefficient` to the term for `bound`, removing the term if the
    /// result is zero.
    pub fn add_term(&mut self, bound: BoundRef, coefficient: i32) {
        if coefficient == 0 {
            return;
        }

        let entry = self.terms.entry(bound).or_insert(0);
        *entry += coefficient;
        if *entry == 0 {
            let _ = self.terms.remove(&bound);
        }
    }

    /// Coefficient-wise sum with another expression.
    pub fn add_expression(&mut self, other: &LinearExpression) {
        for (bound, coefficient) in other.iter() {
            self.add_term(bound, coefficient);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoundRef, i32)> + '_ {
        self.terms.iter().map(|(bound, coefficient)| (*bound, *coefficient))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Substitute actual bound values and sum the expression.
    pub fn evaluate(&self, mut bound_value: impl FnMut(BoundRef) -> f64) -> f64 {
        self.iter()
            .map(|(bound, coefficient)| f64::from(coefficient) * bound_value(bound))
            .sum()
    }
}

impl FromIterator<(BoundRef, i32)> for LinearExpression {
    fn from_iter<T: IntoIterator<Item = (BoundRef, i32)>>(iter: T) -> Self {
        let mut expression = LinearExpression::new();
        for (bound, coefficient) in iter {
            expression.add_term(bound, coefficient);
        }
        expression
    }
}

impl Display for LinearExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{{empty}}");
        }

        // Sorted for stable output; the map itself has no meaningful order.
        let mut terms: Vec<_> = self.iter().collect();
        terms.sort_by_key(|(bound, _)| (bound.constraint, bound.kind == BoundKind::Upper));

        for (bound, coefficient) in terms {
            let sign = if coefficient >= 0 { " + " } else { " - " };
            let kind = match bound.kind {
                BoundKind::Lower => "LB",
                BoundKind::Upper => "UB",
            };
            write!(f, "{sign}{}{kind}({})", coefficient.abs(), bound.constraint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_terms_are_removed() {
        let c1 = ConstraintId::new(1);

        let mut expression = LinearExpression::new();
        expression.add_term(BoundRef::lower(c1), 1);
        expression.add_term(BoundRef::upper(c1), -1);
        expression.add_term(BoundRef::lower(c1), -1);

        assert_eq!(expression.len(), 1);
        assert_eq!(
            expression.iter().collect::<Vec<_>>(),
            vec![(BoundRef::upper(c1), -1)]
        );
    }

    #[test]
    fn expression_sum_is_coefficient_wise() {
        let c1 = ConstraintId::new(1);
        let c2 = ConstraintId::new(2);

        let mut lhs: LinearExpression =
            [(BoundRef::upper(c1), 1), (BoundRef::lower(c2), -1)].into_iter().collect();
        let rhs: LinearExpression =
            [(BoundRef::upper(c1), -1), (BoundRef::upper(c2), 2)].into_iter().collect();

        lhs.add_expression(&rhs);

        let expected: LinearExpression =
            [(BoundRef::lower(c2), -1), (BoundRef::upper(c2), 2)].into_iter().collect();
        assert_eq!(lhs, expected);
    }

    #[test]
    fn evaluation_substitutes_bound_values() {
        let c1 = ConstraintId::new(1);
        let c2 = ConstraintId::new(2);

        let expression: LinearExpression =
            [(BoundRef::upper(c2), 1), (BoundRef::upper(c1), -1)].into_iter().collect();

        let value = expression.evaluate(|bound| {
            if bound.constraint == c1 { 10.0 } else { 5.0 }
        });

        assert_eq!(value, -5.0);
    }

    #[test]
    fn display_renders_signed_terms() {
        let c1 = ConstraintId::new(1);

        let expression: LinearExpression =
            [(BoundRef::lower(c1), 1), (BoundRef::upper(c1), -2)].into_iter().collect();

        assert_eq!(expression.to_string(), " + 1LB(1) - 2UB(1)");
    }
}
