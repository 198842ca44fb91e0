mod controllability;
mod linear_expression;
mod network_error;

pub use controllability::Controllability;
pub use linear_expression::BoundKind;
pub use linear_expression::BoundRef;
pub use linear_expression::LinearExpression;
pub use network_error::NetworkError;
