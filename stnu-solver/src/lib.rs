//! Dynamic controllability checking for Simple Temporal Networks with
//! Uncertainty (STNU).
//!
//! An STNU is a temporal constraint network in which some durations
//! ("contingent" links) are chosen by the environment rather than the
//! scheduler. The network is *dynamically controllable* when a scheduling
//! strategy exists that reacts only to past observations and satisfies all
//! constraints no matter how the contingent durations resolve.
//!
//! The checker implements Morris' reduction algorithm over the distance
//! graph of the network. When the network is not controllable, the verdict
//! carries conflict explanations: linear combinations of original constraint
//! bounds which provably sum to a negative quantity, suitable for a
//! surrounding relaxation search to repair.
//!
//! ```
//! use stnu_solver::ConstraintId;
//! use stnu_solver::DcOptions;
//! use stnu_solver::MorrisN4Dc;
//! use stnu_solver::TemporalConstraint;
//! use stnu_solver::TemporalNetwork;
//!
//! let mut network = TemporalNetwork::new(3);
//! network.add_constraint(TemporalConstraint::contingent(
//!     ConstraintId::new(1),
//!     1,
//!     2,
//!     0.0,
//!     10.0,
//! ));
//! network.add_constraint(TemporalConstraint::requirement(
//!     ConstraintId::new(2),
//!     1,
//!     3,
//!     5.0,
//!     5.0,
//! ));
//!
//! let verdict = MorrisN4Dc::new(DcOptions::default())
//!     .check(&network)
//!     .expect("the network is well-formed");
//! assert!(verdict.is_controllable());
//! ```

pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod graph;
pub(crate) mod morris;
pub(crate) mod network;
#[doc(hidden)]
pub mod stnu_asserts;

pub use crate::basic_types::BoundKind;
pub use crate::basic_types::BoundRef;
pub use crate::basic_types::Controllability;
pub use crate::basic_types::LinearExpression;
pub use crate::basic_types::NetworkError;
pub use crate::morris::DcOptions;
pub use crate::morris::MorrisN4Dc;
pub use crate::network::ConstraintId;
pub use crate::network::EventNames;
pub use crate::network::NodeId;
pub use crate::network::TemporalConstraint;
pub use crate::network::TemporalNetwork;
