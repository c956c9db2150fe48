//! Brain construction VM and synchronous dataflow runtime for the nevo engine
//!
//! A brain is a directed network of two unit kinds: multiplicative weight
//! units and summing "sumsi" units with a leaky linear nonlinearity. The
//! network topology is not designed but compiled: a genome's command tape is
//! executed by a two-stack virtual machine that allocates units and wires
//! them together. At runtime the network advances in strictly ordered
//! synchronous passes, the last of which lets the network steer its own
//! weights through dedicated control wires.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub use nevo_genome::{SumsiId, WeightId, NUM_INPUTS};

pub mod brain;
pub mod builder;
pub mod error;
pub mod wiring;

pub use brain::{Brain, NOISE_AMPLITUDE};
pub use builder::{build, BrainBuilder, MAX_SUMSIS, MAX_WEIGHTS};
pub use error::{BrainError, Result};
pub use wiring::{CtrlSource, InSource, OutTarget, WeightConn};
