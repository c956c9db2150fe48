//! Connection model for weight units
//!
//! Units reference each other by dense integer ID, never by pointer, so
//! cycles are free and the whole table copies trivially. Each weight unit
//! carries three wires; each wire is a tagged peer reference whose `None`
//! variant replaces the original encoding's peer-id 0.

use nevo_genome::{SumsiId, WeightId};

/// Where a weight unit's data input comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InSource {
    /// Not wired; the unit keeps its cached state across the gather pass
    #[default]
    None,
    /// A global input slot
    Global(usize),
    /// A sumsi unit's output
    Sumsi(SumsiId),
}

/// Where a weight unit's output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutTarget {
    /// Not wired; the unit's product is computed but never consumed
    #[default]
    None,
    /// Accumulated into a sumsi unit
    SumsiIn(SumsiId),
    /// Drives another weight unit's control wire
    WeightCtrl(WeightId),
}

/// Where a weight unit's control signal comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CtrlSource {
    /// Not wired; the weight never self-modifies
    #[default]
    None,
    /// Another weight unit's output
    WeightOut(WeightId),
    /// A sumsi unit's output
    SumsiOut(SumsiId),
}

/// The full wiring of one weight unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeightConn {
    /// Data input wire
    pub input: InSource,
    /// Output wire
    pub output: OutTarget,
    /// Control wire feeding the learning update
    pub ctrl: CtrlSource,
}
