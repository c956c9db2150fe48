//! Task oracle, evaluation and evolutionary loop for the nevo engine
//!
//! A generation proceeds in lockstep: fresh task surfaces are drawn and
//! their question streams fixed, every brain replays the same streams and
//! accumulates a score, scores become penalised fitness, and rank selection
//! overwrites the worst slots with mutated clones of the best plus one
//! crossover pair. The best genome itself is never modified.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod crossover;
pub mod error;
pub mod evaluate;
pub mod mutate;
pub mod pool;
pub mod task;

pub use crossover::{crossover, crossover_at, MAX_SNIP};
pub use error::{EvolveError, Result};
pub use evaluate::{evaluate_brain, evaluate_pool};
pub use mutate::{mutate, mutate_clone};
pub use pool::{EvolveParams, GenerationSummary, Pool};
pub use task::{Question, TaskSurface};
