//! Error types for the evolutionary loop

use thiserror::Error;

/// Result type for evolver operations
pub type Result<T> = std::result::Result<T, EvolveError>;

/// Errors that can occur while evolving the pool
#[derive(Error, Debug)]
pub enum EvolveError {
    /// Genome representation or persistence error
    #[error("Genome error: {source}")]
    Genome {
        #[from]
        /// Source genome error
        source: nevo_genome::GenomeError,
    },

    /// Brain construction error
    #[error("Brain error: {source}")]
    Brain {
        #[from]
        /// Source brain error
        source: nevo_brain::BrainError,
    },

    /// Rejection sampling failed to find a balanced task surface
    #[error("No balanced task surface after {attempts} attempts")]
    TaskGeneration {
        /// Number of surfaces tried
        attempts: usize,
    },

    /// Crossover produced a child beyond the gene capacity
    #[error("Crossover child too long: {length} genes (max {max})")]
    CrossoverOverflow {
        /// Child tape length
        length: usize,
        /// Capacity limit
        max: usize,
    },

    /// Invalid evolver parameter
    #[error("Invalid parameter {name}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value rendered as text
        value: String,
        /// Constraint description
        constraint: &'static str,
    },

    /// A pool slot could not be refilled with a buildable genome
    #[error("Failed to regenerate pool slot {slot} after {attempts} attempts")]
    SlotRegeneration {
        /// Slot index
        slot: usize,
        /// Retry budget that was exhausted
        attempts: usize,
    },
}

impl EvolveError {
    /// Create an invalid-parameter error
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        constraint: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvolveError::invalid_parameter("pool_size", 2, ">= 4");
        assert!(format!("{}", err).contains("pool_size"));

        let err = EvolveError::TaskGeneration { attempts: 10_000 };
        assert!(format!("{}", err).contains("10000"));
    }
}
