//! Error types for brain construction and execution

use thiserror::Error;

/// Result type for brain operations
pub type Result<T> = std::result::Result<T, BrainError>;

/// Errors that can occur while building a brain from a genome
///
/// All of these are per-genome failures: the evolver discards the offending
/// genome and refills its slot rather than aborting the process.
#[derive(Error, Debug)]
pub enum BrainError {
    /// The genome itself is invalid (capacity or hyperparameter range)
    #[error("Genome error: {source}")]
    Genome {
        #[from]
        /// Source genome error
        source: nevo_genome::GenomeError,
    },

    /// Weight-unit capacity exceeded during construction
    #[error("Too many weight units: limit {max}")]
    TooManyWeights {
        /// Capacity limit
        max: usize,
    },

    /// Sumsi-unit capacity exceeded during construction
    #[error("Too many sumsi units: limit {max}")]
    TooManySumsis {
        /// Capacity limit
        max: usize,
    },

    /// `WEIGHT_TO_INPUT` argument outside the global input range
    #[error("Input index {index} out of range (inputs: {num_inputs})")]
    InvalidInputIndex {
        /// The offending index
        index: i32,
        /// Number of global input slots
        num_inputs: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrainError::InvalidInputIndex {
            index: 12,
            num_inputs: 9,
        };
        assert!(format!("{}", err).contains("12"));
    }
}
