//! Error types for genome representation and persistence

use thiserror::Error;

/// Result type for genome operations
pub type Result<T> = std::result::Result<T, GenomeError>;

/// Errors that can occur while handling genomes and pool files
#[derive(Error, Debug)]
pub enum GenomeError {
    /// Genome tape exceeds the command capacity
    #[error("Too many genes: {count} (max {max})")]
    TooManyGenes {
        /// Number of commands on the tape
        count: usize,
        /// Capacity limit
        max: usize,
    },

    /// Hyperparameter outside its legal range
    #[error("Invalid hyperparameter {name}: {value} (expected {constraint})")]
    InvalidHyperparameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
        /// Constraint description
        constraint: &'static str,
    },

    /// Unknown opcode wire code in a pool file
    #[error("Unknown opcode code {code}")]
    UnknownOpcode {
        /// The code that failed to decode
        code: u8,
    },

    /// A pool-file line exceeded the 100-character cap
    #[error("Line {line} too long ({length} chars, max {max})")]
    LineTooLong {
        /// 1-based line number
        line: usize,
        /// Observed length
        length: usize,
        /// Line-length cap
        max: usize,
    },

    /// Malformed pool or exchange file
    #[error("Invalid pool format at line {line}: {reason}")]
    InvalidFormat {
        /// 1-based line number
        line: usize,
        /// Reason for the failure
        reason: String,
    },

    /// Pool size in the file disagrees with the configured pool size
    #[error("Pool size mismatch: file has {found}, expected {expected}")]
    PoolSizeMismatch {
        /// Size recorded in the file
        found: usize,
        /// Size the caller expected
        expected: usize,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },
}

impl GenomeError {
    /// Create an invalid-format error
    pub fn invalid_format(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenomeError::TooManyGenes {
            count: 60_000,
            max: 50_000,
        };
        assert!(format!("{}", err).contains("60000"));

        let err = GenomeError::invalid_format(7, "missing arg line");
        assert!(format!("{}", err).contains("line 7"));
    }
}
