//! Text-format persistence for genepools and peer exchange
//!
//! The pool file (`genepool.dat`) is line-oriented: a `genepool_v1` header,
//! the pool size, one `#`-prefixed human-readable summary per genome, then
//! one machine-readable `brain_v1` block per genome. The exchange file
//! (`xpol.dat`) is exactly one `brain_v1` block. Lines starting with `#` are
//! skipped on read; every line read is subject to a 100-character cap.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{GenomeError, Result};
use crate::program::{Command, Genome, Opcode, MAX_GENES};

/// Header line of a pool file
pub const POOL_MAGIC: &str = "genepool_v1";

/// Header line of a per-genome machine block
pub const GENOME_MAGIC: &str = "brain_v1";

/// Maximum accepted length of any line read from a pool or exchange file
pub const MAX_LINE_LEN: usize = 100;

/// Line-by-line reader enforcing the comment and line-length rules
struct LineReader<R> {
    inner: R,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, line_no: 0 }
    }

    /// Next non-comment line, trimmed of the trailing newline
    ///
    /// Returns `None` at end of file. Comment lines still count against the
    /// line cap.
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            let mut buf = String::new();
            let n = self.inner.read_line(&mut buf)?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = buf.trim_end_matches(['\n', '\r']);
            if line.len() > MAX_LINE_LEN {
                return Err(GenomeError::LineTooLong {
                    line: self.line_no,
                    length: line.len(),
                    max: MAX_LINE_LEN,
                });
            }
            if line.starts_with('#') {
                continue;
            }
            return Ok(Some(line.to_string()));
        }
    }

    /// Next non-comment line, or an error when the file ends early
    fn expect_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?.ok_or_else(|| {
            GenomeError::invalid_format(self.line_no, format!("unexpected end of file, expected {}", what))
        })
    }

    fn parse_f32(&mut self, what: &str) -> Result<f32> {
        let line = self.expect_line(what)?;
        line.trim().parse::<f32>().map_err(|_| {
            GenomeError::invalid_format(self.line_no, format!("bad {} value {:?}", what, line))
        })
    }

    fn parse_usize(&mut self, what: &str) -> Result<usize> {
        let line = self.expect_line(what)?;
        line.trim().parse::<usize>().map_err(|_| {
            GenomeError::invalid_format(self.line_no, format!("bad {} value {:?}", what, line))
        })
    }

    fn parse_i32(&mut self, what: &str) -> Result<i32> {
        let line = self.expect_line(what)?;
        line.trim().parse::<i32>().map_err(|_| {
            GenomeError::invalid_format(self.line_no, format!("bad {} value {:?}", what, line))
        })
    }
}

/// Write one machine-readable `brain_v1` block
pub fn write_genome_block<W: Write>(w: &mut W, genome: &Genome) -> Result<()> {
    writeln!(w, "{}", GENOME_MAGIC)?;
    writeln!(w, "{:.6}", genome.learning_rate)?;
    writeln!(w, "{:.6}", genome.thinking_time)?;
    writeln!(w, "{}", genome.commands.len())?;
    for cmd in &genome.commands {
        writeln!(w, "{}", cmd.op.code())?;
        writeln!(w, "{}", cmd.arg)?;
    }
    Ok(())
}

/// Read one machine-readable `brain_v1` block
fn read_genome_block_from<R: BufRead>(lines: &mut LineReader<R>) -> Result<Genome> {
    let magic = lines.expect_line("genome header")?;
    if magic != GENOME_MAGIC {
        return Err(GenomeError::invalid_format(
            lines.line_no,
            format!("expected {:?}, found {:?}", GENOME_MAGIC, magic),
        ));
    }
    let learning_rate = lines.parse_f32("learning_rate")?;
    let thinking_time = lines.parse_f32("thinking_time")?;
    let length = lines.parse_usize("genome length")?;
    if length > MAX_GENES {
        return Err(GenomeError::TooManyGenes {
            count: length,
            max: MAX_GENES,
        });
    }
    let mut commands = Vec::with_capacity(length);
    for _ in 0..length {
        let code = lines.parse_i32("opcode")?;
        let code = u8::try_from(code)
            .map_err(|_| GenomeError::invalid_format(lines.line_no, "negative opcode code"))?;
        let op = Opcode::from_code(code)?;
        let arg = lines.parse_i32("arg")?;
        commands.push(Command::new(op, arg));
    }
    let genome = Genome::new(commands, learning_rate, thinking_time);
    genome.validate()?;
    Ok(genome)
}

/// Read one `brain_v1` block from a reader
pub fn read_genome_block<R: BufRead>(reader: R) -> Result<Genome> {
    let mut lines = LineReader::new(reader);
    read_genome_block_from(&mut lines)
}

/// Write the whole genepool to `path`
pub fn write_pool<P: AsRef<Path>>(path: P, genomes: &[Genome]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{}", POOL_MAGIC)?;
    writeln!(w, "# nevo genepool")?;
    writeln!(w, "{}", genomes.len())?;
    for (slot, genome) in genomes.iter().enumerate() {
        writeln!(w, "# [{:3}] {}", slot, genome.summary())?;
    }
    for genome in genomes {
        write_genome_block(&mut w, genome)?;
    }
    w.flush()?;
    log::debug!("wrote {} genomes to {}", genomes.len(), path.as_ref().display());
    Ok(())
}

/// Load a genepool from `path`, requiring exactly `expected_size` genomes
pub fn read_pool<P: AsRef<Path>>(path: P, expected_size: usize) -> Result<Vec<Genome>> {
    let file = File::open(path.as_ref())?;
    let mut lines = LineReader::new(BufReader::new(file));

    let magic = lines.expect_line("pool header")?;
    if magic != POOL_MAGIC {
        return Err(GenomeError::invalid_format(
            lines.line_no,
            format!("expected {:?}, found {:?}", POOL_MAGIC, magic),
        ));
    }
    let size = lines.parse_usize("pool size")?;
    if size != expected_size {
        return Err(GenomeError::PoolSizeMismatch {
            found: size,
            expected: expected_size,
        });
    }
    let mut genomes = Vec::with_capacity(size);
    for _ in 0..size {
        genomes.push(read_genome_block_from(&mut lines)?);
    }
    log::debug!("read {} genomes from {}", genomes.len(), path.as_ref().display());
    Ok(genomes)
}

/// Write one genome to the peer-exchange file
pub fn write_exchange<P: AsRef<Path>>(path: P, genome: &Genome) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut w = BufWriter::new(file);
    write_genome_block(&mut w, genome)?;
    w.flush()?;
    Ok(())
}

/// Read one genome from the peer-exchange file
pub fn read_exchange<P: AsRef<Path>>(path: P) -> Result<Genome> {
    let file = File::open(path.as_ref())?;
    read_genome_block(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ARG_NONE, ARG_RAND_SUMSI, ARG_RAND_WEIGHT};

    fn sample_genome() -> Genome {
        let mut genome = Genome::seed();
        genome.commands.push(Command::new(Opcode::NewWeight, -37));
        genome
            .commands
            .push(Command::new(Opcode::SumsiToWeightIn, ARG_RAND_WEIGHT));
        genome
            .commands
            .push(Command::new(Opcode::WeightToSumsiIn, ARG_RAND_SUMSI));
        genome.learning_rate = 0.525;
        genome.thinking_time = 17.25;
        genome
    }

    #[test]
    fn test_genome_block_roundtrip() {
        let genome = sample_genome();
        let mut buf = Vec::new();
        write_genome_block(&mut buf, &genome).unwrap();
        let back = read_genome_block(buf.as_slice()).unwrap();
        assert_eq!(back.commands, genome.commands);
        assert!((back.learning_rate - genome.learning_rate).abs() < 1e-6);
        assert!((back.thinking_time - genome.thinking_time).abs() < 1e-6);
    }

    #[test]
    fn test_pool_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genepool.dat");
        let genomes = vec![Genome::seed(), sample_genome(), Genome::seed()];
        write_pool(&path, &genomes).unwrap();
        let back = read_pool(&path, 3).unwrap();
        assert_eq!(back.len(), 3);
        for (a, b) in back.iter().zip(&genomes) {
            assert_eq!(a.commands, b.commands);
        }
    }

    #[test]
    fn test_pool_size_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genepool.dat");
        write_pool(&path, &[Genome::seed(), Genome::seed()]).unwrap();
        let err = read_pool(&path, 3).unwrap_err();
        assert!(matches!(err, GenomeError::PoolSizeMismatch { found: 2, expected: 3 }));
    }

    #[test]
    fn test_comments_skipped_and_long_lines_rejected() {
        let mut text = String::new();
        text.push_str("# leading comment\n");
        let mut block = Vec::new();
        write_genome_block(&mut block, &Genome::seed()).unwrap();
        text.push_str(std::str::from_utf8(&block).unwrap());
        let genome = read_genome_block(text.as_bytes()).unwrap();
        assert_eq!(genome.commands, Genome::seed().commands);

        let long = format!("{}\n", "x".repeat(MAX_LINE_LEN + 1));
        let err = read_genome_block(long.as_bytes()).unwrap_err();
        assert!(matches!(err, GenomeError::LineTooLong { .. }));
    }

    #[test]
    fn test_unknown_opcode_rejected() {
        let text = "brain_v1\n0.800000\n40.000000\n1\n99\n0\n";
        let err = read_genome_block(text.as_bytes()).unwrap_err();
        assert!(matches!(err, GenomeError::UnknownOpcode { code: 99 }));
    }

    #[test]
    fn test_truncated_block_rejected() {
        let text = "brain_v1\n0.800000\n40.000000\n2\n1\n50\n";
        let err = read_genome_block(text.as_bytes()).unwrap_err();
        assert!(matches!(err, GenomeError::InvalidFormat { .. }));
    }

    #[test]
    fn test_exchange_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xpol.dat");
        let genome = sample_genome();
        write_exchange(&path, &genome).unwrap();
        let back = read_exchange(&path).unwrap();
        assert_eq!(back.commands, genome.commands);
    }
}
