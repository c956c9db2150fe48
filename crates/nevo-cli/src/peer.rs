//! Signal-driven elite exchange with a sibling process
//!
//! Two engine processes can trade elite genomes through a shared file.
//! SIGUSR1 carries the download handshake (request, then ready), SIGUSR2
//! the upload push and its acknowledgement. Signal arrival is recorded
//! async-safely by `signal-hook`; the state machine only advances at the
//! generation tick, and all file I/O happens there, never in signal
//! context. A signal arriving in a state that does not expect it is fatal.

use std::path::{Path, PathBuf};

use rand::Rng;
use signal_hook::consts::{SIGUSR1, SIGUSR2};
use signal_hook::iterator::Signals;
use tracing::{info, warn};

use nevo_evolve::Pool;
use nevo_genome::{read_exchange, write_exchange};

use crate::error::{CliError, CliResult};

/// Name of the exchange file within the workspace directory
pub const EXCHANGE_FILE: &str = "xpol.dat";

/// Protocol states of one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Idle; either side may initiate
    Noop,
    /// We requested an elite and await the peer's ready signal
    Download,
    /// The exchange file holds a genome for us to read
    DownloadReady,
    /// We owe the peer a write, or await its ack of our push
    Upload,
}

/// The pure protocol state machine, separated from signal plumbing so the
/// transitions can be tested directly
#[derive(Debug)]
struct ExchangeMachine {
    state: PeerState,
    /// Entered Upload because the peer asked us to serve its download
    serve_request: bool,
    /// Entered DownloadReady via a push; reading must be acked with SIGUSR2
    push_ack: bool,
}

impl ExchangeMachine {
    fn new() -> Self {
        Self {
            state: PeerState::Noop,
            serve_request: false,
            push_ack: false,
        }
    }

    /// Fold one received signal into the state
    fn apply_signal(&mut self, signal: i32) -> CliResult<()> {
        match (signal, self.state) {
            // Peer requests our elite.
            (SIGUSR1, PeerState::Noop) => {
                self.state = PeerState::Upload;
                self.serve_request = true;
            }
            // Peer finished writing the elite we asked for.
            (SIGUSR1, PeerState::Download) => {
                self.state = PeerState::DownloadReady;
            }
            // Peer pushed an elite at us.
            (SIGUSR2, PeerState::Noop) => {
                self.state = PeerState::DownloadReady;
                self.push_ack = true;
            }
            // Peer acked the elite we pushed.
            (SIGUSR2, PeerState::Upload) if !self.serve_request => {
                self.state = PeerState::Noop;
            }
            (signal, state) => {
                return Err(CliError::protocol(format!(
                    "signal {} arrived in state {:?}",
                    signal, state
                )));
            }
        }
        Ok(())
    }
}

/// One endpoint of the elite-exchange protocol
pub struct PeerLink {
    peer_pid: i32,
    machine: ExchangeMachine,
    signals: Signals,
    exchange_path: PathBuf,
    interval: u64,
    next_is_download: bool,
}

impl PeerLink {
    /// Register the signal handlers and set up the link
    pub fn new(peer_pid: i32, dir: &Path, interval: u64) -> CliResult<Self> {
        if peer_pid <= 0 {
            return Err(CliError::invalid_args(format!(
                "peer pid must be positive, got {}",
                peer_pid
            )));
        }
        if interval == 0 {
            return Err(CliError::invalid_args("exchange interval must be >= 1"));
        }
        let signals = Signals::new([SIGUSR1, SIGUSR2])?;
        Ok(Self {
            peer_pid,
            machine: ExchangeMachine::new(),
            signals,
            exchange_path: dir.join(EXCHANGE_FILE),
            interval,
            next_is_download: true,
        })
    }

    fn send_signal(&self, signal: i32) -> CliResult<()> {
        let rc = unsafe { libc::kill(self.peer_pid, signal) };
        if rc != 0 {
            return Err(CliError::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Service the exchange at the end of a generation
    ///
    /// Drains pending signals into the state machine, performs any file work
    /// the current state calls for, and initiates a new exchange every
    /// `interval` generations while idle.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        pool: &mut Pool,
        generation: u64,
        rng: &mut R,
    ) -> CliResult<()> {
        for signal in self.signals.pending() {
            self.machine.apply_signal(signal)?;
        }

        match self.machine.state {
            PeerState::Upload if self.machine.serve_request => {
                write_exchange(&self.exchange_path, pool.best_genome())?;
                self.send_signal(SIGUSR1)?;
                self.machine.serve_request = false;
                self.machine.state = PeerState::Noop;
                info!("served elite download to peer {}", self.peer_pid);
            }
            PeerState::DownloadReady => {
                let genome = read_exchange(&self.exchange_path)?;
                match pool.inject_elite(genome, rng) {
                    Ok(slot) => info!("adopted peer elite into slot {}", slot),
                    Err(e) => warn!("discarding unusable peer elite: {}", e),
                }
                if self.machine.push_ack {
                    self.send_signal(SIGUSR2)?;
                    self.machine.push_ack = false;
                }
                self.machine.state = PeerState::Noop;
            }
            PeerState::Noop if generation > 0 && generation % self.interval == 0 => {
                if self.next_is_download {
                    self.send_signal(SIGUSR1)?;
                    self.machine.state = PeerState::Download;
                    info!("requested elite from peer {}", self.peer_pid);
                } else {
                    write_exchange(&self.exchange_path, pool.best_genome())?;
                    self.send_signal(SIGUSR2)?;
                    self.machine.state = PeerState::Upload;
                    info!("pushed elite to peer {}", self.peer_pid);
                }
                self.next_is_download = !self.next_is_download;
            }
            // Waiting on the peer, or idle off-cadence.
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_handshake_transitions() {
        let mut machine = ExchangeMachine::new();
        // We initiate a download (the link sets Download itself).
        machine.state = PeerState::Download;
        machine.apply_signal(SIGUSR1).unwrap();
        assert_eq!(machine.state, PeerState::DownloadReady);
        assert!(!machine.push_ack);
    }

    #[test]
    fn test_serving_a_peer_request() {
        let mut machine = ExchangeMachine::new();
        machine.apply_signal(SIGUSR1).unwrap();
        assert_eq!(machine.state, PeerState::Upload);
        assert!(machine.serve_request);
    }

    #[test]
    fn test_push_and_ack_transitions() {
        // Receiving side of a push.
        let mut machine = ExchangeMachine::new();
        machine.apply_signal(SIGUSR2).unwrap();
        assert_eq!(machine.state, PeerState::DownloadReady);
        assert!(machine.push_ack);

        // Sending side awaiting the ack.
        let mut machine = ExchangeMachine::new();
        machine.state = PeerState::Upload;
        machine.apply_signal(SIGUSR2).unwrap();
        assert_eq!(machine.state, PeerState::Noop);
    }

    #[test]
    fn test_unexpected_signals_are_fatal() {
        let mut machine = ExchangeMachine::new();
        machine.state = PeerState::DownloadReady;
        assert!(machine.apply_signal(SIGUSR1).is_err());

        let mut machine = ExchangeMachine::new();
        machine.state = PeerState::Download;
        assert!(machine.apply_signal(SIGUSR2).is_err());

        // An ack while serving a request is out of protocol.
        let mut machine = ExchangeMachine::new();
        machine.apply_signal(SIGUSR1).unwrap();
        assert!(machine.apply_signal(SIGUSR2).is_err());
    }
}
