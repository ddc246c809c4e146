mod ledger;
pub mod lexicon;

pub use self::lexicon::{Lexicon, WordSet};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use self::ledger::Ledger;
use crate::protocol::MintStatus;

/// How often the flusher writes the ledger snapshot if codes were issued.
const FLUSH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum MintError {
    #[error("Code space exhausted: every 8-hex-digit code has been issued")]
    ExhaustedSpace,

    #[error("Ledger snapshot at {} is corrupt: {detail}", path.display())]
    StorageCorrupt { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MintError>;

/// An issued 8-hex-digit code.
/// Exactly one textual form per value: `0x` + 8 uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(u32);

impl Code {
    #[allow(dead_code)]
    pub fn value(self) -> u32 {
        self.0
    }

    /// The 8-char lowercase hex form the lexical filter consumes.
    pub fn hex_lower(self) -> String {
        format!("{:08x}", self.0)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// The minting core. All adapters interact through this.
pub struct MintCore {
    ledger: Arc<Ledger>,
    words: Box<dyn WordSet>,
    snapshot_path: PathBuf,
    started_at: Instant,
}

impl MintCore {
    /// Restore the ledger from its snapshot and build the core.
    /// A corrupt snapshot is fatal here — starting with an empty ledger
    /// would reissue previously-used codes.
    pub fn load(snapshot_path: PathBuf, words: Box<dyn WordSet>) -> Result<Self> {
        let ledger = Ledger::load(&snapshot_path)?;
        tracing::info!(
            used = ledger.len(),
            path = %snapshot_path.display(),
            "Ledger restored"
        );
        Ok(Self {
            ledger: Arc::new(ledger),
            words,
            snapshot_path,
            started_at: Instant::now(),
        })
    }

    /// Issue the next code.
    ///
    /// Candidates are drawn uniformly at random and claimed in the ledger
    /// before the lexical filter runs; a candidate the filter rejects stays
    /// claimed and will never be offered again. Collisions with used codes
    /// and filter rejections retry with a fresh draw — the caller only ever
    /// sees a code or `ExhaustedSpace`.
    pub fn next_code(&self) -> Result<Code> {
        loop {
            if self.ledger.is_full() {
                return Err(MintError::ExhaustedSpace);
            }

            let candidate = draw_candidate();
            if !self.ledger.try_claim(candidate) {
                continue;
            }

            let code = Code(candidate);
            if lexicon::is_hexspeak(&code.hex_lower(), self.words.as_ref()) {
                tracing::debug!(code = %code, "Candidate reads as hexspeak, slot consumed");
                continue;
            }

            tracing::debug!(code = %code, "Code issued");
            return Ok(code);
        }
    }

    /// Status overview for the status endpoint.
    pub fn status(&self) -> MintStatus {
        MintStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            used: self.ledger.len(),
            remaining: self.ledger.remaining(),
        }
    }

    /// Write the ledger snapshot now.
    pub fn flush(&self) -> Result<()> {
        self.ledger.save(&self.snapshot_path)?;
        tracing::debug!(
            used = self.ledger.len(),
            path = %self.snapshot_path.display(),
            "Ledger snapshot written"
        );
        Ok(())
    }

    /// Spawn the background flusher: every [`FLUSH_INTERVAL`] it snapshots
    /// the ledger if anything was issued since the last write, so a crash
    /// loses at most one interval of issued codes.
    pub fn spawn_flusher(&self, cancel: CancellationToken) {
        let ledger = self.ledger.clone();
        let path = self.snapshot_path.clone();
        tokio::spawn(async move {
            let mut flushed_len = ledger.len();
            let mut interval = tokio::time::interval(FLUSH_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let len = ledger.len();
                        if len == flushed_len {
                            continue;
                        }
                        match ledger.save(&path) {
                            Ok(()) => {
                                flushed_len = len;
                                tracing::debug!(used = len, "Ledger snapshot written");
                            }
                            Err(e) => tracing::warn!(error = %e, "Periodic ledger flush failed"),
                        }
                    }
                    _ = cancel.cancelled() => {
                        tracing::debug!("Flusher task stopped");
                        break;
                    }
                }
            }
        });
    }

    /// Shut down gracefully: one final snapshot so no issued code is lost.
    pub fn shutdown(&self) -> Result<()> {
        self.flush()?;
        tracing::info!(used = self.ledger.len(), "Mint core shut down");
        Ok(())
    }
}

/// Draw a uniformly random 32-bit candidate from a v4 UUID's random bits.
fn draw_candidate() -> u32 {
    (uuid::Uuid::new_v4().as_u128() & 0xFFFF_FFFF) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// A word set that flags nothing, for tests that only care about
    /// uniqueness and exhaustion.
    struct NoWords;
    impl WordSet for NoWords {
        fn contains_word(&self, _word: &str) -> bool {
            false
        }
    }

    fn core_with_capacity(capacity: u64, words: Box<dyn WordSet>) -> MintCore {
        MintCore {
            ledger: Arc::new(Ledger::with_capacity(capacity)),
            words,
            snapshot_path: std::env::temp_dir().join("hexmint-test-unused.json"),
            started_at: Instant::now(),
        }
    }

    #[test]
    fn code_has_one_canonical_form() {
        assert_eq!(Code(0xdeadbeef).to_string(), "0xDEADBEEF");
        assert_eq!(Code(0x1).to_string(), "0x00000001");
        assert_eq!(Code(0).to_string(), "0x00000000");
        assert_eq!(Code(0xdeadbeef).hex_lower(), "deadbeef");
        assert_eq!(Code(0x1).hex_lower(), "00000001");
    }

    #[test]
    fn issued_codes_are_unique() {
        let core = core_with_capacity(ledger::CODE_SPACE, Box::new(NoWords));
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let code = core.next_code().unwrap();
            assert!(seen.insert(code), "code issued twice: {code}");
            assert!(core.ledger.contains(code.value()));
        }
    }

    #[test]
    fn issued_codes_pass_the_filter() {
        let core = core_with_capacity(ledger::CODE_SPACE, Box::new(Lexicon::embedded()));
        let lex = Lexicon::embedded();
        for _ in 0..200 {
            let code = core.next_code().unwrap();
            assert!(
                !lexicon::is_hexspeak(&code.hex_lower(), &lex),
                "issued a speakable code: {code}"
            );
        }
    }

    #[test]
    fn exhausted_space_is_an_error_not_a_hang() {
        let core = core_with_capacity(3, Box::new(NoWords));
        for _ in 0..3 {
            core.next_code().unwrap();
        }
        let err = core.next_code().unwrap_err();
        assert!(matches!(err, MintError::ExhaustedSpace));
    }

    #[test]
    fn filter_rejections_consume_the_space() {
        // Flags everything: every claimed candidate is rejected, so the
        // generator must drain the space and report exhaustion.
        struct AllWords;
        impl WordSet for AllWords {
            fn contains_word(&self, _word: &str) -> bool {
                true
            }
        }
        let core = core_with_capacity(4, Box::new(AllWords));
        let err = core.next_code().unwrap_err();
        assert!(matches!(err, MintError::ExhaustedSpace));
        assert_eq!(core.ledger.remaining(), 0);
    }

    #[test]
    fn concurrent_callers_get_distinct_codes() {
        let core = Arc::new(core_with_capacity(
            ledger::CODE_SPACE,
            Box::new(Lexicon::embedded()),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let core = core.clone();
            handles.push(std::thread::spawn(move || {
                (0..50)
                    .map(|_| core.next_code().unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for code in handle.join().unwrap() {
                assert!(seen.insert(code), "code issued twice: {code}");
            }
        }
        assert_eq!(seen.len(), 8 * 50);
        assert!(core.ledger.len() >= 8 * 50);
    }

    #[test]
    fn flush_and_load_preserve_issued_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let core = MintCore {
            ledger: Arc::new(Ledger::new()),
            words: Box::new(NoWords),
            snapshot_path: path.clone(),
            started_at: Instant::now(),
        };
        let issued: Vec<Code> = (0..20).map(|_| core.next_code().unwrap()).collect();
        core.shutdown().unwrap();

        let reloaded = MintCore::load(path, Box::new(NoWords)).unwrap();
        for code in issued {
            assert!(reloaded.ledger.contains(code.value()));
        }
    }

    #[test]
    fn status_counts_add_up() {
        let core = core_with_capacity(ledger::CODE_SPACE, Box::new(NoWords));
        core.next_code().unwrap();
        core.next_code().unwrap();
        let status = core.status();
        assert_eq!(status.used, 2);
        assert_eq!(status.used + status.remaining, ledger::CODE_SPACE);
    }
}
