use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use crate::persist;

use super::{MintError, Result};

/// Number of distinct 8-hex-digit codes.
pub(crate) const CODE_SPACE: u64 = 1 << 32;

/// The record of every code ever issued (or consumed by the filter).
/// Source of truth for uniqueness — the snapshot on disk is just a copy.
#[derive(Debug)]
pub(crate) struct Ledger {
    used: Mutex<HashSet<u32>>,
    capacity: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_capacity(CODE_SPACE)
    }

    /// A ledger that treats `capacity` claims as exhausting the space.
    /// Production ledgers always span the full 32-bit space.
    pub(crate) fn with_capacity(capacity: u64) -> Self {
        Self {
            used: Mutex::new(HashSet::new()),
            capacity,
        }
    }

    /// Restore a ledger from its snapshot. A missing snapshot is an empty
    /// ledger; an unreadable one aborts startup rather than silently
    /// reissuing old codes.
    pub fn load(path: &Path) -> Result<Self> {
        let entries: Option<Vec<String>> =
            persist::read_json_if_exists(path).map_err(|e| match e.kind() {
                std::io::ErrorKind::InvalidData => MintError::StorageCorrupt {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                },
                _ => MintError::Io(e),
            })?;

        let ledger = Self::new();
        {
            let mut used = ledger.used.lock().unwrap();
            for entry in entries.unwrap_or_default() {
                let code =
                    parse_snapshot_entry(&entry).ok_or_else(|| MintError::StorageCorrupt {
                        path: path.to_path_buf(),
                        detail: format!("not an 8-hex-digit code: {entry:?}"),
                    })?;
                used.insert(code);
            }
        }
        Ok(ledger)
    }

    /// Snapshot the full used-set to disk, replacing any prior snapshot.
    /// Entries are sorted so identical ledgers produce identical files.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut codes: Vec<u32> = {
            let used = self.used.lock().unwrap();
            used.iter().copied().collect()
        };
        codes.sort_unstable();
        let entries: Vec<String> = codes.into_iter().map(|c| format!("{c:08x}")).collect();
        persist::write_json(path, &entries)?;
        Ok(())
    }

    /// Atomically claim a code: returns false if it was already used.
    /// This is the generator's check-then-mark critical section — two
    /// callers racing on the same candidate cannot both see it as fresh.
    pub fn try_claim(&self, code: u32) -> bool {
        let mut used = self.used.lock().unwrap();
        used.insert(code)
    }

    /// Record a code as used. Idempotent.
    #[allow(dead_code)]
    pub fn mark_used(&self, code: u32) {
        let mut used = self.used.lock().unwrap();
        used.insert(code);
    }

    #[allow(dead_code)]
    pub fn contains(&self, code: u32) -> bool {
        let used = self.used.lock().unwrap();
        used.contains(&code)
    }

    /// Number of codes consumed so far.
    pub fn len(&self) -> u64 {
        let used = self.used.lock().unwrap();
        used.len() as u64
    }

    /// True once every code in the space has been consumed.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.len())
    }
}

/// Snapshot entries are fixed-width lowercase hex, e.g. "00c0ffee".
fn parse_snapshot_entry(entry: &str) -> Option<u32> {
    if entry.len() != 8 || !entry.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(entry, 16).ok()
}
