use std::sync::RwLock;

use tokio::sync::broadcast;

/// Append-only in-memory sequence with offset-based reads.
///
/// Appends broadcast a unit signal so consumers can wait for new entries
/// instead of polling. Entries are never removed; an offset identifies a
/// record for the lifetime of the journal.
pub struct Journal<T> {
    entries: RwLock<Vec<T>>,
    notify_tx: broadcast::Sender<()>,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        let (notify_tx, _) = broadcast::channel(64);
        Self {
            entries: RwLock::new(Vec::new()),
            notify_tx,
        }
    }
}

impl<T: Clone> Journal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry; returns its offset.
    pub fn append(&self, entry: T) -> u64 {
        let mut guard = self.write_entries();
        let offset = guard.len() as u64;
        guard.push(entry);
        drop(guard);
        // Notify waiting consumers (ignore if none).
        let _ = self.notify_tx.send(());
        offset
    }

    /// Append an entry built from its own offset. The build and the append
    /// happen under one lock so the offset inside the entry is authoritative.
    pub fn append_with(&self, make: impl FnOnce(u64) -> T) -> T {
        let mut guard = self.write_entries();
        let offset = guard.len() as u64;
        let entry = make(offset);
        guard.push(entry.clone());
        drop(guard);
        let _ = self.notify_tx.send(());
        entry
    }

    /// Read up to `max` entries starting at `offset`.
    pub fn read_from(&self, offset: u64, max: usize) -> Vec<T> {
        let guard = self.read_entries();
        guard
            .iter()
            .skip(offset as usize)
            .take(max)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> u64 {
        self.read_entries().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe_notify(&self) -> broadcast::Receiver<()> {
        self.notify_tx.subscribe()
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, Vec<T>> {
        match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("journal write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Vec<T>> {
        match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("journal read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
