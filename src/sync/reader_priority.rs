use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{
    token::{Holder, Token},
    RwMutex,
};

/// First readers-writers lock: readers are admitted whenever the reader group is already in.
///
/// Only the first reader of a group competes with writers for the token, and only the last one
/// gives it back. A writer that arrives while readers are active therefore waits for the group to
/// drain completely, and a steady stream of overlapping readers starves it.
#[derive(Default)]
pub struct ReaderPriority {
    // Serializes the 0 -> 1 and 1 -> 0 transitions of `readers`
    entry: Mutex<()>,
    // Only modified under `entry`
    readers: AtomicUsize,
    token: Token,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    Idle,
    Readers(usize),
    /// The reader group holds the token with a count of zero: its first reader is on the way in
    /// or its last one on the way out. Anything but a passing glimpse of this is a leaked token.
    Settling,
    Writer,
}

impl ReaderPriority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader_count(&self) -> usize {
        self.readers.load(Ordering::Acquire)
    }

    pub fn holder(&self) -> Option<Holder> {
        self.token.holder()
    }

    /// Snapshot for observation. Exact while the caller holds a guard or nobody does.
    pub fn state(&self) -> LockState {
        let readers = self.reader_count();
        match self.token.holder() {
            None => LockState::Idle,
            Some(Holder::Writer) => LockState::Writer,
            Some(Holder::Readers) if readers > 0 => LockState::Readers(readers),
            Some(Holder::Readers) => LockState::Settling,
        }
    }
}

impl RwMutex for ReaderPriority {
    fn acquire_read(&self) {
        // Held across the claim: while the first reader waits on a writer, later readers queue
        // here instead of slipping past with a non-zero count.
        let _entry = self.entry.lock();
        if self.readers.load(Ordering::Relaxed) == 0 {
            self.token.claim(Holder::Readers);
        }
        self.readers.fetch_add(1, Ordering::Release);
    }
    fn release_read(&self) {
        let _entry = self.entry.lock();
        let n = self.readers.load(Ordering::Relaxed);
        debug_assert!(n > 0, "release_read without a matching acquire_read");
        self.readers.store(n - 1, Ordering::Release);
        if n == 1 {
            self.token.release(Holder::Readers);
        }
    }
    fn acquire_write(&self) {
        self.token.claim(Holder::Writer);
    }
    fn release_write(&self) {
        self.token.release(Holder::Writer);
    }
}
