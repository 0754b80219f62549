//! Instrumented resource for tests: counts who is inside and records every overlap that the lock
//! should have prevented.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use crate::{error::Result, resource::Resource};

#[derive(Default)]
pub struct Probe {
    content: Vec<u8>,
    fail_reads: bool,
    readers: AtomicUsize,
    writers: AtomicUsize,
    peak_readers: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    violations: AtomicUsize,
}

impl Probe {
    pub fn new(len: usize) -> Self {
        Self {
            content: vec![0; len],
            ..Self::default()
        }
    }
    /// Every read panics.
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }
    pub fn peak_readers(&self) -> usize {
        self.peak_readers.load(Ordering::SeqCst)
    }
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    // Long enough for overlapping tasks to actually overlap
    fn linger() {
        thread::sleep(Duration::from_micros(500));
    }
}

impl Resource for Probe {
    fn read(&self) -> Result<Cow<'_, [u8]>> {
        assert!(!self.fail_reads, "probe read failure");
        let inside = self.readers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_readers.fetch_max(inside, Ordering::SeqCst);
        if self.writers.load(Ordering::SeqCst) != 0 {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        Self::linger();
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.readers.fetch_sub(1, Ordering::SeqCst);
        Ok(Cow::Borrowed(&self.content))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.writers.fetch_add(1, Ordering::SeqCst) != 0
            || self.readers.load(Ordering::SeqCst) != 0
        {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        Self::linger();
        self.content.clear();
        self.content.extend_from_slice(bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.writers.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
