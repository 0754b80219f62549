use std::{fmt, sync::Arc, time::Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::{error::Result, resource::Resource, shared::SharedResource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Reader,
    Writer,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Reader => f.write_str("reader"),
            Kind::Writer => f.write_str("writer"),
        }
    }
}

/// Wrapping byte sum of everything a task read or wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Checksum(u32);

impl Checksum {
    pub fn of(bytes: &[u8]) -> Self {
        let mut sum = Self::default();
        sum.extend(bytes);
        sum
    }
    pub fn extend(&mut self, bytes: &[u8]) {
        bytes.iter().for_each(|b| self.push(*b));
    }
    pub fn push(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(u32::from(byte));
    }
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// What a finished task hands back to whoever joins it.
#[derive(Clone, Debug)]
pub struct Report {
    pub kind: Kind,
    pub id: usize,
    pub checksum: Checksum,
    pub finished_at: Instant,
}

pub struct ReaderTask<R> {
    id: usize,
    shared: Arc<SharedResource<R>>,
}

impl<R: Resource> ReaderTask<R> {
    pub fn new(id: usize, shared: Arc<SharedResource<R>>) -> Self {
        Self { id, shared }
    }

    pub fn run(self) -> Result<Report> {
        debug!(reader = self.id, "started");
        let checksum = {
            let content = self.shared.read();
            debug!(reader = self.id, "reading");
            let mut checksum = Checksum::default();
            content.for_each_chunk(&mut |chunk| checksum.extend(chunk))?;
            checksum
        };
        info!(reader = self.id, %checksum, "done reading");
        Ok(Report {
            kind: Kind::Reader,
            id: self.id,
            checksum,
            finished_at: Instant::now(),
        })
    }
}

pub struct WriterTask<R> {
    id: usize,
    size: usize,
    seed: Option<u64>,
    shared: Arc<SharedResource<R>>,
}

impl<R: Resource> WriterTask<R> {
    pub fn new(id: usize, size: usize, shared: Arc<SharedResource<R>>) -> Self {
        Self {
            id,
            size,
            seed: None,
            shared,
        }
    }

    /// Makes the written content reproducible. Unseeded writers draw from OS entropy.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn run(self) -> Result<Report> {
        debug!(writer = self.id, "started");
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let checksum = {
            let mut content = self.shared.write();
            debug!(writer = self.id, size = self.size, "writing");
            let mut checksum = Checksum::default();
            let bytes = (0..self.size)
                .map(|_| {
                    let b = rng.gen::<u8>();
                    checksum.push(b);
                    b
                })
                .collect::<Vec<_>>();
            content.write(&bytes)?;
            checksum
        };
        info!(writer = self.id, %checksum, "done writing");
        Ok(Report {
            kind: Kind::Writer,
            id: self.id,
            checksum,
            finished_at: Instant::now(),
        })
    }
}
