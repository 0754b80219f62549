use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use clap::ValueEnum;
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    resource::Resource,
    shared::SharedResource,
    task::{Kind, ReaderTask, Report, WriterTask},
};

/// A spawned task that has not been joined yet.
pub struct TaskHandle {
    kind: Kind,
    id: usize,
    thread: JoinHandle<Result<Report>>,
}

impl TaskHandle {
    pub fn kind(&self) -> Kind {
        self.kind
    }
    pub fn id(&self) -> usize {
        self.id
    }
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Spawns readers and writers against one shared resource, one OS thread each.
///
/// Ids are 1-based and counted per kind in spawn order.
pub struct Driver<R> {
    shared: Arc<SharedResource<R>>,
    write_size: usize,
    seed: Option<u64>,
    readers: usize,
    writers: usize,
}

impl<R: Resource + 'static> Driver<R> {
    pub fn new(shared: Arc<SharedResource<R>>, write_size: usize) -> Self {
        Self {
            shared,
            write_size,
            seed: None,
            readers: 0,
            writers: 0,
        }
    }

    /// Writer `n` is seeded with `seed + n`.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn shared(&self) -> &Arc<SharedResource<R>> {
        &self.shared
    }

    pub fn spawn(&mut self, kind: Kind) -> TaskHandle {
        let shared = self.shared.clone();
        let (id, thread) = match kind {
            Kind::Reader => {
                self.readers += 1;
                let task = ReaderTask::new(self.readers, shared);
                (self.readers, thread::spawn(move || task.run()))
            }
            Kind::Writer => {
                self.writers += 1;
                let mut task = WriterTask::new(self.writers, self.write_size, shared);
                if let Some(seed) = self.seed {
                    task = task.seeded(seed.wrapping_add(self.writers as u64));
                }
                (self.writers, thread::spawn(move || task.run()))
            }
        };
        TaskHandle { kind, id, thread }
    }

    pub fn join(&self, handle: TaskHandle) -> Result<Report> {
        let TaskHandle { kind, id, thread } = handle;
        thread
            .join()
            .map_err(|_| Error::TaskPanicked { kind, id })?
    }

    /// Joins every handle, even after a failure, and returns the first error if any.
    pub fn join_all(&self, handles: Vec<TaskHandle>) -> Result<Vec<Report>> {
        let mut reports = Vec::with_capacity(handles.len());
        let mut first_err = None;
        for handle in handles {
            match self.join(handle) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(error = %e, "task failed");
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    /// Tears the driver down and hands back the resource.
    ///
    /// `None` if a spawned task is still holding on to it, i.e. some handle was never joined.
    pub fn finish(self) -> Option<R> {
        Arc::try_unwrap(self.shared)
            .ok()
            .map(SharedResource::into_inner)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// One reader and one writer.
    Basic,
    /// Readers, one writer, then many more readers.
    Flood,
    /// Alternating reader/writer pairs.
    Mix,
}

/// How many tasks each scenario spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counts {
    pub pairs: usize,
    pub readers_before: usize,
    pub readers_after: usize,
}

impl Default for Counts {
    fn default() -> Self {
        Self {
            pairs: 10,
            readers_before: 10,
            readers_after: 89,
        }
    }
}

impl Scenario {
    /// Runs to completion. Reports come back in spawn order.
    pub fn run<R: Resource + 'static>(
        self,
        driver: &mut Driver<R>,
        counts: Counts,
    ) -> Result<Vec<Report>> {
        let handles = match self {
            Scenario::Basic => {
                info!("starting reader and writer");
                vec![driver.spawn(Kind::Reader), driver.spawn(Kind::Writer)]
            }
            Scenario::Flood => {
                let mut handles =
                    Vec::with_capacity(counts.readers_before + 1 + counts.readers_after);
                info!(readers = counts.readers_before, "starting readers");
                handles.extend((0..counts.readers_before).map(|_| driver.spawn(Kind::Reader)));
                info!("starting writer");
                handles.push(driver.spawn(Kind::Writer));
                info!(readers = counts.readers_after, "starting remaining readers");
                handles.extend((0..counts.readers_after).map(|_| driver.spawn(Kind::Reader)));
                handles
            }
            Scenario::Mix => {
                info!(tasks = counts.pairs * 2, "starting readers and writers");
                (0..counts.pairs)
                    .flat_map(|_| [Kind::Reader, Kind::Writer])
                    .map(|kind| driver.spawn(kind))
                    .collect()
            }
        };
        let reports = driver.join_all(handles)?;
        info!(tasks = reports.len(), "all tasks done");
        Ok(reports)
    }
}

/// Reports sorted by when each task finished.
pub fn completion_order(reports: &[Report]) -> Vec<&Report> {
    let mut order = reports.iter().collect::<Vec<_>>();
    order.sort_by_key(|r| r.finished_at);
    order
}
