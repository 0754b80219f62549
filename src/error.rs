use std::{io, path::PathBuf};

use thiserror::Error;

use crate::task::Kind;

/// Everything that can stop a run. None of these are retried.
#[derive(Error, Debug)]
pub enum Error {
    /// The shared resource could not be opened.
    #[error("unable to open shared resource {}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or writing the shared resource failed mid-run.
    #[error("unable to {op} shared resource")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("{kind} {id} panicked")]
    TaskPanicked { kind: Kind, id: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
