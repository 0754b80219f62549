//! First readers-writers problem with reader priority.
//!
//! Readers share a resource, writers get it alone, and a writer waits for as long as readers keep
//! overlapping each other. [`sync::reader_priority::ReaderPriority`] is the protocol;
//! [`shared::SharedResource`] pairs it with the content it gates; [`scenario::Driver`] runs
//! reader and writer threads against it.

pub mod config;
pub mod error;
pub mod resource;
pub mod scenario;
pub mod shared;
pub mod sync;
pub mod task;

#[cfg(test)]
mod probe;
