use std::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
};

use crate::sync::{reader_priority::ReaderPriority, ReadGuard, RwMutex, WriteGuard};

/// A resource together with the lock that gates it.
///
/// The content is only reachable through [`read`](Self::read) and [`write`](Self::write), so no
/// task can touch it outside a held lock.
pub struct SharedResource<R> {
    lock: ReaderPriority,
    content: UnsafeCell<R>,
}

// Readers share `&R` across threads and a writer gets `&mut R` on whichever thread holds the
// token, both only while the lock says so.
unsafe impl<R: Send + Sync> Sync for SharedResource<R> {}

impl<R> SharedResource<R> {
    pub fn new(content: R) -> Self {
        Self {
            lock: ReaderPriority::new(),
            content: UnsafeCell::new(content),
        }
    }

    pub fn lock(&self) -> &ReaderPriority {
        &self.lock
    }

    /// Blocks until the reader group is in.
    pub fn read(&self) -> ReadAccess<'_, R> {
        ReadAccess {
            _guard: self.lock.read(),
            content: &self.content,
        }
    }

    /// Blocks until this thread holds the token alone.
    pub fn write(&self) -> WriteAccess<'_, R> {
        WriteAccess {
            _guard: self.lock.write(),
            content: &self.content,
        }
    }

    pub fn into_inner(self) -> R {
        self.content.into_inner()
    }
}

pub struct ReadAccess<'a, R> {
    _guard: ReadGuard<'a, ReaderPriority>,
    content: &'a UnsafeCell<R>,
}

impl<R> Deref for ReadAccess<'_, R> {
    type Target = R;
    fn deref(&self) -> &R {
        // Shared access: no writer holds the token while `_guard` lives
        unsafe { &*self.content.get() }
    }
}

pub struct WriteAccess<'a, R> {
    _guard: WriteGuard<'a, ReaderPriority>,
    content: &'a UnsafeCell<R>,
}

impl<R> Deref for WriteAccess<'_, R> {
    type Target = R;
    fn deref(&self) -> &R {
        unsafe { &*self.content.get() }
    }
}

impl<R> DerefMut for WriteAccess<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        // Exclusive access: the token is ours and the reader group is empty
        unsafe { &mut *self.content.get() }
    }
}
