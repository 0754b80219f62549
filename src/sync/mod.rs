pub mod reader_priority;
pub mod token;

/// Readers-writers mutex: any number of readers may hold it together, a writer holds it alone.
///
/// The requirements for that are
/// 1. Mutual Exclusion - a writer never overlaps another writer or any reader.
/// 2. Shared Reads - a reader never waits on another reader, only on a writer.
///
/// Nothing here promises progress for writers; see [`reader_priority::ReaderPriority`].
pub trait RwMutex {
    fn acquire_read(&self);
    fn release_read(&self);
    fn acquire_write(&self);
    fn release_write(&self);

    fn read(&self) -> ReadGuard<'_, Self>
    where
        Self: Sized,
    {
        self.acquire_read();
        ReadGuard { mutex: self }
    }
    fn write(&self) -> WriteGuard<'_, Self>
    where
        Self: Sized,
    {
        self.acquire_write();
        WriteGuard { mutex: self }
    }
}

// Guards are the only way to release without calling the raw release_* yourself
pub struct ReadGuard<'a, M: RwMutex> {
    mutex: &'a M,
}
impl<M: RwMutex> Drop for ReadGuard<'_, M> {
    fn drop(&mut self) {
        self.mutex.release_read()
    }
}

pub struct WriteGuard<'a, M: RwMutex> {
    mutex: &'a M,
}
impl<M: RwMutex> Drop for WriteGuard<'_, M> {
    fn drop(&mut self) {
        self.mutex.release_write()
    }
}
