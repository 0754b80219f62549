use parking_lot::{Condvar, Mutex};

/// Who currently holds the exclusivity token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Holder {
    /// The active reader group, claimed by its first reader and released by its last.
    Readers,
    Writer,
}

/// Binary permit that, unlike a mutex guard, may be released by a thread other than the claimer.
///
/// Release wakes exactly one waiter. Which one is up to the OS, so there is no ordering among
/// waiters.
#[derive(Default)]
pub struct Token {
    holder: Mutex<Option<Holder>>,
    freed: Condvar,
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the token is free, then takes it on behalf of `by`.
    pub fn claim(&self, by: Holder) {
        let mut holder = self.holder.lock();
        while holder.is_some() {
            self.freed.wait(&mut holder);
        }
        *holder = Some(by);
    }

    pub fn release(&self, by: Holder) {
        let mut holder = self.holder.lock();
        debug_assert_eq!(
            *holder,
            Some(by),
            "token released by {by:?} while held by {:?}",
            *holder
        );
        *holder = None;
        drop(holder);
        self.freed.notify_one();
    }

    pub fn holder(&self) -> Option<Holder> {
        *self.holder.lock()
    }
}
