//! # Read-write mutex
//! There could be any number of readers or a single writer at a time, never both.
//!
//! It's composed from [Mutex](crate::mutex::Mutex)-es and [LightSwitch](crate::lightswitch::LightSwitch)-es.
//! There are 3 compositions, in the order of increasing fairness:
//! - [ReaderPriority] - a writer may wait forever behind a stream of readers
//! - [StarvationGuarded] - a queue mutex in front of everybody, readers get admitted one by one
//! - [WriterPriority] - a waiting writer goes before any reader that arrived after it
//!
//! [RwMutex] picks one at construction, writer priority is the default.
//!
//! The exclusive side is the usual [Lockable], the shared side is [SharedLockable].
//! Nothing is reentrant: a reader asking for a write lock deadlocks, so does a second `rlock`
//! from a reader while a writer is queued.

mod reader_priority;
mod starvation_guarded;
mod writer_priority;

pub use reader_priority::ReaderPriority;
pub use starvation_guarded::StarvationGuarded;
pub use writer_priority::WriterPriority;

use strum_macros::{Display, EnumIter, EnumString};

use crate::lockable::Lockable;

/// The shared half of a read-write lock.
pub trait SharedLockable: Lockable {
    fn rlock(&self);

    /// # Preconditions
    /// Pairs with an earlier `rlock`.
    fn runlock(&self);

    fn read_guard(&self) -> ReadGuard<'_, Self>
    where
        Self: Sized,
    {
        self.rlock();
        ReadGuard { lock: self }
    }
}

#[must_use = "dropping the guard unlocks right away"]
pub struct ReadGuard<'a, L: SharedLockable + ?Sized> {
    lock: &'a L,
}

impl<L: SharedLockable + ?Sized> Drop for ReadGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.runlock();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RwStrategy {
    ReaderPriority,
    StarvationGuarded,
    #[default]
    WriterPriority,
}

#[derive(Debug)]
pub enum RwMutex {
    ReaderPriority(ReaderPriority),
    StarvationGuarded(StarvationGuarded),
    WriterPriority(WriterPriority),
}

impl RwMutex {
    pub fn new() -> Self {
        Self::with_strategy(RwStrategy::default())
    }

    pub fn with_strategy(strategy: RwStrategy) -> Self {
        match strategy {
            RwStrategy::ReaderPriority => Self::ReaderPriority(ReaderPriority::new()),
            RwStrategy::StarvationGuarded => Self::StarvationGuarded(StarvationGuarded::new()),
            RwStrategy::WriterPriority => Self::WriterPriority(WriterPriority::new()),
        }
    }

    pub fn strategy(&self) -> RwStrategy {
        match self {
            Self::ReaderPriority(_) => RwStrategy::ReaderPriority,
            Self::StarvationGuarded(_) => RwStrategy::StarvationGuarded,
            Self::WriterPriority(_) => RwStrategy::WriterPriority,
        }
    }

    // a single place for the dispatch
    fn inner(&self) -> &dyn SharedLockable {
        match self {
            Self::ReaderPriority(rw) => rw,
            Self::StarvationGuarded(rw) => rw,
            Self::WriterPriority(rw) => rw,
        }
    }
}

impl Default for RwMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for RwMutex {
    fn lock(&self) {
        self.inner().lock();
    }

    fn unlock(&self) {
        self.inner().unlock();
    }
}

impl SharedLockable for RwMutex {
    fn rlock(&self) {
        self.inner().rlock();
    }

    fn runlock(&self) {
        self.inner().runlock();
    }
}

pub fn run() {
    use std::{cell::UnsafeCell, thread, time::Duration};
    use strum::IntoEnumIterator;

    struct Shared(UnsafeCell<i32>);
    // only touched under the rwmutex
    unsafe impl Sync for Shared {}
    impl Shared {
        // closures capture the whole struct through it, not the !Sync cell
        fn get(&self) -> *mut i32 {
            self.0.get()
        }
    }

    for strategy in RwStrategy::iter() {
        let rw = RwMutex::with_strategy(strategy);
        let x = Shared(UnsafeCell::new(5));

        // the write lock holds the reader off until x is updated
        rw.lock();
        thread::scope(|s| {
            s.spawn(|| {
                let _r = rw.read_guard();
                // SAFETY: read-locked
                println!("{strategy}: x is {}", unsafe { *x.get() });
            });
            thread::sleep(Duration::from_millis(50));
            // SAFETY: write-locked
            unsafe { *x.get() = 7 };
            rw.unlock();
        });
    }
}
