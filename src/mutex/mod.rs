//! # Mutex
//! Mutual exclusion built on the [Semaphore](crate::semaphore::Semaphore). There are 2 strategies:
//! - [NaiveMutex] - a semaphore of 1, correct but a waiter can starve
//! - [StarvationFreeMutex] - the three-room protocol, bounded waiting
//!
//! [Mutex] picks one at construction. The starvation-free one is the default.
//!
//! Both of them are non-reentrant: locking twice from the same thread deadlocks, as expected.
//! There's no owning thread either, any thread may unlock.

mod naive;
mod starvation_free;

pub use naive::NaiveMutex;
pub use starvation_free::StarvationFreeMutex;

use strum_macros::{Display, EnumIter, EnumString};

use crate::lockable::Lockable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MutexStrategy {
    Naive,
    #[default]
    StarvationFree,
}

#[derive(Debug)]
pub enum Mutex {
    Naive(NaiveMutex),
    StarvationFree(StarvationFreeMutex),
}

impl Mutex {
    pub fn new() -> Self {
        Self::with_strategy(MutexStrategy::default())
    }

    pub fn with_strategy(strategy: MutexStrategy) -> Self {
        match strategy {
            MutexStrategy::Naive => Self::Naive(NaiveMutex::new()),
            MutexStrategy::StarvationFree => Self::StarvationFree(StarvationFreeMutex::new()),
        }
    }

    pub fn strategy(&self) -> MutexStrategy {
        match self {
            Self::Naive(_) => MutexStrategy::Naive,
            Self::StarvationFree(_) => MutexStrategy::StarvationFree,
        }
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for Mutex {
    fn lock(&self) {
        match self {
            Self::Naive(m) => m.lock(),
            Self::StarvationFree(m) => m.lock(),
        }
    }

    fn unlock(&self) {
        match self {
            Self::Naive(m) => m.unlock(),
            Self::StarvationFree(m) => m.unlock(),
        }
    }
}

pub fn run() {
    use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
    use strum::IntoEnumIterator;

    for strategy in MutexStrategy::iter() {
        let m = Mutex::with_strategy(strategy);
        let n = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..10 {
                s.spawn(|| {
                    let _g = m.guard();
                    for _ in 0..100 {
                        // load + store isn't atomic, the mutex makes it so
                        let v = n.load(Relaxed);
                        n.store(v + 1, Relaxed);
                    }
                });
            }
        });
        println!("{strategy}: n is {}", n.into_inner());
    }
}
