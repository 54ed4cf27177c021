//! # Semaphore
//! The foundation of the crate: an integer value and a set of threads waiting for it to grow.
//! Everything else is built from it.
//!
//! Note that a semaphore's initial value isn't its limit. Signalling is allowed to grow the value
//! past the initial one, e.g. the barrier loads its turnstiles from 0 to N. That's why it's a counter
//! behind a mutex plus a condvar rather than a bounded queue of tokens.
//!
//! ## Waking up
//! [Semaphore::signal] wakes everybody. Each waiter re-checks its own amount and most likely
//! goes back to sleep. A thundering herd, but never a wrong decrement: the check and the decrement
//! happen under the same lock.
//!
//! A queue of waiters with targeted wake-ups would be fairer, it isn't needed for the algorithms
//! built on top of it though.

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};
use crate::lockable::Lockable;

#[derive(Debug)]
pub struct Semaphore {
    value: Mutex<usize>,
    changed: Condvar,
}

impl Semaphore {
    /// It's the only place where a semaphore can fail.
    pub fn new(value: isize) -> Result<Self> {
        let value = usize::try_from(value).map_err(|_| {
            Error::InvalidArgument(format!("cannot create a semaphore of initial value {value}"))
        })?;
        Ok(Self::with_value(value))
    }

    /// infallible version for internal turnstiles and guards
    pub(crate) fn with_value(value: usize) -> Self {
        Self {
            value: Mutex::new(value),
            changed: Condvar::new(),
        }
    }

    /// Block until there's at least `n`, then take `n`.
    pub fn wait(&self, n: usize) {
        let mut value = self.value.lock();
        // spurious wakeups and wakeups meant for others end up here
        while *value < n {
            self.changed.wait(&mut value);
        }
        *value -= n;
    }

    /// Add `n` and let every waiter re-check.
    ///
    /// # Preconditions
    /// Overflowing the value is a programming error.
    pub fn signal(&self, n: usize) {
        let mut value = self.value.lock();
        *value += n;
        // the waiters can't run until the guard is dropped anyway
        self.changed.notify_all();
    }

    /// A snapshot, it may be stale by the time it's returned.
    pub fn value(&self) -> usize {
        *self.value.lock()
    }
}

/// a semaphore with a value of 1 is a lock, e.g. the "room is empty" switch
impl Lockable for Semaphore {
    fn lock(&self) {
        self.wait(1);
    }

    fn unlock(&self) {
        self.signal(1);
    }
}

pub fn run() {
    // 2 waiters, 1 signal for both of them
    let sem = Semaphore::with_value(0);
    std::thread::scope(|s| {
        for i in 0..2 {
            let sem = &sem;
            s.spawn(move || {
                sem.wait(1);
                println!("waiter {i} is done waiting");
            });
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
        println!("signaling");
        sem.signal(2);
    });
    println!("value is {}", sem.value());
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicUsize, Ordering::SeqCst},
        thread::{scope, sleep},
        time::Duration,
    };

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_loaded_semaphore_creation() {
        let sem = Semaphore::new(1).unwrap();
        sem.wait(1);
        assert_eq!(0, sem.value());
    }

    #[test]
    fn test_negative_value() {
        assert_eq!(
            Err(Error::InvalidArgument(
                "cannot create a semaphore of initial value -1".to_string()
            )),
            Semaphore::new(-1).map(|_| ())
        );
    }

    #[test]
    fn test_signal_releases_both_waiters() {
        let sem = Semaphore::new(0).unwrap();
        let done = AtomicUsize::new(0);
        scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    sem.wait(1);
                    done.fetch_add(1, SeqCst);
                });
            }
            // let both of them block
            sleep(Duration::from_millis(100));
            assert_eq!(0, done.load(SeqCst));
            sem.signal(2);
        });
        assert_eq!(2, done.load(SeqCst));
        assert_eq!(0, sem.value());
    }

    #[test]
    fn test_wait_for_many() {
        let sem = Semaphore::new(0).unwrap();
        let passed = AtomicUsize::new(0);
        scope(|s| {
            s.spawn(|| {
                sem.wait(3);
                passed.store(1, SeqCst);
            });
            for _ in 0..2 {
                sem.signal(1);
                sleep(Duration::from_millis(50));
                // 1 or 2 isn't enough
                assert_eq!(0, passed.load(SeqCst));
            }
            sem.signal(1);
        });
        assert_eq!(1, passed.load(SeqCst));
        assert_eq!(0, sem.value());
    }

    #[test]
    fn test_as_a_lock() {
        let sem = Semaphore::new(1).unwrap();
        let inside = AtomicUsize::new(0);
        scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let _g = sem.guard();
                        assert_eq!(0, inside.fetch_add(1, SeqCst));
                        inside.fetch_sub(1, SeqCst);
                    }
                });
            }
        });
        assert_eq!(1, sem.value());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // whatever the split between threads, the books balance
        #[test]
        fn test_value_accounting(initial in 0usize..16, takes in prop::collection::vec(1usize..4, 1..8)) {
            let sem = Semaphore::new(initial as isize).unwrap();
            let total: usize = takes.iter().sum();
            scope(|s| {
                for &n in &takes {
                    let sem = &sem;
                    s.spawn(move || sem.wait(n));
                }
                sem.signal(total);
            });
            prop_assert_eq!(initial, sem.value());
        }
    }
}
