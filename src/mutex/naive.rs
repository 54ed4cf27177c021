//! # Naive mutex
//! A semaphore starting at 1. Lock is `wait(1)`, unlock is `signal(1)`, that's all.
//!
//! It's correct, but there's no order among the waiters: every unlock wakes all of them
//! and any thread may win, including the one that has just unlocked and came back.
//! A thread can be out-raced forever.

use crate::lockable::Lockable;
use crate::semaphore::Semaphore;

#[derive(Debug)]
pub struct NaiveMutex {
    sem: Semaphore,
}

impl NaiveMutex {
    // it's unlocked from the start
    pub fn new() -> Self {
        Self {
            sem: Semaphore::with_value(1),
        }
    }
}

impl Default for NaiveMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for NaiveMutex {
    fn lock(&self) {
        self.sem.wait(1);
    }

    fn unlock(&self) {
        self.sem.signal(1);
    }
}
