//! # Starvation-free mutex
//! Morris's algorithm: two "rooms" and two turnstiles in front of the critical section.
//!
//! ```text
//!  arrive --> [room 1] --t1--> [room 2] --t2--> critical section
//! ```
//!
//! - t1 is open from the start, t2 is closed
//! - threads pass t1 one by one, each lets the next one through
//! - the last thread to leave room 1 keeps t1 closed and opens t2 instead
//! - threads pass t2 one by one, each holder opens t2 for the next one on unlock
//! - the last thread to leave room 2 opens t1 again
//!
//! Once a batch is in room 2, newcomers pile up in room 1 until the batch drains.
//! A thread in room 1 waits for at most one batch ahead of it, so nobody is overtaken indefinitely.
//! Nothing of this makes the order FIFO within a batch.

use std::cell::UnsafeCell;

use tracing::trace;

use crate::lockable::Lockable;
use crate::semaphore::Semaphore;

#[derive(Debug, Default)]
struct Rooms {
    room1: usize,
    room2: usize,
}

pub struct StarvationFreeMutex {
    rooms: UnsafeCell<Rooms>,
    /// binary semaphore for the room counters
    guard: Semaphore,
    t1: Semaphore,
    t2: Semaphore,
}

// the rooms are only touched under the guard semaphore
unsafe impl Sync for StarvationFreeMutex {}

impl StarvationFreeMutex {
    pub fn new() -> Self {
        Self {
            rooms: UnsafeCell::new(Rooms::default()),
            guard: Semaphore::with_value(1),
            t1: Semaphore::with_value(1),
            t2: Semaphore::with_value(0),
        }
    }

    /// run `f` on the room counters while holding the guard
    fn with_rooms<R>(&self, f: impl FnOnce(&mut Rooms) -> R) -> R {
        self.guard.wait(1);
        // SAFETY: the guard is a binary semaphore and we hold it
        let r = f(unsafe { &mut *self.rooms.get() });
        self.guard.signal(1);
        r
    }

    /// [Lockable::lock], with `on_arrival` run under the guard once we're counted in room 1.
    /// From that point on the wait is bounded.
    pub(super) fn lock_after_arrival(&self, on_arrival: impl FnOnce()) {
        self.with_rooms(|r| {
            r.room1 += 1;
            on_arrival();
        });

        self.t1.wait(1);
        let room1_empty = self.with_rooms(|r| {
            r.room2 += 1;
            r.room1 -= 1;
            r.room1 == 0
        });
        if room1_empty {
            // t1 stays closed until room 2 drains
            trace!("room 1 is empty, opening t2");
            self.t2.signal(1);
        } else {
            self.t1.signal(1);
        }

        self.t2.wait(1);
        self.with_rooms(|r| r.room2 -= 1);
    }
}

impl Default for StarvationFreeMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for StarvationFreeMutex {
    fn lock(&self) {
        self.lock_after_arrival(|| {});
    }

    fn unlock(&self) {
        if self.with_rooms(|r| r.room2 == 0) {
            trace!("room 2 is empty, opening t1");
            self.t1.signal(1);
        } else {
            self.t2.signal(1);
        }
    }
}

impl std::fmt::Debug for StarvationFreeMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarvationFreeMutex").finish_non_exhaustive()
    }
}
