//! # Lightswitch
//! Many threads share one lock acquisition of a resource.
//!
//! The metaphor is a room: the first person in switches the light on, the others
//! don't need to touch it while somebody is inside, the last person out switches it off.
//! Here "the light" is a lock on some resource, e.g. the "no writers" mutex of a rwmutex.
//!
//! The switch doesn't own the resource. It's handed over as a [Lockable] handle:
//! a plain `&L` to borrow it, an `Arc<L>` when the lock lives next to the switch.
//!
//! Note that the first thread in and the last thread out are usually different threads =>
//! the resource is locked by one thread and unlocked by another one. That's fine for the
//! semaphore-based locks of this crate.

use std::cell::UnsafeCell;

use tracing::trace;

use crate::lockable::Lockable;
use crate::mutex::Mutex;

pub struct LightSwitch<R: Lockable> {
    counter: UnsafeCell<usize>,
    counter_lock: Mutex,
    resource: R,
}

// the counter is only touched under counter_lock
unsafe impl<R: Lockable> Sync for LightSwitch<R> {}

impl<R: Lockable> LightSwitch<R> {
    pub fn new(resource: R) -> Self {
        Self {
            counter: UnsafeCell::new(0),
            counter_lock: Mutex::new(),
            resource,
        }
    }

    /// The first one in locks the resource, the rest just count themselves in.
    ///
    /// Blocks while the resource is held by somebody other than this switch.
    pub fn lock(&self) {
        let _g = self.counter_lock.guard();
        // SAFETY: counter_lock is held
        let counter = unsafe { &mut *self.counter.get() };
        if *counter == 0 {
            // the counter lock stays held while we wait => the others queue behind us
            self.resource.lock();
            trace!("lightswitch: first one in");
        }
        *counter += 1;
    }

    /// The last one out unlocks the resource.
    ///
    /// # Preconditions
    /// Every unlock pairs with an earlier lock. An extra unlock underflows the counter.
    pub fn unlock(&self) {
        let _g = self.counter_lock.guard();
        // SAFETY: counter_lock is held
        let counter = unsafe { &mut *self.counter.get() };
        *counter -= 1;
        if *counter == 0 {
            trace!("lightswitch: last one out");
            self.resource.unlock();
        }
    }

    /// how many are inside at the moment
    pub fn occupants(&self) -> usize {
        let _g = self.counter_lock.guard();
        // SAFETY: counter_lock is held
        unsafe { *self.counter.get() }
    }
}

/// so that a switch can be guarded or nested into another switch
impl<R: Lockable> Lockable for LightSwitch<R> {
    fn lock(&self) {
        LightSwitch::lock(self)
    }

    fn unlock(&self) {
        LightSwitch::unlock(self)
    }
}

impl<R: Lockable + std::fmt::Debug> std::fmt::Debug for LightSwitch<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightSwitch")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

pub fn run() {
    let room = Mutex::new();
    let switch = LightSwitch::new(&room);
    std::thread::scope(|s| {
        for i in 0..3 {
            let switch = &switch;
            s.spawn(move || {
                switch.lock();
                println!("person {i} is in the room, {} inside", switch.occupants());
                std::thread::sleep(std::time::Duration::from_millis(100));
                switch.unlock();
            });
        }
    });
    // the light is off => the room can be locked directly
    let _g = room.guard();
    println!("the room is empty, {} inside", switch.occupants());
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicBool, AtomicUsize, Ordering::SeqCst},
        thread::{scope, sleep},
        time::Duration,
    };

    use super::*;
    use crate::semaphore::Semaphore;

    /// A resource lock with a side channel: `held` flips only inside the real lock/unlock.
    struct Watched {
        inner: Mutex,
        held: AtomicBool,
        acquisitions: AtomicUsize,
    }

    impl Watched {
        fn new() -> Self {
            Self {
                inner: Mutex::new(),
                held: AtomicBool::new(false),
                acquisitions: AtomicUsize::new(0),
            }
        }
    }

    impl Lockable for Watched {
        fn lock(&self) {
            self.inner.lock();
            assert!(!self.held.swap(true, SeqCst), "locked twice");
            self.acquisitions.fetch_add(1, SeqCst);
        }

        fn unlock(&self) {
            assert!(self.held.swap(false, SeqCst), "unlocked while not held");
            self.inner.unlock();
        }
    }

    #[test]
    fn test_held_iff_occupied() {
        let watched = Watched::new();
        let switch = LightSwitch::new(&watched);
        scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..200 {
                        switch.lock();
                        // we're inside => the light is on
                        assert!(watched.held.load(SeqCst));
                        assert!(switch.occupants() > 0);
                        switch.unlock();
                    }
                });
            }
        });
        assert_eq!(0, switch.occupants());
        assert!(!watched.held.load(SeqCst));
    }

    #[test]
    fn test_only_first_and_last_touch_the_resource() {
        let watched = Watched::new();
        let switch = LightSwitch::new(&watched);
        switch.lock();
        switch.lock();
        switch.lock();
        assert_eq!(1, watched.acquisitions.load(SeqCst));
        assert_eq!(3, switch.occupants());
        switch.unlock();
        switch.unlock();
        assert!(watched.held.load(SeqCst));
        switch.unlock();
        assert!(!watched.held.load(SeqCst));

        // next round takes the resource again
        let _g = switch.guard();
        assert_eq!(2, watched.acquisitions.load(SeqCst));
    }

    #[test]
    fn test_first_one_waits_for_the_resource() {
        // a raw semaphore works as the resource too
        let room_empty = Semaphore::new(1).unwrap();
        let switch = LightSwitch::new(&room_empty);
        let entered = AtomicBool::new(false);

        room_empty.wait(1);
        scope(|s| {
            s.spawn(|| {
                switch.lock();
                entered.store(true, SeqCst);
                switch.unlock();
            });
            sleep(Duration::from_millis(100));
            assert!(!entered.load(SeqCst));
            room_empty.signal(1);
        });
        assert!(entered.load(SeqCst));
        assert_eq!(1, room_empty.value());
    }
}
