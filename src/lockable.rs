//! # Lockable
//! The capability set every lock in the crate shares: `lock` and `unlock`, nothing else.
//!
//! None of the locks here own the data they protect, so unlike the `Mutex<Y>` flavours
//! there's no `Deref` on the guard. It's a plain "unlock on drop" helper.
//!
//! Locks are semaphores underneath => there's no notion of an owning thread.
//! One thread may lock and another one may unlock, the lightswitch relies on that.

use std::sync::Arc;

pub trait Lockable: Send + Sync {
    /// blocks until the lock is acquired
    fn lock(&self);

    /// # Preconditions
    /// The lock has to be locked. Unlocking an unlocked lock isn't detected,
    /// it silently breaks the lock for everybody else.
    fn unlock(&self);

    /// lock and get a guard that unlocks on drop
    fn guard(&self) -> LockGuard<'_, Self>
    where
        Self: Sized,
    {
        self.lock();
        LockGuard { lock: self }
    }
}

/// It can't be made by any other means than [Lockable::guard]
#[must_use = "dropping the guard unlocks right away"]
pub struct LockGuard<'a, L: Lockable + ?Sized> {
    lock: &'a L,
}

impl<L: Lockable + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

// borrowing a lock is the non-owning handle the lightswitch keeps
impl<L: Lockable + ?Sized> Lockable for &L {
    fn lock(&self) {
        (**self).lock()
    }

    fn unlock(&self) {
        (**self).unlock()
    }
}

// ... and the shared one, when the lock lives next to the switch in the same struct
impl<L: Lockable + ?Sized> Lockable for Arc<L> {
    fn lock(&self) {
        (**self).lock()
    }

    fn unlock(&self) {
        (**self).unlock()
    }
}
