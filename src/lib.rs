//! # Semaphore ladder
//! Blocking synchronization primitives, each one built strictly on the one below it:
//! - [Semaphore] - a counter threads can wait on, the only piece with a real lock + condvar inside
//! - [Mutex] - naive or starvation-free, both out of semaphores
//! - [LightSwitch] - first one in locks a resource, last one out unlocks it
//! - [RwMutex] - mutexes + lightswitches, with reader priority, a starvation guard or writer priority
//! - [Barrier] - a reusable two-phase rendezvous, out of semaphores again
//!
//! Nothing here spawns threads, nothing times out, nothing is reentrant.
//! Misusing a lock (unlocking it twice, locking it twice from one thread) isn't detected,
//! it just deadlocks or breaks the lock.

pub mod barrier;
pub mod error;
pub mod lightswitch;
pub mod lockable;
pub mod mutex;
pub mod rwmutex;
pub mod semaphore;

pub use barrier::Barrier;
pub use error::{Error, Result};
pub use lightswitch::LightSwitch;
pub use lockable::{LockGuard, Lockable};
pub use mutex::{Mutex, MutexStrategy, NaiveMutex, StarvationFreeMutex};
pub use rwmutex::{ReadGuard, RwMutex, RwStrategy, SharedLockable};
pub use semaphore::Semaphore;
