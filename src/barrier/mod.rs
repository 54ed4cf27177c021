//! # Barrier
//! A rendezvous for exactly N threads, reusable round after round.
//!
//! ```text
//!     | | | | |
//!     --------- enter: nobody passes until all N are here
//!         |
//!     --------- exit: nobody passes until all N are done with the middle part
//!     | | | | |
//! ```
//!
//! Each phase has its own turnstile, a semaphore starting at 0. The last one to arrive
//! loads the turnstile with N permits at once, so all N pass without blocking again.
//!
//! The exit phase is what makes it reusable. Without it a fast thread could run around
//! into the next round's `enter` while the others are still leaving the current one,
//! and mess up the count.
//!
//! It's built straight on semaphores, no mutexes involved.

use std::cell::UnsafeCell;

use tracing::trace;

use crate::error::{Error, Result};
use crate::semaphore::Semaphore;

pub struct Barrier {
    n: usize,
    count: UnsafeCell<usize>,
    /// binary semaphore for the count
    mu: Semaphore,
    entry: Semaphore,
    exit: Semaphore,
}

// count is only touched while holding mu
unsafe impl Sync for Barrier {}

impl Barrier {
    pub fn new(n: isize) -> Result<Self> {
        if n <= 0 {
            return Err(Error::InvalidArgument(format!(
                "cannot create a barrier for {n} threads"
            )));
        }
        Ok(Self::with_parties(n as usize))
    }

    // n is known to be positive here
    fn with_parties(n: usize) -> Self {
        Self {
            n,
            count: UnsafeCell::new(0),
            mu: Semaphore::with_value(1),
            entry: Semaphore::with_value(0),
            exit: Semaphore::with_value(0),
        }
    }

    pub fn parties(&self) -> usize {
        self.n
    }

    /// Blocks until all N threads have entered.
    pub fn enter(&self) {
        self.mu.wait(1);
        // SAFETY: mu is held
        let count = unsafe { &mut *self.count.get() };
        *count += 1;
        if *count == self.n {
            trace!(n = self.n, "barrier: everybody is in");
            self.entry.signal(self.n);
        }
        self.mu.signal(1);
        self.entry.wait(1);
    }

    /// Blocks until all N threads have exited.
    ///
    /// # Preconditions
    /// Every thread calls it once per round and only after its own [Barrier::enter].
    pub fn exit(&self) {
        self.mu.wait(1);
        // SAFETY: mu is held
        let count = unsafe { &mut *self.count.get() };
        *count -= 1;
        if *count == 0 {
            trace!(n = self.n, "barrier: everybody is out");
            self.exit.signal(self.n);
        }
        self.mu.signal(1);
        self.exit.wait(1);
    }

    /// a single rendezvous call
    pub fn wait(&self) {
        self.enter();
        self.exit();
    }
}

impl std::fmt::Debug for Barrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Barrier")
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

pub fn run() {
    let b = Barrier::with_parties(5);
    std::thread::scope(|s| {
        for i in 0..5 {
            let b = &b;
            s.spawn(move || {
                println!("{i} waits at the barrier");
                b.wait();
                println!("{i} is done waiting");
            });
        }
    });
}

/// Leaders and followers pair up and dance. A pair starts and ends the dance together,
/// the next pair has to wait for the previous one to leave the floor.
pub fn dance(rounds: usize, mut on_dance: impl FnMut(usize) + Send + Clone) {
    let follower_queue = Semaphore::with_value(0);
    let leader_queue = Semaphore::with_value(0);
    let dancing_leaders = Semaphore::with_value(1);
    let dancing_followers = Semaphore::with_value(1);
    let dance_end = Barrier::with_parties(2);

    let mut on_follower_dance = on_dance.clone();
    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..rounds {
                follower_queue.signal(1);
                leader_queue.wait(1);
                // one leader on the floor at a time
                dancing_leaders.wait(1);
                dance_end.enter();
                on_dance(i);
                dance_end.exit();
                dancing_leaders.signal(1);
            }
        });
        s.spawn(|| {
            for i in 0..rounds {
                leader_queue.signal(1);
                follower_queue.wait(1);
                dancing_followers.wait(1);
                dance_end.enter();
                on_follower_dance(i);
                dance_end.exit();
                dancing_followers.signal(1);
            }
        });
    });
}

pub fn run_dancers() {
    dance(5, |i| println!("dancing pair: {i}"));
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicUsize, Ordering::SeqCst},
        thread::scope,
    };

    use parking_lot::Mutex as Log;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_bad_capacity() {
        for n in [0, -3] {
            assert_eq!(
                Err(Error::InvalidArgument(format!(
                    "cannot create a barrier for {n} threads"
                ))),
                Barrier::new(n).map(|_| ())
            );
        }
    }

    #[test]
    fn test_hundred_threads() {
        let b = Barrier::new(100).unwrap();
        let ops = AtomicUsize::new(0);
        scope(|s| {
            for _ in 0..100 {
                s.spawn(|| {
                    ops.fetch_add(1, SeqCst);
                    b.wait();
                    // nobody gets here before everybody has counted
                    assert_eq!(100, ops.load(SeqCst));
                });
            }
        });
    }

    #[test]
    fn test_reusable() {
        const N: usize = 4;
        const ROUNDS: usize = 50;
        let b = Barrier::new(N as isize).unwrap();
        let arrivals = AtomicUsize::new(0);
        scope(|s| {
            for _ in 0..N {
                s.spawn(|| {
                    for round in 0..ROUNDS {
                        arrivals.fetch_add(1, SeqCst);
                        b.enter();
                        // everybody of this round is in, nobody of the next one yet
                        assert_eq!((round + 1) * N, arrivals.load(SeqCst));
                        b.exit();
                    }
                });
            }
        });
        assert_eq!(N * ROUNDS, arrivals.load(SeqCst));
    }

    #[test]
    fn test_single_party_never_blocks() {
        let b = Barrier::new(1).unwrap();
        for _ in 0..10 {
            b.wait();
        }
        assert_eq!(1, b.parties());
    }

    #[test]
    fn test_dancers() {
        let log = Log::new(Vec::new());
        dance(5, |i| log.lock().push(i));
        assert_eq!(vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4], log.into_inner());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_no_one_leaves_early(n in 1usize..24) {
            let b = Barrier::new(n as isize).unwrap();
            let before = AtomicUsize::new(0);
            let early = AtomicUsize::new(0);
            scope(|s| {
                for _ in 0..n {
                    s.spawn(|| {
                        before.fetch_add(1, SeqCst);
                        b.wait();
                        if before.load(SeqCst) != n {
                            early.fetch_add(1, SeqCst);
                        }
                    });
                }
            });
            prop_assert_eq!(0, early.load(SeqCst));
        }
    }
}
