//! # Writer priority
//! Two mutex + lightswitch pairs gating each other:
//! - `read_switch` keeps `no_writers` locked while there are readers inside
//! - `write_switch` keeps `no_readers` locked while there are writers around, waiting or writing
//!
//! A reader has to pass `no_readers` to get to its switch. It lets go of it right away,
//! so readers still read in parallel. The first writer to show up locks `no_readers` via its switch
//! => every reader arriving later waits until the last writer is gone.
//!
//! Writers then take turns on `no_writers`, which is the actual exclusive gate. It's contended only
//! by writers and by the first-reader / last-reader transitions.
//!
//! It's the mirror image of reader priority: a steady stream of writers starves the readers.

use std::sync::Arc;

use crate::lightswitch::LightSwitch;
use crate::lockable::Lockable;
use crate::mutex::Mutex;
use crate::rwmutex::SharedLockable;

#[derive(Debug)]
pub struct WriterPriority {
    no_readers: Arc<Mutex>,
    no_writers: Arc<Mutex>,
    read_switch: LightSwitch<Arc<Mutex>>,
    write_switch: LightSwitch<Arc<Mutex>>,
}

impl WriterPriority {
    pub fn new() -> Self {
        let no_readers = Arc::new(Mutex::new());
        let no_writers = Arc::new(Mutex::new());
        Self {
            read_switch: LightSwitch::new(no_writers.clone()),
            write_switch: LightSwitch::new(no_readers.clone()),
            no_readers,
            no_writers,
        }
    }
}

impl Default for WriterPriority {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for WriterPriority {
    fn lock(&self) {
        self.write_switch.lock();
        self.no_writers.lock();
    }

    fn unlock(&self) {
        self.no_writers.unlock();
        self.write_switch.unlock();
    }
}

impl SharedLockable for WriterPriority {
    fn rlock(&self) {
        // queue behind any writer that got here first
        let _nr = self.no_readers.guard();
        self.read_switch.lock();
    }

    fn runlock(&self) {
        self.read_switch.unlock();
    }
}
