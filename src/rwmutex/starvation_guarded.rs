//! # Starvation guarded
//! Reader priority plus a queue mutex in front of both doors.
//!
//! A writer holds the queue while it waits for the readers inside to leave,
//! so readers arriving after it queue up behind it.
//! The unlocks don't go through the queue.
//!
//! The price: readers get admitted one at a time, each passes the queue on its own.

use std::sync::Arc;

use crate::lightswitch::LightSwitch;
use crate::lockable::Lockable;
use crate::mutex::Mutex;
use crate::rwmutex::SharedLockable;

#[derive(Debug)]
pub struct StarvationGuarded {
    queue: Mutex,
    resource: Arc<Mutex>,
    read_switch: LightSwitch<Arc<Mutex>>,
}

impl StarvationGuarded {
    pub fn new() -> Self {
        let resource = Arc::new(Mutex::new());
        Self {
            queue: Mutex::new(),
            read_switch: LightSwitch::new(resource.clone()),
            resource,
        }
    }
}

impl Default for StarvationGuarded {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for StarvationGuarded {
    fn lock(&self) {
        let _q = self.queue.guard();
        self.resource.lock();
    }

    fn unlock(&self) {
        self.resource.unlock();
    }
}

impl SharedLockable for StarvationGuarded {
    fn rlock(&self) {
        let _q = self.queue.guard();
        self.read_switch.lock();
    }

    fn runlock(&self) {
        self.read_switch.unlock();
    }
}
