//! # Reader priority
//! The simplest composition: a lightswitch over the resource mutex.
//! The first reader locks the resource for everybody, writers lock it directly.
//!
//! Nothing ever stops a new reader while others are reading => a steady stream of
//! readers keeps the light on forever and the writer starves.

use std::sync::Arc;

use crate::lightswitch::LightSwitch;
use crate::lockable::Lockable;
use crate::mutex::Mutex;
use crate::rwmutex::SharedLockable;

#[derive(Debug)]
pub struct ReaderPriority {
    resource: Arc<Mutex>,
    read_switch: LightSwitch<Arc<Mutex>>,
}

impl ReaderPriority {
    pub fn new() -> Self {
        let resource = Arc::new(Mutex::new());
        Self {
            read_switch: LightSwitch::new(resource.clone()),
            resource,
        }
    }
}

impl Default for ReaderPriority {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockable for ReaderPriority {
    fn lock(&self) {
        self.resource.lock();
    }

    fn unlock(&self) {
        self.resource.unlock();
    }
}

impl SharedLockable for ReaderPriority {
    fn rlock(&self) {
        self.read_switch.lock();
    }

    fn runlock(&self) {
        self.read_switch.unlock();
    }
}
