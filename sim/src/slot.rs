//! Single-slot pattern queue: non-blocking overwrite on send, blocking
//! receive. The pipeline intentionally keeps no backlog; only the
//! freshest value matters.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

pub struct SlotQueue<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> SlotQueue<T> {
    pub fn new() -> SlotQueue<T> {
        SlotQueue {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a value, displacing any unconsumed one. Returns true if a
    /// value was displaced.
    pub fn send_latest(&self, value: T) -> bool {
        let mut slot = self.lock();
        let displaced = slot.replace(value).is_some();
        self.ready.notify_one();
        displaced
    }

    /// Block until a value is available.
    pub fn recv(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    pub fn try_recv(&self) -> Option<T> {
        self.lock().take()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return Some(value);
            }
            let (guard, res) = self
                .ready
                .wait_timeout(slot, timeout)
                .unwrap_or_else(|e| e.into_inner());
            slot = guard;
            if res.timed_out() {
                return slot.take();
            }
        }
    }
}

impl<T> Default for SlotQueue<T> {
    fn default() -> Self {
        SlotQueue::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn consumer_sees_only_the_freshest_value() {
        let q = SlotQueue::new();
        assert!(!q.send_latest(1u32));
        assert!(q.send_latest(2));
        assert!(q.send_latest(3));
        assert_eq!(q.try_recv(), Some(3));
        assert_eq!(q.try_recv(), None);
    }

    #[test]
    fn recv_blocks_until_a_value_arrives() {
        let q = Arc::new(SlotQueue::new());
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                q.send_latest(7u32);
            })
        };
        assert_eq!(q.recv(), 7);
        producer.join().unwrap();
    }

    #[test]
    fn recv_timeout_returns_none_when_empty() {
        let q: SlotQueue<u32> = SlotQueue::new();
        assert_eq!(q.recv_timeout(Duration::from_millis(10)), None);
    }
}
