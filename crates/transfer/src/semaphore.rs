//! FIFO counting semaphore.
//!
//! Native semaphores do not guarantee wakeup order, so fairness is built
//! explicitly: waiters park on a queue of oneshot completion handles and a
//! released permit is handed straight to the oldest waiter instead of
//! returning through the shared counter, where a fresh caller could snatch
//! it first.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

/// Counting semaphore with strict FIFO handoff.
///
/// `available() + permits_in_flight == capacity` holds for the semaphore's
/// whole lifetime; permits are returned by dropping the [`Permit`] guard.
pub struct Semaphore {
    capacity: usize,
    state: Mutex<State>,
}

struct State {
    permits: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Guard held while a task occupies one concurrency slot.
///
/// Dropping the guard releases the permit exactly once, on every exit path.
pub struct Permit {
    sem: Arc<Semaphore>,
}

impl Semaphore {
    /// Creates a semaphore admitting at most `capacity` concurrent holders.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Arc<Self> {
        assert!(capacity > 0, "semaphore capacity must be at least 1");
        Arc::new(Self {
            capacity,
            state: Mutex::new(State {
                permits: capacity,
                waiters: VecDeque::new(),
            }),
        })
    }

    /// Acquires a permit, waiting in FIFO order when none is free.
    ///
    /// There is no way to abandon a pending acquire; a parked caller stays
    /// parked until a permit is handed to it.
    pub async fn acquire(self: &Arc<Self>) -> Permit {
        let rx = {
            let mut s = self.state.lock().unwrap();
            if s.permits > 0 {
                s.permits -= 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                s.waiters.push_back(tx);
                Some(rx)
            }
        };

        if let Some(rx) = rx {
            // The sender lives in the queue owned by this semaphore, which
            // the caller keeps alive for the duration of the await; the only
            // way the channel resolves is a release handing the permit over.
            let _ = rx.await;
        }

        Permit {
            sem: Arc::clone(self),
        }
    }

    /// Number of permits currently free.
    pub fn available(&self) -> usize {
        self.state.lock().unwrap().permits
    }

    /// Number of callers parked waiting for a permit.
    pub fn waiting(&self) -> usize {
        self.state.lock().unwrap().waiters.len()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self) {
        let mut s = self.state.lock().unwrap();
        // Hand the permit straight to the oldest waiter. A send only fails
        // if the waiting future was dropped; fall through to the next one.
        while let Some(tx) = s.waiters.pop_front() {
            if tx.send(()).is_ok() {
                return;
            }
        }
        s.permits += 1;
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.sem.release();
    }
}

impl std::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.lock().unwrap();
        f.debug_struct("Semaphore")
            .field("capacity", &self.capacity)
            .field("available", &s.permits)
            .field("waiting", &s.waiters.len())
            .finish()
    }
}
