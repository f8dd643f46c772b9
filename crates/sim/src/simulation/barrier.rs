use crate::errors::BarrierError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

/// A reusable rendezvous point for the shard workers of one cycle.
///
/// Unlike [`std::sync::Barrier`], this barrier can be poisoned: a worker
/// that fails calls [`CycleBarrier::poison`] instead of arriving, and every
/// current or future waiter is released with [`BarrierError::Poisoned`].
///
/// The last participant to arrive runs a release action before anyone is
/// let go, which makes it the place for work that must happen exactly once
/// per cycle.
#[derive(Debug)]
pub struct CycleBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl CycleBarrier {
    /// A barrier for `parties` participants (at least one).
    pub fn new(parties: usize) -> Self {
        Self {
            parties: parties.max(1),
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
        }
    }

    #[inline]
    pub fn parties(&self) -> usize {
        self.parties
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arrive and block until every participant has arrived.
    ///
    /// Returns `Ok(true)` for the single participant that completed the
    /// generation.
    pub fn wait(&self) -> Result<bool, BarrierError> {
        self.wait_then(|| {})
    }

    /// Arrive; the last participant runs `on_release` before waking the rest.
    ///
    /// `on_release` runs while the barrier's lock is held. If it panics the
    /// barrier is poisoned, the other waiters are released with an error and
    /// the panic continues in the calling thread.
    pub fn wait_then<F: FnOnce()>(&self, on_release: F) -> Result<bool, BarrierError> {
        let mut state = self.lock();
        if state.poisoned {
            return Err(BarrierError::Poisoned);
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            let outcome = panic::catch_unwind(AssertUnwindSafe(on_release));
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            if outcome.is_err() {
                state.poisoned = true;
            }
            drop(state);
            self.released.notify_all();
            return match outcome {
                Ok(()) => Ok(true),
                Err(payload) => panic::resume_unwind(payload),
            };
        }

        let generation = state.generation;
        while state.generation == generation && !state.poisoned {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.generation != generation {
            Ok(false)
        } else {
            Err(BarrierError::Poisoned)
        }
    }

    /// Release every waiter with an error and refuse later arrivals.
    pub fn poison(&self) {
        self.lock().poisoned = true;
        self.released.notify_all();
    }

    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn await_arrivals(barrier: &CycleBarrier, count: usize) {
        while barrier.lock().arrived < count {
            thread::yield_now();
        }
    }

    #[test]
    fn test_single_party_is_leader() {
        let barrier = CycleBarrier::new(1);
        assert_eq!(barrier.wait(), Ok(true));
        assert_eq!(barrier.wait(), Ok(true));
    }

    #[test]
    fn test_release_action_runs_once_per_generation() {
        let barrier = Arc::new(CycleBarrier::new(4));
        let releases = Arc::new(AtomicUsize::new(0));
        let leaders = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let releases = Arc::clone(&releases);
                let leaders = Arc::clone(&leaders);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let leader = barrier
                            .wait_then(|| {
                                releases.fetch_add(1, Ordering::SeqCst);
                            })
                            .unwrap();
                        if leader {
                            leaders.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(releases.load(Ordering::SeqCst), 10);
        assert_eq!(leaders.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_poison_releases_waiters() {
        let barrier = Arc::new(CycleBarrier::new(3));
        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.wait())
            })
            .collect();

        await_arrivals(&barrier, 2);
        barrier.poison();

        for w in waiters {
            assert_eq!(w.join().unwrap(), Err(BarrierError::Poisoned));
        }
        assert!(barrier.is_poisoned());
        assert_eq!(barrier.wait(), Err(BarrierError::Poisoned));
    }

    #[test]
    fn test_panicking_release_poisons() {
        let barrier = Arc::new(CycleBarrier::new(2));
        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait())
        };
        await_arrivals(&barrier, 1);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            barrier.wait_then(|| panic!("aggregation failed"))
        }));
        assert!(result.is_err());

        // The waiter was released by the generation advancing.
        assert_eq!(waiter.join().unwrap(), Ok(false));
        assert!(barrier.is_poisoned());
    }
}
