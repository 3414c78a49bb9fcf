//! `TeamBarrier` - the rendezvous point for the lanes of one team.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct State {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

/// A reusable barrier for a fixed number of lanes that can be poisoned.
///
/// `std::sync::Barrier` never wakes its waiters if a participant dies, so a
/// lane that panics mid-pass would leave its teammates blocked forever. Here
/// the panicking lane poisons the barrier (see [`PoisonOnPanic`]) and every
/// current and future waiter panics instead, letting the whole team unwind.
pub struct TeamBarrier {
    lanes: usize,
    state: Mutex<State>,
    cvar: Condvar,
}

impl TeamBarrier {
    /// Creates a barrier for `lanes` participants.
    ///
    /// # Panics
    /// Panics if `lanes == 0`.
    pub fn new(lanes: usize) -> Self {
        assert!(lanes != 0, "barrier needs at least one lane");
        Self {
            lanes,
            state: Mutex::new(State {
                arrived: 0,
                generation: 0,
                poisoned: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Number of participating lanes.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave `State` inconsistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until all lanes have arrived.
    ///
    /// All writes made by a lane before `wait` are visible to every lane after
    /// `wait` returns. Returns `true` for exactly one lane per generation.
    ///
    /// # Panics
    /// Panics if the barrier is poisoned.
    pub fn wait(&self) -> bool {
        let mut state = self.lock();
        assert!(!state.poisoned, "team barrier poisoned by a panicking lane");
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.lanes {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return true;
        }
        while state.generation == generation && !state.poisoned {
            state = self.cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        assert!(!state.poisoned, "team barrier poisoned by a panicking lane");
        false
    }

    /// Poisons the barrier and wakes every waiter.
    pub fn poison(&self) {
        self.lock().poisoned = true;
        self.cvar.notify_all();
    }

    /// Returns `true` once a lane has poisoned the barrier.
    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }
}

/// Guard held by every lane thread; poisons the team barrier if the lane unwinds.
pub struct PoisonOnPanic<'a> {
    barrier: &'a TeamBarrier,
}

impl<'a> PoisonOnPanic<'a> {
    /// Arms the guard for `barrier`.
    pub fn new(barrier: &'a TeamBarrier) -> Self {
        Self { barrier }
    }
}

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.barrier.poison();
        }
    }
}
