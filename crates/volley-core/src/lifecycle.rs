use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// LifecycleState
// ---------------------------------------------------------------------------

/// The five-state polling lifecycle shared by control threads and daemons.
///
/// Transitions are *requested* through a [`StateCell`] and *applied* by the
/// owning thread's own tick loop; nothing ever forces a thread out of its
/// loop. `Dying` is terminal: the loop exits on the next tick that observes
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    NotStarted = 0,
    Starting = 1,
    Started = 2,
    Stopping = 3,
    Stopped = 4,
    Dying = 5,
}

impl LifecycleState {
    pub fn is_running(self) -> bool {
        self != LifecycleState::Dying
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::NotStarted => "not-started",
            LifecycleState::Starting => "starting",
            LifecycleState::Started => "started",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Dying => "dying",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LifecycleState::NotStarted,
            1 => LifecycleState::Starting,
            2 => LifecycleState::Started,
            3 => LifecycleState::Stopping,
            4 => LifecycleState::Stopped,
            _ => LifecycleState::Dying,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StateCell
// ---------------------------------------------------------------------------

/// Shared, observable lifecycle state. Cloning shares the cell.
#[derive(Debug, Clone)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(LifecycleState::NotStarted as u8)))
    }

    pub fn get(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Request a transition. The owning loop observes it on its next tick
    /// (default 20 ms latency).
    pub fn request(&self, state: LifecycleState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    pub fn start(&self) {
        self.request(LifecycleState::Starting);
    }

    pub fn stop(&self) {
        self.request(LifecycleState::Stopping);
    }

    pub fn kill(&self) {
        self.request(LifecycleState::Dying);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// run_loop
// ---------------------------------------------------------------------------

/// Drive the lifecycle from inside the owning thread. `on_active` runs once
/// per tick while the state is `Started`. Returns when `Dying` is observed.
pub fn run_loop<F: FnMut()>(cell: &StateCell, tick: Duration, mut on_active: F) {
    loop {
        match cell.get() {
            LifecycleState::Dying => break,
            LifecycleState::Started => on_active(),
            LifecycleState::Starting => {
                tracing::info!("starting");
                cell.request(LifecycleState::Started);
            }
            LifecycleState::Stopping => {
                tracing::info!("stopping");
                cell.request(LifecycleState::Stopped);
            }
            LifecycleState::NotStarted | LifecycleState::Stopped => {}
        }
        std::thread::sleep(tick);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const TICK: Duration = Duration::from_millis(1);

    fn settle() {
        std::thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn starting_transitions_to_started() {
        let cell = StateCell::new();
        let thread_cell = cell.clone();
        let handle = std::thread::spawn(move || run_loop(&thread_cell, TICK, || {}));

        cell.start();
        settle();
        assert_eq!(cell.get(), LifecycleState::Started);

        cell.kill();
        handle.join().unwrap();
    }

    #[test]
    fn stopping_parks_the_loop() {
        let cell = StateCell::new();
        let ticks = Arc::new(AtomicUsize::new(0));

        let thread_cell = cell.clone();
        let thread_ticks = ticks.clone();
        let handle = std::thread::spawn(move || {
            run_loop(&thread_cell, TICK, || {
                thread_ticks.fetch_add(1, Ordering::SeqCst);
            })
        });

        cell.start();
        settle();
        cell.stop();
        settle();
        assert_eq!(cell.get(), LifecycleState::Stopped);

        let at_stop = ticks.load(Ordering::SeqCst);
        assert!(at_stop > 0);
        settle();
        // No active ticks while stopped.
        assert_eq!(ticks.load(Ordering::SeqCst), at_stop);

        cell.kill();
        handle.join().unwrap();
    }

    #[test]
    fn dying_exits_the_loop() {
        let cell = StateCell::new();
        let thread_cell = cell.clone();
        let handle = std::thread::spawn(move || run_loop(&thread_cell, TICK, || {}));
        cell.kill();
        handle.join().unwrap();
        assert!(!cell.get().is_running());
    }

    #[test]
    fn all_states_but_dying_are_running() {
        for state in [
            LifecycleState::NotStarted,
            LifecycleState::Starting,
            LifecycleState::Started,
            LifecycleState::Stopping,
            LifecycleState::Stopped,
        ] {
            assert!(state.is_running(), "{state} should count as running");
        }
        assert!(!LifecycleState::Dying.is_running());
    }
}
