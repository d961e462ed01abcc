use volley_core::store::Store;

// ---------------------------------------------------------------------------
// LightSink
// ---------------------------------------------------------------------------

/// Seam to the physical output (a GPIO pin on the reference hardware).
pub trait LightSink {
    fn set(&mut self, on: bool);
}

/// Sink that only logs transitions. Used without the rig attached, and as
/// the base for the real pin driver.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<bool>,
}

impl LightSink for LogSink {
    fn set(&mut self, on: bool) {
        if self.last != Some(on) {
            tracing::info!(on, "light state changed");
        }
        self.last = Some(on);
    }
}

// ---------------------------------------------------------------------------
// LightController
// ---------------------------------------------------------------------------

/// One poll step: reload the store, read `light_status`, drive the sink.
/// This daemon is a pure reader of the store; the console is the sole
/// writer of the light field. Eventual consistency only: a write is seen
/// at the next poll after the console's flush.
pub struct LightController<S: LightSink> {
    store: Store,
    sink: S,
}

impl<S: LightSink> LightController<S> {
    pub fn new(store: Store, sink: S) -> Self {
        Self { store, sink }
    }

    pub fn poll(&mut self) {
        if let Err(e) = self.store.reload() {
            // A torn read loses one poll, not the daemon.
            tracing::warn!(error = %e, "could not reload store, keeping last light state");
            return;
        }
        self.sink.set(self.store.data.light_status);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use volley_core::lifecycle::{self, StateCell};

    #[derive(Default)]
    struct RecordingSink {
        states: Vec<bool>,
    }

    impl LightSink for RecordingSink {
        fn set(&mut self, on: bool) {
            self.states.push(on);
        }
    }

    #[test]
    fn poll_tracks_the_writers_flushes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.yaml");

        let mut writer = Store::open(&path).unwrap();
        writer.flush().unwrap();

        let reader = Store::open(&path).unwrap();
        let mut controller = LightController::new(reader, RecordingSink::default());

        controller.poll();
        writer.set_light(true);
        writer.flush().unwrap();
        controller.poll();
        writer.set_light(false);
        writer.flush().unwrap();
        controller.poll();

        assert_eq!(controller.sink().states, vec![false, true, false]);
    }

    #[test]
    fn unflushed_writes_stay_invisible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.yaml");

        let mut writer = Store::open(&path).unwrap();
        writer.flush().unwrap();

        let reader = Store::open(&path).unwrap();
        let mut controller = LightController::new(reader, RecordingSink::default());

        writer.set_light(true); // no flush
        controller.poll();
        assert_eq!(controller.sink().states, vec![false]);
    }

    #[test]
    fn corrupt_store_skips_a_poll_without_crashing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.yaml");

        let mut writer = Store::open(&path).unwrap();
        writer.set_light(true);
        writer.flush().unwrap();

        let reader = Store::open(&path).unwrap();
        let mut controller = LightController::new(reader, RecordingSink::default());
        controller.poll();

        std::fs::write(&path, "light_status: {broken").unwrap();
        controller.poll();
        // Only the good poll drove the sink.
        assert_eq!(controller.sink().states, vec![true]);
    }

    #[test]
    fn shutdown_request_ends_the_poll_loop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.yaml");
        let mut writer = Store::open(&path).unwrap();
        writer.flush().unwrap();

        let store = Store::open(&path).unwrap();
        let state = StateCell::new();
        state.start();

        // Same wiring as the daemon: a cloned cell plays the part of the
        // ctrl-c handler and requests `Dying` mid-run.
        let watcher = state.clone();
        let handle = std::thread::spawn(move || {
            let mut controller = LightController::new(store, RecordingSink::default());
            lifecycle::run_loop(&state, Duration::from_millis(1), || controller.poll());
            controller.sink().states.len()
        });

        std::thread::sleep(Duration::from_millis(50));
        watcher.kill();
        let polls = handle.join().unwrap();
        // The loop exited through the lifecycle after having polled.
        assert!(polls > 0);
        assert!(!watcher.get().is_running());
    }
}
