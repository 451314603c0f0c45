//! Single-writer / multi-reader hand-off of simulation state.
//!
//! The simulation thread publishes a complete `State` after every tick;
//! renderer and audio callback each keep a `SnapshotReader` that swaps in the
//! latest `Arc<State>` without locking and reports whether it moved on.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::state::State;

/// Latest published simulation state
pub struct SnapshotBus {
    current: ArcSwap<State>,
}

impl SnapshotBus {
    pub fn new(initial: State) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Replace the current state (writer side)
    pub fn publish(&self, state: State) {
        self.current.store(Arc::new(state));
    }

    /// Most recent state
    pub fn latest(&self) -> Arc<State> {
        self.current.load_full()
    }

    /// New reader positioned at the current state
    pub fn reader(self: &Arc<Self>) -> SnapshotReader {
        let last = self.latest();
        SnapshotReader {
            bus: Arc::clone(self),
            last_tick: last.n,
            last,
        }
    }
}

/// State seen by a reader, with a flag telling whether it advanced
#[derive(Debug, Clone)]
pub struct Snapshot {
    state: Arc<State>,
    fresh: bool,
}

impl Snapshot {
    pub fn state(&self) -> &State {
        &self.state
    }

    /// True when the simulation moved on since the reader's previous poll
    pub fn fresh(&self) -> bool {
        self.fresh
    }
}

/// Per-consumer cursor over the bus
pub struct SnapshotReader {
    bus: Arc<SnapshotBus>,
    last: Arc<State>,
    last_tick: u64,
}

impl SnapshotReader {
    /// Pick up the newest state, or keep the last one when nothing arrived
    pub fn poll(&mut self) -> Snapshot {
        let latest = self.bus.latest();
        let fresh = latest.n != self.last_tick;
        if fresh {
            self.last_tick = latest.n;
            self.last = latest;
        }
        Snapshot {
            state: Arc::clone(&self.last),
            fresh,
        }
    }

    /// Last state handed out, without polling
    pub fn current(&self) -> &State {
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Pose;
    use crate::lamp::agent::ConstantNoise;
    use crate::params::LampPhysics;

    fn bus() -> (Arc<SnapshotBus>, State, LampPhysics) {
        let physics = LampPhysics::default();
        let state = State::init(&physics, Pose::default());
        (Arc::new(SnapshotBus::new(state.clone())), state, physics)
    }

    #[test]
    fn test_reader_reports_freshness() {
        let (bus, mut state, physics) = bus();
        let mut reader = bus.reader();

        assert!(!reader.poll().fresh());

        state.simulate(1.0 / 60.0, &mut ConstantNoise(0.0), &physics);
        bus.publish(state.clone());

        let snapshot = reader.poll();
        assert!(snapshot.fresh());
        assert_eq!(snapshot.state().n, 1);

        // Nothing new: the same state comes back, marked stale
        let again = reader.poll();
        assert!(!again.fresh());
        assert_eq!(again.state().n, 1);
    }

    #[test]
    fn test_readers_are_independent() {
        let (bus, mut state, physics) = bus();
        let mut video = bus.reader();
        let mut audio = bus.reader();

        state.simulate(1.0 / 60.0, &mut ConstantNoise(0.0), &physics);
        bus.publish(state.clone());

        assert!(video.poll().fresh());
        assert!(audio.poll().fresh());
        assert!(!video.poll().fresh());
    }

    #[test]
    fn test_reader_survives_writer_on_other_thread() {
        let (bus, mut state, physics) = bus();
        let mut reader = bus.reader();

        let writer_bus = Arc::clone(&bus);
        let writer = std::thread::spawn(move || {
            let mut calm = ConstantNoise(0.0);
            for _ in 0..100 {
                state.simulate(1.0 / 60.0, &mut calm, &physics);
                writer_bus.publish(state.clone());
            }
        });
        writer.join().unwrap();

        let snapshot = reader.poll();
        assert!(snapshot.fresh());
        assert_eq!(snapshot.state().n, 100);
        assert_eq!(reader.current().n, 100);
    }
}
