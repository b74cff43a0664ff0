use cw_core::World;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};

/// Mutable context passed to each system during a tick.
pub struct SimContext<'a> {
    /// The cell store.
    pub world: &'a mut World,
    /// The tick counter.
    pub clock: &'a SimClock,
    /// Run configuration.
    pub config: &'a SimConfig,
    /// Event sink.
    pub events: &'a mut EventLog,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.clock.tick(), kind, description));
    }

    /// The current tick number.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }
}
