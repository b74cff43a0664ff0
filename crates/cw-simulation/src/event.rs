use cw_core::{CellId, OrganismId};

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Eating
    /// A mouth consumed a food cell.
    FoodEaten {
        /// The mouth that ate.
        mouth: CellId,
        /// The food cell, destroyed at playback.
        food: CellId,
        /// The organism credited with the meal.
        organism: OrganismId,
    },
    /// An organism owner's energy reserve grew.
    EnergyGained {
        /// The organism whose owner was credited.
        organism: OrganismId,
        /// Energy added.
        amount: f32,
        /// Reserve after the credit.
        total: f32,
    },

    // Merging
    /// A connector latched onto a foreign structure cell.
    OrganismsMerged {
        /// The connector that initiated the merge.
        connector: CellId,
        /// The structure cell that was relabeled.
        structure: CellId,
        /// The label both cells now share.
        organism: OrganismId,
    },

    // Reproduction
    /// A reproducer paid the cost and its organism was cloned.
    Reproduced {
        /// The reproducer that paid.
        root: CellId,
        /// Label of the new organism.
        organism: OrganismId,
        /// Number of cells cloned.
        clones: usize,
    },

    // Custom
    /// A user-defined event.
    Custom {
        /// A label identifying the custom event type.
        label: String,
        /// The cells involved in this custom event.
        cells: Vec<CellId>,
    },
}

impl SimEventKind {
    /// Check whether a given cell is involved in this event.
    pub fn involves(&self, id: CellId) -> bool {
        match self {
            Self::FoodEaten {
                mouth,
                food,
                organism,
            } => *mouth == id || *food == id || organism.owner() == id,
            Self::EnergyGained { organism, .. } => organism.owner() == id,
            Self::OrganismsMerged {
                connector,
                structure,
                ..
            } => *connector == id || *structure == id,
            Self::Reproduced { root, organism, .. } => *root == id || organism.owner() == id,
            Self::Custom { cells, .. } => cells.contains(&id),
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given cell.
    pub fn events_for_cell(&self, id: CellId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Count events matching a predicate on their kind.
    pub fn count_where(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
