use std::collections::VecDeque;

use cw_core::{Cell, CellId, Constraint, OrganismId, World};
use rayon::iter::{IntoParallelIterator, ParallelExtend};

/// A structural or cross-cell write recorded during a parallel scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Remove a cell.
    Destroy(CellId),
    /// Overwrite a cell's organism label.
    SetOrganism {
        /// The cell to relabel.
        cell: CellId,
        /// The new label.
        organism: OrganismId,
    },
    /// Append a link to a cell's constraint list.
    AppendConstraint {
        /// The cell that will own the link.
        cell: CellId,
        /// The link to append.
        constraint: Constraint,
    },
    /// Insert a new cell.
    Spawn(Box<Cell>),
}

/// Outcome of a playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playback {
    /// Commands that took effect.
    pub applied: usize,
    /// Commands whose cell was gone, or whose write was rejected.
    pub skipped: usize,
}

/// Write-behind buffer.
///
/// Parallel scans extend the buffer instead of touching shared state; the
/// buffer is then played back on a single thread, in recording order.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Return `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Apply every command to `world`.
    ///
    /// A command addressing a cell that no longer exists is skipped; the
    /// rest still apply. Consecutive `Destroy` commands are removed as one
    /// batch, which keeps the effect identical to applying them one by one.
    pub fn playback(self, world: &mut World) -> Playback {
        let mut report = Playback::default();
        let mut doomed: Vec<CellId> = Vec::new();
        for command in self.commands {
            if let Command::Destroy(id) = command {
                doomed.push(id);
                continue;
            }
            flush_destroys(world, &mut doomed, &mut report);
            if apply(world, command) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }
        flush_destroys(world, &mut doomed, &mut report);

        if report.skipped > 0 {
            tracing::trace!(skipped = report.skipped, "skipped stale commands at playback");
        }
        report
    }
}

fn flush_destroys(world: &mut World, doomed: &mut Vec<CellId>, report: &mut Playback) {
    if doomed.is_empty() {
        return;
    }
    let requested = doomed.len();
    let removed = world.remove_cells(doomed.drain(..)).len();
    report.applied += removed;
    report.skipped += requested - removed;
}

fn apply(world: &mut World, command: Command) -> bool {
    match command {
        Command::Destroy(id) => world.remove_cell(id).is_ok(),
        Command::SetOrganism { cell, organism } => world.set_organism(cell, organism),
        Command::AppendConstraint { cell, constraint } => {
            world.append_constraint(cell, constraint).is_ok()
        }
        Command::Spawn(cell) => {
            let id = cell.id;
            match world.add_cell(*cell) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(cell = %id, error = %e, "dropping spawned cell");
                    false
                }
            }
        }
    }
}

impl Extend<Command> for CommandBuffer {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl ParallelExtend<Command> for CommandBuffer {
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = Command>,
    {
        self.commands.par_extend(par_iter);
    }
}

/// A pending credit to an organism's energy reserve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyGain {
    /// The organism whose owner cell is credited.
    pub organism: OrganismId,
    /// Energy to add.
    pub amount: f32,
}

/// Multi-producer, single-consumer queue of energy credits.
///
/// Producers fill it from a parallel scan; [`EnergyQueue::drain_into`] is
/// the only consumer and runs on one thread, so concurrent meals for the
/// same organism never race on its reserve.
#[derive(Debug, Default)]
pub struct EnergyQueue {
    pending: VecDeque<EnergyGain>,
}

impl EnergyQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one credit.
    pub fn push(&mut self, gain: EnergyGain) {
        self.pending.push_back(gain);
    }

    /// Number of pending credits.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Return `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending credit to its owner's reserve, in order.
    ///
    /// Returns the credits that landed together with the owner's new total.
    /// Credits whose owner is gone or has no reserve are dropped.
    pub fn drain_into(&mut self, world: &mut World) -> Vec<(EnergyGain, f32)> {
        let mut applied = Vec::with_capacity(self.pending.len());
        while let Some(gain) = self.pending.pop_front() {
            match world.add_energy(gain.organism.owner(), gain.amount) {
                Some(total) => applied.push((gain, total)),
                None => {
                    tracing::trace!(organism = %gain.organism, "energy owner missing, credit dropped");
                }
            }
        }
        applied
    }
}

impl Extend<EnergyGain> for EnergyQueue {
    fn extend<I: IntoIterator<Item = EnergyGain>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}

impl ParallelExtend<EnergyGain> for EnergyQueue {
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = EnergyGain>,
    {
        self.pending.par_extend(par_iter);
    }
}
