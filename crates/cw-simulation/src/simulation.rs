use cw_core::World;

use crate::clock::SimClock;
use crate::collision::CollisionSystem;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::eating::EatingSystem;
use crate::error::SimResult;
use crate::event::EventLog;
use crate::integration::IntegrationSystem;
use crate::merging::MergingSystem;
use crate::relaxation::ConstraintRelaxationSystem;
use crate::reproduction::ReproductionSystem;
use crate::system::System;

/// The top-level simulation orchestrator.
///
/// Owns the world, clock, configuration, event log, and registered systems.
/// Drives the tick loop; each system sees the world exactly as the previous
/// one left it.
pub struct Simulation {
    world: World,
    clock: SimClock,
    config: SimConfig,
    events: EventLog,
    systems: Vec<Box<dyn System>>,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("cells", &self.world.cell_count())
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a new simulation from a world and configuration.
    pub fn new(world: World, config: SimConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            world,
            clock: SimClock::new(),
            config,
            events,
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Register the six cell systems in their fixed order: collision,
    /// relaxation, integration, merging, eating, reproduction.
    pub fn with_default_systems(mut self) -> Self {
        self.add_system(CollisionSystem::new());
        self.add_system(ConstraintRelaxationSystem::new());
        self.add_system(IntegrationSystem::new());
        self.add_system(MergingSystem::new());
        self.add_system(EatingSystem::new());
        self.add_system(ReproductionSystem::new());
        self
    }

    /// Register a system. Systems are ticked in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Validate the configuration and initialize all registered systems.
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.config.validate()?;
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                world: &mut self.world,
                clock: &self.clock,
                config: &self.config,
                events: &mut self.events,
            };
            let result = system.init(&mut ctx);
            self.systems[i] = system;
            result?;
        }
        tracing::debug!(systems = self.systems.len(), "simulation initialized");
        self.initialized = true;
        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// A failing system aborts the rest of the tick; the clock has already
    /// advanced and earlier systems' writes stay applied.
    pub fn tick(&mut self) -> SimResult<()> {
        if !self.initialized {
            self.init()?;
        }

        let tick = self.clock.advance();
        let span = tracing::debug_span!("tick", tick);
        let _guard = span.enter();

        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                world: &mut self.world,
                clock: &self.clock,
                config: &self.config,
                events: &mut self.events,
            };
            let result = system.tick(&mut ctx);
            if let Err(e) = &result {
                tracing::warn!(system = system.name(), error = %e, "system failed");
            }
            self.systems[i] = system;
            result?;
        }
        Ok(())
    }

    /// Advance the simulation by `n` ticks.
    pub fn run(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    /// The cell store.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the cell store, for spawning between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The tick counter.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Events recorded so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Names of the registered systems, in tick order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Extract the world, consuming the simulation.
    pub fn into_world(self) -> World {
        self.world
    }

    /// Number of ticks completed.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }
}

/// Placeholder system used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
