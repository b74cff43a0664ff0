use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use cw_core::CellKind;
use cw_simulation::{
    CollisionSystem, EatingSystem, MergingSystem, ReproductionSystem, SimEventKind, Simulation,
};

use crate::scene;

/// Options for `cw simulate`.
pub struct SimulateArgs {
    /// Number of ticks to run.
    pub ticks: u64,
    /// Seed for scene generation.
    pub seed: u64,
    /// Organisms to seed.
    pub organisms: usize,
    /// Loose food cells to scatter.
    pub food: usize,
    /// Optional JSON config file.
    pub config: Option<PathBuf>,
    /// Print the full event log.
    pub verbose: bool,
}

/// Seed a world, run it, and print a summary.
pub fn run(args: &SimulateArgs) -> Result<(), String> {
    let config = super::load_config(args.config.as_deref())?;
    let world = scene::seed_world(&config, args.seed, args.organisms, args.food)?;
    let cells_before = world.cell_count();

    let mut sim = Simulation::new(world, config).with_default_systems();
    sim.init()
        .map_err(|e| format!("simulation init failed: {e}"))?;
    sim.run(args.ticks)
        .map_err(|e| format!("simulation error at tick {}: {e}", sim.current_tick()))?;

    // Header
    println!(
        "  {} {}",
        "Simulation".bold(),
        format!(
            "({} ticks, seed={}, {} organisms, {} food)",
            args.ticks, args.seed, args.organisms, args.food
        )
        .dimmed()
    );
    println!(
        "  {} cells at start, {} at end, {} events logged",
        cells_before,
        sim.world().cell_count(),
        sim.events().len()
    );
    println!();

    if args.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    // Totals over the whole run
    let log = sim.events();
    let meals = log.count_where(|k| matches!(k, SimEventKind::FoodEaten { .. }));
    let merges = log.count_where(|k| matches!(k, SimEventKind::OrganismsMerged { .. }));
    let births = log.count_where(|k| matches!(k, SimEventKind::Reproduced { .. }));

    println!("  {}", "Activity".bold().underline());
    println!();
    let mut activity = Table::new();
    activity.set_content_arrangement(ContentArrangement::Dynamic);
    activity.set_header(vec!["Event", "Whole run", "Last tick"]);
    activity.add_row(vec![
        "Meals".to_string(),
        meals.to_string(),
        last_tick(sim.get_system::<EatingSystem>().map(EatingSystem::last_meals)),
    ]);
    activity.add_row(vec![
        "Merges".to_string(),
        merges.to_string(),
        last_tick(sim.get_system::<MergingSystem>().map(MergingSystem::last_merged)),
    ]);
    activity.add_row(vec![
        "Births".to_string(),
        births.to_string(),
        last_tick(
            sim.get_system::<ReproductionSystem>()
                .map(ReproductionSystem::last_offspring),
        ),
    ]);
    activity.add_row(vec![
        "Collisions".to_string(),
        "--".to_string(),
        last_tick(
            sim.get_system::<CollisionSystem>()
                .map(CollisionSystem::last_corrected),
        ),
    ]);
    println!("{activity}");
    println!();

    // Population by kind
    println!("  {}", "Population".bold().underline());
    println!();
    let counts = sim.world().cell_counts_by_kind();
    let mut population = Table::new();
    population.set_content_arrangement(ContentArrangement::Dynamic);
    population.set_header(vec!["Kind", "Cells"]);
    for kind in CellKind::ALL {
        let n = counts.get(&kind).copied().unwrap_or(0);
        population.add_row(vec![kind.to_string(), n.to_string()]);
    }
    population.add_row(vec![
        "organisms".bold().to_string(),
        sim.world().organism_count().to_string(),
    ]);
    println!("{population}");
    println!();

    Ok(())
}

fn last_tick(count: Option<usize>) -> String {
    count.map_or_else(|| "--".to_string(), |n| n.to_string())
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::FoodEaten { .. } => description.green(),
        SimEventKind::EnergyGained { .. } => description.yellow(),
        SimEventKind::OrganismsMerged { .. } => description.cyan(),
        SimEventKind::Reproduced { .. } => description.magenta().bold(),
        SimEventKind::Custom { .. } => description.normal(),
    }
}
