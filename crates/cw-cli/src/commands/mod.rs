pub mod config;
pub mod simulate;

use std::path::Path;

use cw_simulation::SimConfig;

/// Load a configuration file, or the defaults when no path is given.
fn load_config(path: Option<&Path>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    SimConfig::from_json_str(&json).map_err(|e| format!("{}: {e}", path.display()))
}
