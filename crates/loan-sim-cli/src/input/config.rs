use loan_sim_core::config::SimulatorConfig;

use crate::input::file;

/// Load the simulator config, or the defaults when no file is given.
pub fn load(path: Option<&str>) -> Result<SimulatorConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        log::debug!("no --config given, using default simulator settings");
        return Ok(SimulatorConfig::default());
    };

    let config: SimulatorConfig = file::read_json_or_yaml(path)?;
    config.check()?;
    log::info!(
        "loaded config from {path}: {} rate limit override(s), limits {}",
        config.rate_limit_overrides.len(),
        if config.enforce_rate_limits { "enforced" } else { "not enforced" }
    );
    Ok(config)
}
