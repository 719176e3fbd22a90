//! Configuration command handler.
//!
//! Prints the effective configuration as pretty JSON, one
//! `{"value": ..., "source": ...}` object per setting, where source is one of
//! `default`, `file`, `env` or `cli`.

use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Handle the cfg command.
///
/// # Errors
///
/// Returns `CliError::Config` if any configuration layer is unreadable or the
/// merged result is invalid, `CliError::Io` if writing fails.
pub fn handle_cfg_command(
    overrides: &Overrides,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let config::ConfigResolved { config, sources } = config::resolve(overrides)?;
    if config.seed.is_none() {
        ui::display_warning(err, "no seed configured, sim runs will not be reproducible")?;
    }
    let display = serde_json::json!({
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "starting_stack": {
            "value": config.starting_stack,
            "source": sources.starting_stack,
        },
        "small_blind": {
            "value": config.small_blind,
            "source": sources.small_blind,
        },
        "big_blind": {
            "value": config.big_blind,
            "source": sources.big_blind,
        },
        "unclaimed_pot_policy": {
            "value": config.unclaimed_pot_policy,
            "source": sources.unclaimed_pot_policy,
        },
        "cache_capacity": {
            "value": config.cache_capacity,
            "source": sources.cache_capacity,
        },
        "personalities": {
            "value": config.personalities,
            "source": sources.personalities,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
