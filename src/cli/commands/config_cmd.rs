//! config command - Get, set, or list configuration values

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::{ActionsConfig, Config, DexConfig};

/// Print the effective configuration.
pub fn list(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    println!("user = {}", config.user().unwrap_or("(unset)"));
    println!("history_limit = {}", config.history_limit());
    println!("log_filter = {}", config.log_filter());
    println!(
        "actions.minor_version_additions = {}",
        config.minor_version_additions()
    );
    let locked = config.locked_view_groups()?;
    println!(
        "view_groups.locked = [{}]",
        locked
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

/// Print where configuration is read from.
pub fn path(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => println!("{}", path.display()),
        None => {
            let path = Config::global_config_path()?;
            println!("{} (not present)", path.display());
        }
    }
    Ok(())
}

/// Set a configuration value and write the file atomically.
///
/// Writes back to the file configuration was loaded from, or to
/// `~/.dex/config.toml` when none exists yet.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut file: DexConfig = ctx.config.file.clone();

    match key {
        "user" => file.user = Some(value.to_string()),
        "history_limit" => {
            let limit: usize = value
                .parse()
                .with_context(|| format!("history_limit must be a number, got '{value}'"))?;
            file.history_limit = Some(limit);
        }
        "log_filter" => file.log_filter = Some(value.to_string()),
        "actions.minor_version_additions" => {
            let enabled: bool = value
                .parse()
                .with_context(|| format!("expected true or false, got '{value}'"))?;
            file.actions
                .get_or_insert_with(ActionsConfig::default)
                .minor_version_additions = Some(enabled);
        }
        _ => bail!("Unknown configuration key: {}", key),
    }

    file.validate().context("Invalid configuration value")?;

    let path = match ctx.config.loaded_from() {
        Some(path) => {
            file.write(path).context("Failed to write config")?;
            path.to_path_buf()
        }
        None => Config::write_global(&file).context("Failed to write config")?,
    };

    if !ctx.quiet {
        println!("Set {} = {} in {}", key, value, path.display());
    }
    Ok(())
}
