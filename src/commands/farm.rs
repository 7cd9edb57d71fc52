//! Farm commands: create, list, rm, update.
//!
//! Each command loads the config, mutates it in memory, and writes it back
//! whole. On any validation error nothing is persisted.

use anyhow::{Result, bail};
use colored::Colorize;
use std::collections::BTreeSet;

use crate::Context;
use crate::cli::UpdateArgs;
use crate::config::Config;
use crate::reconcile::{DefaultDirective, UpdateRequest, reconcile};
use crate::ui;

/// Update a farm's membership and/or the default-farm selection
pub fn update(_ctx: &Context, args: &UpdateArgs) -> Result<()> {
    let request = UpdateRequest {
        add: args.add.clone(),
        remove: args.remove.clone(),
        default: DefaultDirective::from_flag(args.default),
    };

    let config = Config::load()?;
    let updated = reconcile(&config, &args.farm, &request)?;

    let path = updated.save()?;
    log::debug!("wrote config to {}", path.display());

    ui::success(&format!("Farm {:?} updated", args.farm));
    Ok(())
}

/// Create a new farm from registered connections
pub fn create(ctx: &Context, name: &str, connections: &[String]) -> Result<()> {
    let mut config = Config::load()?;

    if config.farms.list.contains_key(name) {
        bail!("farm with name {name:?} already exists");
    }

    for connection in connections {
        if !config.has_connection(connection) {
            bail!("cannot create farm, {connection:?} is not a system connection");
        }
    }

    let members: BTreeSet<String> = connections.iter().cloned().collect();
    let first_farm = config.farms.list.is_empty();
    config.farms.list.insert(name.to_string(), members);

    // The first farm becomes the default
    if first_farm {
        config.farms.default = name.to_string();
    }

    config.save()?;
    ui::success(&format!("Farm {name:?} created"));
    if first_farm && !ctx.quiet {
        ui::dim(&format!("{name:?} is now the default farm"));
    }
    Ok(())
}

/// Remove one or more farms
pub fn rm(_ctx: &Context, farms: &[String]) -> Result<()> {
    let mut config = Config::load()?;

    for name in farms {
        if config.farms.list.remove(name).is_none() {
            bail!("cannot remove farm, {name:?} farm doesn't exist");
        }
        if config.farms.default == *name {
            config.farms.default.clear();
            ui::warn(&format!("Removed farm {name:?} was the default farm"));
        }
    }

    config.save()?;
    for name in farms {
        ui::success(&format!("Farm {name:?} deleted"));
    }
    Ok(())
}

/// List farms with their connections, marking the default
pub fn list(_ctx: &Context) -> Result<()> {
    ui::header("Farms");

    let config = Config::load()?;

    if config.farms.list.is_empty() {
        ui::dim("No farms configured");
        return Ok(());
    }

    ui::kv("Total", &config.farms.list.len().to_string());
    println!();

    for (name, connections) in &config.farms.list {
        let default_marker = if *name == config.farms.default {
            " (default)".cyan().to_string()
        } else {
            String::new()
        };

        println!(
            "  {}{} {}",
            name.bold(),
            default_marker,
            format!("({} connections)", connections.len()).dimmed()
        );
        for connection in connections {
            println!("    {}", connection.dimmed());
        }
    }

    Ok(())
}
