// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cpu_guard::{
    conf::{
        cli::{Cli, Commands},
        cli_handlers,
    },
    defs, utils,
};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::GenConfig { output } = &cli.command {
        return cli_handlers::handle_gen_config(output);
    }

    let mut config = cli_handlers::load_config(&cli)?;

    let dry_run = matches!(cli.command, Commands::Daemon { dry_run: true });
    config.merge_with_cli(cli.verbose, dry_run);

    // Only the long-lived companion writes a log file.
    let log_path = match cli.command {
        Commands::Daemon { .. } if !config.dry_run => Some(Path::new(defs::DAEMON_LOG_FILE)),
        _ => None,
    };

    let _log_guard =
        utils::init_logging(config.verbose, log_path).context("Failed to initialize logging")?;

    match &cli.command {
        Commands::Daemon { .. } => {
            tracing::info!(">> Starting CPU Guard companion...");
            if let Ok(version) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
                tracing::debug!("Kernel Version: {}", version.trim());
            }
            cli_handlers::handle_daemon(&config)
        }
        Commands::Specialize { app_id } => {
            cli_handlers::handle_specialize(&config, app_id.as_deref())
        }
        Commands::Classify { app_id } => cli_handlers::handle_classify(&config, app_id),
        Commands::Request { action } => cli_handlers::handle_request(&config, *action),
        Commands::Status => cli_handlers::handle_status(&config),
        Commands::ShowConfig => cli_handlers::handle_show_config(&config),
        Commands::GenConfig { .. } => Ok(()),
    }
}
