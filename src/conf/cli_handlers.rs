// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    channel::{Command, code},
    companion::{
        CompanionServer, ControllerStatus, DryRunMounter, MountController, Mounter, SysMounter,
    },
    conf::{
        cli::{Action, Cli},
        config::{CONFIG_FILE_DEFAULT, Config},
    },
    dispatcher::{self, DispatchOutcome},
    host::{Module, SocketHost},
    policy::PolicyCache,
    utils,
};

pub fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return Config::from_file(config_path).with_context(|| {
            format!(
                "Failed to load config from custom path: {}",
                config_path.display()
            )
        });
    }

    match Config::load_default() {
        Ok(config) => Ok(config),
        Err(e) => {
            let is_not_found = e
                .root_cause()
                .downcast_ref::<std::io::Error>()
                .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                .unwrap_or(false);

            if is_not_found {
                Ok(Config::default())
            } else {
                Err(e).context(format!(
                    "Failed to load default config from {}",
                    CONFIG_FILE_DEFAULT
                ))
            }
        }
    }
}

pub fn handle_gen_config(output: &Path) -> Result<()> {
    Config::default()
        .save_to_file(output)
        .with_context(|| format!("Failed to save generated config to {}", output.display()))
}

pub fn handle_show_config(config: &Config) -> Result<()> {
    let json = serde_json::to_string(config).context("Failed to serialize config to JSON")?;

    println!("{}", json);

    Ok(())
}

pub fn handle_daemon(config: &Config) -> Result<()> {
    if config.dry_run {
        tracing::info!(":: DRY-RUN MODE :: mount table is simulated");
        return serve(config, DryRunMounter::default());
    }

    serve(config, SysMounter)
}

fn serve<M: Mounter>(config: &Config, mounter: M) -> Result<()> {
    if !config.spoof_source.exists() {
        tracing::warn!(
            "Spoof source {} is missing; activate requests will fail",
            config.spoof_source.display()
        );
    }

    let controller = MountController::new(mounter, &config.spoof_source, &config.target)
        .with_hardening(config.harden_source);

    CompanionServer::bind(&config.socket_path, controller, config.io_timeout())
        .context("Failed to start companion")?
        .with_status_file(&config.status_file)
        .run()
}

pub fn handle_specialize(config: &Config, app_id: Option<&str>) -> Result<()> {
    let host = SocketHost::new(&config.socket_path, config.io_timeout());
    let module = Module::on_load(&config.policy_file);

    let outcome = module.pre_app_specialize(app_id, &host);
    tracing::info!(
        "{}: {}",
        app_id.unwrap_or("<none>"),
        describe(&outcome)
    );

    Ok(())
}

pub fn handle_classify(config: &Config, app_id: &str) -> Result<()> {
    let cache = PolicyCache::new(&config.policy_file);

    if !cache.ensure_fresh() {
        anyhow::bail!(
            "Policy file {} is missing or malformed",
            config.policy_file.display()
        );
    }

    if let Some(snapshot) = cache.snapshot() {
        println!(
            "policy: {} ({} blacklist, {} gamelist)",
            config.policy_file.display(),
            snapshot.suppress_count(),
            snapshot.activate_count()
        );
    }
    println!("{}: {}", app_id, cache.classify(app_id));

    Ok(())
}

pub fn handle_request(config: &Config, action: Action) -> Result<()> {
    let host = SocketHost::new(&config.socket_path, config.io_timeout());
    let command = Command::from(action);

    let result = dispatcher::send_command(&host, command)
        .with_context(|| format!("Failed to send {}", command))?;

    println!("{}: {}", command, result);

    if result != code::SUCCESS {
        anyhow::bail!("Companion returned {}", result);
    }

    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    #[serde(flatten)]
    controller: ControllerStatus,
    target_mounted: bool,
    spoof_source_present: bool,
    policy_present: bool,
}

pub fn handle_status(config: &Config) -> Result<()> {
    let report = StatusReport {
        controller: ControllerStatus::load(&config.status_file)?,
        target_mounted: utils::is_mounted(&config.target),
        spoof_source_present: config.spoof_source.exists(),
        policy_present: config.policy_file.exists(),
    };

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize status")?;

    println!("{}", json);

    Ok(())
}

fn describe(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Skipped => "skipped".to_string(),
        DispatchOutcome::Unlisted => "unlisted, left alone".to_string(),
        DispatchOutcome::Sent { command, result } if *result == code::SUCCESS => {
            format!("{} ok", command)
        }
        DispatchOutcome::Sent { command, result } => format!("{} failed ({})", command, result),
    }
}
