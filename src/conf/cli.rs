// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::{channel::Command, defs};

#[derive(Parser, Debug)]
#[command(name = "cpu-guard", version, about = "Per-app /proc/cpuinfo spoofing")]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the privileged companion
    Daemon {
        /// Keep an in-memory mount table instead of calling mount(2)
        #[arg(long)]
        dry_run: bool,
    },
    /// Handle one app specialization event
    Specialize { app_id: Option<String> },
    /// Print how the policy classifies an app
    Classify { app_id: String },
    /// Send a raw command to the companion
    Request { action: Action },
    Status,
    GenConfig {
        #[arg(short = 'o', long = "output", default_value = defs::CONFIG_FILE)]
        output: PathBuf,
    },
    ShowConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Action {
    Mount,
    Unmount,
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        match action {
            Action::Mount => Command::ActivateSubstitution,
            Action::Unmount => Command::SuppressSubstitution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daemon_flags() {
        let cli = Cli::try_parse_from(["cpu-guard", "-v", "daemon", "--dry-run"]).expect("parse");

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Daemon { dry_run: true }));
    }

    #[test]
    fn specialize_identifier_is_optional() {
        let cli = Cli::try_parse_from(["cpu-guard", "specialize"]).expect("parse");
        assert!(matches!(cli.command, Commands::Specialize { app_id: None }));

        let cli = Cli::try_parse_from(["cpu-guard", "specialize", "com.b"]).expect("parse");
        assert!(
            matches!(cli.command, Commands::Specialize { app_id: Some(ref id) } if id == "com.b")
        );
    }

    #[test]
    fn request_actions_map_to_commands() {
        let cli = Cli::try_parse_from(["cpu-guard", "request", "unmount"]).expect("parse");
        let Commands::Request { action } = cli.command else {
            panic!("expected request");
        };
        assert_eq!(Command::from(action), Command::SuppressSubstitution);

        assert!(Cli::try_parse_from(["cpu-guard", "request", "remount"]).is_err());
    }
}
