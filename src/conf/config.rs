// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::defs;

pub const CONFIG_FILE_DEFAULT: &str = defs::CONFIG_FILE;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_policy_file")]
    pub policy_file: PathBuf,
    #[serde(default = "default_spoof_source")]
    pub spoof_source: PathBuf,
    #[serde(default = "default_target")]
    pub target: PathBuf,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
    #[serde(default = "default_harden_source")]
    pub harden_source: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_policy_file() -> PathBuf {
    PathBuf::from(defs::POLICY_FILE)
}

fn default_spoof_source() -> PathBuf {
    PathBuf::from(defs::SPOOF_SOURCE_FILE)
}

fn default_target() -> PathBuf {
    PathBuf::from(defs::SPOOF_TARGET)
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(defs::COMPANION_SOCKET)
}

fn default_status_file() -> PathBuf {
    PathBuf::from(defs::STATUS_FILE)
}

fn default_io_timeout_ms() -> u64 {
    defs::DEFAULT_IO_TIMEOUT_MS
}

fn default_harden_source() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy_file: default_policy_file(),
            spoof_source: default_spoof_source(),
            target: default_target(),
            socket_path: default_socket_path(),
            status_file: default_status_file(),
            io_timeout_ms: default_io_timeout_ms(),
            harden_source: default_harden_source(),
            verbose: false,
            dry_run: false,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).context("failed to read config file")?;

        let config: Config = toml::from_str(&content).context("failed to parse config file")?;

        Ok(config)
    }

    pub fn load_default() -> Result<Self> {
        Self::from_file(CONFIG_FILE_DEFAULT)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }

        fs::write(path.as_ref(), content).context("failed to write config file")?;

        Ok(())
    }

    pub fn merge_with_cli(&mut self, verbose: bool, dry_run: bool) {
        if verbose {
            self.verbose = true;
        }

        if dry_run {
            self.dry_run = true;
        }
    }

    /// Zero would mean "block forever", which the launch path must never do.
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.target, PathBuf::from("/proc/cpuinfo"));
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config: Config = toml::from_str(
            r#"
            policy_file = "/data/local/tmp/apps.json"
            io_timeout_ms = 500
            harden_source = false
            "#,
        )
        .expect("parse");

        assert_eq!(config.policy_file, PathBuf::from("/data/local/tmp/apps.json"));
        assert_eq!(config.io_timeout(), Duration::from_millis(500));
        assert!(!config.harden_source);
        assert_eq!(config.spoof_source, default_spoof_source());
    }

    #[test]
    fn save_and_reload() {
        let tmp = tempfile::tempdir().expect("create tempdir");
        let path = tmp.path().join("nested").join("config.toml");
        let config = Config {
            socket_path: tmp.path().join("companion.sock"),
            verbose: true,
            ..Config::default()
        };

        config.save_to_file(&path).expect("save");

        assert_eq!(Config::from_file(&path).expect("load"), config);
    }

    #[test]
    fn cli_flags_only_turn_things_on() {
        let mut config = Config {
            verbose: true,
            ..Config::default()
        };

        config.merge_with_cli(false, true);

        assert!(config.verbose);
        assert!(config.dry_run);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = Config {
            io_timeout_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.io_timeout(), Duration::from_millis(1));
    }
}
