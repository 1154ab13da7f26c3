// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils;

/// Snapshot of the companion written after every handled request, so
/// `cpu-guard status` can report without talking to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ControllerStatus {
    pub timestamp: String,
    pub pid: u32,
    pub substitution_active: bool,
    #[serde(default)]
    pub last_command: String,
    #[serde(default)]
    pub last_result: i32,
    #[serde(default)]
    pub handled: u64,
}

impl ControllerStatus {
    pub fn new(
        substitution_active: bool,
        last_command: String,
        last_result: i32,
        handled: u64,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            pid: std::process::id(),
            substitution_active,
            last_command,
            last_result,
            handled,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent() {
            utils::ensure_dir_exists(parent)?;
        }

        utils::atomic_write(path.as_ref(), json)
    }

    /// A missing file means the companion has not handled anything yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.as_ref().display()))
    }
}
