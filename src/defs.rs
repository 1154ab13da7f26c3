// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

// Module payload shipped by the installer
pub const POLICY_FILE: &str = "/data/adb/modules/COPG_CPU/apps.json";
pub const SPOOF_SOURCE_FILE: &str = "/data/adb/modules/COPG_CPU/cpuinfo_spoof";

// The hardware-information file we overlay
pub const SPOOF_TARGET: &str = "/proc/cpuinfo";

// Our own config and logs
pub const CONFIG_FILE: &str = "/data/adb/cpu_guard/config.toml";
pub const DAEMON_LOG_FILE: &str = "/data/adb/cpu_guard/daemon.log";

// Runtime state lives on tmpfs so it never survives a reboot
pub const COMPANION_SOCKET: &str = "/dev/cpu_guard/companion.sock";
pub const STATUS_FILE: &str = "/dev/cpu_guard/status.json";

pub const DEFAULT_IO_TIMEOUT_MS: u64 = 3000;

// Used when the target carries no readable label
pub const CONTEXT_CPUINFO: &str = "u:object_r:proc_cpuinfo:s0";

pub const LOG_TAG: &str = "CPUGuard";
