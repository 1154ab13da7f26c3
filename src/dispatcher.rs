// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{
    channel::{self, ChannelError, Command, code},
    host::Host,
    policy::{Disposition, PolicyCache},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The host gave us no application identifier.
    Skipped,
    /// The application is in neither list; nothing was sent.
    Unlisted,
    Sent { command: Command, result: i32 },
}

/// Runs `host.release()` on every way out of [`dispatch`].
struct ReleaseGuard<'a, H: Host>(&'a H);

impl<H: Host> Drop for ReleaseGuard<'_, H> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Handles one specialization event. Never fails: a spoofing problem must not
/// keep the application from starting.
pub fn dispatch<H: Host>(
    app_id: Option<&str>,
    cache: &PolicyCache,
    host: &H,
) -> DispatchOutcome {
    let _release = ReleaseGuard(host);

    let Some(app_id) = app_id.filter(|id| !id.is_empty()) else {
        log::debug!("No application identifier, skipping");
        return DispatchOutcome::Skipped;
    };

    if !cache.ensure_fresh() {
        log::debug!("Policy not refreshed, using last known snapshot");
    }

    let command = match cache.classify(app_id) {
        Disposition::Suppress => {
            log::debug!("Blacklisted app: {} - unmounting spoof", app_id);
            Command::SuppressSubstitution
        }
        Disposition::Activate => {
            log::debug!("Gamelisted app: {} - mounting spoof", app_id);
            Command::ActivateSubstitution
        }
        Disposition::Unlisted => return DispatchOutcome::Unlisted,
    };

    let result = match send_command(host, command) {
        Ok(result) => {
            if result != code::SUCCESS {
                log::warn!("Companion refused {} for {}: {}", command, app_id, result);
            }
            result
        }
        Err(e) => {
            log::warn!("Spoof request for {} failed: {}", app_id, e);
            code::CHANNEL_FAILURE
        }
    };

    DispatchOutcome::Sent { command, result }
}

/// One fresh connection per command; the stream is dropped (closed) on return.
pub fn send_command<H: Host>(host: &H, command: Command) -> Result<i32, ChannelError> {
    let mut stream = host.connect_companion().map_err(ChannelError::Connect)?;
    channel::request(&mut stream, command)
}
