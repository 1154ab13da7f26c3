// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! The contract with the process-injection framework that calls us.

use std::{
    io::{self, Read, Write},
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    dispatcher::{self, DispatchOutcome},
    policy::PolicyCache,
};

/// What the host framework lends the unprivileged side for one event.
pub trait Host {
    type Stream: Read + Write;

    /// Opens a fresh connection to the privileged companion.
    fn connect_companion(&self) -> io::Result<Self::Stream>;

    /// Tells the host our library may be unloaded from the app process.
    fn release(&self);
}

/// Reaches the companion over its Unix socket, with bounded I/O.
#[derive(Debug, Clone)]
pub struct SocketHost {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketHost {
    pub fn new<P: AsRef<Path>>(socket_path: P, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            timeout,
        }
    }
}

impl Host for SocketHost {
    type Stream = UnixStream;

    fn connect_companion(&self) -> io::Result<UnixStream> {
        let stream = UnixStream::connect(&self.socket_path)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        Ok(stream)
    }

    fn release(&self) {
        log::debug!("Specialization done, module resources released");
    }
}

/// Entry points the host calls: once at load, then once per app.
#[derive(Debug)]
pub struct Module {
    cache: PolicyCache,
}

impl Module {
    /// Primes the policy cache so the first specialization is a cache hit.
    pub fn on_load<P: AsRef<Path>>(policy_file: P) -> Self {
        let cache = PolicyCache::new(policy_file);
        if !cache.ensure_fresh() {
            log::debug!(
                "Policy {} not loaded at module load",
                cache.path().display()
            );
        }
        Self { cache }
    }

    pub fn pre_app_specialize<H: Host>(&self, app_id: Option<&str>, host: &H) -> DispatchOutcome {
        dispatcher::dispatch(app_id, &self.cache, host)
    }

    pub fn cache(&self) -> &PolicyCache {
        &self.cache
    }
}
