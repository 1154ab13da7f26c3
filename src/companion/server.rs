// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    os::unix::net::{UnixListener, UnixStream},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};

use super::{ControllerStatus, MountController, Mounter};
use crate::{channel, utils};

/// Accepts companion connections one at a time.
///
/// Every connection is served to completion before the next `accept`, so two
/// mount operations can never interleave.
pub struct CompanionServer<M: Mounter> {
    listener: UnixListener,
    socket_path: PathBuf,
    controller: MountController<M>,
    timeout: Duration,
    status_path: Option<PathBuf>,
    handled: u64,
}

impl<M: Mounter> CompanionServer<M> {
    pub fn bind<P: AsRef<Path>>(
        socket_path: P,
        controller: MountController<M>,
        timeout: Duration,
    ) -> Result<Self> {
        let socket_path = socket_path.as_ref().to_path_buf();

        if let Some(parent) = socket_path.parent() {
            utils::ensure_dir_exists(parent)?;
        }

        // A socket left by a previous daemon would make bind fail.
        if socket_path.exists() {
            fs::remove_file(&socket_path).with_context(|| {
                format!("failed to remove stale socket {}", socket_path.display())
            })?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("failed to bind {}", socket_path.display()))?;

        utils::set_mode(&socket_path, 0o666)?;

        Ok(Self {
            listener,
            socket_path,
            controller,
            timeout,
            status_path: None,
            handled: 0,
        })
    }

    pub fn with_status_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.status_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn controller(&self) -> &MountController<M> {
        &self.controller
    }

    pub fn handled(&self) -> u64 {
        self.handled
    }

    pub fn run(mut self) -> Result<()> {
        log::info!(
            "[COMPANION] Listening on {}",
            self.socket_path.display()
        );

        loop {
            if let Err(e) = self.serve_next() {
                log::warn!("[COMPANION] {:#}", e);
            }
        }
    }

    /// Accepts and fully serves a single connection.
    pub fn serve_next(&mut self) -> Result<()> {
        let (stream, _) = self
            .listener
            .accept()
            .context("failed to accept companion connection")?;

        self.serve(stream)
    }

    fn serve(&mut self, mut stream: UnixStream) -> Result<()> {
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let controller = &mut self.controller;
        let served = channel::serve_connection(&mut stream, |request| controller.handle(request))
            .context("companion connection failed")?;

        let Some((request, result)) = served else {
            log::debug!("[COMPANION] Peer closed without a command");
            return Ok(());
        };

        self.handled += 1;
        log::info!("[COMPANION] {} -> {}", request, result);

        if let Some(path) = &self.status_path {
            let status = ControllerStatus::new(
                self.controller.substitution_active(),
                request.to_string(),
                result,
                self.handled,
            );
            if let Err(e) = status.save(path) {
                log::warn!("[COMPANION] Failed to save status: {:#}", e);
            }
        }

        Ok(())
    }
}

impl<M: Mounter> Drop for CompanionServer<M> {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}
