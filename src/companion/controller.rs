// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    io,
    path::{Path, PathBuf},
};

use super::Mounter;
use crate::channel::{Command, Request, code};

/// The only component allowed to touch the mount table.
///
/// `substitution_active` is what this controller last did, not a live look at
/// the mount table. It starts `false`: at startup the target is assumed clean.
pub struct MountController<M: Mounter> {
    mounter: M,
    source: PathBuf,
    target: PathBuf,
    harden_source: bool,
    substitution_active: bool,
}

impl<M: Mounter> MountController<M> {
    pub fn new<S, T>(mounter: M, source: S, target: T) -> Self
    where
        S: AsRef<Path>,
        T: AsRef<Path>,
    {
        Self {
            mounter,
            source: source.as_ref().to_path_buf(),
            target: target.as_ref().to_path_buf(),
            harden_source: true,
            substitution_active: false,
        }
    }

    pub fn with_hardening(mut self, enabled: bool) -> Self {
        self.harden_source = enabled;
        self
    }

    pub fn substitution_active(&self) -> bool {
        self.substitution_active
    }

    pub fn mounter(&self) -> &M {
        &self.mounter
    }

    pub fn handle(&mut self, request: &Request) -> i32 {
        match request {
            Request::Known(command) => self.apply(*command),
            Request::Unrecognized(raw) => {
                log::warn!("[COMPANION] Unrecognized command: {:?}", raw);
                code::FAILURE
            }
        }
    }

    pub fn apply(&mut self, command: Command) -> i32 {
        match command {
            Command::ActivateSubstitution => self.activate(),
            Command::SuppressSubstitution => self.suppress(),
        }
    }

    fn activate(&mut self) -> i32 {
        if !self.mounter.source_present(&self.source) {
            log::error!(
                "[COMPANION] Spoof source missing: {}",
                self.source.display()
            );
            return code::SOURCE_MISSING;
        }

        if self.harden_source
            && let Err(e) = self.mounter.harden_source(&self.source, &self.target)
        {
            log::warn!("[COMPANION] Failed to harden spoof source: {:#}", e);
        }

        // Never stack a second bind on top of an earlier one.
        match self.mounter.unmount(&self.target) {
            Ok(()) => {
                self.substitution_active = false;
                log::debug!(
                    "[COMPANION] Cleared previous mount on {}",
                    self.target.display()
                );
            }
            Err(e) if is_not_mounted(&e) => self.substitution_active = false,
            Err(e) => log::warn!(
                "[COMPANION] Pre-mount umount of {} failed: {}",
                self.target.display(),
                e
            ),
        }

        if let Err(e) = self.mounter.bind(&self.source, &self.target) {
            log::error!(
                "[COMPANION] Mount {} -> {} failed: {}",
                self.source.display(),
                self.target.display(),
                e
            );
            return errno_of(&e);
        }

        if !self.mounter.is_mounted(&self.target) {
            log::error!(
                "[COMPANION] Mount reported success but {} is not a mount point",
                self.target.display()
            );
            return code::VERIFY_FAILED;
        }

        self.substitution_active = true;
        log::info!("[COMPANION] Mount successful");
        code::SUCCESS
    }

    fn suppress(&mut self) -> i32 {
        if !self.substitution_active {
            log::debug!("[COMPANION] Spoof not active, nothing to unmount");
            return code::SUCCESS;
        }

        match self.mounter.unmount(&self.target) {
            Ok(()) => {
                self.substitution_active = false;
                log::info!("[COMPANION] Unmount successful");
                code::SUCCESS
            }
            Err(e) => {
                log::error!(
                    "[COMPANION] Unmount {} failed: {}",
                    self.target.display(),
                    e
                );
                errno_of(&e)
            }
        }
    }
}

fn is_not_mounted(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EINVAL) | Some(libc::ENOENT))
}

fn errno_of(e: &io::Error) -> i32 {
    e.raw_os_error()
        .filter(|errno| *errno != 0)
        .unwrap_or(code::FAILURE)
}
