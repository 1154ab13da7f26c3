// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use anyhow::Result;
use rustix::mount::{UnmountFlags, mount_bind, unmount};

use crate::{defs, utils};

/// The privileged operations the controller needs from the kernel.
pub trait Mounter {
    fn source_present(&self, source: &Path) -> bool;

    /// Best effort; callers only log failures.
    fn harden_source(&mut self, source: &Path, target: &Path) -> Result<()>;

    fn bind(&mut self, source: &Path, target: &Path) -> io::Result<()>;

    fn unmount(&mut self, target: &Path) -> io::Result<()>;

    fn is_mounted(&self, target: &Path) -> bool;
}

/// Real syscalls in the current mount namespace.
#[derive(Debug, Default)]
pub struct SysMounter;

impl Mounter for SysMounter {
    fn source_present(&self, source: &Path) -> bool {
        source.exists()
    }

    fn harden_source(&mut self, source: &Path, target: &Path) -> Result<()> {
        utils::set_mode(source, 0o644)?;
        utils::copy_path_context(target, source, defs::CONTEXT_CPUINFO)
    }

    fn bind(&mut self, source: &Path, target: &Path) -> io::Result<()> {
        mount_bind(source, target)?;
        Ok(())
    }

    fn unmount(&mut self, target: &Path) -> io::Result<()> {
        unmount(target, UnmountFlags::DETACH)?;
        Ok(())
    }

    fn is_mounted(&self, target: &Path) -> bool {
        utils::is_mounted(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountCall {
    Bind { source: PathBuf, target: PathBuf },
    Unmount { target: PathBuf },
}

/// Keeps an in-memory mount table instead of touching the kernel.
///
/// Unmounting something that is not mounted fails with `EINVAL`, like
/// `umount2` does.
#[derive(Debug, Default)]
pub struct DryRunMounter {
    mounted: HashSet<PathBuf>,
    calls: Vec<MountCall>,
}

impl DryRunMounter {
    pub fn calls(&self) -> &[MountCall] {
        &self.calls
    }

    pub fn unmount_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, MountCall::Unmount { .. }))
            .count()
    }
}

impl Mounter for DryRunMounter {
    fn source_present(&self, source: &Path) -> bool {
        source.exists()
    }

    fn harden_source(&mut self, source: &Path, _target: &Path) -> Result<()> {
        log::info!("[dry-run] would harden {}", source.display());
        Ok(())
    }

    fn bind(&mut self, source: &Path, target: &Path) -> io::Result<()> {
        log::info!(
            "[dry-run] bind {} -> {}",
            source.display(),
            target.display()
        );
        self.calls.push(MountCall::Bind {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
        });
        self.mounted.insert(target.to_path_buf());
        Ok(())
    }

    fn unmount(&mut self, target: &Path) -> io::Result<()> {
        log::info!("[dry-run] umount {}", target.display());
        self.calls.push(MountCall::Unmount {
            target: target.to_path_buf(),
        });
        if self.mounted.remove(target) {
            Ok(())
        } else {
            Err(io::Error::from_raw_os_error(libc::EINVAL))
        }
    }

    fn is_mounted(&self, target: &Path) -> bool {
        self.mounted.contains(target)
    }
}
