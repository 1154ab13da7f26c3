// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::SystemTime,
};

use anyhow::{Context, Result};

use super::{Disposition, PolicySnapshot};

/// In-memory view of the policy file, reloaded only when its mtime moves.
///
/// Readers clone the current `Arc` and never block on a reload for longer than
/// the pointer swap, so a classification always sees one consistent snapshot.
#[derive(Debug)]
pub struct PolicyCache {
    path: PathBuf,
    current: RwLock<Option<Arc<PolicySnapshot>>>,
    reloads: AtomicUsize,
}

impl PolicyCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: RwLock::new(None),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when a usable snapshot matching the file on disk is loaded.
    ///
    /// A missing or unparsable file returns `false` and keeps whatever snapshot
    /// was loaded before; stale data beats no data.
    pub fn ensure_fresh(&self) -> bool {
        let mtime = match fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                log::debug!("Policy file {} unavailable: {}", self.path.display(), e);
                return false;
            }
        };

        if self
            .snapshot()
            .is_some_and(|snapshot| snapshot.source_mtime() == mtime)
        {
            return true;
        }

        match self.load(mtime) {
            Ok(snapshot) => {
                log::info!(
                    "Policy loaded: {} blacklist, {} gamelist",
                    snapshot.suppress_count(),
                    snapshot.activate_count()
                );
                self.install(snapshot);
                true
            }
            Err(e) => {
                log::warn!("Keeping previous policy: {:#}", e);
                false
            }
        }
    }

    /// Pure lookup against the current snapshot; never touches the disk.
    pub fn classify(&self, app_id: &str) -> Disposition {
        self.snapshot()
            .map(|snapshot| snapshot.classify(app_id))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Option<Arc<PolicySnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of parses that produced a snapshot.
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::Relaxed)
    }

    fn load(&self, mtime: SystemTime) -> Result<PolicySnapshot> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        PolicySnapshot::parse(&content, mtime)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn install(&self, snapshot: PolicySnapshot) {
        let snapshot = Arc::new(snapshot);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }
}
