// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod cache;
pub mod snapshot;

pub use self::{cache::PolicyCache, snapshot::PolicySnapshot};

/// What the policy says should happen to the spoof for one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Not listed anywhere; leave the mount table alone.
    #[default]
    Unlisted,
    /// `blacklist`: the application must see the real file.
    Suppress,
    /// `gamelist`: the application must see the substitute.
    Activate,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Disposition::Unlisted => "unlisted",
            Disposition::Suppress => "suppress",
            Disposition::Activate => "activate",
        };
        f.write_str(name)
    }
}
