// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-app `/proc/cpuinfo` spoofing for rooted Android.
//!
//! The unprivileged side ([`dispatcher`]) classifies each launching app with
//! the [`policy`] cache and asks the privileged [`companion`] over the
//! [`channel`] to bind or drop the substitute file.

pub mod channel;
pub mod companion;
pub mod conf;
pub mod defs;
pub mod dispatcher;
pub mod host;
pub mod policy;
pub mod utils;

pub use self::{
    dispatcher::{DispatchOutcome, dispatch},
    host::{Host, Module, SocketHost},
    policy::{Disposition, PolicyCache},
};
