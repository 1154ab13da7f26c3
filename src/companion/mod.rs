// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! The privileged side: the only code that mounts or unmounts anything.

pub mod controller;
pub mod mounter;
pub mod server;
pub mod status;

pub use self::{
    controller::MountController,
    mounter::{DryRunMounter, MountCall, Mounter, SysMounter},
    server::CompanionServer,
    status::ControllerStatus,
};
