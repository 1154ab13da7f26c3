// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod fs;
pub mod log;
pub mod mount;

pub use self::{fs::*, log::*, mount::*};
