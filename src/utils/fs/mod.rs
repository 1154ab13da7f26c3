// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod file;
pub mod xattr;

pub use self::{file::*, xattr::*};
