// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! One command name in, one native-endian `i32` out, then close.

pub mod client;
pub mod server;

use std::{fmt, io};

use thiserror::Error;

pub use self::{client::request, server::serve_connection};

/// Upper bound for a single command read on the privileged side.
pub const MAX_COMMAND_LEN: usize = 255;

pub const RESULT_LEN: usize = std::mem::size_of::<i32>();

pub mod code {
    pub const SUCCESS: i32 = 0;
    /// Unknown command bytes, or an OS error that carried no errno.
    pub const FAILURE: i32 = -1;
    /// Dispatcher side only: the companion could not be reached.
    pub const CHANNEL_FAILURE: i32 = -2;
    pub const SOURCE_MISSING: i32 = libc::ENOENT;
    pub const VERIFY_FAILED: i32 = libc::EIO;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ActivateSubstitution,
    SuppressSubstitution,
}

impl Command {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Command::ActivateSubstitution => "mount_spoof",
            Command::SuppressSubstitution => "unmount_spoof",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A decoded request. Anything that is not an exact command name stays
/// `Unrecognized` and is answered with [`code::FAILURE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Known(Command),
    Unrecognized(String),
}

impl Request {
    pub fn decode(bytes: &[u8]) -> Self {
        let trimmed = trim_trailing(bytes);

        [Command::ActivateSubstitution, Command::SuppressSubstitution]
            .into_iter()
            .find(|command| command.wire_name().as_bytes() == trimmed)
            .map_or_else(
                || Request::Unrecognized(String::from_utf8_lossy(trimmed).into_owned()),
                Request::Known,
            )
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Known(command) => command.fmt(f),
            Request::Unrecognized(raw) => write!(f, "unrecognized({raw:?})"),
        }
    }
}

// C clients send the terminating NUL, shells send a newline.
fn trim_trailing(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !matches!(b, b'\0' | b'\n'))
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to companion: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to send command: {0}")]
    Write(#[source] io::Error),
    #[error("failed to read result: {0}")]
    Read(#[source] io::Error),
}
