// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::Result;
#[cfg(any(target_os = "linux", target_os = "android"))]
use anyhow::Context;
#[cfg(any(target_os = "linux", target_os = "android"))]
use extattr::{Flags as XattrFlags, lgetxattr, lsetxattr};

#[cfg(any(target_os = "linux", target_os = "android"))]
const SELINUX_XATTR: &str = "security.selinux";

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn lsetfilecon<P: AsRef<Path>>(path: P, con: &str) -> Result<()> {
    lsetxattr(
        path.as_ref(),
        SELINUX_XATTR,
        con.as_bytes(),
        XattrFlags::empty(),
    )
    .map_err(std::io::Error::from)
    .with_context(|| {
        format!(
            "Failed to set SELinux context {} on {}",
            con,
            path.as_ref().display()
        )
    })?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn lsetfilecon<P: AsRef<Path>>(_path: P, _con: &str) -> Result<()> {
    anyhow::bail!("SELinux contexts are not supported on this OS")
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn lgetfilecon<P: AsRef<Path>>(path: P) -> Result<String> {
    let con = lgetxattr(path.as_ref(), SELINUX_XATTR)
        .map_err(std::io::Error::from)
        .with_context(|| {
            format!(
                "Failed to get SELinux context for {}",
                path.as_ref().display()
            )
        })?;
    let con_str = String::from_utf8_lossy(&con).trim_matches('\0').to_string();

    Ok(con_str)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn lgetfilecon<P: AsRef<Path>>(_path: P) -> Result<String> {
    anyhow::bail!("SELinux contexts are not supported on this OS")
}

/// Labels `dst` like `src`, or with `fallback` when `src` has no readable label.
pub fn copy_path_context<S: AsRef<Path>, D: AsRef<Path>>(
    src: S,
    dst: D,
    fallback: &str,
) -> Result<()> {
    let context = lgetfilecon(&src)
        .ok()
        .filter(|ctx| !ctx.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    lsetfilecon(dst, &context)
}
