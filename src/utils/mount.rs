// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{fs, path::Path};

use procfs::process::Process;

/// Whether `path` is a mount point in our mount namespace.
pub fn is_mounted<P: AsRef<Path>>(path: P) -> bool {
    let path_str = path.as_ref().to_string_lossy();
    let search = match path_str.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if let Ok(process) = Process::myself()
        && let Ok(mountinfo) = process.mountinfo()
    {
        return mountinfo
            .into_iter()
            .any(|m| m.mount_point.to_string_lossy() == search);
    }

    fs::read_to_string("/proc/self/mounts")
        .map(|content| mounts_contain(&content, search))
        .unwrap_or(false)
}

fn mounts_contain(mounts: &str, mount_point: &str) -> bool {
    mounts
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|point| point == mount_point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_mount_point_column() {
        let mounts = "proc /proc proc rw,relatime 0 0\n\
                      /dev/block/dm-5 /proc/cpuinfo ext4 ro,seclabel 0 0\n";

        assert!(mounts_contain(mounts, "/proc/cpuinfo"));
        assert!(!mounts_contain(mounts, "/proc/meminfo"));
        assert!(!mounts_contain(mounts, "ext4"));
    }

    #[test]
    fn root_is_always_mounted() {
        assert!(is_mounted("/"));
    }
}
