// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs::{self, OpenOptions},
    io::Write,
    os::unix::fs::PermissionsExt,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};

pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_file = dir.join(format!(".{}_{}.tmp", std::process::id(), now));

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_file)
            .with_context(|| format!("failed to create {}", temp_file.display()))?;
        file.write_all(content.as_ref())?;
    }

    if let Err(e) = fs::rename(&temp_file, path) {
        let _ = fs::remove_file(&temp_file);
        return Err(e).with_context(|| format!("failed to replace {}", path.display()));
    }
    Ok(())
}

pub fn ensure_dir_exists<T: AsRef<Path>>(dir: T) -> Result<()> {
    if !dir.as_ref().exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.as_ref().display()))?;
    }
    Ok(())
}

pub fn set_mode<P: AsRef<Path>>(path: P, mode: u32) -> Result<()> {
    fs::set_permissions(path.as_ref(), fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to chmod {:o} {}", mode, path.as_ref().display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = tempfile::tempdir().expect("create tempdir");
        let path = tmp.path().join("status.json");

        atomic_write(&path, "first").expect("first write");
        atomic_write(&path, "second").expect("second write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
        let leftovers = fs::read_dir(tmp.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn set_mode_changes_permissions() {
        let tmp = tempfile::tempdir().expect("create tempdir");
        let path = tmp.path().join("cpuinfo_spoof");
        fs::write(&path, "processor : 0\n").expect("write");

        set_mode(&path, 0o640).expect("chmod");

        let mode = fs::metadata(&path).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
