// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{collections::HashSet, time::SystemTime};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::Disposition;

const SUPPRESS_LIST: &str = "blacklist";
const ACTIVATE_LIST: &str = "gamelist";

#[derive(Deserialize)]
struct PolicyEntry {
    package_name: String,
}

/// One fully parsed view of the policy file. Never mutated once built.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    suppress: HashSet<String>,
    activate: HashSet<String>,
    source_mtime: SystemTime,
}

impl PolicySnapshot {
    pub fn parse(content: &str, source_mtime: SystemTime) -> Result<Self> {
        let document: Value =
            serde_json::from_str(content).context("policy file is not valid JSON")?;

        let root = document
            .as_object()
            .context("policy file root must be a JSON object")?;

        Ok(Self {
            suppress: package_names(root.get(SUPPRESS_LIST)),
            activate: package_names(root.get(ACTIVATE_LIST)),
            source_mtime,
        })
    }

    /// Suppression is checked first, so an id listed twice is suppressed.
    pub fn classify(&self, app_id: &str) -> Disposition {
        if self.suppress.contains(app_id) {
            Disposition::Suppress
        } else if self.activate.contains(app_id) {
            Disposition::Activate
        } else {
            Disposition::Unlisted
        }
    }

    pub fn source_mtime(&self) -> SystemTime {
        self.source_mtime
    }

    pub fn suppress_count(&self) -> usize {
        self.suppress.len()
    }

    pub fn activate_count(&self) -> usize {
        self.activate.len()
    }
}

fn package_names(list: Option<&Value>) -> HashSet<String> {
    let Some(items) = list.and_then(Value::as_array) else {
        return HashSet::new();
    };

    items
        .iter()
        .filter_map(|item| match PolicyEntry::deserialize(item) {
            Ok(entry) => Some(entry.package_name),
            Err(e) => {
                log::debug!("Skipping policy entry {}: {}", item, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> PolicySnapshot {
        PolicySnapshot::parse(content, SystemTime::UNIX_EPOCH).expect("policy should parse")
    }

    #[test]
    fn classifies_both_lists() {
        let snapshot = parse(
            r#"{
                "blacklist": [{"package_name": "com.a", "app_name": "A"}],
                "gamelist": [{"package_name": "com.b"}]
            }"#,
        );

        assert_eq!(snapshot.classify("com.a"), Disposition::Suppress);
        assert_eq!(snapshot.classify("com.b"), Disposition::Activate);
        assert_eq!(snapshot.classify("com.c"), Disposition::Unlisted);
    }

    #[test]
    fn suppress_wins_when_listed_twice() {
        let snapshot = parse(
            r#"{
                "blacklist": [{"package_name": "com.both"}],
                "gamelist": [{"package_name": "com.both"}]
            }"#,
        );

        assert_eq!(snapshot.classify("com.both"), Disposition::Suppress);
    }

    #[test]
    fn missing_lists_are_empty() {
        let snapshot = parse(r#"{"gamelist": [{"package_name": "com.game"}]}"#);
        assert_eq!(snapshot.suppress_count(), 0);
        assert_eq!(snapshot.activate_count(), 1);

        let empty = parse("{}");
        assert_eq!(empty.classify("com.game"), Disposition::Unlisted);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let snapshot = parse(
            r#"{
                "blacklist": [
                    {"app_name": "No id"},
                    {"package_name": 42},
                    "com.bare.string",
                    {"package_name": "com.ok"}
                ],
                "gamelist": {"package_name": "not.an.array"}
            }"#,
        );

        assert_eq!(snapshot.suppress_count(), 1);
        assert_eq!(snapshot.classify("com.ok"), Disposition::Suppress);
        assert_eq!(snapshot.activate_count(), 0);
        assert_eq!(snapshot.classify("not.an.array"), Disposition::Unlisted);
    }

    #[test]
    fn rejects_invalid_documents() {
        assert!(PolicySnapshot::parse("{ not json", SystemTime::UNIX_EPOCH).is_err());
        assert!(PolicySnapshot::parse("[]", SystemTime::UNIX_EPOCH).is_err());
    }
}
