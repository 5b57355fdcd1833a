//! Audit/harden pairing over a walked script tree.
//!
//! For every directory the walker visits:
//! 1. `audit.ps1` in any casing is an audit candidate.
//! 2. Any `*harden*.ps1` is a harden candidate.
//! 3. A harden candidate whose directory holds an exact `Audit.ps1` becomes a
//!    [`Pairing`] named after the directory; otherwise it is a single entry
//!    named after the file.
//! 4. Audit candidates not used by a pairing are single entries.
//!
//! Several harden scripts next to one `Audit.ps1` yield several pairings with
//! the same audit script and display name. They are kept apart on purpose,
//! one per hardening profile.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::Result;
use crate::scanner::patterns::{
    AUDIT_SCRIPT_NAME, ScriptRole, classify_script_name, dir_display_name, script_display_name,
};
use crate::scanner::walker::{DirListing, walk};

/// A script that runs on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptEntry {
    pub path: PathBuf,
    pub display_name: String,
}

/// An audit script and a harden script living in the same directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub dir: PathBuf,
    pub audit: PathBuf,
    pub harden: PathBuf,
    pub display_name: String,
}

/// One selectable menu line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchEntry {
    Pairing(Pairing),
    Single(ScriptEntry),
}

impl LaunchEntry {
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pairing(pairing) => &pairing.display_name,
            Self::Single(entry) => &entry.display_name,
        }
    }
}

/// Everything found under one scan root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub root: PathBuf,
    pub pairings: Vec<Pairing>,
    pub singles: Vec<ScriptEntry>,
}

impl Discovery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty() && self.singles.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairings.len() + self.singles.len()
    }

    /// Menu order: every pairing first, then every single, each in walk order.
    #[must_use]
    pub fn entries(&self) -> Vec<LaunchEntry> {
        self.pairings
            .iter()
            .cloned()
            .map(LaunchEntry::Pairing)
            .chain(self.singles.iter().cloned().map(LaunchEntry::Single))
            .collect()
    }
}

/// Walk `root` and pair scripts directory by directory.
pub fn discover(root: &Path) -> Result<Discovery> {
    let mut discovery = Discovery {
        root: root.to_path_buf(),
        ..Discovery::default()
    };
    for listing in walk(root)? {
        classify_directory(&listing, &mut discovery);
    }
    Ok(discovery)
}

/// Apply the pairing rules to one directory, appending to `out`.
pub fn classify_directory(listing: &DirListing, out: &mut Discovery) {
    let dir = &listing.path;
    let mut audits = Vec::new();
    let mut hardens = Vec::new();
    for name in &listing.file_names {
        match classify_script_name(name) {
            Some(ScriptRole::Audit) => audits.push(dir.join(name)),
            Some(ScriptRole::Harden) => hardens.push(dir.join(name)),
            None => {}
        }
    }

    let expected_audit = dir.join(AUDIT_SCRIPT_NAME);
    let mut audit_consumed = false;
    for harden in hardens {
        if expected_audit.exists() {
            out.pairings.push(Pairing {
                dir: dir.clone(),
                audit: expected_audit.clone(),
                harden,
                display_name: dir_display_name(dir),
            });
            audit_consumed = true;
        } else {
            let display_name = script_display_name(&harden);
            out.singles.push(ScriptEntry {
                path: harden,
                display_name,
            });
        }
    }

    for audit in audits {
        if audit_consumed && audit == expected_audit {
            continue;
        }
        let display_name = script_display_name(&audit);
        out.singles.push(ScriptEntry {
            path: audit,
            display_name,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"exit 0\n").unwrap();
    }

    #[test]
    fn audit_and_harden_pair_under_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("windows-firewall-2.1");
        touch(&cat.join("Audit.ps1"));
        touch(&cat.join("Harden.ps1"));

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.pairings.len(), 1);
        assert!(found.singles.is_empty(), "audit must not appear as single");
        let pairing = &found.pairings[0];
        assert_eq!(pairing.audit, cat.join("Audit.ps1"));
        assert_eq!(pairing.harden, cat.join("Harden.ps1"));
        assert_eq!(pairing.display_name, "Windows Firewall");
    }

    #[test]
    fn one_pairing_per_harden_file_sharing_audit() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("smb");
        touch(&cat.join("Audit.ps1"));
        touch(&cat.join("Harden_Level1.ps1"));
        touch(&cat.join("Harden_Level2.ps1"));

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.pairings.len(), 2);
        assert!(found.singles.is_empty());
        assert!(found.pairings.iter().all(|p| p.audit == cat.join("Audit.ps1")));
        assert!(found.pairings.iter().all(|p| p.display_name == "Smb"));
        assert_ne!(found.pairings[0].harden, found.pairings[1].harden);
    }

    #[test]
    fn lone_harden_becomes_single_named_after_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("rdp").join("Disable-RDP_Harden.ps1"));

        let found = discover(dir.path()).unwrap();
        assert!(found.pairings.is_empty());
        assert_eq!(found.singles.len(), 1);
        assert_eq!(found.singles[0].display_name, "Disable Rdp Harden");
    }

    #[test]
    fn lone_audit_becomes_single() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("uac");
        touch(&cat.join("Audit.ps1"));

        let found = discover(dir.path()).unwrap();
        assert!(found.pairings.is_empty());
        assert_eq!(
            found.singles,
            vec![ScriptEntry {
                path: cat.join("Audit.ps1"),
                display_name: "Audit".to_string(),
            }]
        );
    }

    #[test]
    fn unrelated_files_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("docs").join("README.md"));
        touch(&dir.path().join("docs").join("Apply.ps1"));

        let found = discover(dir.path()).unwrap();
        assert!(found.is_empty());
        assert_eq!(found.len(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn lowercase_audit_does_not_pair_on_case_sensitive_fs() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("lsa");
        touch(&cat.join("audit.ps1"));
        touch(&cat.join("Harden.ps1"));

        let found = discover(dir.path()).unwrap();
        assert!(found.pairings.is_empty());
        let names: Vec<&str> = found.singles.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["Harden", "Audit"]);
    }

    #[test]
    fn entries_list_pairings_before_singles() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a_single").join("Harden.ps1"));
        touch(&dir.path().join("b_pair").join("Audit.ps1"));
        touch(&dir.path().join("b_pair").join("Harden.ps1"));

        let entries = discover(dir.path()).unwrap().entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], LaunchEntry::Pairing(_)));
        assert!(matches!(entries[1], LaunchEntry::Single(_)));
        assert_eq!(entries[0].display_name(), "B Pair");
        let LaunchEntry::Pairing(pairing) = &entries[0] else {
            unreachable!()
        };
        assert_eq!(pairing.harden, dir.path().join("b_pair").join("Harden.ps1"));
    }

    #[test]
    fn scripts_in_root_itself_are_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Audit.ps1"));
        touch(&dir.path().join("Harden.ps1"));

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.pairings.len(), 1);
        assert_eq!(found.pairings[0].dir, dir.path());
    }

    #[test]
    fn launch_entry_serializes_with_kind_tag() {
        let entry = LaunchEntry::Single(ScriptEntry {
            path: PathBuf::from("Harden.ps1"),
            display_name: "Harden".to_string(),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "single");
        assert_eq!(json["display_name"], "Harden");
    }
}
