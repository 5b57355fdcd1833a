//! Locating and archiving the JSON reports an audit script leaves behind.
//!
//! "The report" is whichever `.json` file was modified most recently. This
//! is only as trustworthy as the file mtimes: a concurrent writer into the
//! same folder, or clock skew, can make it pick the wrong file. The launcher
//! keeps the rule anyway because existing audit scripts depend on it.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::errors::{HsnError, Result};
use crate::core::paths::sibling;

/// Folder the sequencer creates and archives into.
pub const REPORTS_DIR_NAME: &str = "Reports";
/// Alternate folder some audit scripts write to.
pub const FALLBACK_REPORTS_DIR_NAME: &str = "report";
pub const BEFORE_PREFIX: &str = "before_";
pub const AFTER_PREFIX: &str = "after_";
/// Prefixes of files that are already archived and must not be picked again.
pub const ARCHIVED_PREFIXES: [&str; 2] = [BEFORE_PREFIX, AFTER_PREFIX];

/// Directories searched for reports: `reports_dir` and its sibling `report`,
/// whichever exist.
#[must_use]
pub fn search_dirs(reports_dir: &Path) -> Vec<PathBuf> {
    let fallback = sibling(reports_dir, FALLBACK_REPORTS_DIR_NAME);
    [reports_dir.to_path_buf(), fallback]
        .into_iter()
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Newest `.json` file (case-insensitive) in the search dirs whose name does
/// not start with one of `exclude_prefixes`. Equal mtimes resolve to the
/// greater path. Unreadable entries are skipped.
#[must_use]
pub fn find_latest_json(reports_dir: &Path, exclude_prefixes: &[&str]) -> Option<PathBuf> {
    let excluded: Vec<String> = exclude_prefixes.iter().map(|p| p.to_lowercase()).collect();
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for dir in search_dirs(reports_dir) {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if !name.ends_with(".json") || excluded.iter().any(|p| name.starts_with(p.as_str())) {
                continue;
            }
            let path = entry.path();
            let Ok(modified) = fs::metadata(&path).and_then(|meta| meta.modified()) else {
                continue;
            };
            let candidate = (modified, path);
            if newest.as_ref().is_none_or(|best| candidate > *best) {
                newest = Some(candidate);
            }
        }
    }

    newest.map(|(_, path)| path)
}

/// Move the newest unarchived report to `target`.
///
/// Returns the original path when something was archived and `None` when
/// there was nothing to archive. The rename is destructive: the source name
/// no longer exists afterwards.
pub fn archive_latest(reports_dir: &Path, target: &Path) -> Result<Option<PathBuf>> {
    let Some(latest) = find_latest_json(reports_dir, &ARCHIVED_PREFIXES) else {
        return Ok(None);
    };
    fs::rename(&latest, target).map_err(|source| HsnError::io(&latest, source))?;
    Ok(Some(latest))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use filetime::{FileTime, set_file_mtime};

    use super::*;

    fn write_at(path: &Path, age_secs: u64) {
        fs::write(path, b"{}").unwrap();
        let when = SystemTime::now() - Duration::from_secs(age_secs);
        set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
    }

    #[test]
    fn newest_unarchived_json_wins() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join(REPORTS_DIR_NAME);
        fs::create_dir(&reports).unwrap();
        write_at(&reports.join("a.json"), 300);
        write_at(&reports.join("before_old.json"), 0);
        write_at(&reports.join("b.json"), 60);

        assert_eq!(
            find_latest_json(&reports, &ARCHIVED_PREFIXES),
            Some(reports.join("b.json"))
        );
    }

    #[test]
    fn prefix_and_extension_checks_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join(REPORTS_DIR_NAME);
        fs::create_dir(&reports).unwrap();
        write_at(&reports.join("AFTER_run.JSON"), 0);
        write_at(&reports.join("scan.JSON"), 100);
        write_at(&reports.join("notes.txt"), 0);

        assert_eq!(
            find_latest_json(&reports, &ARCHIVED_PREFIXES),
            Some(reports.join("scan.JSON"))
        );
    }

    #[test]
    fn missing_folders_find_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            find_latest_json(&dir.path().join(REPORTS_DIR_NAME), &ARCHIVED_PREFIXES),
            None
        );
    }

    #[test]
    fn sibling_report_folder_is_searched() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join(REPORTS_DIR_NAME);
        let alt = dir.path().join(FALLBACK_REPORTS_DIR_NAME);
        fs::create_dir(&alt).unwrap();
        write_at(&alt.join("audit.json"), 10);

        assert_eq!(search_dirs(&reports), vec![alt.clone()]);
        assert_eq!(
            find_latest_json(&reports, &ARCHIVED_PREFIXES),
            Some(alt.join("audit.json"))
        );

        fs::create_dir(&reports).unwrap();
        write_at(&reports.join("older.json"), 500);
        assert_eq!(
            find_latest_json(&reports, &ARCHIVED_PREFIXES),
            Some(alt.join("audit.json"))
        );
    }

    #[test]
    fn equal_mtimes_pick_greater_path() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join(REPORTS_DIR_NAME);
        fs::create_dir(&reports).unwrap();
        let when = FileTime::from_unix_time(1_700_000_000, 0);
        for name in ["m.json", "z.json", "a.json"] {
            fs::write(reports.join(name), b"{}").unwrap();
            set_file_mtime(reports.join(name), when).unwrap();
        }
        assert_eq!(
            find_latest_json(&reports, &ARCHIVED_PREFIXES),
            Some(reports.join("z.json"))
        );
    }

    #[test]
    fn archive_renames_and_consumes_source() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join(REPORTS_DIR_NAME);
        fs::create_dir(&reports).unwrap();
        write_at(&reports.join("result.json"), 5);
        let target = reports.join("before_Harden_20250101_120000.json");

        let moved = archive_latest(&reports, &target).unwrap();
        assert_eq!(moved, Some(reports.join("result.json")));
        assert!(target.exists());
        assert!(!reports.join("result.json").exists());

        // The archived copy is now excluded, so a second pass finds nothing.
        let again = archive_latest(&reports, &reports.join("after_x.json")).unwrap();
        assert_eq!(again, None);
    }
}
