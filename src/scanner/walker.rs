//! Top-down directory walker feeding the pairing pass.
//!
//! The walker visits the scan root and every real subdirectory below it in
//! pre-order, children sorted by name, and reports the plain file names found
//! in each directory. Symlinked directories are listed as directories but never
//! descended into, which keeps a looping link from turning discovery into an
//! endless walk.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::{HsnError, Result};

/// File names found directly inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub path: PathBuf,
    /// Non-directory entries, sorted. Broken symlinks are listed here too.
    pub file_names: Vec<String>,
}

/// One top-level category folder under the launcher root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
struct DirContents {
    file_names: Vec<String>,
    /// Subdirectories that are safe to descend into (not symlinks).
    descend: Vec<PathBuf>,
    /// Every directory entry, symlinked or not.
    all_dirs: Vec<(String, PathBuf)>,
}

/// Walk `root` and return one listing per visited directory, root first.
///
/// The root must be readable. Unreadable subdirectories are skipped.
pub fn walk(root: &Path) -> Result<Vec<DirListing>> {
    let root_contents = read_dir_contents(root).map_err(|source| HsnError::io(root, source))?;

    let mut listings = Vec::new();
    let mut stack: Vec<(PathBuf, DirContents)> = vec![(root.to_path_buf(), root_contents)];

    while let Some((dir, contents)) = stack.pop() {
        let DirContents {
            file_names,
            descend,
            ..
        } = contents;
        listings.push(DirListing {
            path: dir,
            file_names,
        });

        // Reverse so the smallest name is popped (visited) first.
        for child in descend.into_iter().rev() {
            if let Ok(child_contents) = read_dir_contents(&child) {
                stack.push((child, child_contents));
            }
        }
    }

    Ok(listings)
}

/// Immediate subdirectories of `root`, sorted by name. Symlinked directories count.
pub fn list_categories(root: &Path) -> Result<Vec<Category>> {
    let contents = read_dir_contents(root).map_err(|source| HsnError::io(root, source))?;
    Ok(contents
        .all_dirs
        .into_iter()
        .map(|(name, path)| Category { name, path })
        .collect())
}

fn read_dir_contents(dir: &Path) -> std::io::Result<DirContents> {
    let mut contents = DirContents::default();

    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            contents.descend.push(path.clone());
            contents.all_dirs.push((name, path));
        } else if file_type.is_symlink() && path.is_dir() {
            contents.all_dirs.push((name, path));
        } else {
            contents.file_names.push(name);
        }
    }

    contents.file_names.sort();
    contents.descend.sort();
    contents.all_dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(contents)
}
