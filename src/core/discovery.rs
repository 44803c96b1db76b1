//! Binary discovery inside an installation tree
//!
//! Release archives nest their payload under version-specific directories
//! (`bitcoin-28.2/bin`, `whive/bin`, ...). Discovery walks the tree for the
//! conventional `bin` directory instead of hard-coding any layout, so
//! callers survive version bumps that move the payload.

use std::path::{Path, PathBuf};

use crate::core::artifact::SoftwareId;

/// Recursion limit for the search. Release trees are shallow; anything
/// deeper is not ours.
const MAX_DEPTH: usize = 6;

/// Find the directory named `bin` under `root` that contains the software's
/// GUI executable (a file whose name contains `{key}-qt`).
///
/// Traversal is top-down and lexicographic within each directory, so the
/// result is deterministic. If several candidate trees coexist (for example
/// after a failed partial upgrade left two version folders), the first match
/// in that order wins; no further disambiguation is attempted.
pub fn find_bin_dir(root: &Path, software: SoftwareId) -> Option<PathBuf> {
    let marker = format!("{}-qt", software.key());
    search(root, &marker, 0)
}

fn search(dir: &Path, marker: &str, depth: usize) -> Option<PathBuf> {
    if depth > MAX_DEPTH || !dir.is_dir() {
        return None;
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    entries.sort();

    for sub in &entries {
        if sub.file_name().and_then(|n| n.to_str()) == Some("bin")
            && dir_contains_fragment(sub, marker)
        {
            return Some(sub.clone());
        }
    }
    for sub in &entries {
        if let Some(found) = search(sub, marker, depth + 1) {
            return Some(found);
        }
    }
    None
}

fn dir_contains_fragment(dir: &Path, fragment: &str) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| n.contains(fragment))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

/// Resolve a concrete file inside the discovered bin directory whose name
/// contains `name_fragment`. Used by the supervisor when the expected
/// literal path does not exist.
pub fn find_in_bin_dir(root: &Path, software: SoftwareId, name_fragment: &str) -> Option<PathBuf> {
    let bin_dir = find_bin_dir(root, software)?;
    let mut files: Vec<PathBuf> = std::fs::read_dir(&bin_dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    files.into_iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.contains(name_fragment))
            .unwrap_or(false)
    })
}
