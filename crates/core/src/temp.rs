//! Temp and backup path classification
//!
//! Editors and tools leave characteristic names behind while writing:
//! `document.txt.tmp.12345`, `.document.txt.swp`, `document.txt~`. These
//! helpers recognize them so detection can tell churn from real changes.
//! Backup artifacts (`.bak` and friends) are deliberately a separate class:
//! they are legitimate end-state files, temp files never are.

use std::path::{Path, PathBuf};

/// Suffixes that mark a backup artifact rather than a temp file
const BACKUP_SUFFIXES: &[&str] = &[".bak", ".backup", ".old", ".orig"];

/// Vim swap suffixes
const SWAP_SUFFIXES: &[&str] = &[".swp", ".swo", ".swx"];

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// True when the path names an ephemeral editor/tool artifact
///
/// Ordered naming rules, first match wins:
/// 1. `*.tmp` and `*.tmp.<suffix>` (VSCode-style, with or without a
///    leading dot: `.name.ext.tmp.84`)
/// 2. trailing `~`
/// 3. vim swap files (`.swp`, `.swo`, `.swx`)
/// 4. GNOME `.goutputstream-*`
/// 5. emacs autosave `#name#`
pub fn is_temp_file(path: &Path) -> bool {
    let Some(name) = file_name(path) else { return false };

    if name.ends_with(".tmp") || name.contains(".tmp.") {
        return true;
    }
    if name.ends_with('~') {
        return true;
    }
    if SWAP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        return true;
    }
    if name.starts_with(".goutputstream-") {
        return true;
    }
    if name.len() > 2 && name.starts_with('#') && name.ends_with('#') {
        return true;
    }
    false
}

/// True when the path names a backup artifact (`.bak`, `.backup`, `.old`,
/// `.orig`, trailing `~`)
pub fn is_backup_file(path: &Path) -> bool {
    let Some(name) = file_name(path) else { return false };
    BACKUP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || name.ends_with('~')
}

/// Extract the real filename hiding inside a temp name
///
/// `.orchestrator.py.tmp.84` yields `orchestrator.py`, `.test.txt.swp`
/// yields `test.txt` (interior dots preserved, one leading dot stripped).
/// Returns `None` when the name carries no recognizable decoration
/// (`.gitignore`, `tmp123`).
pub fn extract_base_name(path: &Path) -> Option<String> {
    let name = file_name(path)?;

    // VSCode: [.]base.tmp.<suffix>
    if let Some(idx) = name.rfind(".tmp.") {
        return undot(&name[..idx]);
    }
    if let Some(base) = name.strip_suffix(".tmp") {
        return undot(base);
    }
    for suffix in SWAP_SUFFIXES {
        if let Some(base) = name.strip_suffix(suffix) {
            return undot(base);
        }
    }
    if let Some(base) = name.strip_suffix('~') {
        return non_empty(base);
    }
    if name.len() > 2 {
        if let Some(base) = name.strip_prefix('#').and_then(|n| n.strip_suffix('#')) {
            return non_empty(base);
        }
    }
    None
}

/// Strip temp/backup decoration and return the sibling real path
///
/// `document.txt~` becomes `document.txt`, `..doc.txt.swp` becomes
/// `.doc.txt`, `document.txt.bak` becomes `document.txt`. Undecorated
/// paths come back unchanged.
pub fn extract_original_path(path: &Path) -> PathBuf {
    if let Some(name) = file_name(path) {
        for suffix in BACKUP_SUFFIXES {
            if let Some(base) = name.strip_suffix(suffix) {
                if !base.is_empty() {
                    return path.with_file_name(base);
                }
            }
        }
        if let Some(base) = extract_base_name(path) {
            return path.with_file_name(base);
        }
    }
    path.to_path_buf()
}

fn undot(base: &str) -> Option<String> {
    non_empty(base.strip_prefix('.').unwrap_or(base))
}

fn non_empty(base: &str) -> Option<String> {
    (!base.is_empty()).then(|| base.to_string())
}
