//! Artifact and evidence harvesting.
//!
//! After the script runs, every regular file directly inside `artifacts/`
//! and `evidence/` becomes one [`ResultEntry`]:
//!
//! - file name → entry name
//! - first line → description (trimmed)
//! - the rest of the file → value (trimmed)
//!
//! `\r\n` and lone `\r` line breaks are read as `\n`.
//!
//! An empty file yields an entry with an empty description and value.
//! Entries are ordered by file name. Subdirectories are ignored.

use crate::error::{Result, ShellStepError};
use crate::steps::result::{ResultEntry, StepResult};
use crate::workspace::Workspace;
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Split file content into `(description, value)`.
///
/// ```
/// use shell_step::harvest::split_content;
///
/// assert_eq!(
///     split_content("desc line\nvalue line 1\nvalue line 2\n"),
///     ("desc line", "value line 1\nvalue line 2")
/// );
/// assert_eq!(split_content(""), ("", ""));
/// ```
pub fn split_content(content: &str) -> (&str, &str) {
    match content.split_once('\n') {
        Some((first, rest)) => (first.trim(), rest.trim()),
        None => (content.trim(), ""),
    }
}

/// Convert `\r\n` and lone `\r` line breaks to `\n`.
pub fn normalize_newlines(content: &str) -> Cow<'_, str> {
    if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(content)
    }
}

/// Read one harvested file into an entry named after the file.
///
/// # Errors
///
/// Returns `HarvestDecode` if the file (or its name) is not UTF-8, and
/// `HarvestRead` if it cannot be read.
pub fn read_entry(path: &Path) -> Result<ResultEntry> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ShellStepError::HarvestDecode {
            path: path.to_path_buf(),
        })?;

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::InvalidData {
            ShellStepError::HarvestDecode {
                path: path.to_path_buf(),
            }
        } else {
            ShellStepError::HarvestRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let content = normalize_newlines(&content);
    let (description, value) = split_content(&content);
    Ok(ResultEntry::new(name, value, description))
}

/// Harvest every regular file directly inside `dir`, ordered by name.
///
/// A missing directory harvests nothing.
pub fn harvest_dir(dir: &Path) -> Result<Vec<ResultEntry>> {
    let read_error = |source| ShellStepError::HarvestRead {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("{} was removed by the script; nothing to harvest", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(read_error(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_error)?.path();
        // Follows symlinks: a link to a regular file is harvested.
        if path.is_file() {
            files.push(path);
        } else {
            tracing::debug!("Skipping non-file {}", path.display());
        }
    }
    files.sort();

    files.iter().map(|path| read_entry(path)).collect()
}

/// Harvest a workspace's artifacts and evidence into `result`.
pub fn harvest_workspace(workspace: &Workspace, result: &mut StepResult) -> Result<()> {
    for entry in harvest_dir(&workspace.artifacts_dir())? {
        tracing::debug!("Harvested artifact {}", entry.name);
        result.add_artifact(entry.name, entry.value, entry.description);
    }
    for entry in harvest_dir(&workspace.evidence_dir())? {
        tracing::debug!("Harvested evidence {}", entry.name);
        result.add_evidence(entry.name, entry.value, entry.description);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn split_description_and_value() {
        assert_eq!(
            split_content("desc line\nvalue line 1\nvalue line 2"),
            ("desc line", "value line 1\nvalue line 2")
        );
    }

    #[test]
    fn split_single_line_has_empty_value() {
        assert_eq!(split_content("hello\n"), ("hello", ""));
        assert_eq!(split_content("hello"), ("hello", ""));
    }

    #[test]
    fn split_trims_both_parts() {
        assert_eq!(
            split_content("  desc  \r\n\n  value  \n\n"),
            ("desc", "value")
        );
    }

    #[test]
    fn split_empty_content() {
        assert_eq!(split_content(""), ("", ""));
        assert_eq!(split_content("\n"), ("", ""));
    }

    #[test]
    fn crlf_and_cr_line_breaks_are_normalized() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("crlf"), "desc\r\nline 1\r\nline 2\r\n").unwrap();
        fs::write(temp.path().join("cr"), "desc\rline 1\rline 2").unwrap();

        let entries = harvest_dir(temp.path()).unwrap();

        assert_eq!(
            entries,
            vec![
                ResultEntry::new("cr", "line 1\nline 2", "desc"),
                ResultEntry::new("crlf", "line 1\nline 2", "desc"),
            ]
        );
    }

    #[test]
    fn normalize_newlines_borrows_when_unchanged() {
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed("a\nb")));
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn harvest_dir_reads_files_sorted() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b"), "second\nB").unwrap();
        fs::write(temp.path().join("a"), "first\nA").unwrap();

        let entries = harvest_dir(temp.path()).unwrap();

        assert_eq!(
            entries,
            vec![
                ResultEntry::new("a", "A", "first"),
                ResultEntry::new("b", "B", "second"),
            ]
        );
    }

    #[test]
    fn harvest_dir_ignores_subdirectories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("inner"), "x\ny").unwrap();
        fs::write(temp.path().join("top"), "d\nv").unwrap();

        let entries = harvest_dir(temp.path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "top");
    }

    #[test]
    fn empty_file_yields_empty_entry() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blank"), "").unwrap();

        let entries = harvest_dir(temp.path()).unwrap();

        assert_eq!(entries, vec![ResultEntry::new("blank", "", "")]);
    }

    #[test]
    fn non_utf8_file_is_decode_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("binary"), [0xff, 0xfe, 0x00]).unwrap();

        let err = harvest_dir(temp.path()).unwrap_err();

        match err {
            ShellStepError::HarvestDecode { path } => assert!(path.ends_with("binary")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_dir_harvests_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(harvest_dir(&temp.path().join("gone")).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_harvested() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target.txt");
        fs::write(&target, "linked\nvalue").unwrap();
        let dir = temp.path().join("artifacts");
        fs::create_dir(&dir).unwrap();
        std::os::unix::fs::symlink(&target, dir.join("link")).unwrap();

        let entries = harvest_dir(&dir).unwrap();

        assert_eq!(entries, vec![ResultEntry::new("link", "value", "linked")]);
    }
}
