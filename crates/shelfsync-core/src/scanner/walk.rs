use crate::error::Error;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, trace};
use walkdir::WalkDir;

/// A document file discovered under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl CandidateFile {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// Recursively list regular files under `root` whose name matches `pattern`.
/// Symlinks are not followed. An unreadable root is fatal; unreadable entries
/// below it are logged and skipped.
pub fn list_candidates(root: &Path, pattern: &str) -> Result<Vec<CandidateFile>, Error> {
    let pattern = Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let metadata = fs::metadata(root).map_err(|e| Error::RootInaccessible {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(Error::RootInaccessible {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    fs::read_dir(root).map_err(|e| Error::RootInaccessible {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                error!("Error walking {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if pattern.matches(&name) {
            trace!("Candidate {}", entry.path().display());
            candidates.push(CandidateFile::new(entry.into_path()));
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lists_nested_matches_only() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("shelf").join("deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("a.pdf"), b"x").unwrap();
        fs::write(nested.join("b.pdf"), b"x").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir_all(tmp.path().join("dir.pdf")).unwrap();

        let mut names: Vec<String> = list_candidates(tmp.path(), "*.pdf*")
            .unwrap()
            .into_iter()
            .map(|c| c.file_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = list_candidates(&missing, "*.pdf").unwrap_err();
        assert!(matches!(err, Error::RootInaccessible { .. }));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.pdf");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            list_candidates(&file, "*.pdf"),
            Err(Error::RootInaccessible { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            list_candidates(tmp.path(), "[*.pdf"),
            Err(Error::InvalidPattern { .. })
        ));
    }
}
