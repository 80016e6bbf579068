use crate::error::{CleanupFailure, ElvupError, Result};
use std::path::PathBuf;

/// Temporary files produced by one install run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArtifacts {
    pub tempfile: PathBuf,
    pub top_level_dir: PathBuf,
}

/// Deletes the downloaded archive and the extracted top-level directory.
///
/// Both removals are always attempted; every failure is reported together.
pub fn cleanup_run_artifacts(artifacts: RunArtifacts) -> Result<()> {
    let mut failures = Vec::new();

    if let Err(source) = std::fs::remove_file(&artifacts.tempfile) {
        failures.push(CleanupFailure {
            path: artifacts.tempfile,
            source,
        });
    }

    if let Err(source) = std::fs::remove_dir_all(&artifacts.top_level_dir) {
        failures.push(CleanupFailure {
            path: artifacts.top_level_dir,
            source,
        });
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ElvupError::Cleanup { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::ErrorKind;
    use tempfile::TempDir;

    fn make_artifacts(root: &std::path::Path) -> RunArtifacts {
        let tempfile = root.join("v1.2.3.zip");
        let top_level_dir = root.join("root");
        std::fs::write(&tempfile, "zip bytes").unwrap();
        std::fs::create_dir_all(top_level_dir.join("nested")).unwrap();
        std::fs::write(top_level_dir.join("nested/file.txt"), "hello").unwrap();
        RunArtifacts {
            tempfile,
            top_level_dir,
        }
    }

    #[test]
    fn test_cleanup_removes_both_artifacts() {
        let scratch = TempDir::new().unwrap();
        let artifacts = make_artifacts(scratch.path());
        let (tempfile, top_level_dir) = (
            artifacts.tempfile.clone(),
            artifacts.top_level_dir.clone(),
        );

        cleanup_run_artifacts(artifacts).unwrap();

        assert_eq!(
            std::fs::metadata(&tempfile).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            std::fs::metadata(&top_level_dir).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_cleanup_continues_after_first_failure() {
        let scratch = TempDir::new().unwrap();
        let artifacts = make_artifacts(scratch.path());
        std::fs::remove_file(&artifacts.tempfile).unwrap();
        let top_level_dir = artifacts.top_level_dir.clone();

        let err = cleanup_run_artifacts(artifacts).unwrap_err();

        assert!(!top_level_dir.exists());
        match err {
            ElvupError::Cleanup { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].path, scratch.path().join("v1.2.3.zip"));
                assert_eq!(failures[0].source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected cleanup error, got {other:?}"),
        }
    }

    #[test]
    fn test_cleanup_reports_every_failure() {
        let scratch = TempDir::new().unwrap();
        let artifacts = RunArtifacts {
            tempfile: scratch.path().join("gone.zip"),
            top_level_dir: scratch.path().join("gone"),
        };

        match cleanup_run_artifacts(artifacts) {
            Err(ElvupError::Cleanup { failures }) => assert_eq!(failures.len(), 2),
            other => panic!("expected cleanup error, got {other:?}"),
        }
    }
}
