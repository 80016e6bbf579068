use crate::commands::install::Stage;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElvupError>;

#[derive(Error, Debug)]
pub enum ElvupError {
    #[error("Could not fetch tags for {owner}/{repo}: {message}")]
    Fetch {
        owner: String,
        repo: String,
        message: String,
    },

    #[error("Could not download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Could not open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed archive {path}: {reason}")]
    MalformedArchive { path: PathBuf, reason: String },

    #[error("Archive entry '{name}' would be extracted outside the destination")]
    UnsafeEntry { name: String },

    #[error("Could not copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not clean up run artifacts: {}", describe_failures(.failures))]
    Cleanup { failures: Vec<CleanupFailure> },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ElvupError>,
    },
}

/// A single path the cleaner could not remove.
#[derive(Debug)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

fn describe_failures(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.path.display(), f.source))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ElvupError {
    pub fn fetch_error<S: Into<String>>(owner: &str, repo: &str, message: S) -> Self {
        ElvupError::Fetch {
            owner: owner.to_string(),
            repo: repo.to_string(),
            message: message.into(),
        }
    }

    pub fn download_error<S: Into<String>>(url: &str, message: S) -> Self {
        ElvupError::Download {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(path: &std::path::Path, reason: S) -> Self {
        ElvupError::MalformedArchive {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// The stage a pipeline error came from, if it was raised by the orchestrator.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ElvupError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_error_lists_every_path() {
        let err = ElvupError::Cleanup {
            failures: vec![
                CleanupFailure {
                    path: PathBuf::from("v1.zip"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                },
                CleanupFailure {
                    path: PathBuf::from("root"),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.contains("v1.zip"));
        assert!(message.contains("root"));
    }

    #[test]
    fn test_stage_error_names_stage() {
        let err = ElvupError::Stage {
            stage: Stage::Download,
            source: Box::new(ElvupError::download_error("https://x", "timed out")),
        };

        assert_eq!(err.stage(), Some(Stage::Download));
        assert!(err.to_string().starts_with("download failed"));
        assert!(err.to_string().contains("timed out"));
    }
}
