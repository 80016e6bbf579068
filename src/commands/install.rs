use crate::core::cleanup::{cleanup_run_artifacts, RunArtifacts};
use crate::core::config::Config;
use crate::core::extract::extract;
use crate::core::github::ReleaseSource;
use crate::core::progress::ProgressReporter;
use crate::error::{ElvupError, Result};
use crate::utils::fs::copy_tree;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchTag,
    CreateOutputFile,
    Download,
    CopyToFile,
    Extract,
    CopyToDestination,
    Cleanup,
}

impl Stage {
    /// Status line shown while the stage runs.
    pub fn description(&self, repo: &str) -> String {
        match self {
            Stage::FetchTag => format!("Getting latest tagged {repo} version"),
            Stage::CreateOutputFile => "Creating temporary output file".to_string(),
            Stage::Download => "downloading addon from github".to_string(),
            Stage::CopyToFile => "copying addon contents to temp file".to_string(),
            Stage::Extract => format!("unzipping {repo} files"),
            Stage::CopyToDestination => "moving files to addon folder".to_string(),
            Stage::Cleanup => "cleaning up artifacts".to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchTag => "fetch tag",
            Stage::CreateOutputFile => "create output file",
            Stage::Download => "download",
            Stage::CopyToFile => "copy to file",
            Stage::Extract => "extract",
            Stage::CopyToDestination => "copy to destination",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Installed {
    pub version: String,
    pub destination: PathBuf,
}

/// Removes whatever a failed run left behind. Disarmed once the artifacts
/// are handed to the cleaner.
#[derive(Default)]
struct ArtifactGuard {
    tempfile: Option<PathBuf>,
    top_level_dir: Option<PathBuf>,
}

impl ArtifactGuard {
    fn disarm(&mut self) -> Option<RunArtifacts> {
        match (self.tempfile.take(), self.top_level_dir.take()) {
            (Some(tempfile), Some(top_level_dir)) => Some(RunArtifacts {
                tempfile,
                top_level_dir,
            }),
            _ => None,
        }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if let Some(path) = self.tempfile.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not remove temporary archive"
                );
            }
        }
        if let Some(path) = self.top_level_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not remove extracted directory"
                );
            }
        }
    }
}

/// Installs the newest tag of the configured addon into the destination
/// directory, reporting each stage through `reporter`.
///
/// The first failing stage ends the run; its error is returned wrapped with
/// the stage it came from.
pub fn install_latest<S, W>(
    config: &Config,
    source: &S,
    reporter: &ProgressReporter<W>,
) -> Result<Installed>
where
    S: ReleaseSource + ?Sized,
    W: Write + Send + 'static,
{
    let run_stage = |stage: Stage| {
        reporter.set_message(stage.description(&config.repo));
        tracing::debug!(%stage, "starting stage");
        move |source: ElvupError| {
            tracing::error!(%stage, error = %source, "stage failed");
            ElvupError::Stage {
                stage,
                source: Box::new(source),
            }
        }
    };

    let mut guard = ArtifactGuard::default();

    let on_error = run_stage(Stage::FetchTag);
    let tag = source.latest_tag().map_err(on_error)?;

    let on_error = run_stage(Stage::CreateOutputFile);
    let archive_path = config.get_archive_path(&tag.name);
    let mut output = File::create(&archive_path).map_err(|e| {
        on_error(ElvupError::Write {
            path: archive_path.clone(),
            source: e,
        })
    })?;
    guard.tempfile = Some(archive_path.clone());

    let on_error = run_stage(Stage::Download);
    let mut body = source.download(&tag.zipball_url).map_err(on_error)?;

    let on_error = run_stage(Stage::CopyToFile);
    let bytes = std::io::copy(&mut body, &mut output)
        .and_then(|bytes| output.sync_all().map(|()| bytes))
        .map_err(|e| {
            on_error(ElvupError::Write {
                path: archive_path.clone(),
                source: e,
            })
        })?;
    drop(output);
    tracing::debug!(bytes, archive = %archive_path.display(), "downloaded archive");

    let on_error = run_stage(Stage::Extract);
    let top_level_dir = extract(&archive_path, &config.work_dir).map_err(on_error)?;
    guard.top_level_dir = Some(top_level_dir.clone());

    let on_error = run_stage(Stage::CopyToDestination);
    let destination = config.get_dest_dir();
    copy_tree(&top_level_dir, &destination).map_err(on_error)?;

    let on_error = run_stage(Stage::Cleanup);
    if let Some(artifacts) = guard.disarm() {
        cleanup_run_artifacts(artifacts).map_err(on_error)?;
    }

    Ok(Installed {
        version: tag.name,
        destination,
    })
}
