use crate::error::{ElvupError, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Extracts a release archive into `dest_root` and returns the path of the
/// archive's top-level directory.
///
/// The archive must be laid out the way release hosts package tags: the first
/// entry is a directory and every other entry lives beneath it. This is checked
/// before anything is written, as is that no entry can escape `dest_root`.
pub fn extract(archive_path: &Path, dest_root: &Path) -> Result<PathBuf> {
    let open_error = |source: ZipError| ElvupError::Open {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::open(archive_path).map_err(|e| open_error(ZipError::Io(e)))?;
    let mut archive = ZipArchive::new(file).map_err(open_error)?;

    let root = check_layout(&mut archive, archive_path)?;
    let top_level = dest_root.join(&root);
    let created_top_level = !top_level.exists();

    if let Err(e) = write_entries(&mut archive, archive_path, dest_root) {
        // Only a tree this call created is removed; an existing one is left alone.
        if created_top_level && top_level.exists() {
            if let Err(remove_err) = std::fs::remove_dir_all(&top_level) {
                tracing::warn!(
                    path = %top_level.display(),
                    error = %remove_err,
                    "could not remove partially extracted directory"
                );
            }
        }
        return Err(e);
    }

    tracing::debug!(
        archive = %archive_path.display(),
        entries = archive.len(),
        top_level = %top_level.display(),
        "extracted archive"
    );

    Ok(top_level)
}

fn write_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    archive_path: &Path,
    dest_root: &Path,
) -> Result<()> {
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| ElvupError::Open {
            path: archive_path.to_path_buf(),
            source,
        })?;
        let relative = entry.enclosed_name().ok_or_else(|| ElvupError::UnsafeEntry {
            name: entry.name().to_string(),
        })?;
        let outpath = dest_root.join(relative);
        if !outpath.starts_with(dest_root) {
            return Err(ElvupError::UnsafeEntry {
                name: entry.name().to_string(),
            });
        }

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| write_error(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        let mut outfile = File::create(&outpath).map_err(|e| write_error(&outpath, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| write_error(&outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Owner write is kept so a later run can overwrite the file.
            if let Some(mode) = entry.unix_mode().map(|m| m & 0o777).filter(|m| *m != 0) {
                let perms = std::fs::Permissions::from_mode(mode | 0o200);
                std::fs::set_permissions(&outpath, perms)
                    .map_err(|e| write_error(&outpath, e))?;
            }
        }
    }

    Ok(())
}

/// Returns the archive's root directory after verifying every entry is
/// enclosed and nested under it.
fn check_layout<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    archive_path: &Path,
) -> Result<PathBuf> {
    if archive.is_empty() {
        return Err(ElvupError::malformed(archive_path, "archive has no entries"));
    }

    let open_error = |source: ZipError| ElvupError::Open {
        path: archive_path.to_path_buf(),
        source,
    };

    let root = {
        let first = archive.by_index_raw(0).map_err(open_error)?;
        if !first.is_dir() {
            return Err(ElvupError::malformed(
                archive_path,
                format!("first entry '{}' is not a directory", first.name()),
            ));
        }
        first.enclosed_name().ok_or_else(|| ElvupError::UnsafeEntry {
            name: first.name().to_string(),
        })?
    };

    for i in 1..archive.len() {
        let entry = archive.by_index_raw(i).map_err(open_error)?;
        let path = entry.enclosed_name().ok_or_else(|| ElvupError::UnsafeEntry {
            name: entry.name().to_string(),
        })?;

        if !path.starts_with(&root) || (path == root && !entry.is_dir()) {
            return Err(ElvupError::malformed(
                archive_path,
                format!(
                    "entry '{}' is not inside top-level directory '{}'",
                    entry.name(),
                    root.display()
                ),
            ));
        }
    }

    Ok(root)
}

fn write_error(path: &Path, source: std::io::Error) -> ElvupError {
    ElvupError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes a zip fixture. Entries with `None` content become directories.
#[cfg(test)]
pub(crate) fn write_test_archive(path: &Path, entries: &[(&str, Option<&str>)]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (name, content) in entries {
        match content {
            None => writer.add_directory(*name, options).unwrap(),
            Some(text) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(text.as_bytes()).unwrap();
            }
        }
    }

    writer.finish().unwrap();
}
