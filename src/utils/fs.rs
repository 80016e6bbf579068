use crate::error::{ElvupError, Result};
use std::fs::{File, Permissions};
use std::path::Path;

fn copy_error(path: &Path, source: std::io::Error) -> ElvupError {
    ElvupError::Copy {
        path: path.to_path_buf(),
        source,
    }
}

/// Source permissions with owner write added, so installed files can be
/// replaced by the next run.
fn owner_writable(mut perms: Permissions) -> Permissions {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o200);
    }

    #[cfg(not(unix))]
    {
        perms.set_readonly(false);
    }

    perms
}

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| copy_error(path, e))?;
    }
    Ok(())
}

/// Copies a single file and flushes it to disk before returning.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let mut source = File::open(from).map_err(|e| copy_error(from, e))?;
    let mut destination = File::create(to).map_err(|e| copy_error(to, e))?;

    std::io::copy(&mut source, &mut destination).map_err(|e| copy_error(to, e))?;

    let perms = source
        .metadata()
        .map_err(|e| copy_error(from, e))?
        .permissions();
    let perms = owner_writable(perms);
    destination
        .set_permissions(perms)
        .map_err(|e| copy_error(to, e))?;

    destination.sync_all().map_err(|e| copy_error(to, e))?;
    Ok(())
}

/// Recursively copies `src` into `dst`, visiting entries in file name order.
/// Directory permissions are applied after the directory's children are
/// written. `src` is never modified.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let src_meta = std::fs::metadata(src).map_err(|e| copy_error(src, e))?;
    ensure_dir_exists(dst)?;

    let mut entries = std::fs::read_dir(src)
        .map_err(|e| copy_error(src, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| copy_error(src, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| copy_error(&src_path, e))?;

        if file_type.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }

    std::fs::set_permissions(dst, owner_writable(src_meta.permissions()))
        .map_err(|e| copy_error(dst, e))?;
    Ok(())
}
