use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to back up {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes `contents` to `target` through a sibling temp file and a rename.
///
/// Missing parent directories are created. With `keep_backup`, an existing
/// target is first copied to `<name>.bak.<timestamp>`; the backup path is
/// returned.
pub fn write_output(
    target: &Path,
    contents: &str,
    keep_backup: bool,
) -> Result<Option<PathBuf>, OutputError> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let backup_path = if keep_backup && target.is_file() {
        let candidate = backup_path_for(target);
        fs::copy(target, &candidate).map_err(|source| OutputError::Backup {
            path: target.to_path_buf(),
            source,
        })?;
        Some(candidate)
    } else {
        None
    };

    let temp_path = sibling_with_suffix(target, &format!(".tmp.{}", std::process::id()));
    let written = write_synced(&temp_path, contents.as_bytes()).and_then(|_| replace(&temp_path, target));
    if let Err(source) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(OutputError::Write {
            path: target.to_path_buf(),
            source,
        });
    }

    Ok(backup_path)
}

fn backup_path_for(target: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    sibling_with_suffix(target, &format!(".bak.{timestamp}"))
}

fn sibling_with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(suffix);
    target.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(target_os = "windows")]
fn replace(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            fs::remove_file(to)?;
            fs::rename(from, to)
        }
        other => other,
    }
}

#[cfg(not(target_os = "windows"))]
fn replace(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}
