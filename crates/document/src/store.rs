use crate::error::{DocumentError, Result};
use crate::parser::{parse, Parsed};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What happened to the `.bak` copy during a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Written(PathBuf),
    /// Nothing to back up: the target did not exist yet.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub backup: BackupOutcome,
    pub bytes: usize,
}

/// Sibling backup path: `<path>.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Read the whole file as UTF-8 text.
pub async fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| DocumentError::read(path, e))?;
    String::from_utf8(bytes).map_err(|_| DocumentError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Read and parse `path`.
pub async fn load(path: &Path) -> Result<Parsed> {
    let text = read_text(path).await?;
    let parsed = parse(&text)?;
    debug!(
        "loaded {} ({} lines, {} groups)",
        path.display(),
        parsed.document.len(),
        parsed.document.groups().len()
    );
    Ok(parsed)
}

/// Write `text` to `path`, copying the previous content to `<path>.bak`
/// first. A failed backup is reported in the [`SaveReport`] and does not
/// stop the write.
pub async fn save(path: &Path, text: &str) -> Result<SaveReport> {
    let backup = backup_existing(path).await;
    fs::write(path, text)
        .await
        .map_err(|e| DocumentError::write(path, e))?;
    info!("saved {} ({} bytes)", path.display(), text.len());
    Ok(SaveReport {
        backup,
        bytes: text.len(),
    })
}

async fn backup_existing(path: &Path) -> BackupOutcome {
    let target = backup_path(path);
    match fs::copy(path, &target).await {
        Ok(_) => BackupOutcome::Written(target),
        Err(err) if err.kind() == ErrorKind::NotFound => BackupOutcome::Skipped,
        Err(err) => {
            warn!("failed to create backup {}: {err}", target.display());
            BackupOutcome::Failed(format!("{}: {err}", target.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(backup_path(Path::new(".env")), PathBuf::from(".env.bak"));
        assert_eq!(
            backup_path(Path::new("/srv/app/.env.local")),
            PathBuf::from("/srv/app/.env.local.bak")
        );
    }
}
