//! Export sinks: where finished artifacts are delivered.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Delivers a finished artifact to the user.
pub trait ExportSink {
    /// Triggers a download of `bytes` under the suggested `filename`.
    fn trigger_download(&self, bytes: &[u8], mime: &str, filename: &str) -> Result<(), ExportError>;
}

/// Saves downloads into a directory, creating it on first use.
///
/// Each download is staged in a temporary file inside the target directory
/// and then moved into place, so a failed write never leaves a partial file
/// under the final name. The temporary file is removed when the staging
/// handle is dropped, whether or not the move succeeded.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectorySink {
    fn trigger_download(&self, bytes: &[u8], mime: &str, filename: &str) -> Result<(), ExportError> {
        if filename.is_empty() || Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return Err(ExportError::InvalidRequest(format!(
                "'{}' is not a plain file name",
                filename
            )));
        }

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let target = self.dir.join(filename);
        staged.persist(&target).map_err(|e| ExportError::Io(e.error))?;

        log::info!("saved {} ({}, {} bytes)", target.display(), mime, bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_writes_file_and_leaves_no_temp() {
        let root = TempDir::new().unwrap();
        let sink = DirectorySink::new(root.path().join("out"));

        sink.trigger_download(b"<svg/>", "image/svg+xml", "qrcode.svg").unwrap();

        assert_eq!(fs::read(root.path().join("out/qrcode.svg")).unwrap(), b"<svg/>");
        assert_eq!(entries(&root.path().join("out")), vec!["qrcode.svg".to_string()]);
    }

    #[test]
    fn test_overwrites_previous_download() {
        let root = TempDir::new().unwrap();
        let sink = DirectorySink::new(root.path());

        sink.trigger_download(b"first", "image/octet-stream", "qrcode.png").unwrap();
        sink.trigger_download(b"second", "image/octet-stream", "qrcode.png").unwrap();

        assert_eq!(fs::read(root.path().join("qrcode.png")).unwrap(), b"second");
        assert_eq!(entries(root.path()), vec!["qrcode.png".to_string()]);
    }

    #[test]
    fn test_failed_persist_releases_staging_file() {
        let root = TempDir::new().unwrap();
        // A directory occupying the target name makes the final move fail.
        fs::create_dir(root.path().join("qrcode.png")).unwrap();
        fs::write(root.path().join("qrcode.png/keep"), b"x").unwrap();
        let sink = DirectorySink::new(root.path());

        let result = sink.trigger_download(b"png", "image/octet-stream", "qrcode.png");

        assert!(matches!(result, Err(ExportError::Io(_))));
        assert_eq!(entries(root.path()), vec!["qrcode.png".to_string()]);
    }

    #[test]
    fn test_rejects_paths_as_filenames() {
        let root = TempDir::new().unwrap();
        let sink = DirectorySink::new(root.path());

        for name in ["", "../escape.png", "nested/qrcode.png"] {
            assert!(matches!(
                sink.trigger_download(b"x", "image/octet-stream", name),
                Err(ExportError::InvalidRequest(_))
            ));
        }
    }
}
