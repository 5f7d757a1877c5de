//! Artifact storage.
//!
//! The artifact directory is shared by every scenario in a run and only ever
//! appended to. Files are created with `create_new`, so two captures landing
//! in the same microsecond get distinct names instead of overwriting.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::types::{ArtifactError, ArtifactResult};
use super::utils::{generate_filename, generate_timestamp};

/// Destination for captured artifacts
pub trait ArtifactSink {
    /// Store a PNG under a name derived from `prefix` and `label`; returns the written path
    fn store(&self, prefix: &str, label: &str, png: &[u8]) -> ArtifactResult<PathBuf>;
}

/// Writes artifacts as timestamped files under one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List all PNG files written so far
    pub fn list_artifacts(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut artifacts = Vec::new();
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().map(|e| e == "png").unwrap_or(false) {
                    artifacts.push(path);
                }
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }
}

impl ArtifactSink for DirectorySink {
    fn store(&self, prefix: &str, label: &str, png: &[u8]) -> ArtifactResult<PathBuf> {
        let write_err = |path: &Path, source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|e| write_err(&self.dir, e))?;

        let filename = generate_filename(prefix, label, &generate_timestamp());
        let mut path = self.dir.join(&filename);
        let mut attempt = 1;
        let mut file = loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let stem = filename.trim_end_matches(".png");
                    path = self.dir.join(format!("{}_{}.png", stem, attempt));
                    attempt += 1;
                }
                Err(e) => return Err(write_err(&path, e)),
            }
        };
        file.write_all(png).map_err(|e| write_err(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("nested").join("screenshots"));

        let path = sink.store("click", "Shop", b"png").unwrap();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("click_Shop_"));
        assert_eq!(fs::read(&path).unwrap(), b"png");
    }

    #[test]
    fn test_rapid_stores_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());

        let paths: Vec<PathBuf> = (0..25)
            .map(|_| sink.store("click", "Add_to_Cart", b"x").unwrap())
            .collect();
        let mut unique = paths.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 25);
        assert_eq!(sink.list_artifacts().unwrap().len(), 25);
    }

    #[test]
    fn test_store_into_file_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"not a dir").unwrap();

        let sink = DirectorySink::new(&blocker);
        assert!(matches!(sink.store("click", "x", b"png"), Err(ArtifactError::Write { .. })));
    }
}
