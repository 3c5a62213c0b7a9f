//! Local filesystem storage for uploaded attachments.
//!
//! Every attachment is stored under the configured media root, in a directory
//! derived from the owning record: `problems/<id>/<filename>` for problem files
//! and `solutions/<id>/<filename>` for solution files. The relative path is what
//! gets persisted inside of a database.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use derive_more::{Display, Error, From};
use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use tokio::fs;
use tracing::warn;

use crate::config;

/// Length of a random suffix appended to clashing file names.
const SUFFIX_LENGTH: usize = 7;

/// Errors that may occur while accessing the media storage.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Underlying filesystem error.
    Io(io::Error),

    /// Relative path escapes the media root.
    #[display(fmt = "invalid media path")]
    InvalidPath,
}

/// Reasons for an uploaded file name to be rejected.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum FilenameError {
    #[display(fmt = "file name cannot be empty")]
    Empty,

    #[display(fmt = "file name cannot contain '..'")]
    PathTraversal,

    #[display(fmt = "file name cannot contain control characters")]
    ControlCharacter,

    #[display(fmt = "hidden files are not allowed")]
    Hidden,
}

impl std::error::Error for FilenameError {}

/// Owner of an uploaded attachment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Owner {
    Problem(i64),
    Solution(i64),
}

impl Owner {
    /// Directory, relative to the media root, that stores owner's files.
    pub fn directory(&self) -> String {
        match self {
            Owner::Problem(id) => format!("problems/{id}"),
            Owner::Solution(id) => format!("solutions/{id}"),
        }
    }
}

/// Reduce a client-provided file name to a flat and safe file name.
///
/// Browsers may send full client paths, so only the last path component is kept.
pub fn sanitize_filename(name: &str) -> Result<String, FilenameError> {
    let name = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() {
        return Err(FilenameError::Empty);
    }

    if name.chars().any(char::is_control) {
        return Err(FilenameError::ControlCharacter);
    }

    if name == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if name.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(name.to_string())
}

/// Media storage rooted at the configured directory.
pub struct MediaStorage<'a> {
    config: &'a config::Storage,
}

impl<'a> MediaStorage<'a> {
    /// Create new [`MediaStorage`] from the provided [`Storage`] configuration.
    ///
    /// [`Storage`]: config::Storage
    pub fn new(config: &'a config::Storage) -> MediaStorage<'a> {
        MediaStorage { config }
    }

    /// Resolve a relative media path into an absolute one.
    ///
    /// Only plain path components are accepted.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(relative);

        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if relative.as_os_str().is_empty() || !is_plain {
            return Err(Error::InvalidPath);
        }

        Ok(self.config.media_root.join(relative))
    }

    /// Store an uploaded file for the provided owner.
    ///
    /// Returns the path relative to the media root. If a file with
    /// the same name already exists, a random suffix is added
    /// to the file stem.
    pub async fn save(&self, owner: Owner, filename: &str, data: &[u8]) -> Result<String, Error> {
        let directory = owner.directory();

        fs::create_dir_all(self.resolve(&directory)?).await?;

        let mut relative = format!("{directory}/{filename}");

        while fs::try_exists(self.resolve(&relative)?).await? {
            relative = format!("{directory}/{}", with_suffix(filename));
        }

        fs::write(self.resolve(&relative)?, data).await?;

        Ok(relative)
    }

    /// Read a stored file.
    ///
    /// Directories are reported as missing files.
    pub async fn read(&self, relative: &str) -> Result<Vec<u8>, Error> {
        let path = self.resolve(relative)?;

        if !fs::metadata(&path).await?.is_file() {
            return Err(io::Error::from(io::ErrorKind::NotFound).into());
        }

        Ok(fs::read(path).await?)
    }

    /// Remove previously stored files.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn remove_all<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            let path = path.as_ref();

            let result = match self.resolve(path) {
                Ok(absolute) => fs::remove_file(absolute).await.map_err(Error::from),
                Err(err) => Err(err),
            };

            if let Err(err) = result {
                warn!(%path, %err, "unable to remove media file");
            }
        }
    }
}

/// Insert a random suffix between the file stem and its extension.
fn with_suffix(filename: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut thread_rng(), SUFFIX_LENGTH);

    match filename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{stem}_{suffix}.{extension}"),
        _ => format!("{filename}_{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{sanitize_filename, FilenameError, MediaStorage, Owner};
    use crate::config::Storage;

    fn storage_config(dir: &TempDir) -> Storage {
        Storage {
            media_root: dir.path().to_path_buf(),
            max_upload_size: 1024,
        }
    }

    #[test]
    fn filenames() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(
            sanitize_filename("C:\\Users\\ivan\\screen.png").unwrap(),
            "screen.png"
        );
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("   "), Err(FilenameError::Empty));
        assert_eq!(sanitize_filename("dir/"), Err(FilenameError::Empty));
        assert_eq!(sanitize_filename(".."), Err(FilenameError::PathTraversal));
        assert_eq!(sanitize_filename(".env"), Err(FilenameError::Hidden));
        assert_eq!(
            sanitize_filename("a\r\nb.txt"),
            Err(FilenameError::ControlCharacter)
        );
    }

    #[test]
    fn resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let config = storage_config(&dir);
        let storage = MediaStorage::new(&config);

        assert!(storage.resolve("problems/1/log.txt").is_ok());
        assert!(storage.resolve("../secret").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("").is_err());
    }

    #[tokio::test]
    async fn save_read_and_remove() {
        let dir = TempDir::new().unwrap();
        let config = storage_config(&dir);
        let storage = MediaStorage::new(&config);

        let first = storage
            .save(Owner::Problem(3), "log.txt", b"first")
            .await
            .unwrap();
        let second = storage
            .save(Owner::Problem(3), "log.txt", b"second")
            .await
            .unwrap();
        let other = storage
            .save(Owner::Solution(3), "log.txt", b"third")
            .await
            .unwrap();

        assert_eq!(first, "problems/3/log.txt");
        assert_ne!(first, second);
        assert!(second.starts_with("problems/3/log_") && second.ends_with(".txt"));
        assert_eq!(other, "solutions/3/log.txt");

        assert_eq!(storage.read(&first).await.unwrap(), b"first");
        assert_eq!(storage.read(&second).await.unwrap(), b"second");

        storage.remove_all([&first, &second]).await;

        assert!(storage.read(&first).await.is_err());
        assert!(storage.read(&other).await.is_ok());
        assert!(storage.read("problems/3").await.is_err());
    }
}
