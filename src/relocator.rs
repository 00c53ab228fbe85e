//! Copy-then-delete file relocation.
//!
//! [`move_file`] relocates a single file into a destination directory. The
//! move is not atomic: the bytes are copied to the destination first and the
//! source is removed only once the copy has fully succeeded. Each step that
//! can fail has its own [`MoveError`] variant carrying the offending path and
//! the underlying I/O error.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while relocating a file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The destination directory could not be created.
    #[error("couldn't create destination directory {}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source file could not be opened for reading.
    #[error("couldn't open source file {}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The destination file could not be created or truncated.
    #[error("couldn't create destination file {}", path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Copying the bytes failed part-way. The partial destination is left behind.
    #[error(
        "couldn't copy {} to destination file {}",
        from.display(),
        path.display()
    )]
    Copy {
        from: PathBuf,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The copy succeeded but the source could not be removed, so the file
    /// now exists in both places.
    #[error("couldn't remove source file {}", path.display())]
    SourceRemove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MoveError {
    /// Returns the path the failing step operated on.
    ///
    /// For `Copy` this is the destination file, which may hold partial content.
    pub fn path(&self) -> &Path {
        match self {
            Self::DirectoryCreate { path, .. }
            | Self::SourceOpen { path, .. }
            | Self::DestinationCreate { path, .. }
            | Self::Copy { path, .. }
            | Self::SourceRemove { path, .. } => path,
        }
    }

    /// Returns true when a complete copy exists at the destination but the
    /// source could not be removed.
    pub fn left_duplicate(&self) -> bool {
        matches!(self, Self::SourceRemove { .. })
    }
}

/// Result type for relocation.
pub type MoveResult<T> = Result<T, MoveError>;

/// Moves `source` into `dest_dir`, keeping its file name.
///
/// Missing directories in `dest_dir` are created. An existing file of the
/// same name in `dest_dir` is overwritten. Returns the destination path.
///
/// A source that already sits in `dest_dir` is left untouched and its path
/// returned.
///
/// # Errors
///
/// Returns the [`MoveError`] variant of the first step that failed. Nothing
/// is rolled back: a failed copy may leave a partial destination file, and a
/// failed removal leaves the source next to its complete copy. A destination
/// that is a symlink to the source fails with `DestinationCreate` before
/// anything is written.
///
/// # Examples
///
/// ```no_run
/// use sortdrop::relocator::move_file;
/// use std::path::Path;
///
/// match move_file(Path::new("downloads/photo.jpg"), Path::new("./images")) {
///     Ok(dest) => println!("Moved to {}", dest.display()),
///     Err(e) => eprintln!("Move failed: {}", e),
/// }
/// ```
pub fn move_file(source: &Path, dest_dir: &Path) -> MoveResult<PathBuf> {
    fs::create_dir_all(dest_dir).map_err(|e| MoveError::DirectoryCreate {
        path: dest_dir.to_path_buf(),
        source: e,
    })?;

    let file_name = source.file_name().ok_or_else(|| MoveError::SourceOpen {
        path: source.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name component"),
    })?;
    let destination = dest_dir.join(file_name);

    let mut input = File::open(source).map_err(|e| MoveError::SourceOpen {
        path: source.to_path_buf(),
        source: e,
    })?;

    // Creating the destination would truncate the source itself.
    if is_same_location(source, dest_dir, file_name) {
        debug!(path = %source.display(), "file already in destination directory");
        return Ok(destination);
    }
    if resolves_to(&destination, source) {
        return Err(MoveError::DestinationCreate {
            path: destination,
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination is a link to the source file",
            ),
        });
    }

    {
        let mut output = File::create(&destination).map_err(|e| MoveError::DestinationCreate {
            path: destination.clone(),
            source: e,
        })?;

        let copied = io::copy(&mut input, &mut output).map_err(|e| MoveError::Copy {
            from: source.to_path_buf(),
            path: destination.clone(),
            source: e,
        })?;
        debug!(
            from = %source.display(),
            to = %destination.display(),
            bytes = copied,
            "copied file contents"
        );
    }
    drop(input);

    fs::remove_file(source).map_err(|e| MoveError::SourceRemove {
        path: source.to_path_buf(),
        source: e,
    })?;

    Ok(destination)
}

/// True when `source` already lives directly in `dest_dir` under `file_name`.
fn is_same_location(source: &Path, dest_dir: &Path, file_name: &OsStr) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(dest_dir)) {
        (Ok(source), Ok(dir)) => source == dir.join(file_name),
        _ => false,
    }
}

fn resolves_to(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tempfile::TempDir;

    #[test]
    fn test_move_file_creates_nested_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("notes.txt");
        fs::write(&source, "hello").expect("Failed to write test file");

        let dest_dir = temp_dir.path().join("a").join("b").join("documents");
        let dest = move_file(&source, &dest_dir).expect("Failed to move file");

        assert_eq!(dest, dest_dir.join("notes.txt"));
        assert!(dest_dir.is_dir());
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "hello");
    }

    #[test]
    fn test_move_file_preserves_bytes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("blob.bin");
        let content: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
        fs::write(&source, &content).expect("Failed to write test file");

        let dest = move_file(&source, &temp_dir.path().join("out")).expect("Failed to move file");

        assert_eq!(fs::read(&dest).unwrap(), content);
        assert!(!source.exists());
    }

    #[test]
    fn test_move_file_discards_source_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("deep").join("inner");
        fs::create_dir_all(&nested).unwrap();
        let source = nested.join("clip.mp4");
        fs::write(&source, "video").unwrap();

        let dest_dir = temp_dir.path().join("videos");
        let dest = move_file(&source, &dest_dir).expect("Failed to move file");

        assert_eq!(dest, dest_dir.join("clip.mp4"));
        assert!(!dest_dir.join("deep").exists());
    }

    #[test]
    fn test_move_file_overwrites_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = temp_dir.path().join("images");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(dest_dir.join("photo.png"), "a much longer previous content").unwrap();

        let source = temp_dir.path().join("photo.png");
        fs::write(&source, "new").unwrap();

        let dest = move_file(&source, &dest_dir).expect("Failed to move file");
        assert_eq!(fs::read_to_string(dest).unwrap(), "new");
    }

    #[test]
    fn test_missing_source_is_source_open_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("ghost.txt");
        let dest_dir = temp_dir.path().join("documents");

        let err = move_file(&source, &dest_dir).unwrap_err();

        assert!(matches!(err, MoveError::SourceOpen { .. }));
        assert_eq!(err.path(), source.as_path());
        assert!(dest_dir.is_dir());
        assert_eq!(fs::read_dir(&dest_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_dest_dir_colliding_with_file_is_directory_create_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("images");
        fs::write(&blocker, "not a directory").unwrap();
        let source = temp_dir.path().join("photo.jpg");
        fs::write(&source, "jpeg").unwrap();

        let err = move_file(&source, &blocker).unwrap_err();

        assert!(matches!(err, MoveError::DirectoryCreate { .. }));
        assert!(source.exists());
        assert_eq!(fs::read_to_string(&source).unwrap(), "jpeg");
    }

    #[test]
    fn test_destination_is_directory_is_destination_create_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = temp_dir.path().join("documents");
        fs::create_dir_all(dest_dir.join("report.pdf")).unwrap();
        let source = temp_dir.path().join("report.pdf");
        fs::write(&source, "pdf").unwrap();

        let err = move_file(&source, &dest_dir).unwrap_err();

        assert!(matches!(err, MoveError::DestinationCreate { .. }));
        assert_eq!(err.path(), dest_dir.join("report.pdf").as_path());
        assert!(source.exists());
    }

    #[test]
    fn test_file_already_in_place_is_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = temp_dir.path().join("images");
        fs::create_dir(&dest_dir).unwrap();
        let source = dest_dir.join("photo.gif");
        fs::write(&source, "gif89a").unwrap();

        let dest = move_file(&source, &dest_dir).expect("Failed to move file");

        assert_eq!(dest, source);
        assert_eq!(fs::read_to_string(&source).unwrap(), "gif89a");
    }

    /// Returns false when the current user can still write into a
    /// read-only directory (running as root).
    #[cfg(unix)]
    fn permissions_enforced(dir: &Path) -> bool {
        let marker = dir.join(".write-check");
        match fs::write(&marker, "x") {
            Ok(()) => {
                let _ = fs::remove_file(&marker);
                false
            }
            Err(_) => true,
        }
    }

    #[cfg(unix)]
    fn set_mode(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .expect("Failed to set permissions");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_source_is_copy_error_with_partial_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("weird.jpg");
        fs::create_dir(&source).unwrap();
        let dest_dir = temp_dir.path().join("images");

        let err = move_file(&source, &dest_dir).unwrap_err();

        assert!(matches!(err, MoveError::Copy { .. }));
        assert_eq!(err.path(), dest_dir.join("weird.jpg").as_path());
        assert!(dest_dir.join("weird.jpg").is_file());
        assert_eq!(fs::read(dest_dir.join("weird.jpg")).unwrap().len(), 0);
        assert!(source.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_removal_leaves_duplicate() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let source = locked.join("song.flac");
        fs::write(&source, "fLaC full content").unwrap();
        set_mode(&locked, 0o555);

        if !permissions_enforced(&locked) {
            set_mode(&locked, 0o755);
            return;
        }

        let dest_dir = temp_dir.path().join("audios");
        let result = move_file(&source, &dest_dir);
        set_mode(&locked, 0o755);

        let err = result.unwrap_err();
        assert!(matches!(err, MoveError::SourceRemove { .. }));
        assert!(err.left_duplicate());
        assert_eq!(err.path(), source.as_path());
        assert_eq!(
            fs::read_to_string(dest_dir.join("song.flac")).unwrap(),
            "fLaC full content"
        );
        assert_eq!(fs::read_to_string(&source).unwrap(), "fLaC full content");
    }

    #[cfg(unix)]
    #[test]
    fn test_destination_symlink_to_source_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("photo.png");
        fs::write(&source, "png bytes").unwrap();
        let dest_dir = temp_dir.path().join("images");
        fs::create_dir(&dest_dir).unwrap();
        std::os::unix::fs::symlink(&source, dest_dir.join("photo.png")).unwrap();

        let err = move_file(&source, &dest_dir).unwrap_err();

        assert!(matches!(err, MoveError::DestinationCreate { .. }));
        assert_eq!(fs::read_to_string(&source).unwrap(), "png bytes");
        assert!(
            fs::symlink_metadata(dest_dir.join("photo.png"))
                .unwrap()
                .file_type()
                .is_symlink()
        );
    }

    #[test]
    fn test_error_exposes_io_source() {
        let err = MoveError::SourceRemove {
            path: PathBuf::from("/tmp/photo.jpg"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.left_duplicate());
        assert_eq!(
            err.to_string(),
            "couldn't remove source file /tmp/photo.jpg"
        );
        let cause = err.source().and_then(|s| s.downcast_ref::<io::Error>());
        assert_eq!(cause.map(|e| e.kind()), Some(io::ErrorKind::PermissionDenied));
    }
}
