//! Entry point for newly created files.
//!
//! The [`Dispatcher`] classifies a path and either relocates it into its
//! category's directory or, for unrecognized files, logs a warning and leaves
//! the file where it is. Skipping is a successful outcome, not an error.

use crate::config::DirectoryMap;
use crate::file_category::{Category, ExtensionTable};
use crate::relocator::{self, MoveError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors returned by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Relocating a recognized file failed.
    #[error("error moving file")]
    Move {
        category: Category,
        #[source]
        source: MoveError,
    },
}

impl DispatchError {
    /// Returns the underlying relocation error.
    pub fn move_error(&self) -> &MoveError {
        match self {
            Self::Move { source, .. } => source,
        }
    }
}

/// Result type for dispatching.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// What the dispatcher did with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The file was relocated.
    Moved {
        category: Category,
        destination: PathBuf,
    },
    /// The file type is not managed; nothing was done.
    Skipped,
}

/// Classifies files and routes them to their category directory.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: ExtensionTable,
    directories: DirectoryMap,
}

impl Dispatcher {
    /// Creates a dispatcher from an extension table and a directory map.
    pub fn new(table: ExtensionTable, directories: DirectoryMap) -> Self {
        Self { table, directories }
    }

    /// Returns the extension table used for classification.
    pub fn table(&self) -> &ExtensionTable {
        &self.table
    }

    /// Returns the category directory map.
    pub fn directories(&self) -> &DirectoryMap {
        &self.directories
    }

    /// Handles a "file created" event for `path`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Move` if the file is recognized but could not
    /// be relocated.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortdrop::dispatcher::{Dispatcher, Disposition};
    ///
    /// let dispatcher = Dispatcher::default();
    /// match dispatcher.handle_file_created("photo.JPG") {
    ///     Ok(Disposition::Moved { destination, .. }) => {
    ///         println!("Moved to {}", destination.display())
    ///     }
    ///     Ok(Disposition::Skipped) => println!("Left in place"),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn handle_file_created(&self, path: impl AsRef<Path>) -> DispatchResult<Disposition> {
        let path = path.as_ref();
        let category = self.table.classify(path);

        let Some(dest_dir) = self.directories.get(category) else {
            warn!(path = %path.display(), "unknown file type, leaving file in place");
            return Ok(Disposition::Skipped);
        };

        let destination = relocator::move_file(path, dest_dir)
            .map_err(|source| DispatchError::Move { category, source })?;

        info!(
            from = %path.display(),
            to = %destination.display(),
            %category,
            "moved file"
        );
        Ok(Disposition::Moved {
            category,
            destination,
        })
    }

    /// Returns the category and destination a file would be moved to,
    /// without touching the filesystem. `None` for unrecognized files.
    pub fn plan(&self, path: impl AsRef<Path>) -> Option<(Category, PathBuf)> {
        let path = path.as_ref();
        let category = self.table.classify(path);
        let dest_dir = self.directories.get(category)?;
        let file_name = path.file_name()?;
        Some((category, dest_dir.join(file_name)))
    }
}
