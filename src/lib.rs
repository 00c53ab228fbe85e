//! sortdrop - sort incoming files into category directories
//!
//! This library classifies files by extension, relocates recognized files into
//! per-category directories with a copy-then-delete move, and leaves
//! unrecognized files in place with a warning.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod file_category;
pub mod output;
pub mod relocator;

pub use config::{ConfigError, DirectoryMap, SortConfig};
pub use dispatcher::{DispatchError, Dispatcher, Disposition};
pub use file_category::{Category, ExtensionTable};
pub use relocator::{MoveError, move_file};

pub use cli::{Cli, run_cli};
