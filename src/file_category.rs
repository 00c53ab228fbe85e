//! File categorization by extension.
//!
//! This module maps a file's extension (case-insensitive) to one of a small,
//! closed set of categories. Files whose extension is not recognized map to
//! [`Category::Unknown`], which is a normal result rather than an error.
//!
//! # Examples
//!
//! ```
//! use sortdrop::file_category::{Category, ExtensionTable};
//!
//! let table = ExtensionTable::default();
//! assert_eq!(table.classify("photo.JPG"), Category::Image);
//! assert_eq!(table.classify("notes.txt"), Category::Document);
//! assert_eq!(table.classify("archive.zip"), Category::Unknown);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Represents a broad file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Image files (JPG, PNG, SVG, etc.)
    Image,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
    /// Document files (PDF, DOCX, TXT, etc.)
    Document,
    /// Audio files (MP3, WAV, FLAC, etc.)
    Audio,
    /// Anything not managed by sortdrop
    Unknown,
}

impl Category {
    /// The categories that have a destination directory.
    pub const KNOWN: [Category; 4] = [
        Category::Image,
        Category::Video,
        Category::Document,
        Category::Audio,
    ];

    /// Returns the lower-case label used in configuration and output.
    ///
    /// ```
    /// use sortdrop::file_category::Category;
    ///
    /// assert_eq!(Category::Image.label(), "image");
    /// assert_eq!(Category::Unknown.label(), "unknown");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Document => "document",
            Category::Audio => "audio",
            Category::Unknown => "unknown",
        }
    }

    /// Returns the default destination directory for this category.
    ///
    /// `Unknown` has no directory: unrecognized files are never moved.
    pub fn default_dir(&self) -> Option<&'static str> {
        match self {
            Category::Image => Some("./images"),
            Category::Video => Some("./videos"),
            Category::Document => Some("./documents"),
            Category::Audio => Some("./audios"),
            Category::Unknown => None,
        }
    }

    /// Returns true for every category except `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Returns the lower-cased extension of the path's final segment, including
/// the leading dot, or an empty string when there is none.
///
/// The extension starts at the last `.` of the file name, so a bare dotfile
/// such as `.jpg` yields `".jpg"`.
pub fn extension_of(path: impl AsRef<Path>) -> String {
    let Some(name) = path.as_ref().file_name() else {
        return String::new();
    };
    let name = name.to_string_lossy();
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Maps file extensions to categories.
///
/// The table is immutable once built; `ExtensionTable::default()` holds the
/// standard set of recognized extensions.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    extension_map: HashMap<&'static str, Category>,
}

impl ExtensionTable {
    /// Creates a new `ExtensionTable` with all standard mappings.
    pub fn new() -> Self {
        let mut table = Self {
            extension_map: HashMap::new(),
        };
        table.populate_standard_mappings();
        table
    }

    fn populate_standard_mappings(&mut self) {
        for ext in [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp"] {
            self.add_mapping(ext, Category::Image);
        }
        for ext in [".mp4", ".mov", ".avi", ".mkv", ".flv", ".wmv"] {
            self.add_mapping(ext, Category::Video);
        }
        for ext in [
            ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".txt", ".ppt", ".pptx",
        ] {
            self.add_mapping(ext, Category::Document);
        }
        for ext in [".mp3", ".wav", ".aac", ".flac", ".ogg"] {
            self.add_mapping(ext, Category::Audio);
        }
    }

    fn add_mapping(&mut self, extension: &'static str, category: Category) {
        self.extension_map.insert(extension, category);
    }

    /// Classifies a path by its extension.
    ///
    /// This never touches the filesystem; the path does not need to exist.
    pub fn classify(&self, path: impl AsRef<Path>) -> Category {
        let ext = extension_of(path);
        self.extension_map
            .get(ext.as_str())
            .copied()
            .unwrap_or(Category::Unknown)
    }

    /// Returns the sorted list of extensions mapped to `category`.
    pub fn extensions(&self, category: Category) -> Vec<&'static str> {
        let mut exts: Vec<_> = self
            .extension_map
            .iter()
            .filter(|&(_, c)| *c == category)
            .map(|(ext, _)| *ext)
            .collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::new()
    }
}
