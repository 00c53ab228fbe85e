//! Destination directory configuration.
//!
//! Each known category is sent to a directory. The defaults are relative to
//! the working directory and can be overridden by a TOML file:
//!
//! ```toml
//! [directories]
//! image = "./images"
//! video = "./videos"
//! document = "./documents"
//! audio = "./audios"
//! ```
//!
//! Every key is optional. Directories are not created here; the relocator
//! creates them the first time a file is moved into them.

use crate::file_category::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".sortdroprc.toml";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A category was configured with an empty directory.
    #[error("Directory for category '{0}' must not be empty")]
    EmptyDirectory(Category),
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub directories: DirectoryRules,
}

/// Destination directory per category, as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryRules {
    #[serde(default = "default_image_dir")]
    pub image: PathBuf,
    #[serde(default = "default_video_dir")]
    pub video: PathBuf,
    #[serde(default = "default_document_dir")]
    pub document: PathBuf,
    #[serde(default = "default_audio_dir")]
    pub audio: PathBuf,
}

fn default_dir(category: Category) -> PathBuf {
    PathBuf::from(category.default_dir().unwrap_or_default())
}

fn default_image_dir() -> PathBuf {
    default_dir(Category::Image)
}

fn default_video_dir() -> PathBuf {
    default_dir(Category::Video)
}

fn default_document_dir() -> PathBuf {
    default_dir(Category::Document)
}

fn default_audio_dir() -> PathBuf {
    default_dir(Category::Audio)
}

impl Default for DirectoryRules {
    fn default() -> Self {
        Self {
            image: default_image_dir(),
            video: default_video_dir(),
            document: default_document_dir(),
            audio: default_audio_dir(),
        }
    }
}

impl SortConfig {
    /// Load configuration from file or use defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.sortdroprc.toml` in the current directory
    /// 3. Look for `~/.config/sortdrop/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sortdrop")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate the configuration and build the category directory map.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyDirectory` if any directory is empty.
    pub fn compile(self) -> Result<DirectoryMap, ConfigError> {
        let rules = self.directories;
        for (category, dir) in [
            (Category::Image, &rules.image),
            (Category::Video, &rules.video),
            (Category::Document, &rules.document),
            (Category::Audio, &rules.audio),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDirectory(category));
            }
        }

        Ok(DirectoryMap {
            image: rules.image,
            video: rules.video,
            document: rules.document,
            audio: rules.audio,
        })
    }
}

/// Validated, immutable mapping from category to destination directory.
///
/// Every known category has a directory; only `Category::Unknown` has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMap {
    image: PathBuf,
    video: PathBuf,
    document: PathBuf,
    audio: PathBuf,
}

impl DirectoryMap {
    /// Returns the destination directory for `category`.
    pub fn get(&self, category: Category) -> Option<&Path> {
        match category {
            Category::Image => Some(&self.image),
            Category::Video => Some(&self.video),
            Category::Document => Some(&self.document),
            Category::Audio => Some(&self.audio),
            Category::Unknown => None,
        }
    }

    /// Re-anchors relative directories under `base`. Absolute directories are
    /// left as they are.
    pub fn rooted_at(self, base: &Path) -> Self {
        let root = |dir: PathBuf| {
            if dir.is_absolute() {
                dir
            } else {
                base.join(dir)
            }
        };
        Self {
            image: root(self.image),
            video: root(self.video),
            document: root(self.document),
            audio: root(self.audio),
        }
    }

    /// Iterates over `(category, directory)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Path)> {
        Category::KNOWN
            .into_iter()
            .filter_map(|category| self.get(category).map(|dir| (category, dir)))
    }
}

impl Default for DirectoryMap {
    fn default() -> Self {
        let rules = DirectoryRules::default();
        Self {
            image: rules.image,
            video: rules.video,
            document: rules.document,
            audio: rules.audio,
        }
    }
}
