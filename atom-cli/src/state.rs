//! On-disk state: the engine records, the asset directory and CLI settings.
//!
//! Everything lives in one state directory (default `~/.atom`):
//!
//! - `engine.json`    config plus every stats record
//! - `directory.json` collections and registered agents
//! - `atom.toml`      CLI settings

use std::fs;
use std::path::{Path, PathBuf};

use atom_engine::{AtomEngine, AtomError, InMemoryDirectory};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::settings::Settings;

const ENGINE_FILE: &str = "engine.json";
const DIRECTORY_FILE: &str = "directory.json";
const SETTINGS_FILE: &str = "atom.toml";

/// Errors reading or writing the state directory.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("No home directory found; pass --state-dir")]
    NoHome,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid state in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: AtomError,
    },

    #[error("Failed to serialize {path}: {message}")]
    Serialize { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, StateError>;

/// Handle to the state directory.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Uses `explicit` when given, `~/.atom` otherwise.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path,
            None => dirs::home_dir().ok_or(StateError::NoHome)?.join(".atom"),
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Loads the engine, or an empty one if nothing was saved yet. A stored
    /// configuration outside its bounds is rejected.
    pub fn load_engine(&self) -> Result<AtomEngine> {
        let path = self.path(ENGINE_FILE);
        let engine: AtomEngine = read_json(&path)?.unwrap_or_default();
        if let Ok(config) = engine.config() {
            config
                .validate()
                .map_err(|source| StateError::Invalid { path, source })?;
        }
        Ok(engine)
    }

    pub fn save_engine(&self, engine: &AtomEngine) -> Result<()> {
        write_json(&self.path(ENGINE_FILE), engine)
    }

    pub fn load_directory(&self) -> Result<InMemoryDirectory> {
        Ok(read_json(&self.path(DIRECTORY_FILE))?.unwrap_or_default())
    }

    pub fn save_directory(&self, directory: &InMemoryDirectory) -> Result<()> {
        write_json(&self.path(DIRECTORY_FILE), directory)
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let path = self.path(SETTINGS_FILE);
        let Some(content) = read_optional(&path)? else {
            return Ok(Settings::default());
        };
        toml::from_str(&content).map_err(|e| StateError::Parse {
            path,
            message: e.to_string(),
        })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let path = self.path(SETTINGS_FILE);
        let content = toml::to_string_pretty(settings).map_err(|e| StateError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_file(&path, &content)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };
    debug!(path = %path.display(), "loading state");
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StateError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|e| StateError::Serialize {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_file(path, &content)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    debug!(path = %path.display(), "saving state");
    fs::write(path, content).map_err(|source| StateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
