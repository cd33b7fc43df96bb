//! Small JSON files under the XDG state dir that survive across runs:
//! the syllabus id cache and the sidebar layout.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::storage::write_atomic;

/// `~/.local/state/panda`.
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("panda")?;
    Ok(xdg_dirs.get_state_home().join("panda"))
}

pub fn syllabus_cache_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("syllabus_cache.json"))
}

pub fn sidebar_state_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("sidebar.json"))
}

/// Reads a JSON file; a missing file yields `T::default()`.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("serialize state")?;
    write_atomic(path, &json)
}

/// Syllabus page id of a course, and which catalogue it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusId {
    pub id: String,
    /// Liberal-arts (`/la/`) catalogue rather than the faculty one.
    pub liberal_arts: bool,
}

/// Course name → syllabus id. Entries are never invalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusCache {
    #[serde(default)]
    pub entries: BTreeMap<String, SyllabusId>,
}

impl SyllabusCache {
    pub fn get(&self, course: &str) -> Option<&SyllabusId> {
        self.entries.get(course)
    }

    pub fn insert(&mut self, course: &str, id: SyllabusId) {
        self.entries.insert(course.to_string(), id);
    }

    pub fn load() -> Result<Self> {
        load_json(&syllabus_cache_path()?)
    }

    pub fn save(&self) -> Result<()> {
        save_json(&syllabus_cache_path()?, self)
    }
}
