//! Favorite sellers
//!
//! A persisted set of seller ids, stored in the XDG data directory
//! (~/.local/share/gaz-finder/favorites.json). Only the presentation layer
//! consults it; ranking and routing never do.

use crate::config::defaults::APP_DIR_NAME;
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const FAVORITES_FILE_NAME: &str = "favorites.json";

/// File-backed favorites store
#[derive(Debug)]
pub struct Favorites {
    /// Seller ids in the order they were added
    ids: Vec<String>,
    path: PathBuf,
}

impl Favorites {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Get the favorites file path
    pub fn favorites_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(FAVORITES_FILE_NAME))
    }

    /// Load favorites from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::favorites_path()?)
    }

    /// Load favorites from a specific path; a missing file is an empty store
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let ids = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read favorites file: {}", e))
            })?;

            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse favorites file: {}", e))
            })?
        } else {
            Vec::new()
        };

        Ok(Self { ids, path })
    }

    /// Save favorites to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create favorites directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(&self.ids)?;
        fs::write(&self.path, content).map_err(|e| {
            Error::Config(format!("Failed to write favorites file: {}", e))
        })?;

        debug!("Saved {} favorites to {}", self.ids.len(), self.path.display());
        Ok(())
    }

    /// All favorite seller ids
    pub fn all(&self) -> &[String] {
        &self.ids
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.iter().any(|fav| fav == id)
    }

    /// Flip membership of a seller id
    ///
    /// # Returns
    /// Whether the id is a favorite after the toggle
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(idx) = self.ids.iter().position(|fav| fav == id) {
            self.ids.remove(idx);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Toggle and persist; on a failed write the in-memory set is restored
    pub fn toggle_and_save(&mut self, id: &str) -> Result<bool> {
        let previous = self.ids.clone();
        let favorite = self.toggle(id);
        if let Err(e) = self.save() {
            self.ids = previous;
            return Err(e);
        }
        Ok(favorite)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
