//! Board registry.
//!
//! Holds the board descriptors a build works against. The registry is an
//! explicit handle: everything that augments or binds boards takes it by
//! `&mut`, so there is no process-wide board cache.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

use crate::board::BoardDescriptor;
use crate::{Error, Result};

/// Registry of board descriptors keyed by board id.
#[derive(Debug, Clone, Default)]
pub struct BoardRegistry {
    boards: BTreeMap<String, BoardDescriptor>,
}

impl BoardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` manifest in `dir`; the file stem is the board id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or a file cannot be read,
    /// [`Error::Json`] for malformed JSON, and [`Error::InvalidManifest`] for
    /// a manifest that is not an object.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::io(e, dir, "read directory"))?;

        let mut registry = Self::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::io(e, dir, "read directory entry"))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                trace!(?path, "Skipping non-manifest file");
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let contents =
                std::fs::read_to_string(&path).map_err(|e| Error::io(e, &path, "read"))?;
            let value = serde_json::from_str(&contents)?;
            registry.insert(BoardDescriptor::from_value(id, value)?);
        }

        debug!(?dir, count = registry.len(), "Loaded board manifests");
        Ok(registry)
    }

    /// Add a board, replacing any board with the same id.
    pub fn insert(&mut self, board: BoardDescriptor) {
        self.boards.insert(board.id().to_string(), board);
    }

    /// Get a board by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BoardDescriptor> {
        self.boards.get(id)
    }

    /// Get a board by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut BoardDescriptor> {
        self.boards.get_mut(id)
    }

    /// Get a board by id, failing with [`Error::BoardNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoardNotFound`] if no board has this id.
    pub fn require(&self, id: &str) -> Result<&BoardDescriptor> {
        self.get(id).ok_or_else(|| Error::board_not_found(id))
    }

    /// Get a board by id for mutation, failing with [`Error::BoardNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoardNotFound`] if no board has this id.
    pub fn require_mut(&mut self, id: &str) -> Result<&mut BoardDescriptor> {
        self.boards
            .get_mut(id)
            .ok_or_else(|| Error::board_not_found(id))
    }

    /// Iterate boards in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BoardDescriptor> {
        self.boards.values()
    }

    /// Iterate boards in id order for mutation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BoardDescriptor> {
        self.boards.values_mut()
    }

    /// Board ids in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.boards.keys().map(String::as_str).collect()
    }

    /// Number of boards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Whether the registry has no boards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

impl FromIterator<BoardDescriptor> for BoardRegistry {
    fn from_iter<T: IntoIterator<Item = BoardDescriptor>>(iter: T) -> Self {
        let mut registry = Self::new();
        for board in iter {
            registry.insert(board);
        }
        registry
    }
}
