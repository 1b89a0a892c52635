//! Character persistence.
//!
//! The whole character list lives under one storage key as a JSON array and is
//! rewritten in full after every mutation. Reads never fail: a missing key is
//! an empty list, and unreadable content is logged and treated as empty.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::character::Character;

pub const DEFAULT_STORAGE_KEY: &str = "characters";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("no character at index {index} (have {len})")]
    IndexOutOfRange { index: isize, len: usize },

    /// The in-memory list was changed but could not be written out.
    #[error("changes kept for this session but not saved: {source}")]
    Persist {
        index: Option<usize>,
        source: StorageError,
    },
}

/// Durable string key-value storage.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process storage; writes can be switched off to simulate a full disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One row of the character picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub index: usize,
    pub display_name: String,
}

pub struct CharacterStore<S: Storage> {
    storage: S,
    key: String,
    pretty: bool,
    characters: Vec<Character>,
}

impl<S: Storage> CharacterStore<S> {
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            pretty: false,
            characters: Vec::new(),
        };
        store.load();
        store
    }

    /// Write indented JSON on subsequent saves.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Re-read the list from storage, replacing the in-memory copy.
    pub fn load(&mut self) -> &[Character] {
        self.characters = match self.storage.read(&self.key) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<Character>>(&text) {
                Ok(list) => {
                    debug!(key = %self.key, count = list.len(), "loaded characters");
                    list
                }
                Err(err) => {
                    warn!(key = %self.key, error = %err, "stored characters are malformed; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(key = %self.key, "no stored characters; initializing empty list");
                if let Err(err) = self.storage.write(&self.key, "[]") {
                    warn!(key = %self.key, error = %err, "could not initialize storage");
                }
                Vec::new()
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not read stored characters; starting empty");
                Vec::new()
            }
        };
        &self.characters
    }

    /// Save by name: an exact name match is replaced in place, otherwise the
    /// character is appended. Returns the index written.
    pub fn upsert(&mut self, character: Character) -> Result<usize, StoreError> {
        if character.name.is_empty() {
            return Err(StoreError::Validation("Character name is required.".to_string()));
        }
        let index = match self.position(&character.name) {
            Some(i) => {
                self.characters[i] = character;
                i
            }
            None => {
                self.characters.push(character);
                self.characters.len() - 1
            }
        };
        self.persist(Some(index))?;
        info!(index, name = %self.characters[index].name, "saved character");
        Ok(index)
    }

    /// Overwrite the record at `index`, allowing a rename. A new name that
    /// already belongs to another record is refused.
    pub fn replace(&mut self, index: isize, character: Character) -> Result<usize, StoreError> {
        let i = self.resolve(index)?;
        if character.name.is_empty() {
            return Err(StoreError::Validation("Character name is required.".to_string()));
        }
        if let Some(other) = self.position(&character.name).filter(|&j| j != i) {
            return Err(StoreError::Validation(format!(
                "A character named '{}' is already saved at index {}.",
                character.name, other
            )));
        }
        self.characters[i] = character;
        self.persist(Some(i))?;
        info!(index = i, name = %self.characters[i].name, "replaced character");
        Ok(i)
    }

    pub fn get(&self, index: isize) -> Result<&Character, StoreError> {
        let i = self.resolve(index)?;
        Ok(&self.characters[i])
    }

    /// Remove a character; later indices shift down by one.
    pub fn delete(&mut self, index: isize) -> Result<Character, StoreError> {
        let i = self.resolve(index)?;
        let removed = self.characters.remove(i);
        self.persist(Some(i))?;
        info!(index = i, name = %removed.name, "deleted character");
        Ok(removed)
    }

    pub fn list(&self) -> Vec<ListEntry> {
        self.characters
            .iter()
            .enumerate()
            .map(|(index, c)| ListEntry {
                index,
                display_name: if c.name.is_empty() {
                    format!("Unnamed Character {}", index + 1)
                } else {
                    c.name.clone()
                },
            })
            .collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.characters.iter().position(|c| c.name == name)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn resolve(&self, index: isize) -> Result<usize, StoreError> {
        let len = self.characters.len();
        usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }

    fn persist(&mut self, index: Option<usize>) -> Result<(), StoreError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(&self.characters)
        } else {
            serde_json::to_string(&self.characters)
        };
        let result = encoded
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(&self.key, &json));
        if let Err(source) = result {
            warn!(key = %self.key, error = %source, "could not persist characters");
            return Err(StoreError::Persist { index, source });
        }
        Ok(())
    }
}
