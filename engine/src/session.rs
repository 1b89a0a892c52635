//! An editing session: the store, the character being edited and its derived
//! stats. Views send [`SheetEvent`]s and show the returned [`Notice`].

use std::fmt;

use tracing::debug;

use crate::character::{Character, CharacterField, SheetError};
use crate::stats::{recompute_derived, Ability, DerivedStats, ProficiencyTier, Skill};
use crate::store::{CharacterStore, Storage, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetEvent {
    Edit { field: CharacterField, value: String },
    SetSaveProficiency { ability: Ability, proficient: bool },
    SetSkillTier { skill: Skill, tier: ProficiencyTier },
    SaveRequested,
    LoadRequested(isize),
    DeleteRequested(isize),
    NewCharacter,
}

/// User-facing outcome of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Updated,
    Saved { index: usize },
    Loaded { index: usize },
    Deleted { index: usize, name: String },
    Cleared,
    /// The change applies to this session but storage refused the write.
    NotPersisted { reason: String },
    Rejected(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::NotPersisted { .. } | Notice::Rejected(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Updated => f.write_str("Character updated."),
            Notice::Saved { .. } => f.write_str("Character saved successfully!"),
            Notice::Loaded { .. } => f.write_str("Character loaded successfully!"),
            Notice::Deleted { .. } => f.write_str("Character deleted successfully!"),
            Notice::Cleared => f.write_str("Started a new character."),
            Notice::NotPersisted { reason } => {
                write!(f, "Changes kept for this session but not saved: {}", reason)
            }
            Notice::Rejected(msg) => f.write_str(msg),
        }
    }
}

impl From<StoreError> for Notice {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Persist { source, .. } => Notice::NotPersisted {
                reason: source.to_string(),
            },
            other => Notice::Rejected(other.to_string()),
        }
    }
}

pub struct Session<S: Storage> {
    store: CharacterStore<S>,
    current: Character,
    derived: DerivedStats,
}

impl<S: Storage> Session<S> {
    pub fn new(store: CharacterStore<S>) -> Self {
        let current = Character::default();
        let derived = recompute_derived(&current);
        Self {
            store,
            current,
            derived,
        }
    }

    pub fn current(&self) -> &Character {
        &self.current
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    pub fn store(&self) -> &CharacterStore<S> {
        &self.store
    }

    pub fn into_store(self) -> CharacterStore<S> {
        self.store
    }

    /// Apply a list edit (add/remove/attune) to the current character.
    pub fn edit(&mut self, f: impl FnOnce(&mut Character) -> Result<(), SheetError>) -> Notice {
        match f(&mut self.current) {
            Ok(()) => {
                self.refresh();
                Notice::Updated
            }
            Err(err) => Notice::Rejected(err.to_string()),
        }
    }

    pub fn handle(&mut self, event: SheetEvent) -> Notice {
        debug!(?event, "handling sheet event");
        match event {
            SheetEvent::Edit { field, value } => {
                self.edit(|c| c.set_field(field, &value))
            }
            SheetEvent::SetSaveProficiency {
                ability,
                proficient,
            } => self.edit(|c| {
                c.proficiencies.set_save(ability, proficient);
                Ok(())
            }),
            SheetEvent::SetSkillTier { skill, tier } => self.edit(|c| {
                c.proficiencies.set_skill(skill, tier);
                Ok(())
            }),
            SheetEvent::SaveRequested => match self.store.upsert(self.current.clone()) {
                Ok(index) => Notice::Saved { index },
                Err(err) => err.into(),
            },
            SheetEvent::LoadRequested(index) => match self.store.get(index) {
                Ok(character) => {
                    self.current = character.clone();
                    self.refresh();
                    Notice::Loaded {
                        index: index as usize,
                    }
                }
                Err(err) => err.into(),
            },
            SheetEvent::DeleteRequested(index) => match self.store.delete(index) {
                Ok(removed) => Notice::Deleted {
                    index: index as usize,
                    name: removed.name,
                },
                Err(err) => err.into(),
            },
            SheetEvent::NewCharacter => {
                self.current = Character::default();
                self.refresh();
                Notice::Cleared
            }
        }
    }

    fn refresh(&mut self) {
        self.derived = recompute_derived(&self.current);
    }
}
