use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coerce::{self, default_level};
use crate::stats::{Ability, AbilityScores, Proficiencies};

/// Most items a character can be attuned to at once.
pub const MAX_ATTUNED_ITEMS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("{0}")]
    Validation(String),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("no {section} entry at index {index} (have {len})")]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },
    #[error("all {0} attunement slots are in use")]
    AttunementFull(usize),
}

/// A named feature with free-text description (class abilities, feats).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<String> for Entry {
    fn from(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "coerce::text")]
    pub kind: String,
    /// Number of checkable uses shown on the sheet.
    #[serde(default, deserialize_with = "coerce::charges")]
    pub charges: u32,
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Item {
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "coerce::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub to_hit: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub damage: String,
    #[serde(default, deserialize_with = "coerce::charges")]
    pub charges: u32,
    #[serde(default)]
    pub attuned: bool,
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

/// The editable lists on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Abilities,
    Feats,
    Actions,
    Inventory,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Abilities => "ability",
            Section::Feats => "feat",
            Section::Actions => "action",
            Section::Inventory => "inventory",
        })
    }
}

impl FromStr for Section {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abilities" | "ability" => Ok(Section::Abilities),
            "feats" | "feat" => Ok(Section::Feats),
            "actions" | "action" => Ok(Section::Actions),
            "inventory" | "item" | "items" => Ok(Section::Inventory),
            _ => Err(SheetError::UnknownField(s.trim().to_string())),
        }
    }
}

/// Scalar fields a view may edit by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterField {
    Name,
    Class,
    Race,
    Level,
    Hp,
    Ac,
    Initiative,
    Notes,
    Score(Ability),
}

impl FromStr for CharacterField {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let field = match key.as_str() {
            "name" => CharacterField::Name,
            "class" => CharacterField::Class,
            "race" => CharacterField::Race,
            "level" => CharacterField::Level,
            "hp" => CharacterField::Hp,
            "ac" => CharacterField::Ac,
            "initiative" => CharacterField::Initiative,
            "notes" => CharacterField::Notes,
            other => Ability::ALL
                .into_iter()
                .find(|a| a.key() == other)
                .map(CharacterField::Score)
                .ok_or_else(|| SheetError::UnknownField(s.trim().to_string()))?,
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Character {
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub class: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub race: String,
    #[serde(default = "default_level", deserialize_with = "coerce::level")]
    pub level: i32,
    #[serde(default, deserialize_with = "coerce::text")]
    pub hp: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub ac: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub initiative: String,
    #[serde(default)]
    pub stats: AbilityScores,
    #[serde(default)]
    pub proficiencies: Proficiencies,
    #[serde(default, deserialize_with = "coerce::entry_list")]
    pub abilities: Vec<Entry>,
    #[serde(default, deserialize_with = "coerce::entry_list")]
    pub feats: Vec<Entry>,
    #[serde(default, deserialize_with = "coerce::entry_list")]
    pub actions: Vec<Action>,
    #[serde(default, deserialize_with = "coerce::entry_list")]
    pub inventory: Vec<Item>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub notes: String,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: String::new(),
            class: String::new(),
            race: String::new(),
            level: coerce::MIN_LEVEL,
            hp: String::new(),
            ac: String::new(),
            initiative: String::new(),
            stats: AbilityScores::default(),
            proficiencies: Proficiencies::default(),
            abilities: Vec::new(),
            feats: Vec::new(),
            actions: Vec::new(),
            inventory: Vec::new(),
            notes: String::new(),
        }
    }
}

fn required_name(name: &str, what: &str) -> Result<String, SheetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SheetError::Validation(format!("{} name is required.", what)));
    }
    Ok(name.to_string())
}

fn check_index(section: Section, index: usize, len: usize) -> Result<(), SheetError> {
    if index >= len {
        return Err(SheetError::IndexOutOfRange {
            section,
            index,
            len,
        });
    }
    Ok(())
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a scalar field from raw form text. Scores fall back to 10 when the
    /// text is not numeric; a level must be a whole number of at least 1.
    pub fn set_field(&mut self, field: CharacterField, value: &str) -> Result<(), SheetError> {
        match field {
            CharacterField::Name => self.name = value.to_string(),
            CharacterField::Class => self.class = value.to_string(),
            CharacterField::Race => self.race = value.to_string(),
            CharacterField::Hp => self.hp = value.to_string(),
            CharacterField::Ac => self.ac = value.to_string(),
            CharacterField::Initiative => self.initiative = value.to_string(),
            CharacterField::Notes => self.notes = value.to_string(),
            CharacterField::Level => {
                let level = coerce::level_from_str(value).ok_or_else(|| {
                    SheetError::Validation(format!("level '{}' is not a number", value.trim()))
                })?;
                if level < coerce::MIN_LEVEL {
                    return Err(SheetError::Validation("level must be at least 1".to_string()));
                }
                self.level = level;
            }
            CharacterField::Score(ability) => {
                self.stats.set(ability, coerce::score_from_str(value));
            }
        }
        Ok(())
    }

    pub fn add_ability(&mut self, entry: Entry) -> Result<(), SheetError> {
        let name = required_name(&entry.name, "Ability")?;
        self.abilities.push(Entry { name, ..entry });
        Ok(())
    }

    pub fn add_feat(&mut self, entry: Entry) -> Result<(), SheetError> {
        let name = required_name(&entry.name, "Feat")?;
        self.feats.push(Entry { name, ..entry });
        Ok(())
    }

    pub fn add_action(&mut self, action: Action) -> Result<(), SheetError> {
        let name = required_name(&action.name, "Action")?;
        self.actions.push(Action { name, ..action });
        Ok(())
    }

    /// New items always start unattuned; use [`Character::set_attuned`].
    pub fn add_item(&mut self, item: Item) -> Result<(), SheetError> {
        let name = required_name(&item.name, "Item")?;
        self.inventory.push(Item {
            name,
            attuned: false,
            ..item
        });
        Ok(())
    }

    /// Replace an item's details, keeping its attunement.
    pub fn update_item(&mut self, index: usize, item: Item) -> Result<(), SheetError> {
        check_index(Section::Inventory, index, self.inventory.len())?;
        let name = required_name(&item.name, "Item")?;
        let attuned = self.inventory[index].attuned;
        self.inventory[index] = Item {
            name,
            attuned,
            ..item
        };
        Ok(())
    }

    pub fn remove_entry(&mut self, section: Section, index: usize) -> Result<(), SheetError> {
        let len = self.section_len(section);
        check_index(section, index, len)?;
        match section {
            Section::Abilities => {
                self.abilities.remove(index);
            }
            Section::Feats => {
                self.feats.remove(index);
            }
            Section::Actions => {
                self.actions.remove(index);
            }
            Section::Inventory => {
                self.inventory.remove(index);
            }
        }
        Ok(())
    }

    pub fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Abilities => self.abilities.len(),
            Section::Feats => self.feats.len(),
            Section::Actions => self.actions.len(),
            Section::Inventory => self.inventory.len(),
        }
    }

    pub fn attuned_count(&self) -> usize {
        self.inventory.iter().filter(|i| i.attuned).count()
    }

    pub fn set_attuned(&mut self, index: usize, attuned: bool) -> Result<(), SheetError> {
        check_index(Section::Inventory, index, self.inventory.len())?;
        if attuned && !self.inventory[index].attuned && self.attuned_count() >= MAX_ATTUNED_ITEMS {
            return Err(SheetError::AttunementFull(MAX_ATTUNED_ITEMS));
        }
        self.inventory[index].attuned = attuned;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_form_values_with_fallbacks() {
        let c: Character = serde_json::from_value(json!({
            "name": "Aria",
            "level": "3",
            "hp": 24,
            "stats": { "strength": "15", "dexterity": "", "wisdom": 8 },
            "actions": [{ "name": "Second Wind", "type": "bonus", "charges": "-2" }],
            "inventory": [{ "name": "Wand", "charges": "x" }]
        }))
        .unwrap();
        assert_eq!(c.level, 3);
        assert_eq!(c.hp, "24");
        assert_eq!(c.stats.str_, 15);
        assert_eq!(c.stats.dex, 10);
        assert_eq!(c.stats.con, 10);
        assert_eq!(c.stats.wis, 8);
        assert_eq!(c.actions[0].charges, 0);
        assert_eq!(c.actions[0].kind, "bonus");
        assert_eq!(c.inventory[0].charges, 0);
    }

    #[test]
    fn level_below_one_becomes_one() {
        let c: Character = serde_json::from_value(json!({ "name": "x", "level": -4 })).unwrap();
        assert_eq!(c.level, 1);
        let c: Character = serde_json::from_value(json!({ "name": "x", "level": "abc" })).unwrap();
        assert_eq!(c.level, 1);
    }

    #[test]
    fn legacy_string_entries_become_names() {
        let c: Character = serde_json::from_value(json!({
            "name": "Old",
            "abilities": ["Darkvision"],
            "inventory": ["Rope (gear) - To Hit: , Damage: "]
        }))
        .unwrap();
        assert_eq!(c.abilities, vec![Entry::new("Darkvision", "")]);
        assert_eq!(c.inventory[0].name, "Rope (gear) - To Hit: , Damage: ");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_value::<Character>(json!({ "name": "x", "speed": 30 }));
        assert!(err.is_err());
        let err = serde_json::from_value::<Character>(json!({ "stats": { "luck": 12 } }));
        assert!(err.is_err());
    }

    #[test]
    fn item_json_uses_form_names() {
        let item = Item {
            name: "Longsword".into(),
            kind: "weapon".into(),
            to_hit: "+5".into(),
            damage: "1d8+3".into(),
            charges: 0,
            attuned: false,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["toHit"], "+5");
        assert_eq!(v["type"], "weapon");
    }

    #[test]
    fn set_field_parses_and_rejects() {
        let mut c = Character::new("Aria");
        c.set_field("strength".parse().unwrap(), "17").unwrap();
        c.set_field(CharacterField::Score(Ability::Dex), "lots").unwrap();
        assert_eq!(c.stats.str_, 17);
        assert_eq!(c.stats.dex, 10);

        assert!(c.set_field(CharacterField::Level, "0").is_err());
        assert!(c.set_field(CharacterField::Level, "five").is_err());
        c.set_field(CharacterField::Level, "5").unwrap();
        assert_eq!(c.level, 5);

        assert_eq!(
            "speed".parse::<CharacterField>(),
            Err(SheetError::UnknownField("speed".into()))
        );
    }

    #[test]
    fn items_need_a_name() {
        let mut c = Character::new("Aria");
        let err = c.add_item(Item::from("   ".to_string())).unwrap_err();
        assert_eq!(err, SheetError::Validation("Item name is required.".into()));
        c.add_item(Item::from(" Rope ".to_string())).unwrap();
        assert_eq!(c.inventory[0].name, "Rope");
    }

    #[test]
    fn attunement_is_capped() {
        let mut c = Character::new("Aria");
        for name in ["a", "b", "c", "d"] {
            c.add_item(Item::from(name.to_string())).unwrap();
        }
        for i in 0..3 {
            c.set_attuned(i, true).unwrap();
        }
        assert_eq!(c.set_attuned(3, true), Err(SheetError::AttunementFull(3)));
        // re-attuning an attuned item is not a new slot
        c.set_attuned(0, true).unwrap();
        c.set_attuned(0, false).unwrap();
        c.set_attuned(3, true).unwrap();
        assert_eq!(c.attuned_count(), 3);
    }

    #[test]
    fn update_item_keeps_attunement() {
        let mut c = Character::new("Aria");
        c.add_item(Item::from("Ring".to_string())).unwrap();
        c.set_attuned(0, true).unwrap();
        let mut edited = Item::from("Ring of Warmth".to_string());
        edited.charges = 2;
        c.update_item(0, edited).unwrap();
        assert!(c.inventory[0].attuned);
        assert_eq!(c.inventory[0].charges, 2);
        assert!(matches!(
            c.update_item(5, Item::from("x".to_string())),
            Err(SheetError::IndexOutOfRange { index: 5, len: 1, .. })
        ));
    }

    #[test]
    fn remove_entry_checks_range() {
        let mut c = Character::new("Aria");
        c.add_feat(Entry::new("Alert", "+5 initiative")).unwrap();
        assert!(c.remove_entry(Section::Feats, 1).is_err());
        c.remove_entry(Section::Feats, 0).unwrap();
        assert!(c.feats.is_empty());
    }
}
