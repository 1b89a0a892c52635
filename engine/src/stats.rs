//! Derived-stat engine: ability scores, level and proficiency selections in,
//! every displayed modifier and bonus out.

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::character::Character;
use crate::coerce::{self, default_score};
use crate::{ability_modifier, proficiency_bonus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "strength")]
    Str,
    #[serde(rename = "dexterity")]
    Dex,
    #[serde(rename = "constitution")]
    Con,
    #[serde(rename = "intelligence")]
    Int,
    #[serde(rename = "wisdom")]
    Wis,
    #[serde(rename = "charisma")]
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// Storage key, e.g. `strength`.
    pub fn key(self) -> &'static str {
        match self {
            Ability::Str => "strength",
            Ability::Dex => "dexterity",
            Ability::Con => "constitution",
            Ability::Int => "intelligence",
            Ability::Wis => "wisdom",
            Ability::Cha => "charisma",
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl FromStr for Ability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ability::ALL
            .into_iter()
            .find(|a| a.key().eq_ignore_ascii_case(s) || a.abbrev().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown ability '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbilityScores {
    #[serde(rename = "strength", default = "default_score", deserialize_with = "coerce::score")]
    pub str_: i32,
    #[serde(default = "default_score", deserialize_with = "coerce::score", rename = "dexterity")]
    pub dex: i32,
    #[serde(default = "default_score", deserialize_with = "coerce::score", rename = "constitution")]
    pub con: i32,
    #[serde(default = "default_score", deserialize_with = "coerce::score", rename = "intelligence")]
    pub int_: i32,
    #[serde(default = "default_score", deserialize_with = "coerce::score", rename = "wisdom")]
    pub wis: i32,
    #[serde(default = "default_score", deserialize_with = "coerce::score", rename = "charisma")]
    pub cha: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            str_: coerce::DEFAULT_SCORE,
            dex: coerce::DEFAULT_SCORE,
            con: coerce::DEFAULT_SCORE,
            int_: coerce::DEFAULT_SCORE,
            wis: coerce::DEFAULT_SCORE,
            cha: coerce::DEFAULT_SCORE,
        }
    }
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str_,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int_,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        let slot = match ability {
            Ability::Str => &mut self.str_,
            Ability::Dex => &mut self.dex,
            Ability::Con => &mut self.con,
            Ability::Int => &mut self.int_,
            Ability::Wis => &mut self.wis,
            Ability::Cha => &mut self.cha,
        };
        *slot = score;
    }

    pub fn mod_of(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    /// Governing ability.
    pub fn ability(self) -> Ability {
        use Skill::*;
        match self {
            Athletics => Ability::Str,
            Acrobatics | SleightOfHand | Stealth => Ability::Dex,
            Arcana | History | Investigation | Nature | Religion => Ability::Int,
            AnimalHandling | Insight | Medicine | Perception | Survival => Ability::Wis,
            Deception | Intimidation | Performance | Persuasion => Ability::Cha,
        }
    }

    pub fn label(self) -> &'static str {
        use Skill::*;
        match self {
            Acrobatics => "Acrobatics",
            AnimalHandling => "Animal Handling",
            Arcana => "Arcana",
            Athletics => "Athletics",
            Deception => "Deception",
            History => "History",
            Insight => "Insight",
            Intimidation => "Intimidation",
            Investigation => "Investigation",
            Medicine => "Medicine",
            Nature => "Nature",
            Perception => "Perception",
            Performance => "Performance",
            Persuasion => "Persuasion",
            Religion => "Religion",
            SleightOfHand => "Sleight of Hand",
            Stealth => "Stealth",
            Survival => "Survival",
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        Skill::ALL
            .into_iter()
            .find(|sk| {
                let label: String = sk.label().chars().filter(|c| *c != ' ').collect();
                label.eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| format!("unknown skill '{}'", s.trim()))
    }
}

/// How much of the proficiency bonus applies to a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyTier {
    #[default]
    None,
    Half,
    Proficient,
    Expertise,
}

impl ProficiencyTier {
    /// Unrecognized selections count as no proficiency.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "half" => ProficiencyTier::Half,
            "proficient" => ProficiencyTier::Proficient,
            "expertise" => ProficiencyTier::Expertise,
            _ => ProficiencyTier::None,
        }
    }

    pub fn bonus(self, proficiency_bonus: i32) -> i32 {
        match self {
            ProficiencyTier::None => 0,
            ProficiencyTier::Half => proficiency_bonus.div_euclid(2),
            ProficiencyTier::Proficient => proficiency_bonus,
            ProficiencyTier::Expertise => proficiency_bonus.saturating_mul(2),
        }
    }
}

impl<'de> Deserialize<'de> for ProficiencyTier {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(v.as_str()
            .map(ProficiencyTier::parse_lenient)
            .unwrap_or_default())
    }
}

/// Saving-throw and skill selections for one character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Proficiencies {
    pub saves: IndexSet<Ability>,
    pub skills: IndexMap<Skill, ProficiencyTier>,
}

impl Proficiencies {
    pub fn save(&self, ability: Ability) -> bool {
        self.saves.contains(&ability)
    }

    pub fn set_save(&mut self, ability: Ability, proficient: bool) {
        if proficient {
            self.saves.insert(ability);
        } else {
            self.saves.shift_remove(&ability);
        }
    }

    pub fn skill(&self, skill: Skill) -> ProficiencyTier {
        self.skills.get(&skill).copied().unwrap_or_default()
    }

    pub fn set_skill(&mut self, skill: Skill, tier: ProficiencyTier) {
        if tier == ProficiencyTier::None {
            self.skills.shift_remove(&skill);
        } else {
            self.skills.insert(skill, tier);
        }
    }
}

pub fn saving_throw_bonus(score: i32, proficiency_bonus: i32, proficient: bool) -> i32 {
    ability_modifier(score).saturating_add(if proficient { proficiency_bonus } else { 0 })
}

pub fn skill_bonus(score: i32, proficiency_bonus: i32, tier: ProficiencyTier) -> i32 {
    ability_modifier(score).saturating_add(tier.bonus(proficiency_bonus))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbilityLine {
    pub ability: Ability,
    pub score: i32,
    pub modifier: i32,
    pub save: i32,
    pub save_proficient: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillLine {
    pub skill: Skill,
    pub ability: Ability,
    pub tier: ProficiencyTier,
    pub bonus: i32,
}

/// Everything the sheet displays that is computed rather than typed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedStats {
    pub level: i32,
    pub proficiency_bonus: i32,
    /// In [`Ability::ALL`] order.
    pub abilities: Vec<AbilityLine>,
    /// In [`Skill::ALL`] order.
    pub skills: Vec<SkillLine>,
}

impl DerivedStats {
    pub fn compute(scores: &AbilityScores, level: i32, profs: &Proficiencies) -> Self {
        let pb = proficiency_bonus(level);
        let abilities = Ability::ALL
            .into_iter()
            .map(|ability| {
                let score = scores.get(ability);
                let save_proficient = profs.save(ability);
                AbilityLine {
                    ability,
                    score,
                    modifier: ability_modifier(score),
                    save: saving_throw_bonus(score, pb, save_proficient),
                    save_proficient,
                }
            })
            .collect();
        let skills = Skill::ALL
            .into_iter()
            .map(|skill| {
                let ability = skill.ability();
                let tier = profs.skill(skill);
                SkillLine {
                    skill,
                    ability,
                    tier,
                    bonus: skill_bonus(scores.get(ability), pb, tier),
                }
            })
            .collect();
        Self {
            level,
            proficiency_bonus: pb,
            abilities,
            skills,
        }
    }

    pub fn ability(&self, ability: Ability) -> &AbilityLine {
        &self.abilities[ability as usize]
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.ability(ability).modifier
    }

    pub fn save(&self, ability: Ability) -> i32 {
        self.ability(ability).save
    }

    pub fn skill(&self, skill: Skill) -> i32 {
        self.skills[skill as usize].bonus
    }
}

/// Full recomputation from the character record.
pub fn recompute_derived(character: &Character) -> DerivedStats {
    DerivedStats::compute(
        &character.stats,
        character.level,
        &character.proficiencies,
    )
}
