//! Read-only character sheet rendered as plain text.

use std::fmt;

use crate::character::Character;
use crate::format_signed;
use crate::stats::{DerivedStats, ProficiencyTier};

pub struct SheetView<'a> {
    pub character: &'a Character,
    pub derived: &'a DerivedStats,
}

pub fn render_sheet(character: &Character, derived: &DerivedStats) -> String {
    SheetView { character, derived }.to_string()
}

fn tier_marker(tier: ProficiencyTier) -> &'static str {
    match tier {
        ProficiencyTier::None => "",
        ProficiencyTier::Half => " [half]",
        ProficiencyTier::Proficient => " [proficient]",
        ProficiencyTier::Expertise => " [expertise]",
    }
}

fn charge_boxes(f: &mut fmt::Formatter<'_>, charges: u32) -> fmt::Result {
    if charges == 0 {
        return Ok(());
    }
    let boxes = vec!["[ ]"; charges as usize].join(" ");
    writeln!(f, "    charges: {}", boxes)
}

fn with_description(name: &str, description: &str) -> String {
    if description.trim().is_empty() {
        name.to_string()
    } else {
        format!("{}: {}", name, description)
    }
}

impl fmt::Display for SheetView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.character;
        let d = self.derived;

        let name = if c.name.is_empty() {
            "Character Name"
        } else {
            c.name.as_str()
        };
        writeln!(f, "=== {} ===", name)?;
        let mut header: Vec<String> = [c.class.as_str(), c.race.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        header.push(format!("Level {}", d.level));
        writeln!(f, "{}", header.join(" | "))?;
        writeln!(f, "Proficiency Bonus: {}", format_signed(d.proficiency_bonus))?;
        let initiative = if c.initiative.trim().is_empty() {
            "+0"
        } else {
            c.initiative.as_str()
        };
        writeln!(f, "HP: {}  AC: {}  Initiative: {}", c.hp, c.ac, initiative)?;

        writeln!(f)?;
        writeln!(f, "Ability Scores")?;
        for line in &d.abilities {
            writeln!(
                f,
                "  {} {:>2} ({})  save {}{}",
                line.ability.abbrev(),
                line.score,
                format_signed(line.modifier),
                format_signed(line.save),
                if line.save_proficient { " *" } else { "" }
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Skills")?;
        for line in &d.skills {
            writeln!(
                f,
                "  {} ({}) {}{}",
                line.skill.label(),
                line.ability.abbrev(),
                format_signed(line.bonus),
                tier_marker(line.tier)
            )?;
        }

        for (title, entries) in [("Abilities", &c.abilities), ("Feats", &c.feats)] {
            writeln!(f)?;
            writeln!(f, "{}", title)?;
            if entries.is_empty() {
                writeln!(f, "  (none)")?;
            }
            for e in entries {
                writeln!(f, "  - {}", with_description(&e.name, &e.description))?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Actions")?;
        if c.actions.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for a in &c.actions {
            let label = if a.kind.is_empty() {
                a.name.clone()
            } else {
                format!("{} [{}]", a.name, a.kind)
            };
            writeln!(f, "  - {}", with_description(&label, &a.description))?;
            charge_boxes(f, a.charges)?;
        }

        writeln!(f)?;
        writeln!(f, "Inventory")?;
        if c.inventory.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for item in &c.inventory {
            writeln!(
                f,
                "  - {} ({}) - To Hit: {}, Damage: {}{}",
                item.name,
                item.kind,
                item.to_hit,
                item.damage,
                if item.attuned { " (attuned)" } else { "" }
            )?;
            charge_boxes(f, item.charges)?;
        }

        writeln!(f)?;
        writeln!(f, "Notes")?;
        let notes = c.notes.trim();
        if notes.is_empty() {
            writeln!(f, "  No notes available.")
        } else {
            writeln!(f, "  {}", notes)
        }
    }
}
