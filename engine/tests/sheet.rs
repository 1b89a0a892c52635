use engine::content::builtin_character;
use engine::sheet::render_sheet;
use engine::stats::recompute_derived;
use engine::Character;

#[test]
fn fighter_sheet() {
    let borin = builtin_character("borin").unwrap();
    let sheet = render_sheet(&borin, &recompute_derived(&borin));
    insta::assert_snapshot!(sheet, @r#"
=== Borin ===
Fighter | Dwarf | Level 1
Proficiency Bonus: +2
HP: 13  AC: 18  Initiative: +0

Ability Scores
  STR 16 (+3)  save +5 *
  DEX 10 (+0)  save +0
  CON 16 (+3)  save +5 *
  INT  9 (-1)  save -1
  WIS 12 (+1)  save +1
  CHA  8 (-1)  save -1

Skills
  Acrobatics (DEX) +0
  Animal Handling (WIS) +1
  Arcana (INT) -1
  Athletics (STR) +5 [proficient]
  Deception (CHA) -1
  History (INT) -1
  Insight (WIS) +1
  Intimidation (CHA) -1
  Investigation (INT) -1
  Medicine (WIS) +1
  Nature (INT) -1
  Perception (WIS) +3 [proficient]
  Performance (CHA) -1
  Persuasion (CHA) -1
  Religion (INT) -1
  Sleight of Hand (DEX) +0
  Stealth (DEX) +0
  Survival (WIS) +1

Abilities
  - Second Wind: Regain 1d10 + level hit points as a bonus action.

Feats
  (none)

Actions
  - Second Wind [bonus]: Bonus action heal.
    charges: [ ]

Inventory
  - Warhammer (weapon) - To Hit: +5, Damage: 1d8+3

Notes
  No notes available.
"#);
}

#[test]
fn blank_sheet_uses_placeholders() {
    let c = Character::default();
    let sheet = render_sheet(&c, &recompute_derived(&c));
    assert!(sheet.starts_with("=== Character Name ===\nLevel 1\n"));
    assert!(sheet.contains("Initiative: +0"));
    assert!(sheet.contains("No notes available."));
}

#[test]
fn charges_and_attunement_render() {
    let aria = builtin_character("aria").unwrap();
    let sheet = render_sheet(&aria, &recompute_derived(&aria));
    assert!(sheet.contains(
        "  - Wand of Magic Missiles (wand) - To Hit: , Damage: 3d4+3 (attuned)\n    charges: [ ] [ ] [ ] [ ] [ ] [ ] [ ]\n"
    ));
    assert!(sheet.contains("  Stealth (DEX) +10 [expertise]"));
    assert!(sheet.contains("  Insight (WIS) +1 [half]"));
    assert!(sheet.contains("  Owes the Guild of Lamps a favour."));
}
