use engine::stats::{saving_throw_bonus, skill_bonus};
use engine::{ability_modifier, format_signed, proficiency_bonus, ProficiencyTier};
use proptest::prelude::*;

#[test]
fn ability_modifier_rounds_down() {
    assert_eq!(ability_modifier(7), -2);
    assert_eq!(ability_modifier(8), -1);
    assert_eq!(ability_modifier(9), -1);
    assert_eq!(ability_modifier(10), 0);
    assert_eq!(ability_modifier(11), 0);
    assert_eq!(ability_modifier(15), 2);
    assert_eq!(ability_modifier(1), -5);
    assert_eq!(ability_modifier(30), 10);
}

#[test]
fn ability_modifier_covers_every_score() {
    assert_eq!(ability_modifier(i32::MIN), -1_073_741_829);
    assert_eq!(ability_modifier(i32::MIN + 9), -1_073_741_825);
    assert_eq!(ability_modifier(i32::MAX), 1_073_741_818);
}

#[test]
fn extreme_bonuses_saturate() {
    let pb = proficiency_bonus(i32::MAX);
    assert_eq!(pb, 536_870_913);
    assert!(skill_bonus(i32::MAX, pb, ProficiencyTier::Expertise) > 0);
    assert!(saving_throw_bonus(i32::MIN, pb, true) < 0);
    assert_eq!(skill_bonus(10, i32::MAX, ProficiencyTier::Expertise), i32::MAX);
}

#[test]
fn proficiency_bonus_by_level() {
    assert_eq!(proficiency_bonus(1), 2);
    assert_eq!(proficiency_bonus(4), 2);
    assert_eq!(proficiency_bonus(5), 3);
    assert_eq!(proficiency_bonus(9), 4);
    assert_eq!(proficiency_bonus(17), 6);
    assert_eq!(proficiency_bonus(20), 6);
}

#[test]
fn levels_below_one_use_level_one() {
    assert_eq!(proficiency_bonus(0), 2);
    assert_eq!(proficiency_bonus(-7), 2);
}

#[test]
fn signed_formatting() {
    assert_eq!(format_signed(0), "+0");
    assert_eq!(format_signed(5), "+5");
    assert_eq!(format_signed(3), "+3");
    assert_eq!(format_signed(-2), "-2");
    assert_eq!(format_signed(-3), "-3");
}

#[test]
fn tiers_scale_the_bonus() {
    // DEX 16 (+3), PB +3
    assert_eq!(skill_bonus(16, 3, ProficiencyTier::None), 3);
    assert_eq!(skill_bonus(16, 3, ProficiencyTier::Half), 4);
    assert_eq!(skill_bonus(16, 3, ProficiencyTier::Proficient), 6);
    assert_eq!(skill_bonus(16, 3, ProficiencyTier::Expertise), 9);
}

#[test]
fn unknown_tier_is_none() {
    assert_eq!(ProficiencyTier::parse_lenient("Expertise"), ProficiencyTier::Expertise);
    assert_eq!(ProficiencyTier::parse_lenient(" half "), ProficiencyTier::Half);
    assert_eq!(ProficiencyTier::parse_lenient("double"), ProficiencyTier::None);
    assert_eq!(ProficiencyTier::parse_lenient(""), ProficiencyTier::None);
}

#[test]
fn saving_throws_add_bonus_only_when_proficient() {
    assert_eq!(saving_throw_bonus(14, 2, true), 4);
    assert_eq!(saving_throw_bonus(14, 2, false), 2);
    assert_eq!(saving_throw_bonus(7, 3, true), 1);
}

proptest! {
    #[test]
    fn modifier_is_floor_division(score in any::<i32>()) {
        let expected = ((score as f64 - 10.0) / 2.0).floor() as i32;
        prop_assert_eq!(ability_modifier(score), expected);
    }

    #[test]
    fn proficiency_matches_formula(level in 1i32..=1000) {
        prop_assert_eq!(proficiency_bonus(level), (level - 1) / 4 + 2);
    }

    #[test]
    fn skill_bonus_is_pure(score in 1i32..=30, pb in 2i32..=6, tier in 0usize..4) {
        let tier = [
            ProficiencyTier::None,
            ProficiencyTier::Half,
            ProficiencyTier::Proficient,
            ProficiencyTier::Expertise,
        ][tier];
        let first = skill_bonus(score, pb, tier);
        prop_assert_eq!(first, skill_bonus(score, pb, tier));
        prop_assert!(first >= ability_modifier(score));
    }

    #[test]
    fn signed_text_parses_back(n in -100i32..100) {
        let text = format_signed(n);
        prop_assert!(text.starts_with('+') || text.starts_with('-'));
        prop_assert_eq!(text.parse::<i32>().unwrap(), n);
    }
}
