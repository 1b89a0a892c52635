use engine::{roll_d20, AdMode, Dice};

#[test]
fn roll_adds_modifier() {
    let mut dice = Dice::from_seed(777);
    let res = roll_d20(&mut dice, 3, AdMode::Normal);
    assert!((1..=20).contains(&res.roll));
    assert_eq!(res.total, res.roll + 3);
    assert_eq!(
        res.to_string(),
        format!("Rolled: {} + 3 = {}", res.roll, res.total)
    );
}

#[test]
fn same_seed_same_rolls() {
    let mut a = Dice::from_seed(42);
    let mut b = Dice::from_seed(42);
    for _ in 0..20 {
        assert_eq!(a.d20(AdMode::Advantage), b.d20(AdMode::Advantage));
    }
}

#[test]
fn advantage_never_below_normal_pair() {
    // advantage keeps the higher of the same two rolls disadvantage keeps the lower of
    for seed in 0..50 {
        let adv = Dice::from_seed(seed).d20(AdMode::Advantage);
        let dis = Dice::from_seed(seed).d20(AdMode::Disadvantage);
        assert!(adv >= dis);
    }
}

#[test]
fn huge_modifiers_saturate() {
    let mut dice = Dice::from_seed(3);
    assert_eq!(roll_d20(&mut dice, i32::MAX, AdMode::Normal).total, i32::MAX);
    let low = roll_d20(&mut dice, i32::MIN, AdMode::Normal);
    assert_eq!(low.total, i32::MIN + low.roll);
}
