use super::*;

#[test]
fn test_simple_score_arithmetic() {
    let s1 = SimpleScore::of(10);
    let s2 = SimpleScore::of(3);

    assert_eq!(s1 + s2, SimpleScore::of(13));
    assert_eq!(s1 - s2, SimpleScore::of(7));
    assert_eq!(-s1, SimpleScore::of(-10));
    assert_eq!(s2.checked_multiply(-4), Some(SimpleScore::of(-12)));
    assert_eq!(SimpleScore::of(i64::MAX) + s2, SimpleScore::of(i64::MAX));
}

#[test]
fn test_hard_soft_ordering() {
    let infeasible = HardSoftScore::of(-1, 0);
    let feasible = HardSoftScore::of(0, -1000);
    assert!(feasible > infeasible);
    assert!(feasible.is_feasible());
    assert!(!infeasible.is_feasible());

    assert!(HardSoftScore::of(0, -50) > HardSoftScore::of(0, -100));
    assert!(HardSoftScore::of(-1, -1000) > HardSoftScore::of(-2, 0));
}

#[test]
fn test_level_numbers() {
    let score = HardMediumSoftScore::of(-1, 2, -3);
    assert_eq!(score.to_level_numbers(), vec![-1, 2, -3]);
    assert_eq!(HardMediumSoftScore::from_level_numbers(&[-1, 2, -3]), score);
    assert_eq!(HardMediumSoftScore::levels_count(), 3);
    assert_eq!(HardMediumSoftScore::level_label(1), ScoreLevel::Medium);
    assert_eq!(SimpleScore::levels_count(), 1);
}

#[test]
fn test_checked_multiply_and_abs() {
    let weight = HardSoftScore::of(2, -1);
    assert_eq!(weight.checked_multiply(3), Some(HardSoftScore::of(6, -3)));
    assert_eq!(weight.checked_multiply(i64::MAX), None);
    assert_eq!(
        weight.checked_multiply_decimal(rust_decimal::Decimal::new(15, 1)),
        Some(HardSoftScore::of(3, -2))
    );
    assert_eq!(weight.checked_add(&HardSoftScore::of(i64::MAX, 0)), None);
    assert_eq!(HardSoftScore::of(-2, 5).abs(), HardSoftScore::of(2, 5));
    assert!(HardSoftScore::ONE_HARD.has_hard_component());
    assert!(!HardSoftScore::ONE_SOFT.has_hard_component());
}

#[test]
fn test_parse_round_trip() {
    assert_eq!(SimpleScore::parse("-42").unwrap(), SimpleScore::of(-42));
    assert_eq!(
        HardSoftScore::parse("0hard/-5soft").unwrap(),
        HardSoftScore::of(0, -5)
    );
    assert_eq!(
        HardMediumSoftScore::parse(" -1hard/0medium/7soft ").unwrap(),
        HardMediumSoftScore::of(-1, 0, 7)
    );
    assert_eq!(HardSoftScore::of(-1, 3).to_string(), "-1hard/3soft");
}

#[test]
fn test_parse_errors() {
    assert!(HardSoftScore::parse("0hard").is_err());
    assert!(HardSoftScore::parse("0soft/0hard").is_err());
    assert!(SimpleScore::parse("abc").is_err());
}

#[test]
fn test_debug_format() {
    assert_eq!(format!("{:?}", HardSoftScore::of(1, -2)), "HardSoftScore(1, -2)");
}
