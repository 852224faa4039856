use std::ops::Bound;

use planwright_core::PlanwrightError;

use super::*;

#[derive(Clone, Debug)]
struct Shift {
    employee: usize,
    start: i64,
    end: i64,
}

fn shift(employee: usize, start: i64, end: i64) -> Shift {
    Shift { employee, start, end }
}

#[test]
fn test_validate_accepts_indexing_then_filtering() {
    let joiners = (
        equal(|s: &Shift| s.employee),
        less_than(|a: &Shift| a.start, |b: &Shift| b.start),
        filtering(|a: &Shift, b: &Shift| a.end != b.end),
    );
    assert!(JoinerList::<(Shift,), Shift>::validate(&joiners).is_ok());
}

#[test]
fn test_validate_rejects_indexing_after_filtering() {
    let joiners = (
        filtering(|a: &Shift, b: &Shift| a.end != b.end),
        equal(|s: &Shift| s.employee),
    );
    let err = JoinerList::<(Shift,), Shift>::validate(&joiners).unwrap_err();
    match err {
        PlanwrightError::Config(message) => {
            assert!(message.contains("position 1 (equal)"), "{}", message);
            assert!(message.contains("position 0"), "{}", message);
        }
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn test_equal_keys_share_bucket() {
    let joiners = (equal_bi(|s: &Shift| s.employee, |e: &usize| *e),);
    let left = JoinerList::<(Shift,), usize>::left_key(&joiners, &(shift(3, 0, 8),));
    let right = JoinerList::<(Shift,), usize>::right_key(&joiners, &3);
    let other = JoinerList::<(Shift,), usize>::right_key(&joiners, &4);

    assert_eq!(left.bucket, right.bucket);
    assert_ne!(left.bucket, other.bucket);
    assert_eq!(left.range, None);
}

#[test]
fn test_first_range_joiner_supplies_range_key() {
    let joiners = (
        equal(|s: &Shift| s.employee),
        greater_than(|a: &Shift| a.start, |b: &Shift| b.start),
        less_than(|a: &Shift| a.end, |b: &Shift| b.end),
    );
    let row = (shift(1, 4, 9),);

    let key = JoinerList::<(Shift,), Shift>::left_key(&joiners, &row);
    assert_eq!(key.range, Some(4));
    assert_eq!(
        JoinerList::<(Shift,), Shift>::right_bounds(&joiners, &row),
        (Bound::Unbounded, Bound::Excluded(4))
    );
}

#[test]
fn test_comparison_bounds_are_mirrored() {
    let lte = less_than_or_equal(|a: &Shift| a.start, |b: &Shift| b.start);
    let row = (shift(0, 5, 6),);

    assert_eq!(
        Joiner::<(Shift,), Shift>::right_bounds(&lte, &row),
        Some((Bound::Included(5), Bound::Unbounded))
    );
    assert_eq!(
        Joiner::<(Shift,), Shift>::left_bounds(&lte, &shift(0, 7, 8)),
        Some((Bound::Unbounded, Bound::Included(7)))
    );
    assert!(Joiner::<(Shift,), Shift>::matches(&lte, &row, &shift(0, 5, 9)));
    assert!(!Joiner::<(Shift,), Shift>::matches(&lte, &row, &shift(0, 4, 9)));
}

#[test]
fn test_overlapping_bounds_use_interval_end() {
    let overlap = overlapping(
        |s: &Shift| s.start,
        |s: &Shift| s.end,
        |s: &Shift| s.start,
        |s: &Shift| s.end,
    );
    let row = (shift(0, 10, 20),);

    assert_eq!(Joiner::<(Shift,), Shift>::range_left(&overlap, &row), Some(10));
    assert_eq!(
        Joiner::<(Shift,), Shift>::right_bounds(&overlap, &row),
        Some((Bound::Unbounded, Bound::Excluded(20)))
    );
    assert!(Joiner::<(Shift,), Shift>::matches(&overlap, &row, &shift(1, 15, 25)));
    assert!(!Joiner::<(Shift,), Shift>::matches(&overlap, &row, &shift(1, 0, 10)));
}

#[test]
fn test_bi_left_tuple_key_functions() {
    let joiners = (
        equal_bi(|a: &Shift, _b: &Shift| a.employee, |e: &usize| *e),
        filtering(|a: &Shift, b: &Shift, e: &usize| a.start + b.start > *e as i64),
    );
    let row = (shift(2, 5, 6), shift(3, 7, 8));

    assert!(JoinerList::<(Shift, Shift), usize>::validate(&joiners).is_ok());
    assert!(JoinerList::<(Shift, Shift), usize>::matches(&joiners, &row, &2));
    assert!(!JoinerList::<(Shift, Shift), usize>::matches(&joiners, &row, &3));
}

#[test]
fn test_kind_labels() {
    assert!(JoinerKind::Overlapping.is_indexing());
    assert!(JoinerKind::Overlapping.is_range());
    assert!(!JoinerKind::Equal.is_range());
    assert!(!JoinerKind::Filtering.is_indexing());
    assert_eq!(JoinerKind::GreaterThanOrEqual.to_string(), "greater_than_or_equal");
}

#[test]
fn test_u128_range_keys_stay_distinct_and_ordered() {
    let values = [0u128, 1, i128::MAX as u128, i128::MAX as u128 + 1, u128::MAX - 1, u128::MAX];
    let keys: Vec<i128> = values.iter().map(RangeValue::range_key).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "{:?}", keys);
    assert_eq!(0u128.range_key(), i128::MIN);
    assert_eq!(u64::MAX.range_key(), u64::MAX as i128);
    assert_eq!(i128::MIN.range_key(), i128::MIN);
}
