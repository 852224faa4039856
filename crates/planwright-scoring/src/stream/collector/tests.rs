use super::*;

#[derive(Clone, Debug)]
struct Shift {
    employee: u32,
    hours: i64,
    day: i64,
}

fn shift(employee: u32, hours: i64, day: i64) -> (Shift,) {
    (Shift { employee, hours, day },)
}

fn fold<C: Collector<(Shift,)>>(collector: &C, rows: &[(Shift,)]) -> C::Accumulator {
    let mut acc = collector.create_accumulator();
    for row in rows {
        acc.accumulate(&collector.extract(row));
    }
    acc
}

#[test]
fn test_sum_follows_retraction() {
    let collector = sum(|s: &Shift| s.hours);
    let rows = [shift(1, 8, 0), shift(1, 4, 1), shift(2, 6, 2)];
    let mut acc = fold(&collector, &rows);
    assert_eq!(acc.finish(), 18);

    acc.retract(&collector.extract(&rows[1]));
    assert_eq!(acc.finish(), 14);
    acc.reset();
    assert_eq!(acc.finish(), 0);
}

#[test]
fn test_count_distinct_keeps_shared_values() {
    let collector = count_distinct(|s: &Shift| s.employee);
    let rows = [shift(1, 8, 0), shift(1, 4, 1), shift(2, 6, 2)];
    let mut acc = fold(&collector, &rows);
    assert_eq!(acc.finish(), 2);

    acc.retract(&1);
    assert_eq!(acc.finish(), 2);
    acc.retract(&1);
    assert_eq!(acc.finish(), 1);
}

#[test]
fn test_min_max_fall_back_after_retracting_extreme() {
    let lowest = min(|s: &Shift| s.hours);
    let highest = max(|s: &Shift| s.hours);
    let rows = [shift(1, 8, 0), shift(1, 4, 1), shift(2, 6, 2)];

    let mut low = fold(&lowest, &rows);
    let mut high = fold(&highest, &rows);
    assert_eq!(low.finish(), Some(4));
    assert_eq!(high.finish(), Some(8));

    low.retract(&4);
    high.retract(&8);
    assert_eq!(low.finish(), Some(6));
    assert_eq!(high.finish(), Some(6));

    low.retract(&6);
    low.retract(&8);
    assert_eq!(low.finish(), None);
}

#[test]
fn test_to_list_keeps_duplicates() {
    let collector = to_list(|s: &Shift| s.employee);
    let rows = [shift(1, 8, 0), shift(1, 4, 1), shift(2, 6, 2)];
    let mut acc = fold(&collector, &rows);
    assert_eq!(acc.finish(), vec![1, 1, 2]);

    acc.retract(&1);
    assert_eq!(acc.finish(), vec![1, 2]);
}

#[test]
fn test_count_ignores_values() {
    let collector = count();
    let rows = [shift(1, 8, 0), shift(2, 6, 2)];
    let acc = fold(&collector, &rows);
    assert_eq!(acc.finish(), 2);
    assert_eq!(acc.finish(), 2);
}

#[test]
fn test_consecutive_sequences_split_on_gaps() {
    let collector = consecutive_sequences(|s: &Shift| s.day);
    let rows = [
        shift(1, 8, 1),
        shift(1, 8, 2),
        shift(1, 8, 2),
        shift(1, 8, 3),
        shift(1, 8, 6),
    ];
    let mut acc = fold(&collector, &rows);

    let chain = acc.finish();
    assert_eq!(
        chain.sequences(),
        &[
            Sequence { first: 1, last: 3, count: 4 },
            Sequence { first: 6, last: 6, count: 1 },
        ]
    );
    assert_eq!(chain.breaks(), vec![Break { previous_last: 3, next_first: 6 }]);
    assert_eq!(chain.breaks()[0].length(), 3);

    // removing the middle day splits the first run only once both items go
    acc.retract(&2);
    assert_eq!(acc.finish().sequences().len(), 2);
    acc.retract(&2);
    let chain = acc.finish();
    assert_eq!(chain.sequences().len(), 3);
    assert_eq!(chain.first_sequence().map(Sequence::length), Some(1));
}
