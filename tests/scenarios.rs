use freqmine::{mine, ItemSet, MineConfig, Mode};

mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

// Sorts items within each set and the sets themselves, so results can
// be compared independent of emission order.
fn norm(mut results: Vec<ItemSet>) -> Vec<(Vec<u32>, u32)> {
    for r in &mut results {
        r.items.sort_unstable();
    }
    let mut out: Vec<(Vec<u32>, u32)> = results
        .into_iter()
        .map(|r| (r.items, r.support))
        .collect();
    out.sort();
    out
}

fn cfg(min_support: u32, mode: Mode) -> MineConfig {
    MineConfig {
        min_support,
        mode,
        ..Default::default()
    }
}

const DB1: &[&[u32]] =
    &[&[1, 2, 3], &[1, 2], &[2, 3], &[1, 2, 3]];

fn run(db: &[&[u32]], cfg: &MineConfig) -> Vec<(Vec<u32>, u32)> {
    common::init();
    norm(
        mine(db.iter().map(|t| t.iter().copied()), cfg)
            .expect("mining failed"),
    )
}

#[test]
fn closed_itemsets_of_a_small_db() {
    // {1}: 3 and {3}: 3 are absorbed by {1,2}: 3 and {2,3}: 3, and
    // {1,3}: 2 by {1,2,3}: 2; everything else is closed.
    assert_eq!(
        run(DB1, &cfg(2, Mode::Closed)),
        vec![
            (vec![1, 2], 3),
            (vec![1, 2, 3], 2),
            (vec![2], 4),
            (vec![2, 3], 3),
        ]
    );
}

#[test]
fn all_itemsets_of_a_small_db() {
    assert_eq!(
        run(DB1, &cfg(2, Mode::All)),
        vec![
            (vec![1], 3),
            (vec![1, 2], 3),
            (vec![1, 2, 3], 2),
            (vec![1, 3], 2),
            (vec![2], 4),
            (vec![2, 3], 3),
            (vec![3], 3),
        ]
    );
}

#[test]
fn compressed_itemsets_of_a_small_db() {
    // One record per pattern frame, perfect extensions appended: the
    // subset expansions {3} and {1,3} of the two frames with perfect
    // extensions are not materialized.
    assert_eq!(
        run(DB1, &cfg(2, Mode::AllWithPerfectExt)),
        vec![
            (vec![1], 3),
            (vec![1, 2], 3),
            (vec![1, 2, 3], 2),
            (vec![2], 4),
            (vec![2, 3], 3),
        ]
    );
}

#[test]
fn perfectly_correlated_items_collapse() {
    let db: &[&[u32]] = &[&[1, 2], &[1, 2], &[1, 2]];
    assert_eq!(
        run(db, &cfg(2, Mode::Closed)),
        vec![(vec![1, 2], 3)]
    );
}

#[test]
fn nothing_frequent_yields_nothing() {
    let db: &[&[u32]] = &[&[1], &[2], &[3]];
    assert_eq!(run(db, &cfg(2, Mode::Closed)), vec![]);
}

#[test]
fn single_transaction_yields_itself() {
    let db: &[&[u32]] = &[&[1, 2, 3, 4, 5]];
    assert_eq!(
        run(db, &cfg(1, Mode::Closed)),
        vec![(vec![1, 2, 3, 4, 5], 1)]
    );
}

#[test]
fn disjoint_pairs_stay_disjoint() {
    let db: &[&[u32]] =
        &[&[1, 2], &[2, 3], &[3, 4], &[1, 2], &[2, 3]];
    assert_eq!(
        run(db, &cfg(2, Mode::Closed)),
        vec![
            (vec![1, 2], 2),
            (vec![2], 4),
            (vec![2, 3], 2),
            (vec![3], 3),
        ]
    );
}

#[test]
fn threshold_above_everything_is_empty() {
    assert_eq!(run(DB1, &cfg(100, Mode::Closed)), vec![]);
    assert_eq!(run(DB1, &cfg(100, Mode::All)), vec![]);
}

#[test]
fn max_pattern_len_one_yields_singletons() {
    // Every emitted set is a singleton. {3} does not appear: its
    // pattern frame carries the perfect extension 2, and the combined
    // length is what the bound applies to.
    let mut c = cfg(2, Mode::Closed);
    c.max_pattern_len = 1;
    assert_eq!(run(DB1, &c), vec![(vec![1], 3), (vec![2], 4)]);

    let mut c = cfg(2, Mode::All);
    c.max_pattern_len = 1;
    assert_eq!(run(DB1, &c), vec![(vec![1], 3), (vec![2], 4)]);
}

#[test]
fn min_pattern_len_suppresses_short_sets() {
    let mut c = cfg(2, Mode::Closed);
    c.min_pattern_len = 2;
    // {2}: 4 falls under the length floor; the longer closed sets
    // are unaffected.
    assert_eq!(
        run(DB1, &c),
        vec![
            (vec![1, 2], 3),
            (vec![1, 2, 3], 2),
            (vec![2, 3], 3),
        ]
    );
}

#[test]
fn empty_db_and_empty_transactions() {
    let db: &[&[u32]] = &[];
    assert_eq!(run(db, &cfg(1, Mode::Closed)), vec![]);

    let db: &[&[u32]] = &[&[], &[7], &[]];
    assert_eq!(
        run(db, &cfg(1, Mode::Closed)),
        vec![(vec![7], 1)]
    );
}

#[test]
fn duplicate_items_in_a_transaction_count_once() {
    let db: &[&[u32]] = &[&[1, 1, 2, 2, 2], &[2, 1], &[2]];
    assert_eq!(
        run(db, &cfg(2, Mode::Closed)),
        vec![(vec![1, 2], 2), (vec![2], 3)]
    );
}

#[test]
fn min_support_zero_is_clamped_to_one() {
    let db: &[&[u32]] = &[&[4, 5]];
    assert_eq!(
        run(db, &cfg(0, Mode::Closed)),
        vec![(vec![4, 5], 1)]
    );
}
