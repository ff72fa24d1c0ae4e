use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info};

use crate::arena::NodeArena;
use crate::config::MineConfig;
use crate::fp_tree::FpTree;
use crate::types::errors::MineError;
use crate::types::{Item, ItemIdx, Support, ITEM_NONE};

//------------ Loading -------------------------------------------------------

// Pulls the caller's transactions into owned storage. A transaction
// is a set: duplicate items count once. Empty transactions are kept
// here; the reduction below drops them together with the short ones.
pub(crate) fn load<I, T>(db: I) -> Result<Vec<Vec<Item>>, MineError>
where
    I: IntoIterator<Item = T>,
    T: IntoIterator<Item = Item>,
{
    let mut tracts = Vec::new();
    for trans in db {
        let mut t: Vec<Item> = trans.into_iter().collect();
        if t.iter().any(|&item| item == ITEM_NONE) {
            return Err(MineError::BadInput);
        }
        t.sort_unstable();
        t.dedup();
        tracts.push(t);
    }
    Ok(tracts)
}

//------------ RootTree ------------------------------------------------------

// Everything the mining phase needs from the first pass: the root
// tree, the arena holding its nodes, and the rank-to-item table.
// Read-only while workers run.
pub(crate) struct RootTree {
    pub(crate) tree: FpTree,
    pub(crate) arena: NodeArena,
    pub(crate) idx_to_item: Vec<Item>,
}

// First pass over the database: reduce to frequent items, rank them,
// rewrite and canonically sort the transactions, build the root tree.
// Returns None when no item survives the support threshold.
pub(crate) fn build_root(
    mut tracts: Vec<Vec<Item>>,
    cfg: &MineConfig,
) -> Result<Option<RootTree>, MineError> {
    let min_support = cfg.support_floor();
    let min_len = cfg.min_pattern_len.max(1) as usize;

    info!("transactions: {}", tracts.len());

    let started = Instant::now();

    // Reduce to a fixpoint: dropping an infrequent item can push a
    // transaction under the length floor, and dropping transactions
    // can make further items infrequent.
    let mut freq: HashMap<Item, Support> = HashMap::new();
    loop {
        tracts.retain(|t| t.len() >= min_len);

        freq.clear();
        for t in &tracts {
            for &item in t {
                *freq.entry(item).or_insert(0) += 1;
            }
        }

        let mut reduced = false;
        for t in &mut tracts {
            let before = t.len();
            t.retain(|item| freq[item] >= min_support);
            reduced |= t.len() != before;
        }
        if !reduced {
            break;
        }
    }
    freq.retain(|_, supp| *supp >= min_support);

    debug!(
        "reduced to {} items over {} transactions in {:?}",
        freq.len(),
        tracts.len(),
        started.elapsed()
    );

    if freq.is_empty() {
        return Ok(None);
    }

    // Rank by descending support; equal supports by descending item
    // value. The rank is the ItemIdx used everywhere from here on.
    let mut ranked: Vec<(Item, Support)> = freq.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    let item_to_idx: HashMap<Item, ItemIdx> = ranked
        .iter()
        .enumerate()
        .map(|(idx, &(item, _))| (item, idx as ItemIdx))
        .collect();
    let idx_to_item: Vec<Item> =
        ranked.iter().map(|&(item, _)| item).collect();

    // Rewrite each transaction as ascending ranks (most frequent
    // first) and sort the database lexicographically, so shared
    // prefixes are consecutive and the insertion shortcut holds.
    let sorted = Instant::now();
    let mut db: Vec<Vec<ItemIdx>> = tracts
        .iter()
        .map(|t| {
            let mut ids: Vec<ItemIdx> =
                t.iter().map(|item| item_to_idx[item]).collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    db.sort_unstable();
    debug!("sorting done in {:?}", sorted.elapsed());

    let built = Instant::now();
    let supports: Vec<Support> =
        ranked.iter().map(|&(_, supp)| supp).collect();
    let mut tree = FpTree::with_ranked_supports(&supports);
    let mut arena = NodeArena::new();
    for t in &db {
        tree.insert(&mut arena, t, 1)?;
    }
    debug!(
        "root tree: {} headers, {} nodes, built in {:?}",
        tree.cnt(),
        arena.len(),
        built.elapsed()
    );
    info!("frequent items: {}", tree.cnt());

    Ok(Some(RootTree {
        tree,
        arena,
        idx_to_item,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(min_support: Support) -> MineConfig {
        MineConfig {
            min_support,
            ..Default::default()
        }
    }

    #[test]
    fn load_dedups_within_transaction() {
        let tracts =
            load(vec![vec![3u32, 1, 3, 2, 1], vec![]]).unwrap();
        assert_eq!(tracts[0], vec![1, 2, 3]);
        assert!(tracts[1].is_empty());
    }

    #[test]
    fn load_rejects_reserved_item() {
        assert_eq!(
            load(vec![vec![1u32, ITEM_NONE]]),
            Err(MineError::BadInput)
        );
    }

    #[test]
    fn ranking_orders_by_support_then_value() {
        // supports: 7 -> 3, 5 -> 3, 2 -> 2; ties broken by larger
        // item value first
        let tracts = load(vec![
            vec![5u32, 7],
            vec![5, 7, 2],
            vec![5, 7, 2],
        ])
        .unwrap();
        let root = build_root(tracts, &cfg(2)).unwrap().unwrap();
        assert_eq!(root.idx_to_item, vec![7, 5, 2]);
        assert_eq!(root.tree.headers[0].support, 3);
        assert_eq!(root.tree.headers[2].support, 2);
    }

    #[test]
    fn reduction_reaches_fixpoint() {
        // With min_support 2 and min_pattern_len 2: item 9 is
        // infrequent, which shrinks [8, 9] under the length floor,
        // which in turn makes 8 infrequent.
        let mut c = cfg(2);
        c.min_pattern_len = 2;
        let tracts = load(vec![
            vec![1u32, 2],
            vec![1, 2, 8],
            vec![8, 9],
        ])
        .unwrap();
        let root = build_root(tracts, &c).unwrap().unwrap();
        assert_eq!(root.idx_to_item, vec![2, 1]);
    }

    #[test]
    fn nothing_frequent_yields_none() {
        let tracts = load(vec![vec![1u32], vec![2], vec![3]]).unwrap();
        assert!(build_root(tracts, &cfg(2)).unwrap().is_none());
    }
}
