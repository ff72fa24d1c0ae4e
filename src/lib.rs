//! Frequent-itemset mining over in-memory transaction databases.
//!
//! The miner builds an FP-tree over the frequent items of the input,
//! then recursively projects conditional trees to enumerate itemsets,
//! farming the top-level branches out over a pool of worker threads.
//! By default only *closed* itemsets are reported: itemsets no proper
//! superset of which has the same support. The full frequent set, or
//! a compressed representation of it, can be requested instead via
//! [`Mode`].
//!
//! Diagnostics go through the `log` facade; initialize a logger such
//! as `env_logger` to see them.

pub use config::{MineConfig, Mode};
pub use types::errors::MineError;
pub use types::{AbortFlag, Item, ItemSet, Support};

pub mod config;
pub mod types;

mod arena;
mod closed;
mod fp_tree;
mod mining;
mod order;
mod pattern;

use std::time::Instant;

use log::info;

use mining::Miner;

/// Mines the itemsets of `db` according to `cfg`.
///
/// Each transaction is an iterable of items; duplicates within one
/// transaction count once. The order of the returned itemsets is
/// unspecified.
pub fn mine<I, T>(
    db: I,
    cfg: &MineConfig,
) -> Result<Vec<ItemSet>, MineError>
where
    I: IntoIterator<Item = T>,
    T: IntoIterator<Item = Item>,
{
    mine_with_flag(db, cfg, &AbortFlag::new())
}

/// Like [`mine`], with a caller-provided cancellation flag.
///
/// Setting the flag (typically from a signal handler) makes every
/// worker unwind at its next check point and the run return
/// [`MineError::Aborted`].
pub fn mine_with_flag<I, T>(
    db: I,
    cfg: &MineConfig,
    abort: &AbortFlag,
) -> Result<Vec<ItemSet>, MineError>
where
    I: IntoIterator<Item = T>,
    T: IntoIterator<Item = Item>,
{
    info!(
        "fp-growth: min_support {}, pattern length {}..{}, {:?}",
        cfg.support_floor(),
        cfg.min_pattern_len.max(1),
        cfg.max_pattern_len,
        cfg.mode
    );
    let started = Instant::now();

    let tracts = order::load(db)?;
    let root = match order::build_root(tracts, cfg)? {
        Some(root) => root,
        None => return Ok(Vec::new()),
    };

    if abort.is_set() {
        return Err(MineError::Aborted);
    }

    let miner =
        Miner::new(cfg, &root.tree, &root.arena, &root.idx_to_item, abort);
    let workers = cfg.worker_count(miner.branches());
    let stores = mining::driver::run(&miner, workers)?;

    let results = mining::assemble(cfg.mode, &stores, &root.idx_to_item);

    info!(
        "mined {} itemsets in {:?}",
        results.len(),
        started.elapsed()
    );
    Ok(results)
}
