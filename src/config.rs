use serde_derive::{Deserialize, Serialize};

use crate::types::Support;

//------------ Mode ----------------------------------------------------------

/// What the miner reports.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
pub enum Mode {
    /// Closed frequent itemsets only: no reported itemset has a
    /// proper superset with the same support.
    #[default]
    Closed,
    /// Every frequent itemset, each as its own result. Perfect
    /// extensions are expanded into all their subsets, which is
    /// exponential in the number of simultaneous perfect extensions.
    All,
    /// Every pattern frame as a single result with its perfect
    /// extensions appended. Cheaper than [`Mode::All`]; the reported
    /// itemsets are the support-preserving maximal representatives,
    /// not the full frequent set.
    AllWithPerfectExt,
}

//------------ MineConfig ----------------------------------------------------

/// Parameters of a mining run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MineConfig {
    /// Minimum number of transactions an itemset must occur in.
    /// A value of 0 is treated as 1.
    pub min_support: Support,
    /// Itemsets shorter than this are not reported. They still take
    /// part in the closedness bookkeeping.
    pub min_pattern_len: u32,
    /// Itemsets longer than this are not reported; 0 means unbounded.
    pub max_pattern_len: u32,
    pub mode: Mode,
    /// Worker threads for the top-level branches; 0 means one per
    /// available core.
    pub threads: usize,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            min_support: 1,
            min_pattern_len: 1,
            max_pattern_len: 0,
            mode: Mode::Closed,
            threads: 0,
        }
    }
}

impl MineConfig {
    pub(crate) fn support_floor(&self) -> Support {
        self.min_support.max(1)
    }

    pub(crate) fn worker_count(&self, branches: usize) -> usize {
        let hw = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let want = if self.threads == 0 { hw } else { self.threads };
        want.min(branches).max(1)
    }
}
