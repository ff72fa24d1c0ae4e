use log::debug;

use crate::mining::BranchStore;
use crate::pattern::{closed_entry_id, closed_entry_supp};
use crate::types::{Item, ItemIdx, ItemSet};

use super::ClosedStack;

//------------ Cross-branch closed merge -------------------------------------

// Workers prune with private detectors, which cannot see itemsets
// reported from another top-level branch. A candidate surviving its
// worker can therefore still be subsumed by a superset of identical
// support mined elsewhere; two items of equal support that always
// occur together are the simplest case. This pass replays every
// candidate, branches from the highest index down and records in
// emission order, through one fresh detector, which is exactly the
// view a single sequential worker would have had. Candidates it
// rejects are the cross-branch subsumed ones; with one worker it
// rejects nothing.
//
// Replay relies on the per-element supports stored in the records:
// each real element is re-`add`ed at the support it was mined at,
// while perfect extensions (support 0 in the record) ride along.
// Consecutive records share their stacked prefix; a record that
// diverges pops the stale frames first.
pub(crate) fn merge_closed(
    stores: &[BranchStore],
    idx_to_item: &[Item],
) -> Vec<ItemSet> {
    let k = stores.len();
    let mut cd = ClosedStack::new();
    let mut stacked: Vec<ItemIdx> = Vec::new();
    let mut added = vec![false; k];
    let mut perf: Vec<ItemIdx> = Vec::new();
    let mut cmem: Vec<ItemIdx> = Vec::new();
    let mut out = Vec::new();
    let mut candidates = 0usize;

    for branch in (0..k).rev() {
        let ps = match &stores[branch] {
            BranchStore::Closed(ps) => ps,
            BranchStore::Plain(_) => continue,
        };
        candidates += ps.count();

        // A new branch shares nothing with the previous one.
        cd.remove(stacked.len());
        for &it in &stacked {
            added[it as usize] = false;
        }
        stacked.clear();

        for (entries, s) in ps.iter() {
            // Pop the stacked frames this record does not share.
            let mut shared = stacked.len();
            for (i, &it) in stacked.iter().enumerate() {
                let same = entries
                    .get(i)
                    .map(|e| closed_entry_id(*e) == it)
                    .unwrap_or(false);
                if !same {
                    shared = i;
                    break;
                }
            }
            for &it in &stacked[shared..] {
                added[it as usize] = false;
            }
            cd.remove(stacked.len() - shared);
            stacked.truncate(shared);

            perf.clear();
            let mut subsumed = false;
            for e in entries {
                let id = closed_entry_id(*e);
                let es = closed_entry_supp(*e);
                if es == 0 {
                    perf.push(id);
                } else if !added[id as usize] {
                    if cd.add(id, es) {
                        stacked.push(id);
                        added[id as usize] = true;
                    } else {
                        subsumed = true;
                        break;
                    }
                }
            }
            if subsumed {
                continue;
            }
            if stacked.len() + perf.len() != entries.len() {
                continue;
            }

            if cd.current_support() < s {
                cmem.clear();
                cmem.extend_from_slice(&stacked);
                cmem.extend_from_slice(&perf);
                cd.update(&cmem, s);
                out.push(ItemSet::new(
                    entries
                        .iter()
                        .map(|e| {
                            idx_to_item[closed_entry_id(*e) as usize]
                        })
                        .collect(),
                    s,
                ));
            }

            if let Some(last) = stacked.pop() {
                added[last as usize] = false;
            }
            cd.remove(1);
        }
    }

    debug!(
        "closed merge: {} of {} candidates survive",
        out.len(),
        candidates
    );
    out
}
