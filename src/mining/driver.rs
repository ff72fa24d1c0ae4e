use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use log::{debug, trace};

use crate::config::Mode;
use crate::types::errors::MineError;

use super::scratch::WorkerScratch;
use super::{BranchStore, Miner};

//------------ Parallel driver -----------------------------------------------

// Farms the top-level branches out to `workers` threads.
//
// Scheduling is dynamic: a shared ticket counter hands out branch
// indices and each worker pulls the next unstarted one. Closed mode
// walks the branches from the highest index down, the order the
// closedness bookkeeping is built around; the all-itemset modes walk
// upwards like the sequential loop would.
//
// Every worker owns its scratch (arenas, conditional trees, detector
// state) for its whole lifetime, and each finished branch is
// published into that branch's own once-set slot, so nothing on the
// mining path takes a lock. The root tree and the item tables are
// only ever read.
pub(crate) fn run(
    miner: &Miner,
    workers: usize,
) -> Result<Vec<BranchStore>, MineError> {
    let branches = miner.branches();
    let slots: Vec<OnceLock<BranchStore>> =
        (0..branches).map(|_| OnceLock::new()).collect();
    let ticket = AtomicUsize::new(0);
    let descending = miner.cfg.mode == Mode::Closed;

    debug!("mining {} branches on {} workers", branches, workers);

    let mut first_err: Result<(), MineError> = Ok(());
    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for wid in 0..workers {
            let slots = &slots;
            let ticket = &ticket;
            let handle = std::thread::Builder::new()
                .name(format!("miner-{}", wid))
                .spawn_scoped(scope, move || -> Result<(), MineError> {
                    let mut w = WorkerScratch::new(miner.branches());
                    loop {
                        let t = ticket.fetch_add(1, Ordering::Relaxed);
                        if t >= branches {
                            return Ok(());
                        }
                        let branch =
                            if descending { branches - 1 - t } else { t };
                        if miner.abort.is_set() {
                            return Err(MineError::Aborted);
                        }
                        let store = miner.mine_branch(&mut w, branch)?;
                        if slots[branch].set(store).is_err() {
                            return Err(MineError::Internal(
                                "branch mined twice",
                            ));
                        }
                    }
                })
                .map_err(|_| {
                    MineError::Internal("failed to spawn a worker")
                });
            match handle {
                Ok(h) => handles.push(h),
                Err(e) => {
                    first_err = Err(e);
                    break;
                }
            }
        }

        for h in handles {
            match h.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_err.is_ok() {
                        first_err = Err(e);
                    }
                }
                Err(_) => {
                    if first_err.is_ok() {
                        first_err =
                            Err(MineError::Internal("a worker panicked"));
                    }
                }
            }
        }
    });
    first_err?;

    trace!("all workers joined");

    Ok(slots
        .into_iter()
        .map(|slot| {
            slot.into_inner()
                .unwrap_or_else(|| BranchStore::empty(miner.cfg.mode))
        })
        .collect())
}
