pub(crate) mod driver;
pub(crate) mod scratch;

use log::{log_enabled, trace};

use crate::arena::NodeArena;
use crate::closed::merge;
use crate::config::{MineConfig, Mode};
use crate::fp_tree::node::NODE_NIL;
use crate::fp_tree::FpTree;
use crate::pattern::{
    closed_entry, item_entry, ClosedEntry, ItemEntry, PatternStore,
};
use crate::types::errors::MineError;
use crate::types::{AbortFlag, Item, ItemIdx, ItemSet, Support};

use scratch::WorkerScratch;

//------------ BranchStore ---------------------------------------------------

// The pattern store of one top-level branch. Closed mode keeps
// encoded entries (id plus per-element support) for the merge replay;
// the all-itemset modes store finished item values.
#[derive(Debug)]
pub(crate) enum BranchStore {
    Closed(PatternStore<ClosedEntry>),
    Plain(PatternStore<ItemEntry>),
}

impl BranchStore {
    pub(crate) fn empty(mode: Mode) -> Self {
        match mode {
            Mode::Closed => Self::Closed(PatternStore::new()),
            Mode::All | Mode::AllWithPerfectExt => {
                Self::Plain(PatternStore::new())
            }
        }
    }

    pub(crate) fn count(&self) -> usize {
        match self {
            Self::Closed(ps) => ps.count(),
            Self::Plain(ps) => ps.count(),
        }
    }
}

//------------ Miner ---------------------------------------------------------

// The shared, read-only context of a mining run. Workers get a `&`
// to this plus their own `WorkerScratch`.
pub(crate) struct Miner<'a> {
    cfg: &'a MineConfig,
    min_support: Support,
    max_items: usize,
    root: &'a FpTree,
    root_arena: &'a NodeArena,
    idx_to_item: &'a [Item],
    abort: &'a AbortFlag,
}

impl<'a> Miner<'a> {
    pub(crate) fn new(
        cfg: &'a MineConfig,
        root: &'a FpTree,
        root_arena: &'a NodeArena,
        idx_to_item: &'a [Item],
        abort: &'a AbortFlag,
    ) -> Self {
        Self {
            cfg,
            min_support: cfg.support_floor(),
            max_items: root.cnt(),
            root,
            root_arena,
            idx_to_item,
            abort,
        }
    }

    pub(crate) fn branches(&self) -> usize {
        self.root.cnt()
    }

    // Mines one top-level branch to completion and returns its
    // pattern store. In closed mode the worker's detector carries
    // state from branch to branch, which is why a worker keeps one
    // scratch for its lifetime.
    pub(crate) fn mine_branch(
        &self,
        w: &mut WorkerScratch,
        branch: usize,
    ) -> Result<BranchStore, MineError> {
        let mut store = BranchStore::empty(self.cfg.mode);

        self.begin_pattern(w);
        let h = self.root.headers[branch];
        if !self.add_pattern_element(w, h.item, h.support)? {
            // No closed itemset can start here; the pattern frame
            // stays open for the next branch.
            return Ok(store);
        }

        let single = h.head != NODE_NIL
            && self.root_arena.node(h.head).sibling == NODE_NIL;
        if single {
            // A single path above the only node: every ancestor is a
            // perfect extension, no projection needed.
            let mut a = self.root_arena.node(h.head).parent;
            while a != NODE_NIL {
                let anc = *self.root_arena.node(a);
                let ah = self.root.headers[anc.id as usize];
                self.add_perfect_ext(w, ah.item, ah.support);
                a = anc.parent;
            }
        } else if self.root.cnt() > 1 {
            let mut dst = w.pool.pop().unwrap_or_default();
            let mark = w.proj.mark_for(1);
            if w.proj.project_root(
                self.root,
                self.root_arena,
                branch,
                &mut dst,
                self.min_support,
            )? {
                self.growth(w, &dst, 1, &mut store)?;
            }
            w.proj.restore_for(1, mark);
            w.pool.push(dst);
        }

        self.end_local_pattern(w, &mut store)?;
        self.end_pattern(w);

        if log_enabled!(log::Level::Trace) {
            trace!(
                "{} branch {}: {} patterns",
                std::thread::current().name().unwrap_or("unnamed-thread"),
                branch,
                store.count()
            );
        }
        Ok(store)
    }

    // Recursive growth over a conditional tree at `depth`. Mirrors
    // `mine_branch` for every header id, highest first.
    fn growth(
        &self,
        w: &mut WorkerScratch,
        tree: &FpTree,
        depth: usize,
        store: &mut BranchStore,
    ) -> Result<(), MineError> {
        if self.abort.is_set() {
            return Err(MineError::Aborted);
        }

        let mut dst_opt = if tree.cnt() > 1 {
            Some(w.pool.pop().unwrap_or_default())
        } else {
            None
        };
        let mark = w.proj.mark_for(depth + 1);

        for i in (0..tree.cnt()).rev() {
            let h = tree.headers[i];
            if !self.add_pattern_element(w, h.item, h.support)? {
                continue;
            }

            let single = h.head != NODE_NIL
                && w.proj.node(depth, h.head).sibling == NODE_NIL;
            if single {
                let mut a = w.proj.node(depth, h.head).parent;
                while a != NODE_NIL {
                    let anc = *w.proj.node(depth, a);
                    let ah = tree.headers[anc.id as usize];
                    self.add_perfect_ext(w, ah.item, ah.support);
                    a = anc.parent;
                }
            } else if let Some(dst) = dst_opt.as_mut() {
                if w.proj.project(tree, depth, i, dst, self.min_support)? {
                    self.growth(w, dst, depth + 1, store)?;
                }
            }

            self.end_local_pattern(w, store)?;
        }

        w.proj.restore_for(depth + 1, mark);
        if let Some(dst) = dst_opt {
            w.pool.push(dst);
        }
        Ok(())
    }

    fn begin_pattern(&self, w: &mut WorkerScratch) {
        if !w.pattern_open {
            w.pattern_open = true;
            w.added.fill(false);
            w.added_perfect_ext.fill(false);
            w.last_ids.clear();
            w.supports.clear();
            w.perfect_ext_ids.clear();
        }
    }

    // Extends the open pattern with `item` at conditional support
    // `supp`. Returns false when the closed-itemset detector rules
    // the whole branch out.
    fn add_pattern_element(
        &self,
        w: &mut WorkerScratch,
        item: ItemIdx,
        supp: Support,
    ) -> Result<bool, MineError> {
        if supp < self.min_support || !w.pattern_open {
            return Ok(true);
        }
        let it = item as usize;
        if w.added_perfect_ext[it] || w.added[it] {
            return Ok(true);
        }
        if self.cfg.mode == Mode::Closed && !w.closed.add(item, supp) {
            return Ok(false);
        }
        w.added[it] = true;
        w.supports.push(supp);
        w.last_ids.push(item);
        if w.last_ids.len() > self.max_items {
            return Err(MineError::Internal(
                "open pattern exceeds the item count",
            ));
        }
        Ok(true)
    }

    fn add_perfect_ext(
        &self,
        w: &mut WorkerScratch,
        item: ItemIdx,
        supp: Support,
    ) {
        if supp < self.min_support || !w.pattern_open {
            return;
        }
        let it = item as usize;
        if !w.added_perfect_ext[it] && !w.added[it] {
            w.added_perfect_ext[it] = true;
            w.perfect_ext_ids.push(item);
        }
    }

    // Closes the innermost pattern element: emits the pattern if it
    // qualifies, then unwinds the element and its perfect extensions.
    fn end_local_pattern(
        &self,
        w: &mut WorkerScratch,
        store: &mut BranchStore,
    ) -> Result<(), MineError> {
        if !w.pattern_open {
            return Ok(());
        }

        let last_cnt = w.last_ids.len();
        let comb = last_cnt + w.perfect_ext_ids.len();
        let min_len = self.cfg.min_pattern_len.max(1) as usize;
        let max_len = self.cfg.max_pattern_len as usize;

        if last_cnt > 0
            && comb >= min_len
            && (max_len == 0 || comb <= max_len)
        {
            let s = w.supports[last_cnt - 1];
            match (self.cfg.mode, &mut *store) {
                (Mode::Closed, BranchStore::Closed(ps)) => {
                    let r = w.closed.current_support();
                    if r < s {
                        w.enc.clear();
                        for (&id, &es) in
                            w.last_ids.iter().zip(w.supports.iter())
                        {
                            w.enc.push(closed_entry(id, es));
                        }
                        for &id in &w.perfect_ext_ids {
                            w.enc.push(closed_entry(id, 0));
                        }
                        ps.push(&w.enc, s)?;

                        w.cmem.clear();
                        w.cmem.extend_from_slice(&w.last_ids);
                        w.cmem.extend_from_slice(&w.perfect_ext_ids);
                        w.closed.update(&w.cmem, s);
                    }
                }
                (Mode::All, BranchStore::Plain(ps)) => {
                    w.items_buf.clear();
                    for &id in &w.last_ids {
                        w.items_buf
                            .push(item_entry(self.idx_to_item[id as usize]));
                    }
                    // every subset of the perfect extensions extends
                    // the pattern at the same support
                    for pos in 0..w.perfect_ext_ids.len() {
                        self.expand(w, ps, pos, s, min_len, max_len)?;
                    }
                    if last_cnt >= min_len
                        && (max_len == 0 || last_cnt <= max_len)
                    {
                        ps.push(&w.items_buf, s)?;
                    }
                }
                (Mode::AllWithPerfectExt, BranchStore::Plain(ps)) => {
                    w.items_buf.clear();
                    for &id in &w.last_ids {
                        w.items_buf
                            .push(item_entry(self.idx_to_item[id as usize]));
                    }
                    for &id in &w.perfect_ext_ids {
                        w.items_buf
                            .push(item_entry(self.idx_to_item[id as usize]));
                    }
                    ps.push(&w.items_buf, s)?;
                }
                _ => {
                    return Err(MineError::Internal(
                        "pattern store flavor does not match the mode",
                    ));
                }
            }
        }

        if self.cfg.mode == Mode::Closed {
            w.closed.remove(1);
        }
        if let Some(last) = w.last_ids.pop() {
            w.added[last as usize] = false;
            w.supports.pop();
        }
        for &p in &w.perfect_ext_ids {
            w.added_perfect_ext[p as usize] = false;
        }
        w.perfect_ext_ids.clear();
        Ok(())
    }

    // Emits, for the perfect extension at `pos`, every pattern formed
    // by the open items plus a subset of the extensions starting
    // there. `items_buf` holds the open items on entry and is
    // restored before returning.
    fn expand(
        &self,
        w: &mut WorkerScratch,
        ps: &mut PatternStore<ItemEntry>,
        pos: usize,
        s: Support,
        min_len: usize,
        max_len: usize,
    ) -> Result<(), MineError> {
        let id = w.perfect_ext_ids[pos];
        w.items_buf
            .push(item_entry(self.idx_to_item[id as usize]));
        for j in pos + 1..w.perfect_ext_ids.len() {
            self.expand(w, ps, j, s, min_len, max_len)?;
        }
        let len = w.items_buf.len();
        if len >= min_len && (max_len == 0 || len <= max_len) {
            ps.push(&w.items_buf, s)?;
        }
        w.items_buf.pop();
        Ok(())
    }

    fn end_pattern(&self, w: &mut WorkerScratch) {
        w.pattern_open = false;
    }
}

//------------ Result assembly -----------------------------------------------

// Turns the per-branch stores into the public result set. Closed mode
// goes through the cross-branch merge; the other modes translate the
// records as they are.
pub(crate) fn assemble(
    mode: Mode,
    stores: &[BranchStore],
    idx_to_item: &[Item],
) -> Vec<ItemSet> {
    match mode {
        Mode::Closed => merge::merge_closed(stores, idx_to_item),
        Mode::All | Mode::AllWithPerfectExt => {
            let mut out = Vec::new();
            for store in stores {
                if let BranchStore::Plain(ps) = store {
                    for (entries, supp) in ps.iter() {
                        out.push(ItemSet::new(
                            entries.iter().map(|e| e.get()).collect(),
                            supp,
                        ));
                    }
                }
            }
            out
        }
    }
}
