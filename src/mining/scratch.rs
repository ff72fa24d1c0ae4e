use crate::arena::{ArenaMark, NodeArena};
use crate::closed::ClosedStack;
use crate::fp_tree::node::TreeNode;
use crate::fp_tree::FpTree;
use crate::pattern::{ClosedEntry, ItemEntry};
use crate::types::errors::MineError;
use crate::types::{ItemIdx, Support};

//------------ ProjScratch ---------------------------------------------------

// Projection state of one worker: the arenas backing its conditional
// trees and the two scratch arrays `project` needs.
//
// Trees alternate between the two arenas by recursion depth, so a
// projection's source nodes and destination nodes are always in
// different storage. Checkpoints stay LIFO per arena: a level marks
// the arena its children allocate from on entry and restores it on
// exit.
#[derive(Debug)]
pub(crate) struct ProjScratch {
    arena_odd: NodeArena,
    arena_even: NodeArena,
    subs: Vec<Support>,
    path: Vec<u32>,
}

impl ProjScratch {
    pub(crate) fn new(max_items: usize) -> Self {
        Self {
            arena_odd: NodeArena::new(),
            arena_even: NodeArena::new(),
            subs: vec![0; max_items],
            path: vec![0; max_items],
        }
    }

    fn arena(&self, depth: usize) -> &NodeArena {
        if depth % 2 == 1 {
            &self.arena_odd
        } else {
            &self.arena_even
        }
    }

    pub(crate) fn mark_for(&self, depth: usize) -> ArenaMark {
        self.arena(depth).mark()
    }

    pub(crate) fn restore_for(&mut self, depth: usize, mark: ArenaMark) {
        if depth % 2 == 1 {
            self.arena_odd.restore(mark);
        } else {
            self.arena_even.restore(mark);
        }
    }

    // Reads a node of a tree that lives at `depth`.
    #[inline]
    pub(crate) fn node(&self, depth: usize, idx: u32) -> &TreeNode {
        self.arena(depth).node(idx)
    }

    // Projects the root tree (whose nodes live in the session arena)
    // into a depth-1 conditional tree.
    pub(crate) fn project_root(
        &mut self,
        root: &FpTree,
        root_arena: &NodeArena,
        pivot: usize,
        dst: &mut FpTree,
        min_support: Support,
    ) -> Result<bool, MineError> {
        root.project(
            root_arena,
            pivot,
            dst,
            &mut self.arena_odd,
            &mut self.subs,
            &mut self.path,
            min_support,
        )
    }

    // Projects a conditional tree at `src_depth` one level deeper.
    pub(crate) fn project(
        &mut self,
        src: &FpTree,
        src_depth: usize,
        pivot: usize,
        dst: &mut FpTree,
        min_support: Support,
    ) -> Result<bool, MineError> {
        if src_depth % 2 == 1 {
            src.project(
                &self.arena_odd,
                pivot,
                dst,
                &mut self.arena_even,
                &mut self.subs,
                &mut self.path,
                min_support,
            )
        } else {
            src.project(
                &self.arena_even,
                pivot,
                dst,
                &mut self.arena_odd,
                &mut self.subs,
                &mut self.path,
                min_support,
            )
        }
    }
}

//------------ WorkerScratch -------------------------------------------------

// Everything one worker owns exclusively. Built once per worker and
// reused across all the top-level branches it claims; only the flag
// arrays are reset between branches. Nothing in here is shared, so
// the mining hot path takes no lock.
#[derive(Debug)]
pub(crate) struct WorkerScratch {
    pub(crate) proj: ProjScratch,
    // conditional trees not currently on the recursion stack
    pub(crate) pool: Vec<FpTree>,
    pub(crate) added: Vec<bool>,
    pub(crate) added_perfect_ext: Vec<bool>,
    pub(crate) last_ids: Vec<ItemIdx>,
    pub(crate) supports: Vec<Support>,
    pub(crate) perfect_ext_ids: Vec<ItemIdx>,
    pub(crate) closed: ClosedStack,
    pub(crate) pattern_open: bool,
    // emission scratch
    pub(crate) enc: Vec<ClosedEntry>,
    pub(crate) items_buf: Vec<ItemEntry>,
    pub(crate) cmem: Vec<ItemIdx>,
}

impl WorkerScratch {
    pub(crate) fn new(max_items: usize) -> Self {
        Self {
            proj: ProjScratch::new(max_items),
            pool: Vec::new(),
            added: vec![false; max_items],
            added_perfect_ext: vec![false; max_items],
            last_ids: Vec::with_capacity(max_items),
            supports: Vec::with_capacity(max_items),
            perfect_ext_ids: Vec::with_capacity(max_items),
            closed: ClosedStack::new(),
            pattern_open: false,
            enc: Vec::new(),
            items_buf: Vec::new(),
            cmem: Vec::new(),
        }
    }
}
