pub(crate) mod merge;

use std::collections::HashMap;

use crate::types::{ItemIdx, Support, IDX_NONE, SUPP_MAX};

//------------ ExtTree -------------------------------------------------------

// The repository a frame keeps: a set-trie over every reported
// itemset, projected onto the frame's prefix. A stored path is the
// reported set minus the prefix, as a strictly descending ItemIdx
// sequence (patterns are built in descending rank order, so this is
// the order they arrive in). `supp` on a node is the maximum support
// of any stored set whose path runs through it.
//
// `ext_max` indexes the same content by single item: the maximum
// support of any stored set containing that item. This is the value
// the closedness check needs, and keeping it beside the trie makes
// the check O(1) while the trie itself carries enough structure to be
// projected one prefix item deeper.
#[derive(Debug, Default)]
struct ExtNode {
    supp: Support,
    children: Vec<(ItemIdx, ExtNode)>,
}

#[derive(Debug, Default)]
struct ExtTree {
    root: ExtNode,
    ext_max: HashMap<ItemIdx, Support>,
}

impl ExtNode {
    fn child_mut(&mut self, item: ItemIdx) -> &mut ExtNode {
        if let Some(pos) =
            self.children.iter().position(|(id, _)| *id == item)
        {
            return &mut self.children[pos].1;
        }
        self.children.push((item, ExtNode::default()));
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }
}

impl ExtTree {
    fn max_for(&self, item: ItemIdx) -> Support {
        self.ext_max.get(&item).copied().unwrap_or(0)
    }

    // Registers a reported set (relative to this frame's prefix).
    fn insert(&mut self, seq: &[ItemIdx], supp: Support) {
        let ExtTree { root, ext_max } = self;
        let mut node = root;
        for &item in seq {
            let e = ext_max.entry(item).or_insert(0);
            *e = (*e).max(supp);
            node = node.child_mut(item);
            node.supp = node.supp.max(supp);
        }
    }

    // Builds the repository one prefix item deeper: every stored set
    // containing `item`, with `item` removed. Paths are descending,
    // so subtrees below a smaller id cannot contain `item` and are
    // skipped whole.
    fn project(&self, item: ItemIdx) -> ExtTree {
        let mut dst = ExtTree::default();
        let mut prefix = Vec::new();
        Self::project_node(&self.root, item, &mut prefix, &mut dst);
        dst
    }

    fn project_node(
        node: &ExtNode,
        item: ItemIdx,
        prefix: &mut Vec<ItemIdx>,
        dst: &mut ExtTree,
    ) {
        for (id, child) in &node.children {
            if *id == item {
                dst.graft(prefix, child);
            } else if *id > item {
                prefix.push(*id);
                Self::project_node(child, item, prefix, dst);
                prefix.pop();
            }
        }
    }

    // Inserts `prefix` and then merges the subtree hanging off the
    // projected-away item. The subtree's own max is the max of every
    // set running through the removed edge, which is exactly what the
    // prefix nodes inherit.
    fn graft(&mut self, prefix: &[ItemIdx], src: &ExtNode) {
        let ExtTree { root, ext_max } = self;
        let mut node = &mut *root;
        for &item in prefix {
            let e = ext_max.entry(item).or_insert(0);
            *e = (*e).max(src.supp);
            node = node.child_mut(item);
            node.supp = node.supp.max(src.supp);
        }
        Self::merge(node, src, ext_max);
    }

    fn merge(
        dst: &mut ExtNode,
        src: &ExtNode,
        ext_max: &mut HashMap<ItemIdx, Support>,
    ) {
        for (id, src_child) in &src.children {
            let e = ext_max.entry(*id).or_insert(0);
            *e = (*e).max(src_child.supp);
            let dst_child = dst.child_mut(*id);
            dst_child.supp = dst_child.supp.max(src_child.supp);
            Self::merge(dst_child, src_child, ext_max);
        }
    }
}

//------------ ClosedStack ---------------------------------------------------

// One frame per open prefix item, on top of a permanent sentinel
// frame for the empty prefix. A frame's repository is only built
// (projected from the frame below) the first time the frame is
// consulted; sibling branches that get rejected early never pay for
// it.
#[derive(Debug)]
struct Frame {
    item: ItemIdx,
    tree: Option<ExtTree>,
}

#[derive(Debug)]
pub(crate) struct ClosedStack {
    frames: Vec<Frame>,
}

impl ClosedStack {
    pub(crate) fn new() -> Self {
        Self {
            frames: vec![Frame {
                item: IDX_NONE,
                tree: Some(ExtTree::default()),
            }],
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    // Records the attempt to extend the current prefix with `item` at
    // conditional support `supp`. Returns false when some reported
    // itemset already covers the extended prefix at that support or
    // higher; the candidate cannot be closed and the caller abandons
    // the branch. On success a frame for the new prefix is pushed.
    pub(crate) fn add(&mut self, item: ItemIdx, supp: Support) -> bool {
        let top = self.frames.len() - 1;
        self.materialize(top);
        if let Some(tree) = self.frames[top].tree.as_ref() {
            if tree.max_for(item) >= supp {
                return false;
            }
        }
        self.frames.push(Frame { item, tree: None });
        true
    }

    // Registers an emitted itemset. `items` is the full payload in
    // pattern order: the open prefix first, perfect extensions after.
    // Every materialized frame receives the part of the set that lies
    // beyond its own prefix; frames still unmaterialized pick the set
    // up when they project from their parent.
    pub(crate) fn update(&mut self, items: &[ItemIdx], supp: Support) {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            if let Some(tree) = frame.tree.as_mut() {
                if let Some(suffix) = items.get(i..) {
                    tree.insert(suffix, supp);
                }
            }
        }
    }

    // Pops at most `k` frames; the sentinel stays. `k` larger than
    // the current depth clamps.
    pub(crate) fn remove(&mut self, k: usize) {
        let k = k.min(self.depth());
        self.frames.truncate(self.frames.len() - k);
    }

    // The maximum support of any reported superset of the full
    // current prefix. An itemset is only emitted when its support
    // strictly exceeds this.
    pub(crate) fn current_support(&mut self) -> Support {
        let d = self.depth();
        if d == 0 {
            // Sentinel: nothing below the empty prefix may be
            // reported.
            return SUPP_MAX - 1;
        }
        let item = self.frames[d].item;
        self.materialize(d - 1);
        match self.frames[d - 1].tree.as_ref() {
            Some(tree) => tree.max_for(item),
            None => 0,
        }
    }

    // Projects repositories down the stack until frame `d` is built.
    // The sentinel frame always exists, so the walk terminates.
    fn materialize(&mut self, d: usize) {
        let mut base = d;
        while self.frames[base].tree.is_none() {
            base -= 1;
        }
        for i in base + 1..=d {
            let (lo, hi) = self.frames.split_at_mut(i);
            if let Some(parent) = lo[i - 1].tree.as_ref() {
                hi[0].tree = Some(parent.project(hi[0].item));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_with_equal_support_is_rejected() {
        let mut cd = ClosedStack::new();

        // Mine item 1 at support 3, report {1, 0} at 3.
        assert!(cd.add(1, 3));
        cd.update(&[1, 0], 3);
        assert_eq!(cd.current_support(), 3);
        cd.remove(1);

        // Extending the empty prefix with 0 at support 3 is covered
        // by the reported {1, 0}; at support 4 it is not.
        assert!(!cd.add(0, 3));
        assert!(cd.add(0, 4));
    }

    #[test]
    fn deeper_frames_project_the_repository() {
        let mut cd = ClosedStack::new();

        // Report {3, 2, 1} at 2 while prefix [3] is open.
        assert!(cd.add(3, 5));
        assert!(cd.add(2, 2));
        assert!(cd.add(1, 2));
        cd.update(&[3, 2, 1], 2);
        assert_eq!(cd.current_support(), 2);
        cd.remove(2);

        // Back at prefix [3]: the sibling extension 1 at support 2 is
        // covered by the projected {2, 1}.
        assert!(!cd.add(1, 2));
        // A different sibling at higher support is not.
        assert!(cd.add(0, 4));
        cd.remove(1);

        cd.remove(1);
        assert_eq!(cd.depth(), 0);

        // At the empty prefix, 1 at support 2 is covered as well.
        assert!(!cd.add(1, 2));
        assert!(cd.add(1, 3));
    }

    #[test]
    fn remove_clamps_to_depth() {
        let mut cd = ClosedStack::new();
        assert!(cd.add(2, 4));
        assert!(cd.add(1, 3));
        cd.remove(10);
        assert_eq!(cd.depth(), 0);
        // the sentinel survives and keeps working
        assert!(cd.add(2, 4));
    }

    #[test]
    fn empty_prefix_never_emits() {
        let mut cd = ClosedStack::new();
        assert_eq!(cd.current_support(), SUPP_MAX - 1);
    }

    #[test]
    fn updates_reach_outer_frames() {
        let mut cd = ClosedStack::new();

        // Open [4, 2], report {4, 2, 0} at 3 from the recursion.
        assert!(cd.add(4, 9));
        assert!(cd.add(2, 3));
        assert!(cd.add(0, 3));
        cd.update(&[4, 2, 0], 3);
        cd.remove(1);

        // {4, 2} at 3 is covered by {4, 2, 0}.
        assert_eq!(cd.current_support(), 3);
        cd.remove(1);
        // {4} at 9 is not.
        assert_eq!(cd.current_support(), 3);
    }
}
