pub(crate) mod node;

use log::trace;

use crate::arena::NodeArena;
use crate::types::errors::MineError;
use crate::types::{ItemIdx, Support, SUPP_MAX};

use node::{TreeNode, NODE_NIL};

//------------ Header --------------------------------------------------------

// Per-item entry of a tree's dense header table. `item` is the global
// rank of the item (an index into the session's idx-to-item table);
// the entry's own position in the table is the local id that nodes
// carry. `head` is the most recently inserted node for this id.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Header {
    pub(crate) item: ItemIdx,
    pub(crate) support: Support,
    pub(crate) head: u32,
}

//------------ FpTree --------------------------------------------------------

// A prefix tree of item-id sequences with a header-indexed item list
// per id. The root is implicit: nodes whose `parent` is `NODE_NIL`
// hang off it, and its support is tracked separately.
//
// Invariants: every non-root node's parent is closer to the root;
// walking `sibling` from `headers[id].head` enumerates exactly the
// nodes carrying `id`; `headers[id].support` is the sum of the
// supports on that list.
#[derive(Debug, Default)]
pub(crate) struct FpTree {
    pub(crate) headers: Vec<Header>,
    pub(crate) root_support: Support,
}

impl FpTree {
    // Sets up the root tree, taking the item supports in rank order.
    // Header position and global rank coincide here; conditional
    // trees built by `project` keep the global rank in `item` while
    // compacting positions.
    pub(crate) fn with_ranked_supports(supports: &[Support]) -> Self {
        let headers = supports
            .iter()
            .enumerate()
            .map(|(idx, &support)| Header {
                item: idx as ItemIdx,
                support,
                head: NODE_NIL,
            })
            .collect();
        Self {
            headers,
            root_support: 0,
        }
    }

    pub(crate) fn cnt(&self) -> usize {
        self.headers.len()
    }

    // Inserts a transaction, given as local header ids in ascending
    // order, with the given count.
    //
    // The shared-prefix walk only tests the head of each id's item
    // list: a child is reused iff the most recently inserted node for
    // the next id hangs off the current node. Transactions arrive in
    // canonically sorted order, so equal prefixes are consecutive and
    // the head is the only node that can match.
    pub(crate) fn insert(
        &mut self,
        arena: &mut NodeArena,
        path: &[u32],
        count: Support,
    ) -> Result<(), MineError> {
        let mut cur = NODE_NIL;
        let mut i = 0;

        loop {
            if cur == NODE_NIL {
                self.root_support += count;
            } else {
                arena.node_mut(cur).support += count;
            }
            if i == path.len() {
                return Ok(());
            }
            let head = self.headers[path[i] as usize].head;
            if head == NODE_NIL || arena.node(head).parent != cur {
                break;
            }
            cur = head;
            i += 1;
        }

        // No shared child for the rest of the path; chain new nodes.
        while i < path.len() {
            let id = path[i];
            let n = arena.alloc()?;
            let head = &mut self.headers[id as usize].head;
            *arena.node_mut(n) = TreeNode {
                id,
                support: count,
                parent: cur,
                sibling: *head,
            };
            *head = n;
            cur = n;
            i += 1;
        }
        Ok(())
    }

    // Builds into `dst` the conditional tree for extending the
    // current prefix with the item at header `pivot`: the database
    // restricted to transactions containing that item, the item
    // itself removed, infrequent extensions pruned.
    //
    // `subs` accumulates per-ancestor supports and is then reused as
    // the remap table from old header positions to compacted ones,
    // with `SUPP_MAX` marking pruned entries. `path` is scratch for
    // assembling each remapped node path back to front. Both must be
    // at least `pivot` long.
    //
    // Returns false when no extension reaches `min_support`; the
    // caller abandons the branch.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn project(
        &self,
        src_arena: &NodeArena,
        pivot: usize,
        dst: &mut FpTree,
        dst_arena: &mut NodeArena,
        subs: &mut [Support],
        path: &mut [u32],
        min_support: Support,
    ) -> Result<bool, MineError> {
        for s in subs[..pivot].iter_mut() {
            *s = 0;
        }

        let mut n = self.headers[pivot].head;
        while n != NODE_NIL {
            let node = src_arena.node(n);
            let mut a = node.parent;
            while a != NODE_NIL {
                let anc = src_arena.node(a);
                subs[anc.id as usize] += node.support;
                a = anc.parent;
            }
            n = node.sibling;
        }

        // Compact the surviving ids into dst's header table, turning
        // `subs` into the remap as we go.
        dst.headers.clear();
        for i in 0..pivot {
            if subs[i] < min_support {
                subs[i] = SUPP_MAX;
                continue;
            }
            let new_id = dst.headers.len() as u32;
            dst.headers.push(Header {
                item: self.headers[i].item,
                support: subs[i],
                head: NODE_NIL,
            });
            subs[i] = new_id;
        }

        if dst.headers.is_empty() {
            return Ok(false);
        }

        // dst is reused across sibling projections; only now is it
        // certain the old contents are dead.
        dst.root_support = 0;

        trace!(
            "project pivot {}: {} of {} ids survive",
            pivot,
            dst.headers.len(),
            pivot
        );

        let mut n = self.headers[pivot].head;
        while n != NODE_NIL {
            let node = src_arena.node(n);
            let mut end = pivot;
            let mut a = node.parent;
            while a != NODE_NIL {
                let anc = src_arena.node(a);
                let remapped = subs[anc.id as usize];
                if remapped != SUPP_MAX {
                    end -= 1;
                    path[end] = remapped;
                }
                a = anc.parent;
            }
            dst.insert(dst_arena, &path[end..pivot], node.support)?;
            n = node.sibling;
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Walks an item list and returns (support, parent) per node,
    // newest first.
    fn list_of(
        tree: &FpTree,
        arena: &NodeArena,
        id: usize,
    ) -> Vec<(Support, u32)> {
        let mut out = Vec::new();
        let mut n = tree.headers[id].head;
        while n != NODE_NIL {
            let node = arena.node(n);
            out.push((node.support, node.parent));
            n = node.sibling;
        }
        out
    }

    fn build() -> (FpTree, NodeArena) {
        // ids 0..3 with supports matching four transactions:
        // [0,1], [0,1,2], [0,1,2], [0,2]
        let mut tree = FpTree::with_ranked_supports(&[4, 3, 3]);
        let mut arena = NodeArena::new();
        for path in [
            &[0u32, 1][..],
            &[0, 1, 2][..],
            &[0, 1, 2][..],
            &[0, 2][..],
        ] {
            tree.insert(&mut arena, path, 1).unwrap();
        }
        (tree, arena)
    }

    #[test]
    fn insert_shares_prefixes() {
        let (tree, arena) = build();

        assert_eq!(tree.root_support, 4);
        // one node for id 0, one for id 1, two for id 2
        assert_eq!(list_of(&tree, &arena, 0), vec![(4, NODE_NIL)]);
        assert_eq!(list_of(&tree, &arena, 1).len(), 1);
        assert_eq!(list_of(&tree, &arena, 1)[0].0, 3);
        let twos = list_of(&tree, &arena, 2);
        assert_eq!(twos.len(), 2);
        // newest first: the lone [0,2] tail, then the shared [0,1,2]
        assert_eq!(twos[0].0, 1);
        assert_eq!(twos[1].0, 2);
        // header support equals the sum over the list
        assert_eq!(
            tree.headers[2].support,
            twos.iter().map(|n| n.0).sum::<Support>()
        );
    }

    #[test]
    fn project_builds_conditional_db() {
        let (tree, arena) = build();
        let mut dst = FpTree::default();
        let mut dst_arena = NodeArena::new();
        let mut subs = vec![0; tree.cnt()];
        let mut path = vec![0; tree.cnt()];

        // Conditional DB of id 2: {0:3, 1:2}.
        let ok = tree
            .project(&arena, 2, &mut dst, &mut dst_arena, &mut subs, &mut path, 2)
            .unwrap();
        assert!(ok);
        assert_eq!(dst.cnt(), 2);
        assert_eq!(dst.headers[0].item, 0);
        assert_eq!(dst.headers[0].support, 3);
        assert_eq!(dst.headers[1].item, 1);
        assert_eq!(dst.headers[1].support, 2);
        // paths [0]:1 and [0,1]:2 share the id-0 node
        assert_eq!(list_of(&dst, &dst_arena, 0), vec![(3, NODE_NIL)]);
        assert_eq!(list_of(&dst, &dst_arena, 1).len(), 1);

        // With min_support 3 the id-1 extension is pruned.
        let ok = tree
            .project(&arena, 2, &mut dst, &mut dst_arena, &mut subs, &mut path, 3)
            .unwrap();
        assert!(ok);
        assert_eq!(dst.cnt(), 1);
        assert_eq!(dst.headers[0].item, 0);

        // Nothing survives a threshold above every extension.
        let ok = tree
            .project(&arena, 2, &mut dst, &mut dst_arena, &mut subs, &mut path, 4)
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn project_of_top_id_is_empty() {
        let (tree, arena) = build();
        let mut dst = FpTree::default();
        let mut dst_arena = NodeArena::new();
        let mut subs = vec![0; tree.cnt()];
        let mut path = vec![0; tree.cnt()];

        // id 0 has no ancestors at all
        let ok = tree
            .project(&arena, 0, &mut dst, &mut dst_arena, &mut subs, &mut path, 1)
            .unwrap();
        assert!(!ok);
    }
}
