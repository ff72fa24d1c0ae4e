use crate::types::Support;

// Sentinel node index. Doubles as "no node" in a header list and as
// "parent is the root" in a node, so the shared-prefix walk and the
// ancestor walk both terminate on the same test.
pub(crate) const NODE_NIL: u32 = u32::MAX;

//------------ TreeNode ------------------------------------------------------

// One FP-tree node. `id` is the header index within the owning tree,
// `parent` points towards the root and `sibling` chains all nodes
// with the same `id` into the header's item list. Both are indices
// into the arena the owning tree allocates from.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TreeNode {
    pub(crate) id: u32,
    pub(crate) support: Support,
    pub(crate) parent: u32,
    pub(crate) sibling: u32,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self {
            id: 0,
            support: 0,
            parent: NODE_NIL,
            sibling: NODE_NIL,
        }
    }
}
