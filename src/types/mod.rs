mod abort;

pub mod errors;

pub use abort::AbortFlag;

use serde_derive::{Deserialize, Serialize};

//------------ Base types ----------------------------------------------------

/// An item as supplied by the caller. Opaque to the miner, except that
/// the all-ones value is reserved.
pub type Item = u32;

/// The number of transactions an itemset occurs in.
pub type Support = u32;

// Dense rank of a frequent item after global ordering (descending
// support, ties broken by descending item value). Stable for the
// lifetime of the root tree.
pub(crate) type ItemIdx = u32;

pub(crate) const SUPP_MAX: Support = Support::MAX;

// Reserved item value; rejected on input.
pub(crate) const ITEM_NONE: Item = Item::MAX;

// Sentinel rank, used by the closed-itemset detector for the frame
// below the first real prefix item.
pub(crate) const IDX_NONE: ItemIdx = ItemIdx::MAX;

//------------ ItemSet -------------------------------------------------------

/// A mined itemset together with its support.
///
/// Items appear in the order they were added to the pattern, i.e. in
/// descending root-support order, not sorted by value.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ItemSet {
    pub items: Vec<Item>,
    pub support: Support,
}

impl ItemSet {
    pub fn new(items: Vec<Item>, support: Support) -> Self {
        Self { items, support }
    }
}

impl std::fmt::Display for ItemSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "}}: {}", self.support)
    }
}
