use std::fmt;

/// Possible errors returned by a mining run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MineError {
    /// The transaction database is malformed: an item carries the
    /// reserved all-ones value. Raised while loading, before any
    /// mining state is built.
    BadInput,
    /// A node arena or pattern store failed to grow. The session is
    /// lost; there is no partial result.
    OutOfMemory,
    /// The abort flag was observed. Workers have unwound cleanly and
    /// the session is lost.
    Aborted,
    /// An internal invariant was violated. This indicates a bug in the
    /// miner, not in the caller.
    Internal(&'static str),
}

impl std::error::Error for MineError {}

impl fmt::Display for MineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MineError::BadInput => {
                write!(
                    f,
                    "Error: An item uses the reserved all-ones value."
                )
            }
            MineError::OutOfMemory => {
                write!(
                    f,
                    "Error: Out of memory while growing mining state."
                )
            }
            MineError::Aborted => {
                write!(f, "Error: The mining run was aborted.")
            }
            MineError::Internal(msg) => {
                write!(f, "Error: Internal invariant violated: {}.", msg)
            }
        }
    }
}
