#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Engine-level behavior, independent of the player's search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineOptions {
    /// Start pondering, read-limited, with this many reads (0 = off).
    pub ponder_limit: u64,
    /// Answer `genmove` with a pass when the opponent just passed.
    pub courtesy_pass: bool,
    /// Keep search results across moves instead of clearing them.
    pub tree_reuse: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            ponder_limit: 0,
            courtesy_pass: false,
            tree_reuse: true,
        }
    }
}
