use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque token naming one independent differentiation context.
///
/// A tensor body can carry a graph node (and a gradient slot) under several graph ids at
/// once, which is what nested and higher-order differentiation is built on. Ids are cheap
/// to copy and compare; the only structure they expose is equality and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    /// Graph used whenever a caller does not name one.
    pub const DEFAULT: GraphId = GraphId(0);

    /// Returns a graph id distinct from every id handed out before in this process.
    pub fn fresh() -> GraphId {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_default(&self) -> bool {
        *self == GraphId::DEFAULT
    }
}

impl Default for GraphId {
    fn default() -> Self {
        GraphId::DEFAULT
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "default")
        } else {
            write!(f, "graph-{}", self.0)
        }
    }
}
