//! Thread-local switches deciding whether ops record graph history.
//!
//! Scopes form a stack per thread. The innermost scope that covers a graph id decides;
//! with no covering scope, backprop is enabled.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::autograd::GraphId;

#[derive(Debug, Clone)]
struct BackpropMode {
    /// `None` covers every graph.
    graph_ids: Option<Vec<GraphId>>,
    enabled: bool,
}

impl BackpropMode {
    fn covers(&self, graph_id: GraphId) -> bool {
        match &self.graph_ids {
            None => true,
            Some(ids) => ids.contains(&graph_id),
        }
    }
}

thread_local! {
    static BACKPROP_MODE_STACK: RefCell<Vec<BackpropMode>> = const { RefCell::new(Vec::new()) };
}

fn push_mode(mode: BackpropMode) -> usize {
    BACKPROP_MODE_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(mode);
        stack.len()
    })
}

fn pop_mode(expected_depth: usize) {
    BACKPROP_MODE_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        debug_assert_eq!(stack.len(), expected_depth, "backprop mode scopes must nest");
        stack.pop();
    });
}

/// Returns whether ops should record graph nodes for `graph_id` on this thread.
pub fn is_backprop_required(graph_id: GraphId) -> bool {
    BACKPROP_MODE_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .find(|mode| mode.covers(graph_id))
            .map_or(true, |mode| mode.enabled)
    })
}

/// Disables graph recording while alive.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct NoBackpropModeScope {
    depth: usize,
    _not_send: PhantomData<Rc<()>>,
}

impl NoBackpropModeScope {
    /// Disables recording on every graph.
    pub fn new() -> Self {
        Self::push(None)
    }

    /// Disables recording on the listed graphs only.
    pub fn for_graphs(graph_ids: &[GraphId]) -> Self {
        Self::push(Some(graph_ids.to_vec()))
    }

    fn push(graph_ids: Option<Vec<GraphId>>) -> Self {
        let depth = push_mode(BackpropMode {
            graph_ids,
            enabled: false,
        });
        NoBackpropModeScope {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl Default for NoBackpropModeScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoBackpropModeScope {
    fn drop(&mut self) {
        pop_mode(self.depth);
    }
}

/// Re-enables graph recording for one graph, overriding enclosing no-backprop scopes.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ForceBackpropModeScope {
    depth: usize,
    _not_send: PhantomData<Rc<()>>,
}

impl ForceBackpropModeScope {
    pub fn new(graph_id: GraphId) -> Self {
        let depth = push_mode(BackpropMode {
            graph_ids: Some(vec![graph_id]),
            enabled: true,
        });
        ForceBackpropModeScope {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ForceBackpropModeScope {
    fn drop(&mut self) {
        pop_mode(self.depth);
    }
}

#[cfg(test)]
#[path = "backprop_mode_test.rs"]
mod tests;
