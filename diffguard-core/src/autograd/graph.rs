use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use crate::autograd::backward_op::BackwardOp;
use crate::autograd::GraphId;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// Identity of a graph node during a backward traversal (pointer address).
pub(crate) type NodeId = *const GraphNode;

/// Node attached to a tensor body under one graph id.
///
/// The node refers to its body weakly. Graph structure (nodes, op nodes and the tensors
/// saved by backward rules) never keeps a tensor body alive, so dropping the handles a
/// caller holds is enough to release every body a computation allocated.
pub(crate) struct GraphNode {
    pub(crate) graph_id: GraphId,
    /// `None` for leaves.
    pub(crate) creator: Option<OpNode>,
    pub(crate) body: Weak<RwLock<TensorData>>,
    pub(crate) shape: Vec<usize>,
    pub(crate) dtype: DType,
}

/// The operation that produced an internal node, with one entry per op input.
/// An entry is `None` when that input was not tracked on the node's graph.
pub(crate) struct OpNode {
    pub(crate) op: Arc<dyn BackwardOp>,
    pub(crate) inputs: Vec<Option<Arc<GraphNode>>>,
}

impl GraphNode {
    pub(crate) fn new_leaf(
        graph_id: GraphId,
        body: Weak<RwLock<TensorData>>,
        shape: Vec<usize>,
        dtype: DType,
    ) -> Self {
        GraphNode {
            graph_id,
            creator: None,
            body,
            shape,
            dtype,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.creator.is_none()
    }

    pub(crate) fn id(node: &Arc<GraphNode>) -> NodeId {
        Arc::as_ptr(node)
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let creator = self.creator.as_ref().map(|c| format!("{:?}", c.op));
        f.debug_struct("GraphNode")
            .field("graph_id", &self.graph_id)
            .field("creator", &creator)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .finish()
    }
}

/// Orders every node reachable from `roots` so that a node always comes before the
/// nodes it was computed from (reverse post-order of a depth-first walk).
pub(crate) fn topological_order(roots: &[Arc<GraphNode>]) -> Vec<Arc<GraphNode>> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut post_order: Vec<Arc<GraphNode>> = Vec::new();
    // (node, inputs already pushed)
    let mut stack: Vec<(Arc<GraphNode>, bool)> = Vec::new();

    for root in roots {
        stack.push((Arc::clone(root), false));
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                post_order.push(node);
                continue;
            }
            if !visited.insert(GraphNode::id(&node)) {
                continue;
            }
            stack.push((Arc::clone(&node), true));
            if let Some(creator) = &node.creator {
                for input in creator.inputs.iter().flatten() {
                    if !visited.contains(&GraphNode::id(input)) {
                        stack.push((Arc::clone(input), false));
                    }
                }
            }
        }
    }

    post_order.reverse();
    log::trace!("topological_order: {} nodes reachable", post_order.len());
    post_order
}
