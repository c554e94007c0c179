// PlayLens - core/tree.rs
//
// Index arena backing the execution tree while a transcript is being parsed.
//
// The context keeps "current play/task/include" as plain `NodeId` handles
// into this arena; ownership only ever runs parent -> child. `into_root`
// assembles the arena into an owned `ExecutionNode` tree once parsing ends.

use crate::core::model::ExecutionNode;

/// Handle to a node in an [`ExecutionTree`]. Only valid for the tree that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Append-only arena of execution nodes.
#[derive(Debug)]
pub struct ExecutionTree {
    /// Node payloads. Their own `children` vectors stay empty until assembly.
    nodes: Vec<ExecutionNode>,
    /// Child handles per node, in insertion order.
    edges: Vec<Vec<NodeId>>,
}

impl ExecutionTree {
    /// Create a tree containing only `root`.
    pub fn new(root: ExecutionNode) -> Self {
        Self {
            nodes: vec![root],
            edges: vec![Vec::new()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `node` as the last child of `parent` and return its handle.
    pub fn append(&mut self, parent: NodeId, node: ExecutionNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.edges.push(Vec::new());
        self.edges[parent.0].push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> &ExecutionNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut ExecutionNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.edges[id.0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consume the arena and build the owned tree rooted at node 0.
    pub fn into_root(self) -> ExecutionNode {
        let Self { mut nodes, edges } = self;
        assemble(NodeId(0), &mut nodes, &edges)
    }
}

fn assemble(id: NodeId, nodes: &mut [ExecutionNode], edges: &[Vec<NodeId>]) -> ExecutionNode {
    // Every id appears exactly once in `edges`, so each payload is taken once.
    let mut node = std::mem::take(&mut nodes[id.0]);
    node.children = edges[id.0]
        .iter()
        .map(|&child| assemble(child, nodes, edges))
        .collect();
    node
}
