//! Feature graph runtime representation.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};

use super::definition::{GraphDefinition, NodeDefinition};
use super::edge::EdgeData;
use super::mode::GraphMode;
use super::node::{Node, NodeKind};
use super::{NodeId, TRACING_TARGET};
use crate::engine::{Dependencies, RunMode};
use crate::error::{Error, Result};
use crate::transform::Transformation;

/// An owning registry of the nodes of one feature pipeline.
///
/// Internally uses petgraph's `DiGraph`; edges point from an upstream node to
/// the node consuming its value and carry the argument position they feed.
pub struct Graph<V> {
    /// The underlying directed graph.
    graph: DiGraph<Node<V>, EdgeData>,
    /// Mapping from NodeId to petgraph's NodeIndex.
    node_indices: HashMap<NodeId, NodeIndex>,
    /// Mapping from node name to NodeId.
    names: HashMap<String, NodeId>,
    /// When nodes are evaluated.
    mode: GraphMode,
}

impl<V> Graph<V> {
    /// Creates a new empty graph in the given mode.
    pub fn new(mode: GraphMode) -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            names: HashMap::new(),
            mode,
        }
    }

    /// Creates a new empty graph that evaluates nodes as they are added.
    pub fn eager() -> Self {
        Self::new(GraphMode::Eager)
    }

    /// Creates a new empty graph that defers evaluation to pipeline runs.
    pub fn lazy() -> Self {
        Self::new(GraphMode::Lazy)
    }

    /// Returns the evaluation mode.
    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns whether a node belongs to this graph.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_indices.contains_key(&id)
    }

    /// Returns a reference to a node.
    pub fn node(&self, id: NodeId) -> Option<&Node<V>> {
        let index = self.node_indices.get(&id)?;
        self.graph.node_weight(*index)
    }

    /// Returns a node by name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node<V>> {
        self.names.get(name).and_then(|id| self.node(*id))
    }

    /// Returns the ID of the node with the given name.
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Returns an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<V>> {
        self.graph.node_weights()
    }

    /// Returns the value a node materialized during eager construction.
    pub fn cached_output(&self, id: NodeId) -> Option<&V> {
        self.node(id).and_then(Node::cached_output)
    }

    /// Returns the upstream nodes of a node, in argument order.
    pub fn inbound_nodes(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let index = self.index(id)?;
        Ok(self
            .inbound_indices(index)
            .into_iter()
            .map(|upstream| self.graph[upstream].id())
            .collect())
    }

    /// Returns the downstream nodes consuming a node's value.
    pub fn outbound_nodes(&self, id: NodeId) -> Result<BTreeSet<NodeId>> {
        let index = self.index(id)?;
        Ok(self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .map(|downstream| self.graph[downstream].id())
            .collect())
    }

    /// Sets or clears the descriptive output shape of a node.
    pub fn set_shape(&mut self, id: NodeId, shape: Option<Vec<usize>>) -> Result<()> {
        let index = self.index(id)?;
        self.graph[index].set_shape(shape);
        Ok(())
    }

    /// Replaces the upstream nodes of `id` with `upstream`, in order.
    ///
    /// Fails with [`Error::Cycle`] if `id` is already an ancestor of any of
    /// the new upstream nodes. Values materialized eagerly by `id` and its
    /// descendants are discarded, since they were computed from the old edges.
    pub fn connect(&mut self, id: NodeId, upstream: &[NodeId]) -> Result<()> {
        let index = self.index(id)?;
        let upstream = self.indices(upstream)?;
        let node = &self.graph[index];

        if node.is_input() {
            return Err(Error::InvalidGraph(format!(
                "input node `{}` cannot have upstream nodes",
                node.name()
            )));
        }
        self.check_arity(node, upstream.len())?;

        for &candidate in &upstream {
            if candidate == index || has_path_connecting(&self.graph, index, candidate, None) {
                return Err(Error::Cycle {
                    node: self.graph[index].name().to_owned(),
                });
            }
        }

        let mut stale: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| edge.id())
            .collect();
        // Removal swaps the last edge into the freed slot.
        stale.sort_unstable_by(|a, b| b.cmp(a));
        for edge in stale {
            self.graph.remove_edge(edge);
        }
        self.link(index, &upstream);

        let mut dfs = Dfs::new(&self.graph, index);
        while let Some(descendant) = dfs.next(&self.graph) {
            self.graph[descendant].set_cached_output(None);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            node = %self.graph[index].name(),
            upstream_count = upstream.len(),
            "Node reconnected"
        );

        Ok(())
    }

    /// Converts the graph to a serializable, read-only definition.
    pub fn to_definition(&self) -> GraphDefinition {
        let nodes = self
            .graph
            .node_indices()
            .map(|index| {
                let node = &self.graph[index];
                NodeDefinition {
                    id: node.id(),
                    name: node.name().to_owned(),
                    kind: node.kind(),
                    shape: node.shape().map(<[usize]>::to_vec),
                    inbound: self
                        .inbound_indices(index)
                        .into_iter()
                        .map(|upstream| self.graph[upstream].name().to_owned())
                        .collect(),
                }
            })
            .collect();

        GraphDefinition {
            mode: self.mode,
            nodes,
        }
    }

    /// Returns the graph index of a node owned by this graph.
    pub(crate) fn index(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_indices
            .get(&id)
            .copied()
            .ok_or(Error::UnknownNode(id))
    }

    /// Returns a mutable reference to a node.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<V>> {
        let index = self.index(id)?;
        Ok(&mut self.graph[index])
    }

    fn indices(&self, ids: &[NodeId]) -> Result<Vec<NodeIndex>> {
        ids.iter().map(|id| self.index(*id)).collect()
    }

    fn inbound_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| (edge.weight().position, edge.source()))
            .collect();
        edges.sort_unstable_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, source)| source).collect()
    }

    fn ensure_name_free(&self, name: &str) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn check_arity(&self, node: &Node<V>, upstream_count: usize) -> Result<()> {
        match node.kind() {
            NodeKind::Output if upstream_count != 1 => Err(Error::InvalidGraph(format!(
                "output node `{}` takes exactly one upstream node, got {upstream_count}",
                node.name()
            ))),
            NodeKind::Transformation if upstream_count == 0 => {
                Err(Error::InvalidGraph(format!(
                    "transformation node `{}` needs at least one upstream node",
                    node.name()
                )))
            }
            _ => Ok(()),
        }
    }

    fn insert(&mut self, node: Node<V>) -> (NodeId, NodeIndex) {
        let id = node.id();
        self.names.insert(node.name().to_owned(), id);
        let index = self.graph.add_node(node);
        self.node_indices.insert(id, index);
        (id, index)
    }

    fn link(&mut self, index: NodeIndex, upstream: &[NodeIndex]) {
        for (position, &source) in upstream.iter().enumerate() {
            self.graph.add_edge(source, index, EdgeData { position });
        }
    }
}

impl<V: Clone> Graph<V> {
    /// Adds an input node with no upstream nodes.
    pub fn add_input(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        self.ensure_name_free(&name)?;

        let (id, _) = self.insert(Node::input(name));
        tracing::trace!(target: TRACING_TARGET, node_id = %id, "Input node added");
        Ok(id)
    }

    /// Adds an input node and materializes it with `value`.
    ///
    /// Only eager graphs accept values at construction; lazy graphs receive
    /// them through pipeline runs.
    pub fn add_input_with_value(&mut self, name: impl Into<String>, value: V) -> Result<NodeId> {
        let name = name.into();
        if self.mode.is_lazy() {
            return Err(Error::InvalidGraph(format!(
                "cannot materialize input `{name}` in a lazy graph"
            )));
        }
        self.ensure_name_free(&name)?;

        let mut node = Node::input(name);
        node.set_cached_output(Some(value));
        let (id, _) = self.insert(node);
        tracing::trace!(
            target: TRACING_TARGET,
            node_id = %id,
            materialized = true,
            "Input node added"
        );
        Ok(id)
    }

    /// Adds a transformation node applying `payload` to `upstream`, in order.
    ///
    /// In eager mode the node is evaluated in [`RunMode::Fit`] right away when
    /// every upstream node already holds a value; read the result with
    /// [`cached_output`](Self::cached_output). The node is only added if
    /// that evaluation succeeds.
    pub fn add_transformation<T>(
        &mut self,
        name: impl Into<String>,
        payload: T,
        upstream: &[NodeId],
    ) -> Result<NodeId>
    where
        T: Transformation<V> + 'static,
    {
        let node = Node::transformation(name.into(), Box::new(payload));
        self.add_connected(node, upstream)
    }

    /// Adds an output marker node forwarding the value of `upstream`.
    pub fn add_output(&mut self, name: impl Into<String>, upstream: NodeId) -> Result<NodeId> {
        self.add_connected(Node::output(name.into()), &[upstream])
    }

    fn add_connected(&mut self, mut node: Node<V>, upstream: &[NodeId]) -> Result<NodeId> {
        self.ensure_name_free(node.name())?;
        let upstream = self.indices(upstream)?;
        self.check_arity(&node, upstream.len())?;

        if self.mode.is_eager() {
            let values: Option<Vec<&V>> = upstream
                .iter()
                .map(|index| self.graph[*index].cached_output())
                .collect();

            if let Some(values) = values {
                let value = node.evaluate(&values, RunMode::Fit)?;
                node.set_cached_output(Some(value));
            }
        }

        let materialized = node.cached_output().is_some();
        let (id, index) = self.insert(node);
        self.link(index, &upstream);

        tracing::trace!(
            target: TRACING_TARGET,
            node = %self.graph[index].name(),
            upstream_count = upstream.len(),
            materialized,
            "Node added"
        );

        Ok(id)
    }
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self::new(GraphMode::default())
    }
}

impl<V> Dependencies for Graph<V> {
    fn inbound(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.inbound_nodes(id)
    }

    fn label(&self, id: NodeId) -> String {
        self.node(id)
            .map(|node| node.name().to_owned())
            .unwrap_or_else(|| id.to_string())
    }
}

impl<V> std::fmt::Debug for Graph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("mode", &self.mode)
            .field("node_count", &self.graph.node_count())
            .field("edge_count", &self.graph.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Identity, Lambda};

    fn double() -> impl Transformation<i64> {
        Lambda::new(|inputs: &[&i64]| Ok(inputs[0] * 2))
    }

    fn sum() -> impl Transformation<i64> {
        Lambda::new(|inputs: &[&i64]| Ok(inputs.iter().copied().sum::<i64>()))
    }

    #[test]
    fn test_duplicate_input_name() {
        let mut graph = Graph::<i64>::lazy();
        graph.add_input("age").unwrap();

        let error = graph.add_input("age").unwrap_err();
        assert!(matches!(error, Error::DuplicateName { name } if name == "age"));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_duplicate_name_across_roles() {
        let mut graph = Graph::<i64>::lazy();
        let a = graph.add_input("a").unwrap();
        let error = graph.add_transformation("a", double(), &[a]).unwrap_err();
        assert!(matches!(error, Error::DuplicateName { .. }));
    }

    #[test]
    fn test_edges_keep_argument_order() {
        let mut graph = Graph::<i64>::lazy();
        let a = graph.add_input("a").unwrap();
        let b = graph.add_input("b").unwrap();
        let c = graph.add_transformation("c", sum(), &[b, a, b]).unwrap();

        assert_eq!(graph.inbound_nodes(c).unwrap(), vec![b, a, b]);
        assert_eq!(graph.outbound_nodes(b).unwrap(), BTreeSet::from([c]));
        assert!(graph.inbound_nodes(a).unwrap().is_empty());
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_foreign_node_is_rejected() {
        let mut other = Graph::<i64>::lazy();
        let foreign = other.add_input("x").unwrap();

        let mut graph = Graph::<i64>::lazy();
        let error = graph.add_transformation("y", double(), &[foreign]).unwrap_err();
        assert!(matches!(error, Error::UnknownNode(id) if id == foreign));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_transformation_requires_upstream() {
        let mut graph = Graph::<i64>::lazy();
        let error = graph.add_transformation("t", double(), &[]).unwrap_err();
        assert!(matches!(error, Error::InvalidGraph(_)));
    }

    #[test]
    fn test_lazy_graph_does_not_evaluate() {
        let mut graph = Graph::<i64>::lazy();
        let a = graph.add_input("a").unwrap();
        let b = graph.add_transformation("b", double(), &[a]).unwrap();
        assert!(graph.cached_output(b).is_none());
        assert!(graph.add_input_with_value("c", 1).is_err());
    }

    #[test]
    fn test_eager_graph_evaluates_on_construction() {
        let mut graph = Graph::<i64>::eager();
        let a = graph.add_input_with_value("a", 5).unwrap();
        let b = graph.add_transformation("b", double(), &[a]).unwrap();
        let c = graph.add_output("c", b).unwrap();

        assert_eq!(graph.cached_output(b), Some(&10));
        assert_eq!(graph.cached_output(c), Some(&10));
        assert_eq!(graph.node(c).unwrap().kind(), NodeKind::Output);
    }

    #[test]
    fn test_eager_graph_waits_for_values() {
        let mut graph = Graph::<i64>::eager();
        let a = graph.add_input("a").unwrap();
        let b = graph.add_input_with_value("b", 1).unwrap();
        let c = graph.add_transformation("c", sum(), &[a, b]).unwrap();
        assert!(graph.cached_output(c).is_none());
    }

    #[test]
    fn test_eager_failure_does_not_add_node() {
        let mut graph = Graph::<i64>::eager();
        let a = graph.add_input_with_value("a", 0).unwrap();
        let failing = Lambda::new(|_: &[&i64]| Err("bad input".into()));

        let error = graph.add_transformation("b", failing, &[a]).unwrap_err();
        assert!(matches!(
            error,
            Error::Evaluation { ref node, mode: RunMode::Fit, .. } if node == "b"
        ));
        assert!(graph.id_of("b").is_none());
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_connect_rejects_cycle() {
        let mut graph = Graph::<i64>::lazy();
        let a = graph.add_input("a").unwrap();
        let b = graph.add_transformation("b", Identity, &[a]).unwrap();
        let c = graph.add_transformation("c", Identity, &[b]).unwrap();

        let error = graph.connect(b, &[c]).unwrap_err();
        assert!(matches!(error, Error::Cycle { node } if node == "b"));
        let error = graph.connect(b, &[b]).unwrap_err();
        assert!(matches!(error, Error::Cycle { .. }));
        assert_eq!(graph.inbound_nodes(b).unwrap(), vec![a]);
    }

    #[test]
    fn test_connect_rewires_and_clears_eager_values() {
        let mut graph = Graph::<i64>::eager();
        let a = graph.add_input_with_value("a", 1).unwrap();
        let b = graph.add_input_with_value("b", 2).unwrap();
        let c = graph.add_transformation("c", double(), &[a]).unwrap();
        let d = graph.add_transformation("d", double(), &[c]).unwrap();
        assert_eq!(graph.cached_output(d), Some(&4));

        graph.connect(c, &[b]).unwrap();
        assert_eq!(graph.inbound_nodes(c).unwrap(), vec![b]);
        assert!(graph.outbound_nodes(a).unwrap().is_empty());
        assert!(graph.cached_output(c).is_none());
        assert!(graph.cached_output(d).is_none());
        assert_eq!(graph.cached_output(b), Some(&2));
    }

    #[test]
    fn test_connect_rejects_input_upstream() {
        let mut graph = Graph::<i64>::lazy();
        let a = graph.add_input("a").unwrap();
        let b = graph.add_input("b").unwrap();
        assert!(matches!(
            graph.connect(a, &[b]),
            Err(Error::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_definition_lists_nodes_in_order() {
        let mut graph = Graph::<i64>::lazy();
        let a = graph.add_input("a").unwrap();
        let b = graph.add_transformation("b", double(), &[a]).unwrap();
        graph.add_output("out", b).unwrap();
        graph.set_shape(b, Some(vec![3])).unwrap();

        let definition = graph.to_definition();
        let names: Vec<_> = definition.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "out"]);
        assert_eq!(definition.nodes[1].inbound, ["a"]);
        assert_eq!(definition.nodes[1].shape, Some(vec![3]));
        assert_eq!(definition.nodes[2].kind, NodeKind::Output);
    }
}
