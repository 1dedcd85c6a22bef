//! Pipeline executor.

use std::collections::{BTreeMap, HashMap};

use super::context::ExecutionContext;
use super::scheduler;
use super::{FittedState, NodeRole, PipelineConfig, RunMode, TRACING_TARGET};
use crate::error::{Error, Result};
use crate::graph::{Graph, Node, NodeId};
use crate::transform::Transformation;

/// Runs a feature graph to produce the values of requested output nodes.
///
/// A pipeline borrows its graph mutably: `fit` runs update the learned
/// parameters of stateful transformations, and graph structure cannot change
/// while a pipeline exists. Values computed during a run live in a
/// run-scoped [`ExecutionContext`] and are dropped when the run ends.
pub struct Pipeline<'g, V> {
    graph: &'g mut Graph<V>,
    config: PipelineConfig,
}

impl<'g, V: Clone> Pipeline<'g, V> {
    /// Creates a pipeline over `graph` with default configuration.
    pub fn new(graph: &'g mut Graph<V>) -> Self {
        Self::with_config(graph, PipelineConfig::default())
    }

    /// Creates a pipeline over `graph` with the given configuration.
    pub fn with_config(graph: &'g mut Graph<V>, config: PipelineConfig) -> Self {
        Self { graph, config }
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the graph this pipeline runs.
    pub fn graph(&self) -> &Graph<V> {
        &*self.graph
    }

    /// Returns the nodes a run for `outputs` evaluates, in execution order.
    pub fn order(&self, outputs: &[NodeId]) -> Result<Vec<NodeId>> {
        scheduler::order(&*self.graph, outputs)
    }

    /// Classifies a node relative to a set of requested outputs.
    ///
    /// Only nodes a run for `outputs` would evaluate have a role; any other
    /// node is rejected with [`Error::InvalidInput`].
    pub fn role(&self, id: NodeId, outputs: &[NodeId]) -> Result<NodeRole> {
        let node = self.node(id)?;
        if !self.order(outputs)?.contains(&id) {
            return Err(Error::InvalidInput(format!(
                "node `{}` is not needed for the requested outputs",
                node.name()
            )));
        }
        let role = if node.is_input() {
            NodeRole::Input
        } else if outputs.contains(&id) {
            NodeRole::Output
        } else {
            NodeRole::Intermediate
        };
        Ok(role)
    }

    /// Runs the graph in [`RunMode::Fit`].
    pub fn fit<I, K>(&mut self, outputs: &[NodeId], raw_inputs: I) -> Result<BTreeMap<String, V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        self.run(outputs, raw_inputs, RunMode::Fit)
    }

    /// Runs the graph in [`RunMode::Transform`].
    pub fn transform<I, K>(
        &mut self,
        outputs: &[NodeId],
        raw_inputs: I,
    ) -> Result<BTreeMap<String, V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        self.run(outputs, raw_inputs, RunMode::Transform)
    }

    /// Evaluates the ancestors of `outputs` and returns the outputs' values.
    ///
    /// `raw_inputs` maps input node names to values; every input node the
    /// outputs depend on must be present. The result is keyed by the names
    /// of the requested outputs. A failed run returns no values at all.
    pub fn run<I, K>(
        &mut self,
        outputs: &[NodeId],
        raw_inputs: I,
        mode: RunMode,
    ) -> Result<BTreeMap<String, V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut raw: HashMap<String, V> = raw_inputs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();

        let mut requested = Vec::with_capacity(outputs.len());
        for &id in outputs {
            self.node(id)?;
            if !requested.contains(&id) {
                requested.push(id);
            }
        }
        if requested.is_empty() {
            return Err(Error::InvalidInput("no output nodes requested".into()));
        }

        self.check_raw_inputs(&raw)?;
        let order = self.order(&requested)?;

        // Checked up front so a fit run never updates some payloads and then
        // stops on a missing value.
        for &id in &order {
            let node = self.node(id)?;
            if node.is_input() && !raw.contains_key(node.name()) {
                return Err(Error::MissingInput {
                    name: node.name().to_owned(),
                });
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            pipeline = %self.config.name,
            mode = %mode,
            node_count = order.len(),
            output_count = requested.len(),
            "Starting pipeline run"
        );

        let mut ctx = ExecutionContext::new(mode);
        for &id in &order {
            self.evaluate(id, &mut raw, &mut ctx)?;
        }

        let mut results = BTreeMap::new();
        for id in requested {
            let name = self.node(id)?.name().to_owned();
            let value = ctx.take(id).ok_or_else(|| {
                Error::InvalidGraph(format!("output `{name}` was not produced"))
            })?;
            results.insert(name, value);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            pipeline = %self.config.name,
            mode = %mode,
            evaluated = ctx.evaluated(),
            "Pipeline run completed"
        );

        Ok(results)
    }

    /// Exports the learned parameters of every stateful transformation.
    pub fn save_state(&self) -> FittedState {
        let mut state = FittedState::new();
        for node in self.graph.nodes().filter(|node| node.is_stateful()) {
            if let Some(params) = node.payload().and_then(|payload| payload.save_state()) {
                state.insert(node.name(), params);
            }
        }
        state
    }

    /// Restores learned parameters exported by [`save_state`](Self::save_state).
    ///
    /// Every entry must name a stateful transformation node of this graph.
    /// The call is all or nothing: if any payload rejects its parameters, the
    /// payloads restored before it are rolled back to their previous state.
    pub fn load_state(&mut self, state: &FittedState) -> Result<()> {
        let mut targets = Vec::with_capacity(state.len());
        for (name, params) in state.iter() {
            let id = self.graph.id_of(name).ok_or_else(|| {
                Error::InvalidInput(format!("fitted state names unknown node `{name}`"))
            })?;
            if !self.node(id)?.is_stateful() {
                return Err(Error::InvalidInput(format!(
                    "node `{name}` has no learned parameters to restore"
                )));
            }
            targets.push((id, name, params));
        }

        let mut restored = Vec::with_capacity(targets.len());
        for (id, name, params) in targets {
            let payload = self.payload_mut(id)?;
            let previous = payload.save_state();
            if let Err(source) = payload.load_state(params.clone()) {
                self.rollback(restored);
                return Err(Error::InvalidInput(format!(
                    "cannot restore state of `{name}`: {source}"
                )));
            }
            restored.push((id, previous));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            pipeline = %self.config.name,
            restored = state.len(),
            "Fitted state restored"
        );

        Ok(())
    }

    /// Puts back the parameters payloads held before a failed restore.
    fn rollback(&mut self, restored: Vec<(NodeId, Option<serde_json::Value>)>) {
        for (id, previous) in restored.into_iter().rev() {
            let payload = match self.payload_mut(id) {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(target: TRACING_TARGET, error = %error, "Rollback skipped node");
                    continue;
                }
            };

            let Some(previous) = previous else {
                payload.reset();
                continue;
            };
            if let Err(error) = payload.load_state(previous) {
                tracing::warn!(
                    target: TRACING_TARGET,
                    pipeline = %self.config.name,
                    node_id = %id,
                    error = %error,
                    "Failed to roll back fitted state"
                );
            }
        }
    }

    fn payload_mut(&mut self, id: NodeId) -> Result<&mut (dyn Transformation<V> + 'static)> {
        self.graph
            .node_mut(id)?
            .payload_mut()
            .ok_or_else(|| Error::InvalidGraph(format!("node {id} has no transformation")))
    }

    fn node(&self, id: NodeId) -> Result<&Node<V>> {
        self.graph.node(id).ok_or(Error::UnknownNode(id))
    }

    fn check_raw_inputs(&self, raw: &HashMap<String, V>) -> Result<()> {
        let mut unknown: Vec<&str> = raw
            .keys()
            .map(String::as_str)
            .filter(|name| !self.graph.node_by_name(name).is_some_and(Node::is_input))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        unknown.sort_unstable();

        if self.config.strict_inputs {
            return Err(Error::InvalidInput(format!(
                "values supplied for unknown inputs: {}",
                unknown.join(", ")
            )));
        }

        tracing::warn!(
            target: TRACING_TARGET,
            pipeline = %self.config.name,
            ignored = ?unknown,
            "Ignoring values that do not name an input node"
        );
        Ok(())
    }

    fn evaluate(
        &mut self,
        id: NodeId,
        raw: &mut HashMap<String, V>,
        ctx: &mut ExecutionContext<V>,
    ) -> Result<()> {
        let node = self.node(id)?;
        if node.is_input() {
            let name = node.name();
            let value = raw.remove(name).ok_or_else(|| Error::MissingInput {
                name: name.to_owned(),
            })?;
            ctx.seed(id, value);
            return Ok(());
        }

        let inbound = self.graph.inbound_nodes(id)?;
        let value = {
            let inputs = inbound
                .iter()
                .map(|upstream| {
                    ctx.get(*upstream).ok_or_else(|| {
                        Error::InvalidGraph(format!("upstream node {upstream} has no value"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let node = self.graph.node_mut(id)?;
            tracing::trace!(
                target: TRACING_TARGET,
                node = %node.name(),
                kind = %node.kind(),
                input_count = inputs.len(),
                "Evaluating node"
            );
            node.evaluate(&inputs, ctx.mode())?
        };

        ctx.record(id, value);
        Ok(())
    }
}

impl<V> std::fmt::Debug for Pipeline<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .finish()
    }
}
