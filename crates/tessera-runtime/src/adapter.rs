//! Input node factories for columnar data sources.
//!
//! A columnar source (a dataframe, a CSV reader) calls into the graph once
//! per column, producing a mapping from column name to input node that the
//! caller then wires transformations onto.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::graph::{Graph, NodeId};

/// Tracing target for adapters.
const TRACING_TARGET: &str = "tessera_runtime::adapter";

/// Creates one input node per column name.
pub fn from_column_names<V, I, K>(
    graph: &mut Graph<V>,
    names: I,
) -> Result<BTreeMap<String, NodeId>>
where
    V: Clone,
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let mut nodes = BTreeMap::new();
    for name in names {
        let name = name.into();
        let id = graph.add_input(name.clone())?;
        nodes.insert(name, id);
    }
    Ok(nodes)
}

/// Creates one input node per column.
///
/// Eager graphs materialize each input with its column values. Lazy graphs
/// only record the column names; their values are supplied to each pipeline
/// run instead.
pub fn from_columns<V, I, K>(graph: &mut Graph<V>, columns: I) -> Result<BTreeMap<String, NodeId>>
where
    V: Clone,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
{
    let eager = graph.mode().is_eager();
    let mut nodes = BTreeMap::new();
    for (name, values) in columns {
        let name = name.into();
        let id = if eager {
            graph.add_input_with_value(name.clone(), values)?
        } else {
            graph.add_input(name.clone())?
        };
        nodes.insert(name, id);
    }

    tracing::debug!(
        target: TRACING_TARGET,
        mode = %graph.mode(),
        column_count = nodes.len(),
        "Input nodes created from columns"
    );

    Ok(nodes)
}
