//! Topological ordering of the nodes a run needs.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graph::NodeId;

/// Read access to the upstream edges of a set of nodes.
pub trait Dependencies {
    /// Returns the upstream nodes of `id`, in argument order.
    fn inbound(&self, id: NodeId) -> Result<Vec<NodeId>>;

    /// Returns a human-readable label for `id`, used in error messages.
    fn label(&self, id: NodeId) -> String;
}

#[derive(Clone, Copy)]
enum Mark {
    /// On the current traversal path.
    Active,
    /// Emitted, along with all of its ancestors.
    Done,
}

struct Frame {
    node: NodeId,
    inbound: Vec<NodeId>,
    cursor: usize,
}

/// Returns every ancestor of `outputs`, outputs included, in dependency order.
///
/// Each node appears exactly once and after all of its inbound nodes. The
/// walk starts from the outputs in the given order and visits inbound nodes
/// in argument order, so the same graph always yields the same order. Nodes
/// not reachable from `outputs` are left out.
pub fn order<D>(deps: &D, outputs: &[NodeId]) -> Result<Vec<NodeId>>
where
    D: Dependencies + ?Sized,
{
    let mut marks: HashMap<NodeId, Mark> = HashMap::new();
    let mut order = Vec::new();

    for &output in outputs {
        if marks.contains_key(&output) {
            continue;
        }

        marks.insert(output, Mark::Active);
        let mut stack = vec![Frame {
            node: output,
            inbound: deps.inbound(output)?,
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = frame.inbound.get(frame.cursor) else {
                let node = frame.node;
                stack.pop();
                marks.insert(node, Mark::Done);
                order.push(node);
                continue;
            };
            frame.cursor += 1;

            match marks.get(&next) {
                Some(Mark::Done) => {}
                Some(Mark::Active) => {
                    return Err(Error::Cycle {
                        node: deps.label(next),
                    });
                }
                None => {
                    marks.insert(next, Mark::Active);
                    stack.push(Frame {
                        node: next,
                        inbound: deps.inbound(next)?,
                        cursor: 0,
                    });
                }
            }
        }
    }

    Ok(order)
}
