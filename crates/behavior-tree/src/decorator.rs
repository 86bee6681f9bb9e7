//! Decorator behavior nodes.
//!
//! Decorators wrap a single child behavior and modify its result or execution.
//! This module provides [`Inverter`] (NOT logic), [`ForceSuccess`] and
//! [`ForceFailure`] (result suppression), [`Repeat`] (counted re-ticking) and
//! [`SubTree`] (pass-through root of an included tree).

use tracing::warn;

use crate::behavior::{Behavior, NodeKind, NodePorts, NodeType, TickContext};
use crate::config::NodeConfig;
use crate::port::{PortsList, input_port};
use crate::status::NodeStatus;

/// Index of the single child every decorator owns.
const CHILD: usize = 0;

/// Inverts the result of its child behavior.
///
/// # Semantics
///
/// - If the child returns `Success`, the inverter returns `Failure`
/// - If the child returns `Failure`, the inverter returns `Success`
/// - `Running` passes through
///
/// This is analogous to a logical NOT (!) operation.
#[derive(Debug, Default)]
pub struct Inverter;

impl NodePorts for Inverter {
    fn kind() -> NodeKind {
        NodeKind::Decorator
    }
}

impl NodeType for Inverter {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for Inverter {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.tick_child(CHILD).invert()
    }
}

/// Returns `Success` once the child completes, regardless of its result.
///
/// This is useful for:
/// - Optional behaviors that shouldn't cause a sequence to fail
/// - Logging/debugging nodes that observe state without affecting control flow
#[derive(Debug, Default)]
pub struct ForceSuccess;

impl NodePorts for ForceSuccess {
    fn kind() -> NodeKind {
        NodeKind::Decorator
    }
}

impl NodeType for ForceSuccess {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for ForceSuccess {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        match ctx.tick_child(CHILD) {
            NodeStatus::Running => NodeStatus::Running,
            _ => NodeStatus::Success,
        }
    }
}

/// Returns `Failure` once the child completes, regardless of its result.
#[derive(Debug, Default)]
pub struct ForceFailure;

impl NodePorts for ForceFailure {
    fn kind() -> NodeKind {
        NodeKind::Decorator
    }
}

impl NodeType for ForceFailure {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for ForceFailure {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        match ctx.tick_child(CHILD) {
            NodeStatus::Running => NodeStatus::Running,
            _ => NodeStatus::Failure,
        }
    }
}

/// Runs its child `num_cycles` times.
///
/// # Semantics
///
/// - Each tick runs at most one cycle of the child. While cycles remain the
///   node returns `Running`, so the host loop keeps control between cycles.
/// - A child `Failure` stops the loop and returns `Failure`.
/// - `num_cycles = -1` repeats forever; `0` succeeds without ticking.
///   Any other negative count fails without ticking.
#[derive(Debug, Default)]
pub struct Repeat {
    completed: u64,
}

impl NodePorts for Repeat {
    fn provided_ports() -> PortsList {
        PortsList::new().with(
            input_port("num_cycles")
                .with_default(1)
                .with_description("repetitions, -1 for infinite"),
        )
    }

    fn kind() -> NodeKind {
        NodeKind::Decorator
    }
}

impl NodeType for Repeat {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self::default()
    }
}

impl Behavior for Repeat {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let cycles = match ctx.get_input::<i64>("num_cycles") {
            Ok(cycles) => cycles,
            Err(error) => {
                warn!(
                    target: "behavior_tree::decorator",
                    node = ctx.name(),
                    %error,
                    "invalid num_cycles"
                );
                return NodeStatus::Failure;
            }
        };
        if cycles < -1 {
            warn!(
                target: "behavior_tree::decorator",
                node = ctx.name(),
                cycles,
                "num_cycles must be -1 or non-negative"
            );
            return NodeStatus::Failure;
        }
        if cycles == 0 {
            return NodeStatus::Success;
        }

        match ctx.tick_child(CHILD) {
            NodeStatus::Success => {
                self.completed += 1;
                ctx.halt_child(CHILD);
                if cycles > 0 && self.completed >= cycles as u64 {
                    self.completed = 0;
                    NodeStatus::Success
                } else {
                    NodeStatus::Running
                }
            }
            NodeStatus::Failure => {
                self.completed = 0;
                ctx.halt_child(CHILD);
                NodeStatus::Failure
            }
            NodeStatus::Running | NodeStatus::Idle => NodeStatus::Running,
        }
    }

    fn halt(&mut self, _ctx: &mut TickContext<'_>) {
        self.completed = 0;
    }
}

/// Root of an included tree.
///
/// The tree builder instantiates the tree named by the `ID` port as the
/// only child, under a blackboard scope that falls back to the including
/// tree's scope. Ticking passes the child's status through.
#[derive(Debug, Default)]
pub struct SubTree;

impl NodePorts for SubTree {
    fn provided_ports() -> PortsList {
        PortsList::new().with(input_port("ID").with_description("id of the included tree"))
    }

    fn kind() -> NodeKind {
        NodeKind::SubTree
    }
}

impl NodeType for SubTree {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for SubTree {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.tick_child(CHILD)
    }
}
