//! Composite behavior nodes.
//!
//! Composite nodes control the execution flow of multiple child behaviors.
//! This module provides the fundamental building blocks for creating complex
//! decision trees: [`Sequence`] (AND logic), [`Fallback`] (OR logic) and
//! [`Parallel`] (threshold logic).

use tracing::warn;

use crate::behavior::{Behavior, NodeKind, NodePorts, NodeType, TickContext};
use crate::config::NodeConfig;
use crate::port::{PortsList, input_port};
use crate::status::NodeStatus;

/// Executes children in order until one fails.
///
/// # Semantics
///
/// A `Sequence` node evaluates its children from left to right:
/// - If a child returns `Failure`, the sequence **stops immediately** and returns `Failure`
/// - If a child returns `Success`, the sequence **continues** to the next child
/// - If a child returns `Running`, the sequence returns `Running` and the next
///   tick **resumes at that child** instead of restarting from the first one
/// - If all children return `Success`, the sequence returns `Success`
///
/// On either terminal status the cursor goes back to the first child and all
/// children are reset to `Idle`.
#[derive(Debug, Default)]
pub struct Sequence {
    current: usize,
}

impl Sequence {
    fn reset(&mut self, ctx: &mut TickContext<'_>) {
        self.current = 0;
        ctx.halt_children();
    }
}

impl NodePorts for Sequence {
    fn kind() -> NodeKind {
        NodeKind::Control
    }
}

impl NodeType for Sequence {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self::default()
    }
}

impl Behavior for Sequence {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        while self.current < ctx.child_count() {
            match ctx.tick_child(self.current) {
                NodeStatus::Success => self.current += 1,
                NodeStatus::Running => return NodeStatus::Running,
                NodeStatus::Failure | NodeStatus::Idle => {
                    self.reset(ctx);
                    return NodeStatus::Failure;
                }
            }
        }
        self.reset(ctx);
        NodeStatus::Success
    }

    fn halt(&mut self, _ctx: &mut TickContext<'_>) {
        self.current = 0;
    }
}

/// Executes children in order until one succeeds.
///
/// # Semantics
///
/// A `Fallback` node evaluates its children from left to right:
/// - If a child returns `Success`, the fallback **stops immediately** and returns `Success`
/// - If a child returns `Failure`, the fallback **continues** to the next child
/// - If a child returns `Running`, the fallback returns `Running` and resumes
///   at that child on the next tick
/// - If all children return `Failure`, the fallback returns `Failure`
///
/// Cursor and children are reset on either terminal status.
#[derive(Debug, Default)]
pub struct Fallback {
    current: usize,
}

impl Fallback {
    fn reset(&mut self, ctx: &mut TickContext<'_>) {
        self.current = 0;
        ctx.halt_children();
    }
}

impl NodePorts for Fallback {
    fn kind() -> NodeKind {
        NodeKind::Control
    }
}

impl NodeType for Fallback {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self::default()
    }
}

impl Behavior for Fallback {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        while self.current < ctx.child_count() {
            match ctx.tick_child(self.current) {
                NodeStatus::Failure | NodeStatus::Idle => self.current += 1,
                NodeStatus::Running => return NodeStatus::Running,
                NodeStatus::Success => {
                    self.reset(ctx);
                    return NodeStatus::Success;
                }
            }
        }
        self.reset(ctx);
        NodeStatus::Failure
    }

    fn halt(&mut self, _ctx: &mut TickContext<'_>) {
        self.current = 0;
    }
}

/// Ticks all unfinished children every tick and decides by thresholds.
///
/// # Ports
///
/// - `success_count`: successes needed to return `Success`; `-1` means all
///   children (default)
/// - `failure_count`: failures that make the node return `Failure`
///   (default 1)
///
/// Children that already finished are not ticked again until the node
/// completes. When every child finished without reaching the success
/// threshold, the node fails.
#[derive(Debug, Default)]
pub struct Parallel {
    finished: Vec<bool>,
    successes: usize,
    failures: usize,
}

impl Parallel {
    fn reset(&mut self, ctx: &mut TickContext<'_>) {
        self.finished.clear();
        self.successes = 0;
        self.failures = 0;
        ctx.halt_children();
    }

    fn thresholds(ctx: &TickContext<'_>) -> Option<(usize, usize)> {
        let children = ctx.child_count();
        let read = |port: &str| match ctx.get_input::<i64>(port) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(
                    target: "behavior_tree::composite",
                    node = ctx.name(),
                    %error,
                    "invalid parallel threshold"
                );
                None
            }
        };

        let success = match read("success_count")? {
            n if n < 0 => children,
            n => n as usize,
        };
        let failure = match read("failure_count")? {
            n if n < 0 => children,
            n => n as usize,
        };

        if success == 0 || success > children || failure == 0 || failure > children {
            warn!(
                target: "behavior_tree::composite",
                node = ctx.name(),
                success,
                failure,
                children,
                "parallel thresholds out of range"
            );
            return None;
        }
        Some((success, failure))
    }
}

impl NodePorts for Parallel {
    fn provided_ports() -> PortsList {
        PortsList::new()
            .with(
                input_port("success_count")
                    .with_default(-1)
                    .with_description("successes required, -1 for all children"),
            )
            .with(
                input_port("failure_count")
                    .with_default(1)
                    .with_description("failures that abort the node"),
            )
    }

    fn kind() -> NodeKind {
        NodeKind::Control
    }
}

impl NodeType for Parallel {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self::default()
    }
}

impl Behavior for Parallel {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let Some((success_threshold, failure_threshold)) = Self::thresholds(ctx) else {
            self.reset(ctx);
            return NodeStatus::Failure;
        };

        let children = ctx.child_count();
        if self.finished.len() != children {
            self.finished = vec![false; children];
        }

        for index in 0..children {
            if self.finished[index] {
                continue;
            }
            match ctx.tick_child(index) {
                NodeStatus::Success => {
                    self.finished[index] = true;
                    self.successes += 1;
                }
                NodeStatus::Failure | NodeStatus::Idle => {
                    self.finished[index] = true;
                    self.failures += 1;
                }
                NodeStatus::Running => {}
            }

            if self.successes >= success_threshold {
                self.reset(ctx);
                return NodeStatus::Success;
            }
            if self.failures >= failure_threshold {
                self.reset(ctx);
                return NodeStatus::Failure;
            }
        }

        if self.finished.iter().all(|done| *done) {
            self.reset(ctx);
            return NodeStatus::Failure;
        }
        NodeStatus::Running
    }

    fn halt(&mut self, _ctx: &mut TickContext<'_>) {
        self.finished.clear();
        self.successes = 0;
        self.failures = 0;
    }
}
