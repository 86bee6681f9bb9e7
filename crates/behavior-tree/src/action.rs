//! Leaf nodes and leaf adapters.
//!
//! - Built-in leaves: [`AlwaysSuccess`], [`AlwaysFailure`], [`SetBlackboard`]
//! - [`SimpleAction`]: a closure registered as an action or condition
//! - [`StatefulAction`] + [`Stateful`]: the asynchronous leaf contract

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::behavior::{Behavior, NodePorts, NodeType, TickContext};
use crate::config::NodeConfig;
use crate::port::{PortValue, PortsList, bidirectional_port, input_port};
use crate::status::NodeStatus;

/// Leaf that always succeeds.
#[derive(Debug, Default)]
pub struct AlwaysSuccess;

impl NodePorts for AlwaysSuccess {}

impl NodeType for AlwaysSuccess {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for AlwaysSuccess {
    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
        NodeStatus::Success
    }
}

/// Leaf that always fails.
#[derive(Debug, Default)]
pub struct AlwaysFailure;

impl NodePorts for AlwaysFailure {}

impl NodeType for AlwaysFailure {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for AlwaysFailure {
    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
        NodeStatus::Failure
    }
}

/// Writes the text of port `value` into the blackboard entry named by
/// port `output_key`.
///
/// `output_key` accepts the key name itself (`output_key="target"`) or a
/// reference (`output_key="{target}"`); both write entry `target` in the
/// node's own scope.
#[derive(Debug, Default)]
pub struct SetBlackboard;

impl NodePorts for SetBlackboard {
    fn provided_ports() -> PortsList {
        PortsList::new()
            .with(input_port("value").with_description("text to store"))
            .with(bidirectional_port("output_key").with_description("blackboard key to write"))
    }
}

impl NodeType for SetBlackboard {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self
    }
}

impl Behavior for SetBlackboard {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let written = ctx
            .get_input::<String>("value")
            .and_then(|value| match ctx.config().port("output_key") {
                Some(PortValue::Literal(key)) => {
                    ctx.config().blackboard().set(key.clone(), value);
                    Ok(())
                }
                _ => ctx.set_output("output_key", value),
            });

        match written {
            Ok(()) => NodeStatus::Success,
            Err(error) => {
                warn!(
                    target: "behavior_tree::action",
                    node = ctx.name(),
                    %error,
                    "SetBlackboard failed"
                );
                NodeStatus::Failure
            }
        }
    }
}

/// Tick function of a [`SimpleAction`].
pub type TickFunction = Arc<dyn Fn(&NodeConfig) -> NodeStatus + Send + Sync>;

/// Leaf whose tick is a shared closure over the node's configuration.
///
/// Registered through
/// [`Registry::register_simple_action`](crate::Registry::register_simple_action)
/// or [`register_simple_condition`](crate::Registry::register_simple_condition).
#[derive(Clone)]
pub struct SimpleAction {
    tick_fn: TickFunction,
}

impl SimpleAction {
    pub fn new(tick_fn: TickFunction) -> Self {
        Self { tick_fn }
    }
}

impl Behavior for SimpleAction {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        (self.tick_fn)(ctx.config())
    }
}

impl fmt::Debug for SimpleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleAction").finish_non_exhaustive()
    }
}

/// Asynchronous leaf contract.
///
/// The first tick calls `on_start`; while the action reports `Running`,
/// later ticks call `on_running`. If the tree halts the action while it is
/// running, `on_halted` performs cleanup and the next tick starts over with
/// `on_start`.
///
/// Long work belongs outside `tick` (a thread, a channel, a timer); these
/// callbacks only check progress.
pub trait StatefulAction: Send + Sized + 'static {
    fn new(name: &str, config: &NodeConfig) -> Self;

    fn provided_ports() -> PortsList {
        PortsList::new()
    }

    fn on_start(&mut self, config: &NodeConfig) -> NodeStatus;

    fn on_running(&mut self, config: &NodeConfig) -> NodeStatus;

    fn on_halted(&mut self, _config: &NodeConfig) {}
}

/// Adapts a [`StatefulAction`] to [`Behavior`].
#[derive(Debug)]
pub struct Stateful<T> {
    inner: T,
    running: bool,
}

impl<T> Stateful<T> {
    pub fn wrap(inner: T) -> Self {
        Self {
            inner,
            running: false,
        }
    }
}

impl<T: StatefulAction> Behavior for Stateful<T> {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let status = if self.running {
            self.inner.on_running(ctx.config())
        } else {
            self.inner.on_start(ctx.config())
        };
        self.running = status.is_running();
        status
    }

    fn halt(&mut self, ctx: &mut TickContext<'_>) {
        if self.running {
            self.inner.on_halted(ctx.config());
            self.running = false;
        }
    }
}

impl<T: StatefulAction> NodePorts for Stateful<T> {
    fn provided_ports() -> PortsList {
        T::provided_ports()
    }
}

impl<T: StatefulAction> NodeType for Stateful<T> {
    fn new(name: &str, config: &NodeConfig) -> Self {
        Self::wrap(T::new(name, config))
    }
}
