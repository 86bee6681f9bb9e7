//! Node types available to `bt` trees.
//!
//! `Action_A` and `Action_B` take the same three static arguments, handed
//! over in two different ways:
//!
//! - `Action_A` is registered with a builder closure that captures them
//! - `Action_B` is built from `(name, config)` like any other node and
//!   receives them afterwards through [`Tree::initialize`]

use std::fmt;

use behavior_tree::{
    Behavior, InitError, Initialize, NodeConfig, NodePorts, NodeStatus, NodeType, PortsList,
    Registry, Stateful, StatefulAction, TickContext, Tree, input_port,
};
use tracing::{info, warn};

pub const ACTION_A: &str = "Action_A";
pub const ACTION_B: &str = "Action_B";

/// Static arguments of the demo actions.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionArgs {
    pub number: i32,
    pub ratio: f64,
    pub text: String,
}

impl fmt::Display for ActionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.number, self.ratio, self.text)
    }
}

/// Arguments captured by the `Action_A` builder.
#[allow(clippy::approx_constant)]
pub fn action_a_args() -> ActionArgs {
    ActionArgs {
        number: 42,
        ratio: 3.14,
        text: "hello world".to_string(),
    }
}

/// Arguments passed to `Action_B` after construction.
pub fn action_b_args() -> ActionArgs {
    ActionArgs {
        number: 69,
        ratio: 9.99,
        text: "interesting_value".to_string(),
    }
}

/// Action that receives its arguments at construction time.
#[derive(Debug)]
pub struct ActionA {
    args: ActionArgs,
}

impl ActionA {
    pub fn new(args: ActionArgs) -> Self {
        Self { args }
    }
}

impl NodePorts for ActionA {}

impl Behavior for ActionA {
    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
        println!("{ACTION_A}: {}", self.args);
        NodeStatus::Success
    }
}

/// Action that receives its arguments through post-construction init.
#[derive(Debug, Default)]
pub struct ActionB {
    args: Option<ActionArgs>,
}

impl NodePorts for ActionB {}

impl NodeType for ActionB {
    fn new(_name: &str, _config: &NodeConfig) -> Self {
        Self::default()
    }
}

impl Behavior for ActionB {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        match &self.args {
            Some(args) => {
                println!("{ACTION_B}: {args}");
                NodeStatus::Success
            }
            None => {
                warn!(target: "bt::nodes", node = ctx.name(), "Action_B has no arguments");
                NodeStatus::Failure
            }
        }
    }
}

impl Initialize for ActionB {
    type Args = ActionArgs;

    fn initialize(&mut self, args: ActionArgs) -> Result<(), InitError> {
        self.args = Some(args);
        Ok(())
    }
}

/// Prints a counter every tick and succeeds once it reaches zero.
#[derive(Debug)]
pub struct Countdown {
    name: String,
    remaining: u32,
}

impl StatefulAction for Countdown {
    fn new(name: &str, _config: &NodeConfig) -> Self {
        Self {
            name: name.to_string(),
            remaining: 0,
        }
    }

    fn provided_ports() -> PortsList {
        PortsList::new().with(
            input_port("ticks")
                .with_default(3)
                .with_description("ticks spent running before success"),
        )
    }

    fn on_start(&mut self, config: &NodeConfig) -> NodeStatus {
        match config.get_input::<u32>("ticks") {
            Ok(0) => NodeStatus::Success,
            Ok(ticks) => {
                self.remaining = ticks;
                info!(target: "bt::nodes", node = %self.name, ticks, "countdown started");
                NodeStatus::Running
            }
            Err(error) => {
                warn!(target: "bt::nodes", node = %self.name, %error, "invalid countdown");
                NodeStatus::Failure
            }
        }
    }

    fn on_running(&mut self, _config: &NodeConfig) -> NodeStatus {
        self.remaining = self.remaining.saturating_sub(1);
        println!("{}: {}", self.name, self.remaining);
        if self.remaining == 0 {
            NodeStatus::Success
        } else {
            NodeStatus::Running
        }
    }

    fn on_halted(&mut self, _config: &NodeConfig) {
        info!(
            target: "bt::nodes",
            node = %self.name,
            remaining = self.remaining,
            "countdown halted"
        );
    }
}

fn say_something(config: &NodeConfig) -> NodeStatus {
    match config.get_input::<String>("message") {
        Ok(message) => {
            println!("Robot says: {message}");
            NodeStatus::Success
        }
        Err(error) => {
            warn!(target: "bt::nodes", node = config.name(), %error, "nothing to say");
            NodeStatus::Failure
        }
    }
}

/// Registers only the two demo actions on top of the built-ins.
pub fn demo_registry() -> behavior_tree::Result<Registry> {
    let mut registry = Registry::new();

    let args = action_a_args();
    registry.register_builder(
        Registry::build_manifest::<ActionA>(ACTION_A),
        move |_: &str, _: &NodeConfig| -> Box<dyn Behavior> {
            Box::new(ActionA::new(args.clone()))
        },
    )?;
    registry.register_initializable::<ActionB>(ACTION_B)?;

    Ok(registry)
}

/// Registry used by `bt run` and `bt nodes`.
pub fn registry() -> behavior_tree::Result<Registry> {
    let mut registry = demo_registry()?;
    registry.register_simple_action(
        "SaySomething",
        PortsList::new().with(input_port("message").with_description("text to print")),
        say_something,
    )?;
    registry.register_node_type::<Stateful<Countdown>>("Countdown")?;
    Ok(registry)
}

/// Hands `Action_B` its arguments. Returns how many nodes received them.
pub fn initialize_demo_nodes(tree: &mut Tree) -> Result<usize, InitError> {
    tree.initialize(ACTION_B, action_b_args())
}
