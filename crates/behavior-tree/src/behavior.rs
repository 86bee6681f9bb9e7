//! Core behavior trait and the owned tree node.
//!
//! This module defines the [`Behavior`] trait, the fundamental abstraction
//! for all behavior tree nodes, and [`TreeNode`], which owns a behavior
//! together with its configuration, last status and children.

use std::fmt;

use tracing::{trace, warn};

use crate::config::NodeConfig;
use crate::error::PortError;
use crate::init::DynInitialize;
use crate::port::PortsList;
use crate::status::NodeStatus;

/// Category of a node type, used for arity checks and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Leaf that performs work.
    Action,
    /// Leaf that only checks state.
    Condition,
    /// Composite with one or more children.
    Control,
    /// Wrapper with exactly one child.
    Decorator,
    /// Reference to another tree of the same document.
    SubTree,
}

impl NodeKind {
    /// Returns `true` if a node of this kind accepts `count` children
    /// from a tree description.
    pub fn accepts_children(self, count: usize) -> bool {
        match self {
            NodeKind::Action | NodeKind::Condition | NodeKind::SubTree => count == 0,
            NodeKind::Control => count >= 1,
            NodeKind::Decorator => count == 1,
        }
    }

    /// Human readable arity, for error messages.
    pub fn expected_children(self) -> &'static str {
        match self {
            NodeKind::Action | NodeKind::Condition | NodeKind::SubTree => "no",
            NodeKind::Control => "at least one",
            NodeKind::Decorator => "exactly one",
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Action | NodeKind::Condition)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Action => "action",
            NodeKind::Condition => "condition",
            NodeKind::Control => "control",
            NodeKind::Decorator => "decorator",
            NodeKind::SubTree => "subtree",
        };
        f.write_str(label)
    }
}

/// A behavior tree node that can be ticked.
///
/// # Contract
///
/// - `tick` may have side effects and must be callable repeatedly.
/// - Synchronous nodes return `Success` or `Failure` before returning.
/// - Asynchronous nodes may return `Running`; the driver ticks them again
///   later. They must not block inside `tick` beyond a bounded check.
/// - `tick` never returns `Idle`.
pub trait Behavior: Send {
    /// Evaluate this node once.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Access to the node's configuration (ports, blackboard) and
    ///   to its children, which composites and decorators tick through it.
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus;

    /// Called when a `Running` node is interrupted.
    ///
    /// Reset internal state here so the next tick starts fresh. Children are
    /// halted by the owning [`TreeNode`] after this returns.
    fn halt(&mut self, _ctx: &mut TickContext<'_>) {}

    /// Capability query for post-construction initialization.
    ///
    /// Returns `None` unless the node type was registered with
    /// [`Registry::register_initializable`](crate::Registry::register_initializable).
    fn as_initialize(&mut self) -> Option<&mut dyn DynInitialize> {
        None
    }
}

/// Static description of a node type: its ports and kind.
///
/// Independent of how the type is constructed, so a type built by a custom
/// builder closure can still derive its manifest through
/// [`Registry::build_manifest`](crate::Registry::build_manifest).
pub trait NodePorts {
    /// Ports this type declares. Empty by default.
    fn provided_ports() -> PortsList {
        PortsList::new()
    }

    fn kind() -> NodeKind {
        NodeKind::Action
    }
}

/// A node type the registry can construct from `(name, config)` alone.
pub trait NodeType: Behavior + NodePorts + Sized + 'static {
    /// Standard constructor.
    fn new(name: &str, config: &NodeConfig) -> Self;
}

/// What a behavior sees while it is ticked or halted.
pub struct TickContext<'a> {
    config: &'a NodeConfig,
    children: &'a mut [TreeNode],
}

impl<'a> TickContext<'a> {
    pub fn config(&self) -> &NodeConfig {
        self.config
    }

    /// Instance name of the node being ticked.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Shorthand for [`NodeConfig::get_input`].
    pub fn get_input<T>(&self, port: &str) -> Result<T, PortError>
    where
        T: std::str::FromStr + Clone + 'static,
    {
        self.config.get_input(port)
    }

    /// Shorthand for [`NodeConfig::set_output`].
    pub fn set_output<T>(&self, port: &str, value: T) -> Result<(), PortError>
    where
        T: std::any::Any + Send + Sync,
    {
        self.config.set_output(port, value)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Ticks child `index` and returns its status.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn tick_child(&mut self, index: usize) -> NodeStatus {
        self.children[index].execute_tick()
    }

    /// Status child `index` reported on its last tick, without ticking it.
    pub fn child_status(&self, index: usize) -> NodeStatus {
        self.children[index].status()
    }

    /// Halts child `index`, returning it to `Idle`.
    pub fn halt_child(&mut self, index: usize) {
        self.children[index].halt();
    }

    /// Halts every child, returning all of them to `Idle`.
    pub fn halt_children(&mut self) {
        for child in self.children.iter_mut() {
            child.halt();
        }
    }
}

/// An instantiated node: behavior, configuration, status and children.
///
/// A parent exclusively owns its children, so a built tree is a strict
/// hierarchy rooted at one node.
pub struct TreeNode {
    config: NodeConfig,
    kind: NodeKind,
    status: NodeStatus,
    behavior: Box<dyn Behavior>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(config: NodeConfig, kind: NodeKind, behavior: Box<dyn Behavior>) -> Self {
        Self {
            config,
            kind,
            status: NodeStatus::Idle,
            behavior,
            children: Vec::new(),
        }
    }

    /// Appends an owned child.
    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn push_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn registration_id(&self) -> &str {
        self.config.registration_id()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Status returned by the most recent tick, or `Idle`.
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Ticks the behavior once and records the resulting status.
    pub fn execute_tick(&mut self) -> NodeStatus {
        let previous = self.status;
        let mut ctx = TickContext {
            config: &self.config,
            children: &mut self.children,
        };
        let mut status = self.behavior.tick(&mut ctx);

        if status == NodeStatus::Idle {
            warn!(
                target: "behavior_tree::node",
                node = self.config.name(),
                registration_id = self.config.registration_id(),
                "tick returned IDLE, treating it as FAILURE"
            );
            status = NodeStatus::Failure;
        }

        if status != previous {
            trace!(
                target: "behavior_tree::node",
                node = self.config.name(),
                from = %previous,
                to = %status,
                "status changed"
            );
        }

        self.status = status;
        status
    }

    /// Halts this node and its whole subtree.
    ///
    /// A `Running` node first gets its behavior's `halt` hook; then every
    /// child is halted recursively and the node returns to `Idle`.
    pub fn halt(&mut self) {
        if self.status.is_running() {
            let mut ctx = TickContext {
                config: &self.config,
                children: &mut self.children,
            };
            self.behavior.halt(&mut ctx);
        }
        for child in self.children.iter_mut() {
            child.halt();
        }
        self.status = NodeStatus::Idle;
    }

    /// Visits this node and its descendants depth-first, parents first.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&TreeNode),
    {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_size).sum::<usize>()
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn Behavior {
        self.behavior.as_mut()
    }

    pub(crate) fn children_mut(&mut self) -> &mut [TreeNode] {
        &mut self.children
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("name", &self.config.name())
            .field("registration_id", &self.config.registration_id())
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::blackboard::Blackboard;

    struct Fixed(NodeStatus);

    impl Behavior for Fixed {
        fn tick(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
            self.0
        }
    }

    struct CountHalts {
        halts: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl Behavior for CountHalts {
        fn tick(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
            NodeStatus::Running
        }

        fn halt(&mut self, _ctx: &mut TickContext<'_>) {
            self.halts
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn node(name: &str, behavior: impl Behavior + 'static) -> TreeNode {
        let config = NodeConfig::new(name, name, Arc::new(Blackboard::new()));
        TreeNode::new(config, NodeKind::Action, Box::new(behavior))
    }

    #[test]
    fn execute_tick_records_status() {
        let mut leaf = node("ok", Fixed(NodeStatus::Success));
        assert_eq!(leaf.status(), NodeStatus::Idle);
        assert_eq!(leaf.execute_tick(), NodeStatus::Success);
        assert_eq!(leaf.status(), NodeStatus::Success);
    }

    #[test]
    fn idle_result_is_coerced_to_failure() {
        let mut leaf = node("broken", Fixed(NodeStatus::Idle));
        assert_eq!(leaf.execute_tick(), NodeStatus::Failure);
    }

    #[test]
    fn halt_runs_cleanup_only_for_running_nodes() {
        let halts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut leaf = node(
            "worker",
            CountHalts {
                halts: Arc::clone(&halts),
            },
        );

        leaf.halt();
        assert_eq!(halts.load(std::sync::atomic::Ordering::SeqCst), 0);

        assert_eq!(leaf.execute_tick(), NodeStatus::Running);
        leaf.halt();
        assert_eq!(halts.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(leaf.status(), NodeStatus::Idle);
    }

    #[test]
    fn arity_rules_follow_kind() {
        assert!(NodeKind::Control.accepts_children(3));
        assert!(!NodeKind::Control.accepts_children(0));
        assert!(NodeKind::Decorator.accepts_children(1));
        assert!(!NodeKind::Decorator.accepts_children(2));
        assert!(NodeKind::Action.accepts_children(0));
        assert!(!NodeKind::Condition.accepts_children(1));

        assert!(NodeKind::Action.is_leaf());
        assert!(NodeKind::Condition.is_leaf());
        assert!(!NodeKind::SubTree.is_leaf());
        assert!(!NodeKind::Decorator.is_leaf());
    }

    /// Ticks its child only once, then keeps reporting the child's last status.
    struct Latch {
        ticked: bool,
    }

    impl Behavior for Latch {
        fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
            if !self.ticked {
                self.ticked = true;
                ctx.tick_child(0);
            }
            ctx.child_status(0)
        }
    }

    #[test]
    fn child_status_reads_without_ticking() {
        let halts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let worker = node(
            "worker",
            CountHalts {
                halts: Arc::clone(&halts),
            },
        );
        let mut latch = node("latch", Latch { ticked: false }).with_child(worker);

        assert_eq!(latch.execute_tick(), NodeStatus::Running);
        assert_eq!(latch.execute_tick(), NodeStatus::Running);

        latch.halt();
        assert_eq!(halts.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(latch.children()[0].status(), NodeStatus::Idle);
        // The halted child reports Idle, which the parent's tick turns into Failure.
        assert_eq!(latch.execute_tick(), NodeStatus::Failure);
    }

    #[test]
    fn visit_walks_parents_first() {
        let root = node("root", Fixed(NodeStatus::Success))
            .with_child(node("a", Fixed(NodeStatus::Success)))
            .with_child(node("b", Fixed(NodeStatus::Success)));

        let mut names = Vec::new();
        root.visit(&mut |n| names.push(n.name().to_string()));
        assert_eq!(names, ["root", "a", "b"]);
        assert_eq!(root.subtree_size(), 3);
    }
}
