//! Helpers shared by unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::behavior::{Behavior, NodeKind, NodeType, TickContext, TreeNode};
use crate::blackboard::Blackboard;
use crate::config::NodeConfig;
use crate::status::NodeStatus;

/// Leaf that replays a script of statuses, repeating the last one, and
/// counts how often it was ticked and halted.
pub struct Scripted {
    script: VecDeque<NodeStatus>,
    last: NodeStatus,
    pub ticks: Arc<AtomicUsize>,
    pub halts: Arc<AtomicUsize>,
}

impl Scripted {
    pub fn new(script: &[NodeStatus]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            last: NodeStatus::Success,
            ticks: Arc::new(AtomicUsize::new(0)),
            halts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Behavior for Scripted {
    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }

    fn halt(&mut self, _ctx: &mut TickContext<'_>) {
        self.halts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counters of a [`Scripted`] leaf that stay readable after the leaf was
/// moved into a tree.
#[derive(Clone)]
pub struct Counters {
    ticks: Arc<AtomicUsize>,
    halts: Arc<AtomicUsize>,
}

impl Counters {
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn halts(&self) -> usize {
        self.halts.load(Ordering::SeqCst)
    }
}

pub fn blackboard() -> Arc<Blackboard> {
    Arc::new(Blackboard::new())
}

/// Builds a scripted leaf node and returns it with its counters.
pub fn scripted(name: &str, script: &[NodeStatus]) -> (TreeNode, Counters) {
    let leaf = Scripted::new(script);
    let counters = Counters {
        ticks: Arc::clone(&leaf.ticks),
        halts: Arc::clone(&leaf.halts),
    };
    let config = NodeConfig::new(name, "Scripted", blackboard());
    (TreeNode::new(config, NodeKind::Action, Box::new(leaf)), counters)
}

/// Builds a node of type `T` with the given config and children.
pub fn node_with<T: NodeType>(config: NodeConfig, children: Vec<TreeNode>) -> TreeNode {
    let behavior = T::new(config.name(), &config);
    children
        .into_iter()
        .fold(TreeNode::new(config, T::kind(), Box::new(behavior)), |node, child| {
            node.with_child(child)
        })
}

/// Builds a node of type `T` with default ports and the given children.
pub fn node<T: NodeType>(name: &str, children: Vec<TreeNode>) -> TreeNode {
    let mut config = NodeConfig::new(name, name, blackboard());
    for port in T::provided_ports().iter() {
        if let Some(default) = &port.default {
            config = config.with_port(port.name.clone(), default.as_str());
        }
    }
    node_with::<T>(config, children)
}
