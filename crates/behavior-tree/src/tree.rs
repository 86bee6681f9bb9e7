//! Built trees and the tick driver.

use std::any::Any;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::behavior::TreeNode;
use crate::blackboard::Blackboard;
use crate::error::InitError;
use crate::status::NodeStatus;

/// An executable behavior tree.
///
/// Owns the root node (and through it every node) plus the root blackboard.
/// Ticking is single-threaded and cooperative: a tick runs to completion
/// before the next one starts.
#[derive(Debug)]
pub struct Tree {
    root: TreeNode,
    blackboard: Arc<Blackboard>,
    main_tree_id: String,
}

impl Tree {
    pub(crate) fn new(root: TreeNode, blackboard: Arc<Blackboard>, main_tree_id: String) -> Self {
        Self {
            root,
            blackboard,
            main_tree_id,
        }
    }

    /// Id of the tree definition this tree was built from.
    pub fn main_tree_id(&self) -> &str {
        &self.main_tree_id
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn root_blackboard(&self) -> &Arc<Blackboard> {
        &self.blackboard
    }

    /// Status of the root after the most recent tick, `Idle` before the
    /// first one and after a halt.
    pub fn status(&self) -> NodeStatus {
        self.root.status()
    }

    /// Ticks the root exactly once.
    pub fn tick_once(&mut self) -> NodeStatus {
        self.root.execute_tick()
    }

    /// Ticks until the root returns a terminal status, sleeping `interval`
    /// between ticks.
    pub fn tick_while_running(&mut self, interval: Duration) -> NodeStatus {
        self.tick_loop(interval, None)
    }

    /// Like [`tick_while_running`](Self::tick_while_running), but stops after
    /// `max_ticks` ticks. Returns `Running` if the limit was reached first;
    /// the tree is left running so the caller decides whether to halt it.
    /// With `max_ticks == 0` nothing is ticked and the current status is
    /// returned.
    pub fn tick_at_most(&mut self, max_ticks: u64, interval: Duration) -> NodeStatus {
        self.tick_loop(interval, Some(max_ticks))
    }

    /// Halts every node, running `halt` cleanup on running ones.
    pub fn halt(&mut self) {
        self.root.halt();
    }

    /// Visits every node depth-first, parents before children.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(&TreeNode),
    {
        self.root.visit(&mut f);
    }

    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// Runs post-construction initialization on every node registered as
    /// `registration_id`, returning how many nodes were initialized.
    ///
    /// # Errors
    ///
    /// - [`InitError::NotInitializable`] if a matching node lacks the
    ///   capability
    /// - [`InitError::ArgsMismatch`] if `args` is not the type the node
    ///   expects
    /// - whatever the node's own `initialize` returns
    pub fn initialize<A>(&mut self, registration_id: &str, args: A) -> Result<usize, InitError>
    where
        A: Any,
    {
        let count = initialize_nodes(&mut self.root, registration_id, &args)?;
        debug!(
            target: "behavior_tree::tree",
            registration_id,
            count,
            "post-construction init done"
        );
        Ok(count)
    }

    fn tick_loop(&mut self, interval: Duration, max_ticks: Option<u64>) -> NodeStatus {
        let mut ticks = 0_u64;

        while max_ticks.is_none_or(|max| ticks < max) {
            if ticks > 0 && !interval.is_zero() {
                thread::sleep(interval);
            }
            ticks += 1;
            if !self.tick_once().is_running() {
                break;
            }
        }

        let status = self.status();

        debug!(
            target: "behavior_tree::tree",
            tree = %self.main_tree_id,
            ticks,
            %status,
            "tick loop finished"
        );
        status
    }
}

fn initialize_nodes(
    node: &mut TreeNode,
    registration_id: &str,
    args: &dyn Any,
) -> Result<usize, InitError> {
    let mut count = 0;

    if node.registration_id() == registration_id {
        let instance = node.name().to_string();
        let init = node
            .behavior_mut()
            .as_initialize()
            .ok_or_else(|| InitError::NotInitializable {
                type_name: registration_id.to_string(),
            })?;
        init.initialize_any(&instance, args)?;
        count += 1;
    }

    for child in node.children_mut() {
        count += initialize_nodes(child, registration_id, args)?;
    }
    Ok(count)
}
