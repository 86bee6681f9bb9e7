//! Behavior tree execution core.
//!
//! Node types are registered in a [`Registry`], trees are described as data
//! ([`TreeDocument`]) and instantiated by the [`TreeBuilder`], and the
//! resulting [`Tree`] is driven one tick at a time.
//!
//! - **Tick-based**: the root is ticked by the host; nodes that need more
//!   time return `Running` and are ticked again
//! - **Scoped data**: nodes exchange values through a [`Blackboard`],
//!   addressed by their ports
//! - **Two-phase construction**: node types can receive extra arguments
//!   through a builder closure or a post-construction [`Initialize`] step
//!
//! # Architecture
//!
//! - [`Behavior`] / [`NodePorts`] / [`NodeType`]: node contract
//! - [`NodeStatus`]: Idle, Running, Success or Failure
//! - Composite nodes: [`Sequence`], [`Fallback`], [`Parallel`]
//! - Decorator nodes: [`Inverter`], [`ForceSuccess`], [`ForceFailure`],
//!   [`Repeat`], [`SubTree`]
//! - Leaves: [`AlwaysSuccess`], [`AlwaysFailure`], [`SetBlackboard`],
//!   [`SimpleAction`], [`Stateful`]

pub mod action;
pub mod behavior;
pub mod blackboard;
pub mod builder;
pub mod composite;
pub mod config;
pub mod decorator;
pub mod description;
pub mod error;
pub mod init;
#[cfg(feature = "loaders")]
pub mod loader;
pub mod port;
pub mod registry;
pub mod status;
pub mod tree;

#[cfg(test)]
mod testing;

pub use action::{
    AlwaysFailure, AlwaysSuccess, SetBlackboard, SimpleAction, Stateful, StatefulAction,
};
pub use behavior::{Behavior, NodeKind, NodePorts, NodeType, TickContext, TreeNode};
pub use blackboard::Blackboard;
pub use builder::TreeBuilder;
pub use composite::{Fallback, Parallel, Sequence};
pub use config::NodeConfig;
pub use decorator::{ForceFailure, ForceSuccess, Inverter, Repeat, SubTree};
pub use description::{NodeDescription, TreeDefinition, TreeDocument};
pub use error::{BlackboardError, InitError, PortError, Result, TreeError};
pub use init::{DynInitialize, Initializable, Initialize};
#[cfg(feature = "loaders")]
pub use loader::{LoadResult, TreeLoader};
pub use port::{
    PortDirection, PortInfo, PortValue, PortsList, bidirectional_port, input_port, output_port,
};
pub use registry::{Capabilities, Manifest, NodeBuilder, Registry};
pub use status::NodeStatus;
pub use tree::Tree;
