//! Two-phase construction: post-construction initialization.
//!
//! Some node types need static arguments that the standard
//! `(name, config)` constructor cannot carry. Besides capturing them in a
//! custom builder closure, a type can implement [`Initialize`] and be
//! registered with
//! [`Registry::register_initializable`](crate::Registry::register_initializable).
//! The host then calls [`Tree::initialize`](crate::Tree::initialize) once,
//! before the first tick. The core does not enforce the call; a node ticked
//! before being initialized logs a warning once.

use std::any::{Any, type_name};

use tracing::warn;

use crate::behavior::{Behavior, NodeKind, NodePorts, NodeType, TickContext};
use crate::config::NodeConfig;
use crate::error::InitError;
use crate::port::PortsList;
use crate::status::NodeStatus;

/// Post-construction initialization with typed arguments.
pub trait Initialize {
    type Args: Clone + 'static;

    fn initialize(&mut self, args: Self::Args) -> Result<(), InitError>;
}

/// Object-safe form of [`Initialize`], returned by
/// [`Behavior::as_initialize`].
pub trait DynInitialize {
    /// Runs initialization if `args` has the type the node expects.
    fn initialize_any(&mut self, instance: &str, args: &dyn Any) -> Result<(), InitError>;

    fn is_initialized(&self) -> bool;
}

/// Adapter that gives an [`Initialize`] node type the capability.
pub struct Initializable<T> {
    inner: T,
    initialized: bool,
    warned: bool,
}

impl<T> Initializable<T> {
    pub fn wrap(inner: T) -> Self {
        Self {
            inner,
            initialized: false,
            warned: false,
        }
    }
}

impl<T> Behavior for Initializable<T>
where
    T: Behavior + Initialize,
{
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        if !self.initialized && !self.warned {
            warn!(
                target: "behavior_tree::init",
                node = ctx.name(),
                "ticked before post-construction initialization"
            );
            self.warned = true;
        }
        self.inner.tick(ctx)
    }

    fn halt(&mut self, ctx: &mut TickContext<'_>) {
        self.inner.halt(ctx);
    }

    fn as_initialize(&mut self) -> Option<&mut dyn DynInitialize> {
        Some(self)
    }
}

impl<T> DynInitialize for Initializable<T>
where
    T: Behavior + Initialize,
{
    fn initialize_any(&mut self, instance: &str, args: &dyn Any) -> Result<(), InitError> {
        let args = args
            .downcast_ref::<T::Args>()
            .ok_or_else(|| InitError::ArgsMismatch {
                instance: instance.to_string(),
                expected: type_name::<T::Args>(),
            })?;
        self.inner.initialize(args.clone())?;
        self.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl<T: NodePorts> NodePorts for Initializable<T> {
    fn provided_ports() -> PortsList {
        T::provided_ports()
    }

    fn kind() -> NodeKind {
        T::kind()
    }
}

impl<T> NodeType for Initializable<T>
where
    T: NodeType + Initialize,
{
    fn new(name: &str, config: &NodeConfig) -> Self {
        Self::wrap(T::new(name, config))
    }
}
