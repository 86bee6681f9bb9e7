//! Node registry: maps registration ids to builders and manifests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::action::{AlwaysFailure, AlwaysSuccess, SetBlackboard, SimpleAction};
use crate::behavior::{Behavior, NodeKind, NodePorts, NodeType};
use crate::composite::{Fallback, Parallel, Sequence};
use crate::config::NodeConfig;
use crate::decorator::{ForceFailure, ForceSuccess, Inverter, Repeat, SubTree};
use crate::error::{Result, TreeError};
use crate::init::{Initializable, Initialize};
use crate::port::PortsList;
use crate::status::NodeStatus;

/// Factory producing a node instance from `(instance name, config)`.
pub type NodeBuilder = Arc<dyn Fn(&str, &NodeConfig) -> Box<dyn Behavior> + Send + Sync>;

/// Capabilities recorded for a node type at registration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Instances expose post-construction init through
    /// [`Behavior::as_initialize`].
    pub initializable: bool,
}

/// Identity of a registered node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub registration_id: String,
    pub kind: NodeKind,
    pub ports: PortsList,
    pub capabilities: Capabilities,
}

impl Manifest {
    pub fn new(registration_id: impl Into<String>, kind: NodeKind, ports: PortsList) -> Self {
        Self {
            registration_id: registration_id.into(),
            kind,
            ports,
            capabilities: Capabilities::default(),
        }
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

struct Entry {
    manifest: Manifest,
    builder: NodeBuilder,
}

/// Registry of node types available to the tree builder.
///
/// # Registration strategies
///
/// - [`register_node_type`](Self::register_node_type): the type is built from
///   `(name, config)` by [`NodeType::new`]
/// - [`register_builder`](Self::register_builder): an explicit builder,
///   typically a closure capturing extra construction arguments
/// - [`register_initializable`](Self::register_initializable): like
///   `register_node_type`, and the host passes extra arguments after
///   construction through [`Tree::initialize`](crate::Tree::initialize)
///
/// Entries never change once registered.
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    /// Creates a registry with the built-in control, decorator and leaf
    /// nodes.
    ///
    /// Built-ins: `Sequence`, `Fallback`, `Parallel`, `Inverter`,
    /// `ForceSuccess`, `ForceFailure`, `Repeat`, `SubTree`, `AlwaysSuccess`,
    /// `AlwaysFailure`, `SetBlackboard`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.insert_node_type::<Sequence>("Sequence");
        registry.insert_node_type::<Fallback>("Fallback");
        registry.insert_node_type::<Parallel>("Parallel");
        registry.insert_node_type::<Inverter>("Inverter");
        registry.insert_node_type::<ForceSuccess>("ForceSuccess");
        registry.insert_node_type::<ForceFailure>("ForceFailure");
        registry.insert_node_type::<Repeat>("Repeat");
        registry.insert_node_type::<SubTree>("SubTree");
        registry.insert_node_type::<AlwaysSuccess>("AlwaysSuccess");
        registry.insert_node_type::<AlwaysFailure>("AlwaysFailure");
        registry.insert_node_type::<SetBlackboard>("SetBlackboard");
        registry
    }

    /// Creates a registry without any node types.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Derives the manifest of `T` from its static port declaration.
    pub fn build_manifest<T: NodePorts>(registration_id: &str) -> Manifest {
        Manifest::new(registration_id, T::kind(), T::provided_ports())
    }

    /// Registers an explicit builder under `manifest.registration_id`.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateType`] if the id is already taken.
    pub fn register_builder<F>(&mut self, manifest: Manifest, builder: F) -> Result<()>
    where
        F: Fn(&str, &NodeConfig) -> Box<dyn Behavior> + Send + Sync + 'static,
    {
        self.ensure_free(&manifest.registration_id)?;
        self.insert(manifest, Arc::new(builder));
        Ok(())
    }

    /// Registers `T`, built from `(name, config)` only.
    pub fn register_node_type<T: NodeType>(&mut self, registration_id: &str) -> Result<()> {
        self.ensure_free(registration_id)?;
        self.insert_node_type::<T>(registration_id);
        Ok(())
    }

    /// Registers `T` with the post-construction initialization capability.
    pub fn register_initializable<T>(&mut self, registration_id: &str) -> Result<()>
    where
        T: NodeType + Initialize,
    {
        self.ensure_free(registration_id)?;
        let manifest = Self::build_manifest::<T>(registration_id)
            .with_capabilities(Capabilities { initializable: true });
        self.insert(
            manifest,
            Arc::new(|name: &str, config: &NodeConfig| -> Box<dyn Behavior> {
                Box::new(Initializable::<T>::new(name, config))
            }),
        );
        Ok(())
    }

    /// Registers a closure as an action leaf.
    pub fn register_simple_action<F>(
        &mut self,
        registration_id: &str,
        ports: PortsList,
        tick_fn: F,
    ) -> Result<()>
    where
        F: Fn(&NodeConfig) -> NodeStatus + Send + Sync + 'static,
    {
        self.register_simple(registration_id, NodeKind::Action, ports, tick_fn)
    }

    /// Registers a closure as a condition leaf.
    pub fn register_simple_condition<F>(
        &mut self,
        registration_id: &str,
        ports: PortsList,
        tick_fn: F,
    ) -> Result<()>
    where
        F: Fn(&NodeConfig) -> NodeStatus + Send + Sync + 'static,
    {
        self.register_simple(registration_id, NodeKind::Condition, ports, tick_fn)
    }

    /// Instantiates a node of type `type_name`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownType`] if nothing is registered under that id.
    pub fn create(
        &self,
        type_name: &str,
        instance_name: &str,
        config: &NodeConfig,
    ) -> Result<Box<dyn Behavior>> {
        let entry = self.entry(type_name)?;
        Ok((entry.builder)(instance_name, config))
    }

    pub fn manifest(&self, registration_id: &str) -> Option<&Manifest> {
        self.entries.get(registration_id).map(|e| &e.manifest)
    }

    /// All manifests, sorted by registration id.
    pub fn manifests(&self) -> Vec<&Manifest> {
        let mut manifests: Vec<&Manifest> = self.entries.values().map(|e| &e.manifest).collect();
        manifests.sort_by(|a, b| a.registration_id.cmp(&b.registration_id));
        manifests
    }

    pub fn contains(&self, registration_id: &str) -> bool {
        self.entries.contains_key(registration_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register_simple<F>(
        &mut self,
        registration_id: &str,
        kind: NodeKind,
        ports: PortsList,
        tick_fn: F,
    ) -> Result<()>
    where
        F: Fn(&NodeConfig) -> NodeStatus + Send + Sync + 'static,
    {
        self.ensure_free(registration_id)?;
        let tick_fn: crate::action::TickFunction = Arc::new(tick_fn);
        self.insert(
            Manifest::new(registration_id, kind, ports),
            Arc::new(move |_name: &str, _config: &NodeConfig| -> Box<dyn Behavior> {
                Box::new(SimpleAction::new(Arc::clone(&tick_fn)))
            }),
        );
        Ok(())
    }

    fn insert_node_type<T: NodeType>(&mut self, registration_id: &str) {
        self.insert(
            Self::build_manifest::<T>(registration_id),
            Arc::new(|name: &str, config: &NodeConfig| -> Box<dyn Behavior> {
                Box::new(T::new(name, config))
            }),
        );
    }

    fn insert(&mut self, manifest: Manifest, builder: NodeBuilder) {
        debug!(
            target: "behavior_tree::registry",
            registration_id = %manifest.registration_id,
            kind = %manifest.kind,
            ports = manifest.ports.len(),
            initializable = manifest.capabilities.initializable,
            "registered node type"
        );
        self.entries
            .insert(manifest.registration_id.clone(), Entry { manifest, builder });
    }

    fn ensure_free(&self, registration_id: &str) -> Result<()> {
        if self.entries.contains_key(registration_id) {
            return Err(TreeError::DuplicateType {
                type_name: registration_id.to_string(),
            });
        }
        Ok(())
    }

    fn entry(&self, type_name: &str) -> Result<&Entry> {
        self.entries
            .get(type_name)
            .ok_or_else(|| TreeError::UnknownType {
                type_name: type_name.to_string(),
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.manifests())
            .finish()
    }
}
