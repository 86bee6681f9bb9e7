//! Tree construction from a [`TreeDocument`].
//!
//! Building happens in two passes. The first pass walks the selected tree
//! (following `SubTree` references) and checks every type name, port binding
//! and child count against the registry. Only if the whole description is
//! valid does the second pass call the node builders, so a failed build
//! never constructs a node.

use std::sync::Arc;

use tracing::debug;

use crate::behavior::{NodeKind, TreeNode};
use crate::blackboard::Blackboard;
use crate::config::NodeConfig;
use crate::description::{NodeDescription, TreeDefinition, TreeDocument};
use crate::error::{Result, TreeError};
use crate::port::PortValue;
use crate::registry::{Manifest, Registry};
use crate::tree::Tree;

/// Port of a `SubTree` node naming the included tree.
const SUBTREE_ID_PORT: &str = "ID";

/// Builds executable [`Tree`]s from descriptions using a [`Registry`].
///
/// # Examples
///
/// ```
/// use behavior_tree::{NodeDescription, Registry, TreeBuilder, TreeDefinition, TreeDocument};
///
/// let registry = Registry::new();
/// let document = TreeDocument::new().tree(TreeDefinition::new(
///     "Main",
///     NodeDescription::new("Sequence")
///         .child(NodeDescription::new("AlwaysSuccess"))
///         .child(NodeDescription::new("AlwaysSuccess")),
/// ));
///
/// let mut tree = TreeBuilder::new(&registry).build(&document).unwrap();
/// assert!(tree.tick_once().is_success());
/// ```
#[derive(Debug)]
pub struct TreeBuilder<'r> {
    registry: &'r Registry,
    blackboard: Option<Arc<Blackboard>>,
    main_tree: Option<String>,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            blackboard: None,
            main_tree: None,
        }
    }

    /// Root blackboard of the built tree. A fresh one is created otherwise.
    #[must_use]
    pub fn blackboard(mut self, blackboard: Arc<Blackboard>) -> Self {
        self.blackboard = Some(blackboard);
        self
    }

    /// Entry point, overriding the document's `main_tree_to_execute`.
    #[must_use]
    pub fn main_tree(mut self, id: impl Into<String>) -> Self {
        self.main_tree = Some(id.into());
        self
    }

    /// Validates `document` and instantiates its main tree.
    ///
    /// # Errors
    ///
    /// Any [`TreeError`] construction error. No partial tree is returned.
    pub fn build(&self, document: &TreeDocument) -> Result<Tree> {
        let definition = self.select_main_tree(document)?;
        let root = single_root(definition)?;

        let mut path = vec![definition.id.clone()];
        self.validate(document, root, &mut path)?;

        let blackboard = self.blackboard.clone().unwrap_or_default();
        let root = self.instantiate(document, root, &blackboard)?;

        debug!(
            target: "behavior_tree::builder",
            tree = %definition.id,
            root = root.name(),
            nodes = root.subtree_size(),
            "tree built"
        );

        Ok(Tree::new(root, blackboard, definition.id.clone()))
    }

    fn select_main_tree<'d>(&self, document: &'d TreeDocument) -> Result<&'d TreeDefinition> {
        let requested = self
            .main_tree
            .as_deref()
            .or(document.main_tree_to_execute.as_deref());

        let selected = match requested {
            Some(id) => document.find(id),
            None if document.trees.len() == 1 => document.trees.first(),
            None => None,
        };

        selected.ok_or_else(|| TreeError::MissingMainTree {
            requested: requested.map(str::to_string),
            available: document.trees.len(),
        })
    }

    fn validate(
        &self,
        document: &TreeDocument,
        node: &NodeDescription,
        path: &mut Vec<String>,
    ) -> Result<()> {
        let manifest = self.manifest(&node.type_name)?;

        if let Some(port) = node.ports.keys().find(|port| !manifest.ports.contains(port)) {
            return Err(TreeError::PortMismatch {
                type_name: node.type_name.clone(),
                port: port.clone(),
            });
        }

        if !manifest.kind.accepts_children(node.children.len()) {
            return Err(TreeError::ChildCount {
                instance: node.instance_name().to_string(),
                kind: manifest.kind,
                expected: manifest.kind.expected_children(),
                found: node.children.len(),
            });
        }

        if manifest.kind == NodeKind::SubTree {
            let id = subtree_id(node);
            if path.contains(&id) {
                return Err(TreeError::RecursiveSubTree {
                    path: format!("{} -> {id}", path.join(" -> ")),
                    tree_id: id,
                });
            }
            let root = single_root(self.included_tree(document, node, &id)?)?;

            path.push(id);
            self.validate(document, root, path)?;
            path.pop();
        }

        node.children
            .iter()
            .try_for_each(|child| self.validate(document, child, path))
    }

    fn instantiate(
        &self,
        document: &TreeDocument,
        node: &NodeDescription,
        blackboard: &Arc<Blackboard>,
    ) -> Result<TreeNode> {
        let manifest = self.manifest(&node.type_name)?;
        let name = node.instance_name();

        let mut config = NodeConfig::new(name, &node.type_name, Arc::clone(blackboard));
        for (port, value) in &node.ports {
            config = config.with_port(port.clone(), value.clone());
        }
        for port in manifest.ports.iter() {
            if let Some(default) = &port.default
                && config.port(&port.name).is_none()
            {
                config = config.with_port(port.name.clone(), PortValue::Literal(default.clone()));
            }
        }

        let behavior = self.registry.create(&node.type_name, name, &config)?;
        let mut instance = TreeNode::new(config, manifest.kind, behavior);

        if manifest.kind == NodeKind::SubTree {
            let id = subtree_id(node);
            let root = single_root(self.included_tree(document, node, &id)?)?;
            let scope = Arc::new(Blackboard::with_parent(Arc::clone(blackboard)));
            instance.push_child(self.instantiate(document, root, &scope)?);
        } else {
            for child in &node.children {
                instance.push_child(self.instantiate(document, child, blackboard)?);
            }
        }

        Ok(instance)
    }

    fn manifest(&self, type_name: &str) -> Result<&'r Manifest> {
        self.registry
            .manifest(type_name)
            .ok_or_else(|| TreeError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    fn included_tree<'d>(
        &self,
        document: &'d TreeDocument,
        node: &NodeDescription,
        id: &str,
    ) -> Result<&'d TreeDefinition> {
        document.find(id).ok_or_else(|| TreeError::UnknownTree {
            tree_id: id.to_string(),
            instance: node.instance_name().to_string(),
        })
    }
}

fn single_root(definition: &TreeDefinition) -> Result<&NodeDescription> {
    match definition.roots.as_slice() {
        [root] => Ok(root),
        [] => Err(TreeError::EmptyTree {
            tree_id: definition.id.clone(),
        }),
        roots => Err(TreeError::MultipleRoots {
            tree_id: definition.id.clone(),
            count: roots.len(),
        }),
    }
}

fn subtree_id(node: &NodeDescription) -> String {
    node.ports
        .get(SUBTREE_ID_PORT)
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::behavior::Behavior;
    use crate::port::{PortsList, input_port};
    use crate::status::NodeStatus;

    fn leaf(type_name: &str) -> NodeDescription {
        NodeDescription::new(type_name)
    }

    fn document(root: NodeDescription) -> TreeDocument {
        TreeDocument::new().tree(TreeDefinition::new("Main", root))
    }

    #[test]
    fn builds_single_tree_without_main_tree_id() {
        let registry = Registry::new();
        let doc = document(
            leaf("Sequence")
                .child(leaf("AlwaysSuccess"))
                .child(leaf("AlwaysSuccess")),
        );

        let tree = TreeBuilder::new(&registry).build(&doc).unwrap();
        assert_eq!(tree.main_tree_id(), "Main");
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.root().kind(), NodeKind::Control);
    }

    #[test]
    fn main_tree_selection() {
        let registry = Registry::new();
        let doc = TreeDocument::new()
            .tree(TreeDefinition::new("A", leaf("AlwaysSuccess")))
            .tree(TreeDefinition::new("B", leaf("AlwaysFailure")));

        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::MissingMainTree {
                requested: None,
                available: 2
            }
        );

        let mut tree = TreeBuilder::new(&registry).main_tree("B").build(&doc).unwrap();
        assert_eq!(tree.tick_once(), NodeStatus::Failure);

        let doc = doc.main_tree("A");
        let tree = TreeBuilder::new(&registry).build(&doc).unwrap();
        assert_eq!(tree.main_tree_id(), "A");

        assert!(matches!(
            TreeBuilder::new(&registry).main_tree("C").build(&doc),
            Err(TreeError::MissingMainTree { requested: Some(_), .. })
        ));
    }

    #[test]
    fn root_count_is_checked() {
        let registry = Registry::new();
        let mut definition = TreeDefinition::new("Main", leaf("AlwaysSuccess"));
        definition.roots.push(leaf("AlwaysFailure"));
        let doc = TreeDocument::new().tree(definition);

        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::MultipleRoots {
                tree_id: "Main".into(),
                count: 2
            }
        );

        let doc = TreeDocument::new().tree(TreeDefinition {
            id: "Empty".into(),
            roots: vec![],
        });
        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::EmptyTree {
                tree_id: "Empty".into()
            }
        );
    }

    #[test]
    fn unknown_type_constructs_no_nodes() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        let counter = Arc::clone(&constructed);
        registry
            .register_builder(
                Manifest::new("Counted", NodeKind::Action, PortsList::new()),
                move |_: &str, _: &NodeConfig| -> Box<dyn Behavior> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Box::new(crate::action::AlwaysSuccess)
                },
            )
            .unwrap();

        let doc = document(leaf("Sequence").child(leaf("Counted")).child(leaf("Missing")));
        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::UnknownType {
                type_name: "Missing".into()
            }
        );
        assert_eq!(constructed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn undeclared_port_is_rejected() {
        let registry = Registry::new();
        let doc = document(leaf("Repeat").port("cycles", "3").child(leaf("AlwaysSuccess")));

        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::PortMismatch {
                type_name: "Repeat".into(),
                port: "cycles".into()
            }
        );
    }

    #[test]
    fn child_count_follows_kind() {
        let registry = Registry::new();

        let doc = document(leaf("Sequence"));
        assert!(matches!(
            TreeBuilder::new(&registry).build(&doc),
            Err(TreeError::ChildCount { kind: NodeKind::Control, found: 0, .. })
        ));

        let doc = document(
            leaf("Inverter")
                .child(leaf("AlwaysSuccess"))
                .child(leaf("AlwaysSuccess")),
        );
        assert!(matches!(
            TreeBuilder::new(&registry).build(&doc),
            Err(TreeError::ChildCount { kind: NodeKind::Decorator, found: 2, .. })
        ));

        let doc = document(leaf("AlwaysSuccess").named("leaf").child(leaf("AlwaysFailure")));
        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::ChildCount {
                instance: "leaf".into(),
                kind: NodeKind::Action,
                expected: "no",
                found: 1
            }
        );
    }

    #[test]
    fn defaults_are_materialised() {
        let mut registry = Registry::new();
        registry
            .register_simple_action(
                "Say",
                PortsList::new().with(input_port("message").with_default("hi")),
                |_| NodeStatus::Success,
            )
            .unwrap();
        let doc = document(leaf("Sequence").child(leaf("Say").named("default")).child(
            leaf("Say").named("bound").port("message", "{text}"),
        ));

        let tree = TreeBuilder::new(&registry).build(&doc).unwrap();
        let children = tree.root().children();
        assert_eq!(children[0].config().port("message"), Some(&PortValue::literal("hi")));
        assert_eq!(
            children[1].config().port("message"),
            Some(&PortValue::blackboard("text"))
        );
    }

    #[test]
    fn subtree_gets_child_scope() {
        let registry = Registry::new();
        let doc = TreeDocument::new()
            .main_tree("Main")
            .tree(TreeDefinition::new("Main", NodeDescription::subtree("Sub")))
            .tree(TreeDefinition::new(
                "Sub",
                leaf("SetBlackboard")
                    .port("value", "done")
                    .port("output_key", "state"),
            ));

        let mut tree = TreeBuilder::new(&registry).build(&doc).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.tick_once(), NodeStatus::Success);

        let root_bb = Arc::clone(tree.root_blackboard());
        let child_bb = tree.root().children()[0].config().blackboard();
        assert!(Arc::ptr_eq(child_bb.parent().unwrap(), &root_bb));
        assert_eq!(child_bb.get::<String>("state"), Ok("done".to_string()));
        assert!(!root_bb.has("state"));
    }

    #[test]
    fn subtree_errors() {
        let registry = Registry::new();

        let doc = document(NodeDescription::subtree("Nowhere").named("include"));
        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::UnknownTree {
                tree_id: "Nowhere".into(),
                instance: "include".into()
            }
        );

        let doc = TreeDocument::new()
            .main_tree("A")
            .tree(TreeDefinition::new("A", NodeDescription::subtree("B")))
            .tree(TreeDefinition::new(
                "B",
                leaf("Sequence")
                    .child(leaf("AlwaysSuccess"))
                    .child(NodeDescription::subtree("A")),
            ));
        assert_eq!(
            TreeBuilder::new(&registry).build(&doc).unwrap_err(),
            TreeError::RecursiveSubTree {
                tree_id: "A".into(),
                path: "A -> B -> A".into()
            }
        );
    }

    #[test]
    fn uses_provided_blackboard() {
        let registry = Registry::new();
        let blackboard = Arc::new(Blackboard::new());
        blackboard.set("seed", 7_i32);

        let tree = TreeBuilder::new(&registry)
            .blackboard(Arc::clone(&blackboard))
            .build(&document(leaf("AlwaysSuccess")))
            .unwrap();
        assert!(Arc::ptr_eq(tree.root_blackboard(), &blackboard));
        assert_eq!(tree.root_blackboard().get::<i32>("seed"), Ok(7));
    }
}
