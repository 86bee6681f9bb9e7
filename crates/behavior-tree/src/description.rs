//! Parsed tree descriptions consumed by the [`TreeBuilder`](crate::TreeBuilder).
//!
//! A [`TreeDocument`] holds one or more named [`TreeDefinition`]s; each
//! definition holds the top-level [`NodeDescription`]s of one tree. The
//! builder only accepts definitions with exactly one top-level node.

use std::collections::BTreeMap;

use crate::port::PortValue;

/// A set of named trees plus an optional entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeDocument {
    #[cfg_attr(feature = "serde", serde(default))]
    pub main_tree_to_execute: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trees: Vec<TreeDefinition>,
}

impl TreeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn main_tree(mut self, id: impl Into<String>) -> Self {
        self.main_tree_to_execute = Some(id.into());
        self
    }

    #[must_use]
    pub fn tree(mut self, tree: TreeDefinition) -> Self {
        self.trees.push(tree);
        self
    }

    pub fn find(&self, id: &str) -> Option<&TreeDefinition> {
        self.trees.iter().find(|tree| tree.id == id)
    }
}

/// One named tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeDefinition {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub roots: Vec<NodeDescription>,
}

impl TreeDefinition {
    /// A tree with a single root node.
    pub fn new(id: impl Into<String>, root: NodeDescription) -> Self {
        Self {
            id: id.into(),
            roots: vec![root],
        }
    }
}

/// One node of a tree description.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDescription {
    /// Registration id of the node type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    /// Instance name; defaults to the type name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ports: BTreeMap<String, PortValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            ports: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Shorthand for a `SubTree` node including tree `id`.
    pub fn subtree(id: impl Into<String>) -> Self {
        Self::new("SubTree").port("ID", PortValue::Literal(id.into()))
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: impl Into<String>, value: impl Into<PortValue>) -> Self {
        self.ports.insert(port.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }

    /// Instance name, falling back to the type name.
    pub fn instance_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.type_name)
    }
}
