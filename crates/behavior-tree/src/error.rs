//! Error types for tree construction, ports, blackboard access and
//! post-construction initialization.
//!
//! Structural problems ([`TreeError`]) are detected while registering node
//! types or building a tree and abort the operation. Blackboard and port
//! errors are ordinary values a node handles during `tick`.

use thiserror::Error;

use crate::behavior::NodeKind;

pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised by the registry and the tree builder.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node type with this registration id already exists.
    #[error("node type `{type_name}` is already registered")]
    DuplicateType { type_name: String },

    /// The description references a type that was never registered.
    #[error("node type `{type_name}` is not registered")]
    UnknownType { type_name: String },

    /// A port binding names a port the type's manifest does not declare.
    #[error("node type `{type_name}` has no port named `{port}`")]
    PortMismatch { type_name: String, port: String },

    /// The selected tree declares more than one top-level node.
    #[error("tree `{tree_id}` declares {count} root nodes, expected exactly one")]
    MultipleRoots { tree_id: String, count: usize },

    /// The selected tree declares no nodes at all.
    #[error("tree `{tree_id}` has no root node")]
    EmptyTree { tree_id: String },

    /// No tree matches the requested entry point, or the entry point is
    /// ambiguous because none was named and several trees exist.
    #[error("{}", missing_main_tree_message(.requested, .available))]
    MissingMainTree {
        requested: Option<String>,
        available: usize,
    },

    /// A `SubTree` node references a tree id that the document lacks.
    #[error("subtree `{tree_id}` referenced by `{instance}` is not defined")]
    UnknownTree { tree_id: String, instance: String },

    /// A `SubTree` chain references itself.
    #[error("subtree `{tree_id}` includes itself (path: {path})")]
    RecursiveSubTree { tree_id: String, path: String },

    /// A node received a number of children its kind does not allow.
    #[error("{kind} node `{instance}` expects {expected} children, found {found}")]
    ChildCount {
        instance: String,
        kind: NodeKind,
        expected: &'static str,
        found: usize,
    },
}

fn missing_main_tree_message(requested: &Option<String>, available: &usize) -> String {
    match requested {
        Some(id) => format!("main tree `{id}` not found among {available} tree(s)"),
        None => format!(
            "no main tree selected and the document defines {available} tree(s)"
        ),
    }
}

/// Errors from blackboard lookups.
///
/// A missing key is a normal outcome; nodes decide whether it means
/// "use a default" or "fail".
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard key `{key}` not found")]
    NotFound { key: String },

    #[error("blackboard key `{key}` holds a value of a different type than `{expected}`")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Errors from reading or writing a node's ports during a tick.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PortError {
    /// The port has neither a binding nor a default value.
    #[error("port `{port}` is not bound and has no default")]
    NotBound { port: String },

    /// A literal (or string blackboard entry) could not be parsed.
    #[error("port `{port}`: cannot parse `{raw}` as `{expected}`")]
    Parse {
        port: String,
        raw: String,
        expected: &'static str,
    },

    #[error("port `{port}`: {source}")]
    Blackboard {
        port: String,
        #[source]
        source: BlackboardError,
    },

    /// Outputs must be remapped to a blackboard key.
    #[error("port `{port}` is bound to a literal and cannot be written")]
    NotWritable { port: String },
}

/// Errors from the post-construction initialization capability.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InitError {
    /// The node type was not registered with the initialization capability.
    #[error("node type `{type_name}` does not support post-construction init")]
    NotInitializable { type_name: String },

    /// The arguments passed do not match the type the node expects.
    #[error("node `{instance}` expects init arguments of type `{expected}`")]
    ArgsMismatch {
        instance: String,
        expected: &'static str,
    },

    /// The node inspected the arguments and refused them.
    #[error("node `{instance}` rejected its init arguments: {reason}")]
    Rejected { instance: String, reason: String },
}
