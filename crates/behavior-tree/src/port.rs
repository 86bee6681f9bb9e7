//! Port declarations and bindings.
//!
//! A node type declares its ports through [`NodeType::provided_ports`]; a
//! tree description binds each port to either a literal or a blackboard key.
//!
//! [`NodeType::provided_ports`]: crate::NodeType::provided_ports

use std::collections::BTreeMap;
use std::fmt;

/// Direction of data flow through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortDirection {
    Input,
    Output,
    InOut,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
            PortDirection::InOut => "inout",
        };
        f.write_str(label)
    }
}

/// A single port declaration: name, direction and optional default literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub direction: PortDirection,
    pub default: Option<String>,
    pub description: String,
}

impl PortInfo {
    pub fn new(name: impl Into<String>, direction: PortDirection) -> Self {
        Self {
            name: name.into(),
            direction,
            default: None,
            description: String::new(),
        }
    }

    /// Sets the literal used when a description leaves the port unbound.
    #[must_use]
    pub fn with_default(mut self, default: impl ToString) -> Self {
        self.default = Some(default.to_string());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Declares an input port.
pub fn input_port(name: impl Into<String>) -> PortInfo {
    PortInfo::new(name, PortDirection::Input)
}

/// Declares an output port.
pub fn output_port(name: impl Into<String>) -> PortInfo {
    PortInfo::new(name, PortDirection::Output)
}

/// Declares a port that is both read and written.
pub fn bidirectional_port(name: impl Into<String>) -> PortInfo {
    PortInfo::new(name, PortDirection::InOut)
}

/// Set of port declarations, keyed and ordered by port name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortsList {
    ports: BTreeMap<String, PortInfo>,
}

impl PortsList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, replacing an earlier one with the same name.
    #[must_use]
    pub fn with(mut self, port: PortInfo) -> Self {
        self.insert(port);
        self
    }

    pub fn insert(&mut self, port: PortInfo) {
        self.ports.insert(port.name.clone(), port);
    }

    pub fn get(&self, name: &str) -> Option<&PortInfo> {
        self.ports.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ports.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortInfo> + '_ {
        self.ports.values()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl FromIterator<PortInfo> for PortsList {
    fn from_iter<I: IntoIterator<Item = PortInfo>>(iter: I) -> Self {
        let mut list = Self::new();
        for port in iter {
            list.insert(port);
        }
        list
    }
}

/// What a port is bound to in a tree description.
///
/// In text form, `"{key}"` refers to blackboard entry `key`; any other
/// string is a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum PortValue {
    Literal(String),
    Blackboard(String),
}

impl PortValue {
    /// Parses the textual binding convention.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(key) = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            && !key.trim().is_empty()
        {
            return PortValue::Blackboard(key.trim().to_string());
        }
        PortValue::Literal(text.to_string())
    }

    pub fn literal(value: impl ToString) -> Self {
        PortValue::Literal(value.to_string())
    }

    pub fn blackboard(key: impl Into<String>) -> Self {
        PortValue::Blackboard(key.into())
    }

    /// Returns the blackboard key if this is a reference.
    pub fn blackboard_key(&self) -> Option<&str> {
        match self {
            PortValue::Blackboard(key) => Some(key),
            PortValue::Literal(_) => None,
        }
    }
}

impl From<&str> for PortValue {
    fn from(text: &str) -> Self {
        PortValue::parse(text)
    }
}

impl From<String> for PortValue {
    fn from(text: String) -> Self {
        PortValue::parse(&text)
    }
}

impl From<PortValue> for String {
    fn from(value: PortValue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortValue::Literal(text) => f.write_str(text),
            PortValue::Blackboard(key) => write!(f, "{{{key}}}"),
        }
    }
}
