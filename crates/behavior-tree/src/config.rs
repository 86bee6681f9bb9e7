//! Per-instance node configuration.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::blackboard::Blackboard;
use crate::error::PortError;
use crate::port::PortValue;

/// Data bound to one node instance when the tree is built.
///
/// Holds the instance name, the registration id the node was created from,
/// the port bindings and the blackboard scope the node reads and writes.
/// The tree builder fills it in completely before calling the node's
/// builder; afterwards it is only read.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    name: String,
    registration_id: String,
    ports: BTreeMap<String, PortValue>,
    blackboard: Arc<Blackboard>,
}

impl NodeConfig {
    pub fn new(
        name: impl Into<String>,
        registration_id: impl Into<String>,
        blackboard: Arc<Blackboard>,
    ) -> Self {
        Self {
            name: name.into(),
            registration_id: registration_id.into(),
            ports: BTreeMap::new(),
            blackboard,
        }
    }

    /// Binds `port`, replacing any earlier binding.
    #[must_use]
    pub fn with_port(mut self, port: impl Into<String>, value: impl Into<PortValue>) -> Self {
        self.ports.insert(port.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    pub fn blackboard(&self) -> &Arc<Blackboard> {
        &self.blackboard
    }

    pub fn port(&self, port: &str) -> Option<&PortValue> {
        self.ports.get(port)
    }

    pub fn ports(&self) -> impl Iterator<Item = (&str, &PortValue)> + '_ {
        self.ports.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Reads an input port.
    ///
    /// Literals are parsed with `FromStr`. Blackboard references are
    /// resolved now, at tick time, through the node's scope chain.
    pub fn get_input<T>(&self, port: &str) -> Result<T, PortError>
    where
        T: FromStr + Clone + 'static,
    {
        match self.binding(port)? {
            PortValue::Literal(raw) => raw.parse::<T>().map_err(|_| PortError::Parse {
                port: port.to_string(),
                raw: raw.clone(),
                expected: type_name::<T>(),
            }),
            PortValue::Blackboard(key) => {
                self.blackboard
                    .get_parsed::<T>(key)
                    .map_err(|source| PortError::Blackboard {
                        port: port.to_string(),
                        source,
                    })
            }
        }
    }

    /// Reads an input port bound to a blackboard entry of any clonable type.
    ///
    /// Use this for values that have no text form. Literal bindings are
    /// reported as [`PortError::Parse`].
    pub fn get_input_entry<T>(&self, port: &str) -> Result<T, PortError>
    where
        T: Clone + 'static,
    {
        match self.binding(port)? {
            PortValue::Literal(raw) => Err(PortError::Parse {
                port: port.to_string(),
                raw: raw.clone(),
                expected: type_name::<T>(),
            }),
            PortValue::Blackboard(key) => {
                self.blackboard
                    .get::<T>(key)
                    .map_err(|source| PortError::Blackboard {
                        port: port.to_string(),
                        source,
                    })
            }
        }
    }

    /// Writes an output port into the blackboard key it is bound to.
    pub fn set_output<T>(&self, port: &str, value: T) -> Result<(), PortError>
    where
        T: Any + Send + Sync,
    {
        match self.binding(port)? {
            PortValue::Blackboard(key) => {
                self.blackboard.set(key.clone(), value);
                Ok(())
            }
            PortValue::Literal(_) => Err(PortError::NotWritable {
                port: port.to_string(),
            }),
        }
    }

    fn binding(&self, port: &str) -> Result<&PortValue, PortError> {
        self.ports.get(port).ok_or_else(|| PortError::NotBound {
            port: port.to_string(),
        })
    }
}
