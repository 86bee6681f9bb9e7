//! List registered node types.

use anyhow::Result;
use behavior_tree::Manifest;
use clap::Parser;

use crate::nodes;

/// List the node types `bt run` understands
#[derive(Parser, Debug)]
pub struct Nodes {}

impl Nodes {
    pub fn execute(self) -> Result<()> {
        let registry = nodes::registry()?;
        for manifest in registry.manifests() {
            println!("{}", describe(manifest));
        }
        Ok(())
    }
}

fn describe(manifest: &Manifest) -> String {
    let mut line = format!(
        "{:<16} {:<10}",
        manifest.registration_id,
        manifest.kind.to_string()
    );
    for port in manifest.ports.iter() {
        line.push_str(&format!(" {}:{}", port.name, port.direction));
        if let Some(default) = &port.default {
            line.push_str(&format!("={default}"));
        }
    }
    if manifest.capabilities.initializable {
        line.push_str(" [init]");
    }
    line.trim_end().to_string()
}
