//! Two ways of passing extra arguments to a node type.

use anyhow::{Context, Result};
use behavior_tree::{NodeDescription, TreeBuilder, TreeDefinition, TreeDocument};
use clap::Parser;
use tracing::info;

use crate::nodes::{self, ACTION_A, ACTION_B};

/// Build `Sequence[Action_A, Action_B]`, initialize `Action_B` and tick once
#[derive(Parser, Debug)]
pub struct Demo {}

impl Demo {
    pub fn document() -> TreeDocument {
        TreeDocument::new().main_tree("MainTree").tree(TreeDefinition::new(
            "MainTree",
            NodeDescription::new("Sequence")
                .child(NodeDescription::new(ACTION_A))
                .child(NodeDescription::new(ACTION_B)),
        ))
    }

    pub fn execute(self) -> Result<()> {
        let registry = nodes::demo_registry()?;
        let mut tree = TreeBuilder::new(&registry).build(&Self::document())?;

        let initialized = nodes::initialize_demo_nodes(&mut tree)
            .context("Failed to initialize Action_B")?;
        info!(target: "bt::demo", initialized, "Action_B initialized");

        let status = tree.tick_once();
        info!(target: "bt::demo", %status, "demo finished");
        Ok(())
    }
}
