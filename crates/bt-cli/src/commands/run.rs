//! Run a tree document.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use behavior_tree::{Blackboard, TreeBuilder, TreeLoader};
use clap::Parser;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::nodes;

/// Load a RON tree document and tick it until it completes
#[derive(Parser, Debug)]
pub struct Run {
    /// Tree document (RON)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Tree to execute, overriding the document's `main_tree_to_execute`
    #[arg(long)]
    pub main_tree: Option<String>,

    /// Seed a root blackboard entry (repeatable)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// Sleep between ticks in milliseconds [env: BT_TICK_INTERVAL_MS]
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Halt the tree after this many ticks [env: BT_MAX_TICKS]
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

impl Run {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let document = TreeLoader::load(&self.file)?;
        let registry = nodes::registry()?;

        let blackboard = Arc::new(Blackboard::new());
        for (key, value) in &self.defines {
            blackboard.set(key.clone(), value.clone());
        }

        let mut builder = TreeBuilder::new(&registry).blackboard(blackboard);
        if let Some(id) = &self.main_tree {
            builder = builder.main_tree(id.clone());
        }
        let mut tree = builder
            .build(&document)
            .with_context(|| format!("Failed to build tree from {}", self.file.display()))?;
        nodes::initialize_demo_nodes(&mut tree)?;

        info!(
            target: "bt::run",
            tree = tree.main_tree_id(),
            nodes = tree.node_count(),
            "running tree"
        );

        let interval = self
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or(config.tick_interval);
        let status = match self.max_ticks.or(config.max_ticks) {
            Some(max_ticks) => tree.tick_at_most(max_ticks, interval),
            None => tree.tick_while_running(interval),
        };

        if status.is_running() {
            warn!(target: "bt::run", tree = tree.main_tree_id(), "tick limit reached, halting");
            tree.halt();
        }

        println!("{}: {status}", tree.main_tree_id());
        Ok(())
    }
}

fn parse_define(text: &str) -> Result<(String, String), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{text}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{text}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
