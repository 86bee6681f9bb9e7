//! End-to-end execution tests: registry, builder and driver together.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use behavior_tree::{
    Blackboard, BlackboardError, Manifest, NodeConfig, NodeDescription, NodeKind, NodeStatus,
    PortsList, Registry, TreeBuilder, TreeDefinition, TreeDocument, TreeError, input_port,
};

/// Registers leaves whose scripted results are shared with the test, and
/// records the order in which they were ticked.
struct Harness {
    registry: Registry,
    log: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers `id` as a leaf returning the statuses in `script`, then
    /// repeating the last one.
    fn scripted(&mut self, id: &str, script: &[NodeStatus]) {
        let log = Arc::clone(&self.log);
        let script: Arc<Vec<NodeStatus>> = Arc::new(script.to_vec());
        let calls = Arc::new(AtomicUsize::new(0));
        let label = id.to_string();
        self.registry
            .register_simple_action(id, PortsList::new(), move |_| {
                log.lock().unwrap().push(label.clone());
                let call = calls.fetch_add(1, Ordering::SeqCst);
                script[call.min(script.len() - 1)]
            })
            .expect("fresh id");
    }

    fn ticked(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }
}

fn main_tree(root: NodeDescription) -> TreeDocument {
    TreeDocument::new().tree(TreeDefinition::new("MainTree", root))
}

fn composite(type_name: &str, children: &[&str]) -> NodeDescription {
    children
        .iter()
        .fold(NodeDescription::new(type_name), |node, child| {
            node.child(NodeDescription::new(*child))
        })
}

#[test]
fn sequence_resumes_at_running_child() {
    use NodeStatus::{Running, Success};

    let mut harness = Harness::new();
    harness.scripted("A", &[Success]);
    harness.scripted("B", &[Running, Success]);
    harness.scripted("C", &[Success]);

    let mut tree = TreeBuilder::new(&harness.registry)
        .build(&main_tree(composite("Sequence", &["A", "B", "C"])))
        .expect("valid tree");

    assert_eq!(tree.tick_once(), Running);
    assert_eq!(harness.ticked(), ["A", "B"]);

    assert_eq!(tree.tick_once(), Success);
    assert_eq!(harness.ticked(), ["B", "C"]);
}

#[test]
fn fallback_stops_at_first_success() {
    use NodeStatus::{Failure, Success};

    let mut harness = Harness::new();
    harness.scripted("A", &[Failure]);
    harness.scripted("B", &[Success]);
    harness.scripted("X", &[Failure]);

    let mut tree = TreeBuilder::new(&harness.registry)
        .build(&main_tree(composite("Fallback", &["A", "B", "X"])))
        .expect("valid tree");

    assert_eq!(tree.tick_once(), Success);
    assert_eq!(harness.ticked(), ["A", "B"]);
}

#[test]
fn running_tree_converges() {
    use NodeStatus::{Running, Success};

    let mut harness = Harness::new();
    harness.scripted("Slow", &[Running, Running, Running, Success]);

    let mut tree = TreeBuilder::new(&harness.registry)
        .build(&main_tree(composite("Sequence", &["Slow"])))
        .expect("valid tree");

    assert_eq!(tree.tick_while_running(Duration::from_millis(1)), Success);
    assert_eq!(harness.ticked().len(), 4);
}

#[test]
fn halting_a_running_tree_resets_it() {
    use NodeStatus::{Idle, Running, Success};

    let mut harness = Harness::new();
    harness.scripted("A", &[Success]);
    harness.scripted("B", &[Running]);

    let mut tree = TreeBuilder::new(&harness.registry)
        .build(&main_tree(composite("Sequence", &["A", "B"])))
        .expect("valid tree");

    assert_eq!(tree.tick_once(), Running);
    tree.halt();
    assert_eq!(tree.status(), Idle);
    tree.visit(|node| assert_eq!(node.status(), Idle));

    harness.ticked();
    tree.tick_once();
    assert_eq!(harness.ticked(), ["A", "B"]);
}

#[test]
fn construction_errors() {
    let mut registry = Registry::new();
    assert_eq!(
        registry.register_node_type::<behavior_tree::AlwaysSuccess>("Sequence"),
        Err(TreeError::DuplicateType {
            type_name: "Sequence".into()
        })
    );

    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    registry
        .register_builder(
            Manifest::new("Tracked", NodeKind::Action, PortsList::new()),
            move |_: &str, _: &NodeConfig| -> Box<dyn behavior_tree::Behavior> {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::new(behavior_tree::AlwaysSuccess)
            },
        )
        .expect("fresh id");

    let document = main_tree(composite("Sequence", &["Tracked", "Tracked", "Unregistered"]));
    let error = TreeBuilder::new(&registry)
        .build(&document)
        .expect_err("unknown type");
    assert_eq!(
        error,
        TreeError::UnknownType {
            type_name: "Unregistered".into()
        }
    );
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn blackboard_scopes() {
    let root = Arc::new(Blackboard::new());
    root.set("speed", 3_u32);

    let child = Blackboard::with_parent(Arc::clone(&root));
    assert_eq!(child.get::<u32>("speed"), Ok(3));
    assert_eq!(
        child.get::<u32>("missing"),
        Err(BlackboardError::NotFound {
            key: "missing".into()
        })
    );

    child.set("speed", 5_u32);
    assert_eq!(child.get::<u32>("speed"), Ok(5));
    assert_eq!(root.get::<u32>("speed"), Ok(3));
}

#[test]
fn manifest_derivation_matches_hand_built() {
    let ports = PortsList::new().with(
        input_port("num_cycles")
            .with_default(1)
            .with_description("repetitions, -1 for infinite"),
    );
    let by_hand = Manifest::new("Repeat", NodeKind::Decorator, ports);

    assert_eq!(
        Registry::build_manifest::<behavior_tree::Repeat>("Repeat"),
        by_hand
    );
    assert_eq!(Registry::new().manifest("Repeat"), Some(&by_hand));
}

#[test]
fn ports_read_blackboard_at_tick_time() {
    let mut registry = Registry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry
        .register_simple_action(
            "Say",
            PortsList::new().with(input_port("message")),
            move |config: &NodeConfig| match config.get_input::<String>("message") {
                Ok(message) => {
                    sink.lock().unwrap().push(message);
                    NodeStatus::Success
                }
                Err(_) => NodeStatus::Failure,
            },
        )
        .expect("fresh id");

    let document = main_tree(
        NodeDescription::new("Sequence")
            .child(
                NodeDescription::new("SetBlackboard")
                    .port("value", "written first")
                    .port("output_key", "text"),
            )
            .child(NodeDescription::new("Say").port("message", "{text}")),
    );
    let mut tree = TreeBuilder::new(&registry).build(&document).expect("valid tree");

    assert_eq!(tree.tick_once(), NodeStatus::Success);
    assert_eq!(*seen.lock().unwrap(), ["written first"]);
}
