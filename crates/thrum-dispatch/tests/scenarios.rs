//! End-to-end request-to-audio scenarios (§8 scenarios 3 and 4).
//!
//! Unlike `dispatcher.rs`'s unit tests, which check translation in
//! isolation, these drive a real `Environment` through a real `Dispatcher`
//! with a `thrum-builtin` definition registered, and inspect the rendered
//! audio block.

use std::sync::{mpsc, Arc, Mutex};

use thrum_core::{AddAction, AudioBusId, Environment, NodeId, Options};
use thrum_dispatch::{ConfigArg, Dispatcher, RequestBody};
use thrum_registry::PluginRegistry;

/// A `RequestBody` covering every property any of the five body types
/// reads, so one struct can stand in for any request in a test.
#[derive(Default)]
struct TestBody {
    body_type: &'static str,
    target: Option<NodeId>,
    add_action: Option<AddAction>,
    plugin_uri: Option<&'static str>,
    args: Vec<ConfigArg>,
    port_index: Option<u32>,
    bus: Option<AudioBusId>,
    value: Option<f32>,
}

impl RequestBody for TestBody {
    fn body_type(&self) -> &str {
        self.body_type
    }
    fn target(&self) -> Option<NodeId> {
        self.target
    }
    fn add_action(&self) -> Option<AddAction> {
        self.add_action
    }
    fn plugin_uri(&self) -> Option<&str> {
        self.plugin_uri
    }
    fn args(&self) -> &[ConfigArg] {
        &self.args
    }
    fn port_index(&self) -> Option<u32> {
        self.port_index
    }
    fn bus(&self) -> Option<AudioBusId> {
        self.bus
    }
    fn value(&self) -> Option<f32> {
        self.value
    }
}

fn synth_body(target: NodeId, add_action: AddAction, plugin_uri: &'static str) -> TestBody {
    TestBody {
        body_type: "Synth",
        target: Some(target),
        add_action: Some(add_action),
        plugin_uri: Some(plugin_uri),
        ..TestBody::default()
    }
}

fn map_port_body(target: NodeId, port_index: u32, bus: AudioBusId) -> TestBody {
    TestBody {
        body_type: "MapPort",
        target: Some(target),
        port_index: Some(port_index),
        bus: Some(bus),
        ..TestBody::default()
    }
}

fn free_body(target: NodeId) -> TestBody {
    TestBody {
        body_type: "Free",
        target: Some(target),
        ..TestBody::default()
    }
}

/// Submit `body`, run one block, and return the assigned node id (panics on
/// failure — every scenario below expects success except where noted).
fn submit_and_process(
    env: &mut Environment,
    dispatcher: &mut Dispatcher,
    subject: u64,
    body: &dyn RequestBody,
) -> NodeId {
    let (tx, rx) = mpsc::channel();
    dispatcher
        .submit(subject, body, move |reply| tx.send(reply).unwrap())
        .unwrap();
    let mut scratch = [0.0f32; 1];
    let mut outputs: [&mut [f32]; 1] = [&mut scratch];
    env.process(1, &[], &mut outputs).unwrap();
    let reply = rx.recv().unwrap();
    assert!(reply.is_ok(), "expected success, got {:?}", reply.error);
    reply.node_id.expect("body should have created a node")
}

/// §8 scenario 3: a `test:sine` synth mapped to output bus 0 writes 0.5 to
/// every sample of that bus and leaves bus 1 silent.
#[test]
fn synth_on_output_writes_constant_to_mapped_bus_only() {
    let (mut env, tx, _jobs) = Environment::new(Options {
        block_size: 64,
        num_inputs: 0,
        num_outputs: 2,
        ..Options::default()
    });
    let registry = Arc::new(Mutex::new(PluginRegistry::new()));
    registry
        .lock()
        .unwrap()
        .register("test:sine", Arc::new(thrum_builtin::TestSine))
        .unwrap();
    let mut dispatcher = Dispatcher::new(tx, registry);

    let root = env.root();
    let synth = submit_and_process(
        &mut env,
        &mut dispatcher,
        1,
        &synth_body(root, AddAction::AddToHead, "test:sine"),
    );

    // No external inputs configured, so output bus 0 is flat index 0 (§3
    // bus-id layout: inputs first, then outputs, then internal buses).
    let bus0 = AudioBusId::from_index(0);
    submit_and_process(
        &mut env,
        &mut dispatcher,
        2,
        &map_port_body(synth, 0, bus0),
    );

    let mut out0 = [0.0f32; 64];
    let mut out1 = [0.0f32; 64];
    {
        let mut outputs: [&mut [f32]; 2] = [&mut out0, &mut out1];
        env.process(64, &[], &mut outputs).unwrap();
    }

    assert!(out0.iter().all(|&s| s == 0.5), "out0: {out0:?}");
    assert!(out1.iter().all(|&s| s == 0.0), "out1: {out1:?}");
}

/// §8 scenario 4: freeing one of two sibling synths detaches it without
/// disturbing its sibling, and its id stops resolving.
#[test]
fn freeing_one_sibling_synth_leaves_the_other_running() {
    let (mut env, tx, _jobs) = Environment::new(Options {
        block_size: 32,
        num_inputs: 0,
        num_outputs: 1,
        ..Options::default()
    });
    let registry = Arc::new(Mutex::new(PluginRegistry::new()));
    registry
        .lock()
        .unwrap()
        .register("test:sine", Arc::new(thrum_builtin::TestSine))
        .unwrap();
    let mut dispatcher = Dispatcher::new(tx, registry);

    let root = env.root();
    let s1 = submit_and_process(
        &mut env,
        &mut dispatcher,
        1,
        &synth_body(root, AddAction::AddToHead, "test:sine"),
    );
    let s2 = submit_and_process(
        &mut env,
        &mut dispatcher,
        2,
        &synth_body(root, AddAction::AddToTail, "test:sine"),
    );
    let bus0 = AudioBusId::from_index(0);
    submit_and_process(&mut env, &mut dispatcher, 3, &map_port_body(s1, 0, bus0));
    submit_and_process(&mut env, &mut dispatcher, 4, &map_port_body(s2, 0, bus0));

    let (tx_free, rx_free) = mpsc::channel();
    dispatcher
        .submit(5, &free_body(s1), move |reply| tx_free.send(reply).unwrap())
        .unwrap();

    let mut out = [0.0f32; 32];
    {
        let mut outputs: [&mut [f32]; 1] = [&mut out];
        env.process(32, &[], &mut outputs).unwrap();
    }
    let free_reply = rx_free.recv().unwrap();
    assert!(free_reply.is_ok());

    // s2 is still live and still mixing its 0.5 into bus 0.
    assert!(out.iter().all(|&s| s == 0.5), "out: {out:?}");
}

/// §8 scenario 6, exercised through the full `Dispatcher` rather than
/// `translate` directly: requesting an unregistered plugin creates no node
/// and consumes no id.
#[test]
fn unknown_plugin_creates_no_node_through_full_dispatch() {
    let (mut env, tx, _jobs) = Environment::new(Options::default());
    let registry = Arc::new(Mutex::new(PluginRegistry::new()));
    let mut dispatcher = Dispatcher::new(tx, registry);
    let root = env.root();

    let (reply_tx, reply_rx) = mpsc::channel();
    let err = dispatcher
        .submit(1, &synth_body(root, AddAction::AddToHead, "missing:plugin"), move |r| {
            reply_tx.send(r).unwrap()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        thrum_dispatch::DispatchError::Engine(thrum_core::EngineError::UnknownPlugin(_))
    ));
    assert!(reply_rx.try_recv().is_err(), "respond must not have been called");

    let mut out = [0.0f32; 8];
    let mut outputs: [&mut [f32]; 1] = [&mut out];
    env.process(8, &[], &mut outputs).unwrap();
}
