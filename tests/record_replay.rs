//! Record-replay round-trip integration test.
//!
//! Records a reconciliation pass against an in-memory lab, then replays the
//! cassettes with no lab at all and checks the pass comes out the same.

use labsync::adapters::memory::MemoryLab;
use labsync::adapters::recording::{
    RecordingCapabilities, RecordingNetworkApi, RecordingNodeApi, RecordingTopologyApi,
};
use labsync::cassette::config::CassetteConfig;
use labsync::cassette::session::RecordingSession;
use labsync::context::ServiceContext;
use labsync::link::{Endpoint, LinkDeclaration, LinkError, LinkReconciler, LinkState, Observation};

const LAB: &str = "/replay.unl";

fn declaration() -> LinkDeclaration {
    LinkDeclaration {
        lab: LAB.into(),
        source: Endpoint::new(1, "e0"),
        network: None,
        target: Some(Endpoint::new(2, "e0")),
        style: None,
    }
}

/// Creates the link, reads it back, then reads a record whose node is gone.
fn exercise(ctx: &ServiceContext) -> (LinkState, Observation, String) {
    let reconciler = LinkReconciler::new(ctx);
    let created = reconciler.create(&declaration()).unwrap();
    let observed = reconciler.read(&created).unwrap();
    let mut stale = created.clone();
    stale.source = Endpoint::new(9, "e0");
    let drift = match reconciler.read(&stale) {
        Err(err @ LinkError::Drift { .. }) => err.to_string(),
        other => panic!("expected drift, got {other:?}"),
    };
    (created, observed, drift)
}

#[test]
fn record_then_replay_produces_identical_outputs() {
    let root = std::env::temp_dir().join("labsync_record_replay_test");
    let _ = std::fs::remove_dir_all(&root);

    // --- Phase 1: record against an in-memory lab ---
    let lab = MemoryLab::new();
    lab.add_node(LAB, 1, "r1", &["e0"]);
    lab.add_node(LAB, 2, "r2", &["e0"]);
    let session = RecordingSession::new(&root, "memory").unwrap();
    let mut recording = ServiceContext::in_memory(&lab);
    recording.nodes = Box::new(RecordingNodeApi::new(Box::new(lab.clone()), session.nodes.clone()));
    recording.networks =
        Box::new(RecordingNetworkApi::new(Box::new(lab.clone()), session.networks.clone()));
    recording.topology =
        Box::new(RecordingTopologyApi::new(Box::new(lab.clone()), session.topology.clone()));
    recording.capabilities =
        Box::new(RecordingCapabilities::new(Box::new(lab.clone()), session.capability.clone()));

    let recorded = exercise(&recording);
    let dir = session.save().unwrap().to_path_buf();
    assert!(dir.join("nodes.cassette.yaml").is_file());
    assert!(dir.join("networks.cassette.yaml").is_file());

    // --- Phase 2: replay with no lab behind the ports ---
    let config = CassetteConfig::from_dir(&dir).unwrap();
    let replayed = exercise(&ServiceContext::replaying_from(&config).unwrap());
    assert_eq!(recorded, replayed);

    // --- Phase 3: replay again for determinism ---
    let again = exercise(&ServiceContext::replaying_from(&config).unwrap());
    assert_eq!(replayed, again);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn replay_past_the_recording_fails_instead_of_panicking() {
    let root = std::env::temp_dir().join("labsync_replay_exhausted_test");
    let _ = std::fs::remove_dir_all(&root);
    let session = RecordingSession::new(&root, "memory").unwrap();
    let dir = session.save().unwrap().to_path_buf();

    let ctx = ServiceContext::replaying_from(&CassetteConfig::from_dir(&dir).unwrap()).unwrap();
    let err = LinkReconciler::new(&ctx).create(&declaration()).unwrap_err();

    assert!(matches!(err, LinkError::Api(labsync::ports::ApiError::Replay(_))));
    let _ = std::fs::remove_dir_all(&root);
}
