//! End-to-end scenarios driving [`NetworkEngine`] the way a host page would

use crate::config::{Config, NetworkSettings, MAX_NODE_COUNT};
use crate::engine::{EngineOptions, EngineState, FrameWork, NetworkEngine};
use crate::foundation::logging;
use crate::foundation::math::Vec3;
use crate::hardware::{DeviceSignals, PerformanceTier};

const FRAME: f32 = 1.0 / 60.0;

fn engine_with(tier: PerformanceTier, settings: NetworkSettings) -> NetworkEngine {
    logging::init_for_tests();
    NetworkEngine::new(EngineOptions {
        settings,
        signals: DeviceSignals::default(),
        tier_override: Some(tier),
        seed: Some(42),
        ..EngineOptions::default()
    })
    .unwrap()
}

fn run_frames(engine: &mut NetworkEngine, from: u32, to: u32) {
    for frame in from..to {
        engine.tick(frame as f32 * FRAME);
    }
}

#[test]
fn test_mobile_device_resolves_low_tier() {
    logging::init_for_tests();
    let engine = NetworkEngine::new(EngineOptions {
        signals: DeviceSignals {
            user_agent: Some("Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile".into()),
            logical_cores: Some(8),
            memory_gb: Some(8.0),
        },
        seed: Some(1),
        ..EngineOptions::default()
    })
    .unwrap();

    let settings = engine.settings();
    assert_eq!(settings.tier, PerformanceTier::Low);
    assert_eq!(settings.node_count, 110);
    assert_eq!(settings.connection_distance, 5.0);
    assert_eq!(settings.update_interval, 6);
    assert_eq!(settings.max_connections, 50);
    assert_eq!(engine.field().len(), 110);
}

#[test]
fn test_tier_precedence() {
    logging::init_for_tests();
    let workstation = DeviceSignals {
        user_agent: None,
        logical_cores: Some(16),
        memory_gb: Some(32.0),
    };
    let persisted_low = NetworkSettings {
        performance_tier: Some(PerformanceTier::Low),
        ..NetworkSettings::default()
    };

    let detected = NetworkEngine::new(EngineOptions {
        signals: workstation.clone(),
        seed: Some(1),
        ..EngineOptions::default()
    })
    .unwrap();
    assert_eq!(detected.profile().tier, PerformanceTier::High);

    let persisted = NetworkEngine::new(EngineOptions {
        settings: persisted_low.clone(),
        signals: workstation.clone(),
        seed: Some(1),
        ..EngineOptions::default()
    })
    .unwrap();
    assert_eq!(persisted.profile().tier, PerformanceTier::Low);

    let explicit = NetworkEngine::new(EngineOptions {
        settings: persisted_low,
        signals: workstation,
        tier_override: Some(PerformanceTier::Medium),
        seed: Some(1),
        ..EngineOptions::default()
    })
    .unwrap();
    assert_eq!(explicit.profile().tier, PerformanceTier::Medium);
}

#[test]
fn test_missing_signals_fall_back_to_medium() {
    logging::init_for_tests();
    let engine = NetworkEngine::new(EngineOptions {
        signals: DeviceSignals::default(),
        seed: Some(3),
        ..EngineOptions::default()
    })
    .unwrap();
    assert_eq!(engine.profile().tier, PerformanceTier::Medium);
}

#[test]
fn test_settings_file_sets_persisted_tier() {
    logging::init_for_tests();
    let path = std::env::temp_dir().join(format!("node_network_settings_{}.toml", std::process::id()));
    let path = path.to_string_lossy().into_owned();

    let saved = NetworkSettings {
        performance_tier: Some(PerformanceTier::High),
        node_count: Some(64),
        ..NetworkSettings::default()
    };
    saved.save_to_file(&path).unwrap();

    let options = EngineOptions {
        signals: DeviceSignals::default(),
        seed: Some(5),
        ..EngineOptions::default()
    }
    .with_settings_file(&path)
    .unwrap();
    let engine = NetworkEngine::new(options).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(engine.profile().tier, PerformanceTier::High);
    assert_eq!(engine.field().len(), 64);
    assert_eq!(engine.settings().max_connections, 150);
}

#[test]
fn test_idle_pointer_stops_repelling() {
    let mut engine = engine_with(
        PerformanceTier::Low,
        NetworkSettings {
            mouse_repulsion_radius: Some(100.0),
            ..NetworkSettings::default()
        },
    );

    engine.pointer_moved(640.0, 360.0);
    let active = engine.tick(0.0);
    assert!(active.simulation.repulsion_impulse > 0.0);

    let still_active = engine.tick(4.9);
    assert!(still_active.simulation.repulsion_impulse > 0.0);

    let idle = engine.tick(5.0);
    assert_eq!(idle.simulation.repulsion_impulse, 0.0);
}

#[test]
fn test_pointer_leave_stops_repelling() {
    let mut engine = engine_with(
        PerformanceTier::Low,
        NetworkSettings {
            mouse_repulsion_radius: Some(100.0),
            ..NetworkSettings::default()
        },
    );

    engine.pointer_moved(100.0, 100.0);
    assert!(engine.tick(0.0).simulation.repulsion_impulse > 0.0);
    engine.pointer_left();
    assert_eq!(engine.tick(FRAME).simulation.repulsion_impulse, 0.0);
}

#[test]
fn test_hidden_page_freezes_state() {
    let mut engine = engine_with(PerformanceTier::Medium, NetworkSettings::default());
    run_frames(&mut engine, 0, 30);

    let positions = engine.registry().positions().to_vec();
    let frames = engine.frame_count();
    let live = engine.graph().connection_count();

    engine.set_page_visible(false);
    assert_eq!(engine.state(), EngineState::Suspended);
    for frame in 30..90 {
        let report = engine.tick(frame as f32 * FRAME);
        assert!(report.work.contains(FrameWork::SUSPENDED));
        assert!(!report.advanced());
    }
    assert_eq!(engine.registry().positions(), positions.as_slice());
    assert_eq!(engine.frame_count(), frames);
    assert_eq!(engine.graph().connection_count(), live);

    engine.set_page_visible(true);
    engine.set_in_viewport(false);
    assert!(engine.tick(2.0).work.contains(FrameWork::SUSPENDED));

    engine.set_in_viewport(true);
    assert!(engine.tick(2.0 + FRAME).advanced());
    assert_eq!(engine.frame_count(), frames + 1);
}

#[test]
fn test_teardown_disposes_resources() {
    let mut engine = engine_with(PerformanceTier::High, NetworkSettings::default());
    engine.resize_container(800.0, 600.0);
    run_frames(&mut engine, 0, 120);
    assert!(engine.pool().capacity() > 0);

    engine.pointer_moved(10.0, 10.0);
    engine.resize_container(640.0, 480.0);
    engine.teardown();

    assert_eq!(engine.state(), EngineState::TornDown);
    assert_eq!(engine.pool().capacity(), 0);
    assert_eq!(engine.pool().outstanding(), 0);
    assert_eq!(engine.pool().factory().live(), 0);
    assert_eq!(engine.connections().count(), 0);

    let report = engine.tick(10.0);
    assert!(report.work.contains(FrameWork::TORN_DOWN));
    assert!(!report.work.contains(FrameWork::RESIZED));
    assert_eq!(engine.container_size(), (800.0, 600.0));
}

#[test]
fn test_connections_stay_within_budget() {
    let mut engine = engine_with(PerformanceTier::High, NetworkSettings::default());
    let budget = engine.settings().max_connections;

    let mut saw_connections = false;
    for frame in 0..600 {
        let report = engine.tick(frame as f32 * FRAME);
        assert!(report.live_connections <= budget);
        saw_connections |= report.live_connections > 0;
        for connection in engine.connections() {
            assert!((0.0..=engine.settings().node_opacity + 1e-6).contains(&connection.opacity));
        }
    }
    assert!(saw_connections);
}

#[test]
fn test_reduced_budget_applies_on_next_pass() {
    let mut engine = engine_with(PerformanceTier::High, NetworkSettings::default());
    run_frames(&mut engine, 0, 10);

    engine
        .apply_settings(NetworkSettings {
            max_connections: Some(5),
            ..NetworkSettings::default()
        })
        .unwrap();
    let report = engine.tick(10.0 * FRAME);
    assert!(report.topology.is_some());
    assert!(report.live_connections <= 5);
}

#[test]
fn test_node_identity_survives_resize_cycle() {
    let mut engine = engine_with(
        PerformanceTier::Low,
        NetworkSettings {
            node_count: Some(100),
            ..NetworkSettings::default()
        },
    );
    run_frames(&mut engine, 0, 10);
    let anchors: Vec<Vec3> = engine.field().nodes().iter().map(|node| node.base_position).collect();

    for (step, count) in [160, 100].into_iter().enumerate() {
        engine
            .apply_settings(NetworkSettings {
                node_count: Some(count),
                ..NetworkSettings::default()
            })
            .unwrap();
        let start = 10 + step as u32 * 10;
        run_frames(&mut engine, start, start + 10);
        assert_eq!(engine.field().len(), count);
        assert_eq!(engine.registry().len(), count);
    }

    for (node, anchor) in engine.field().nodes().iter().zip(&anchors) {
        assert_eq!(node.base_position, *anchor);
    }
    for (position, node) in engine.field().nodes().iter().enumerate() {
        assert_eq!(node.index, position);
    }
}

#[test]
fn test_node_radius_drives_published_scales() {
    let mut engine = engine_with(
        PerformanceTier::Low,
        NetworkSettings {
            node_radius: Some(0.5),
            ..NetworkSettings::default()
        },
    );
    engine.tick(0.0);
    assert!(engine.registry().scales().iter().all(|&scale| (0.4..=0.6).contains(&scale)));

    engine
        .apply_settings(NetworkSettings {
            node_radius: Some(0.05),
            ..NetworkSettings::default()
        })
        .unwrap();
    engine.tick(FRAME);
    assert!(engine.registry().scales().iter().all(|&scale| scale <= 0.06));
}

#[test]
fn test_oversized_node_count_is_clamped() {
    let mut engine = engine_with(PerformanceTier::Low, NetworkSettings::default());
    engine.tick(0.0);

    engine
        .apply_settings(NetworkSettings {
            node_count: Some(usize::MAX / 2),
            ..NetworkSettings::default()
        })
        .unwrap();
    assert_eq!(engine.field().len(), MAX_NODE_COUNT);
    assert_eq!(engine.registry().len(), MAX_NODE_COUNT);
    assert!(engine.tick(FRAME).advanced());
}

#[test]
fn test_allocation_failure_skips_render_only() {
    logging::init_for_tests();
    let mut engine = NetworkEngine::new(EngineOptions {
        signals: DeviceSignals::default(),
        tier_override: Some(PerformanceTier::High),
        seed: Some(42),
        allocation_limit: Some(0),
        ..EngineOptions::default()
    })
    .unwrap();

    let first = engine.tick(0.0);
    assert!(first.live_connections > 0);
    let before = engine.registry().positions().to_vec();

    let report = engine.tick(FRAME);
    assert!(report.work.contains(FrameWork::PHYSICS | FrameWork::RENDER_SKIPPED));
    assert!(!report.rendered());
    assert_eq!(report.resources_outstanding, 0);
    assert_ne!(engine.registry().positions(), before.as_slice());
}
