//! Headless node network demo
//!
//! Drives the engine the way a host page would: a 60 Hz clock, a wandering
//! pointer, a few page elements to avoid, a hidden-tab interval and a window
//! resize. Positions and line resources would normally go to a renderer; here
//! the per-second summaries are logged instead.
//!
//! Usage: `network_demo [settings.toml|settings.ron]`

use node_network::prelude::*;
use rand::Rng;

const FRAME_RATE: f32 = 60.0;
const TOTAL_FRAMES: u32 = 900;

/// Page element in container pixels
struct PageElement {
    id: u64,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

const PAGE_ELEMENTS: [PageElement; 3] = [
    PageElement { id: 1, left: 440.0, top: 80.0, width: 400.0, height: 120.0 },
    PageElement { id: 2, left: 120.0, top: 420.0, width: 300.0, height: 180.0 },
    PageElement { id: 3, left: 860.0, top: 400.0, width: 280.0, height: 220.0 },
];

fn measure_obstacles(engine: &NetworkEngine) -> Vec<DomCollider> {
    let (container_width, container_height) = engine.container_size();
    let world = engine.extent();

    PAGE_ELEMENTS
        .iter()
        .map(|element| {
            let center = dom_to_world(
                element.left + element.width * 0.5,
                element.top + element.height * 0.5,
                container_width,
                container_height,
                world.width,
                world.height,
            );
            DomCollider::new(
                center.x,
                center.y,
                element.width / container_width * world.width,
                element.height / container_height * world.height,
                ColliderSource(element.id),
            )
        })
        .collect()
}

fn run(settings_path: Option<String>) -> Result<(), EngineError> {
    let mut options = EngineOptions {
        signals: DeviceSignals::probe_host(),
        ..EngineOptions::default()
    };
    if let Some(path) = settings_path {
        options = options.with_settings_file(&path)?;
    }

    let mut engine = NetworkEngine::new(options)?;
    let mut rng = rand::thread_rng();

    for frame in 0..TOTAL_FRAMES {
        let elapsed = frame as f32 / FRAME_RATE;

        match frame {
            240 => engine.set_page_visible(false),
            300 => engine.set_page_visible(true),
            420 => engine.resize_container(1024.0, 768.0),
            _ => {}
        }

        if (60..600).contains(&frame) {
            let (width, height) = engine.container_size();
            let angle = elapsed * 0.8;
            let x = width * 0.5 + angle.cos() * width * 0.3 + rng.gen_range(-3.0..3.0);
            let y = height * 0.5 + angle.sin() * height * 0.3 + rng.gen_range(-3.0..3.0);
            engine.pointer_moved(x, y);
        } else if frame == 600 {
            engine.pointer_left();
        }

        let report = engine.tick(elapsed);

        if report.work.contains(FrameWork::OBSTACLES_STALE) {
            let obstacles = measure_obstacles(&engine);
            engine.set_obstacles(obstacles);
        }
        if report.work.contains(FrameWork::RESIZED) {
            let (width, height) = engine.container_size();
            log::info!("Resize applied at frame {}: {}x{}", frame, width, height);
        }
        if report.work.contains(FrameWork::RENDER_SKIPPED) {
            log::warn!("Frame {} rendered without connection updates", frame);
        }

        if frame % 60 == 0 {
            if report.work.contains(FrameWork::SUSPENDED) {
                log::info!("t={:5.1}s suspended", elapsed);
            } else {
                let stats = engine.pool().stats();
                log::info!(
                    "t={:5.1}s nodes={} live={} fading={} lines={} (allocated {}, reused {}) repulsion={:.3}",
                    elapsed,
                    report.simulation.nodes,
                    report.live_connections,
                    report.fading_connections,
                    report.resources_outstanding,
                    stats.allocated,
                    stats.reused,
                    report.simulation.repulsion_impulse
                );
            }
        }
    }

    engine.teardown();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting node network demo");

    match run(std::env::args().nth(1)) {
        Ok(()) => {
            log::info!("Node network demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Node network demo failed: {}", e);
            Err(e.into())
        }
    }
}
