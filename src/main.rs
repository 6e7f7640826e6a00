//! Astro Drift entry point
//!
//! The browser build is driven from JS through `platform::web::WebGame`.
//! Natively this runs a headless autopilot session and logs the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use astro_drift::consts::FRAME_MS;
    use astro_drift::persistence::MemoryStore;
    use astro_drift::platform::Host;
    use astro_drift::sim::{Field, GamePhase};

    env_logger::init();
    log::info!("Astro Drift (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    let mut host = Host::new(MemoryStore::new(), seed, Field::new(800.0, 600.0), 0.0);
    host.request_start();

    let max_frames = 60 * 180;
    let mut now = 0.0;
    let mut frames = 0;
    while frames < max_frames {
        autopilot::steer(&mut host);
        let events = host.frame(now);
        for cue in host.audible(&events) {
            log::debug!("[{:>8.0} ms] sound {}", now, cue.name());
        }
        if host.state().phase == GamePhase::GameOver {
            break;
        }
        now += FRAME_MS;
        frames += 1;
    }

    let stats = &host.state().stats;
    log::info!(
        "Autopilot finished after {} frames: score {}, {} shots, {:.1}% accuracy, {} destroyed, high score {}",
        frames,
        stats.score,
        stats.shots,
        stats.accuracy(),
        stats.destroyed,
        host.high_score()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_main, this is just to satisfy the compiler
}

/// Turn toward the nearest rock and fire when lined up
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use astro_drift::persistence::KeyValueStore;
    use astro_drift::platform::Host;
    use astro_drift::sim::Controls;
    use astro_drift::{angle_of, normalize_angle};

    const AIM_TOLERANCE: f32 = 0.08;

    pub fn steer<S: KeyValueStore>(host: &mut Host<S>) {
        let player = &host.state().player;
        let target = host
            .state()
            .asteroids
            .iter()
            .filter(|a| a.is_active())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            })
            .map(|a| a.pos);

        let Some(target) = target else {
            host.set_controls(Controls::default());
            return;
        };

        let error = normalize_angle(angle_of(target - player.pos) - player.angle);
        host.set_controls(Controls::Keys {
            left: error < -AIM_TOLERANCE,
            right: error > AIM_TOLERANCE,
            thrust: false,
            reverse: false,
        });
        if error.abs() <= AIM_TOLERANCE {
            host.request_shoot();
        }
    }
}
