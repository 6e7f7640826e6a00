//! Render/HUD snapshot handed to the host each frame
//!
//! Plain data, serialized to JSON for the browser. Scales and opacities are
//! already resolved against `now`.

use glam::Vec2;
use serde::Serialize;

use super::entities::{AsteroidState, BULLET_COLOR, Crater, ExplosionPiece, PLAYER_COLOR, PowerUpKind};
use super::state::{GamePhase, GameState};

#[derive(Debug, Clone, Serialize)]
pub struct PieceView {
    pub pos: Vec2,
    pub size: f32,
    pub color: &'static str,
    pub opacity: f32,
}

impl From<&ExplosionPiece> for PieceView {
    fn from(piece: &ExplosionPiece) -> Self {
        Self {
            pos: piece.pos,
            size: piece.size,
            color: piece.color,
            opacity: piece.opacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub angle: f32,
    /// Default ship color; hosts overlay the player's preference
    pub color: String,
    pub scale: f32,
    pub exploded: bool,
    pub thrusting: bool,
    pub thrust_frame: u32,
    pub shield_active: bool,
    pub shield_visible: bool,
    pub shield_angle: f32,
    pub pieces: Vec<PieceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AsteroidView {
    pub id: u32,
    pub pos: Vec2,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
    pub size: f32,
    pub color: &'static str,
    pub outline: Vec<Vec2>,
    pub craters: Vec<Crater>,
    pub exploding: bool,
    pub debris: Vec<PieceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlackHoleView {
    pub pos: Vec2,
    pub angle: f32,
    pub spin: f32,
    pub scale: f32,
    pub opacity: f32,
    pub radius: f32,
    pub core_radius: f32,
    pub gravity_radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointTextView {
    pub pos: Vec2,
    pub text: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub score: u64,
    pub shots: u32,
    pub hits: u32,
    pub accuracy: f32,
    pub elapsed_ms: f64,
    pub destroyed: u32,
    pub high_score: u64,
    /// The session currently holds the high score
    pub high_score_is_current: bool,
}

/// Everything a renderer and HUD need for one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub paused: bool,
    pub width: f32,
    pub height: f32,
    /// `None` in attract mode
    pub player: Option<PlayerView>,
    pub bullets: Vec<BulletView>,
    pub asteroids: Vec<AsteroidView>,
    pub power_ups: Vec<PowerUpView>,
    pub black_hole: Option<BlackHoleView>,
    pub point_texts: Vec<PointTextView>,
    pub stats: StatsView,
    pub flash_opacity: f32,
    pub shake_intensity: f32,
}

impl FrameSnapshot {
    pub fn capture(state: &GameState, now: f64) -> Self {
        let player = (state.phase != GamePhase::Attract).then(|| {
            let p = &state.player;
            PlayerView {
                pos: p.pos,
                angle: p.angle,
                color: PLAYER_COLOR.to_string(),
                scale: p.recoil_scale(),
                exploded: p.exploded,
                thrusting: p.thrusting,
                thrust_frame: p.thrust_frame,
                shield_active: p.has_shield(),
                shield_visible: p.has_shield() && p.shield.visible,
                shield_angle: p.shield.ring_angle,
                pieces: p.pieces.iter().map(PieceView::from).collect(),
            }
        });

        let asteroids = state
            .asteroids
            .iter()
            .filter(|a| !a.is_gone())
            .map(|a| {
                let level = a.fade_level(now);
                let debris = match &a.state {
                    AsteroidState::Exploding { debris, .. } => {
                        debris.iter().map(PieceView::from).collect()
                    }
                    _ => Vec::new(),
                };
                AsteroidView {
                    id: a.id,
                    pos: a.pos,
                    rotation: a.rotation,
                    scale: level,
                    opacity: level,
                    size: a.size,
                    color: a.color,
                    outline: a.outline.clone(),
                    craters: a.craters.clone(),
                    exploding: !a.is_active(),
                    debris,
                }
            })
            .collect();

        let power_ups = state
            .power_ups
            .iter()
            .filter(|p| !p.gone)
            .map(|p| {
                let level = p.fade_level(now);
                PowerUpView {
                    id: p.id,
                    kind: p.kind,
                    pos: p.pos,
                    rotation: p.rotation,
                    scale: level * p.pulse(now),
                    opacity: level,
                    size: p.size(),
                }
            })
            .collect();

        let black_hole = state.black_hole.as_ref().filter(|h| !h.gone).map(|h| {
            let level = h.fade_level(now);
            BlackHoleView {
                pos: h.pos,
                angle: h.angle,
                spin: h.spin_angle,
                scale: level,
                opacity: level,
                radius: h.hit_radius(),
                core_radius: h.core_radius(),
                gravity_radius: h.gravity_radius(),
            }
        });

        let stats = &state.stats;
        Self {
            phase: state.phase,
            paused: state.is_paused(),
            width: state.field.width,
            height: state.field.height,
            player,
            bullets: state
                .bullets
                .iter()
                .filter(|b| b.alive)
                .map(|b| BulletView {
                    pos: b.pos,
                    radius: b.radius(),
                    color: BULLET_COLOR,
                })
                .collect(),
            asteroids,
            power_ups,
            black_hole,
            point_texts: state
                .point_texts
                .iter()
                .map(|t| PointTextView {
                    pos: t.pos,
                    text: t.label(),
                    opacity: t.opacity(),
                })
                .collect(),
            stats: StatsView {
                score: stats.score,
                shots: stats.shots,
                hits: stats.hits,
                accuracy: stats.accuracy(),
                elapsed_ms: stats.elapsed_ms(now),
                destroyed: stats.destroyed,
                high_score: state.high_score,
                high_score_is_current: state.high_score_beaten,
            },
            flash_opacity: state.effects.flash_opacity(now),
            shake_intensity: state.effects.shake_intensity(now),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Field;

    #[test]
    fn test_attract_has_no_player() {
        let state = GameState::new(1, Field::new(800.0, 600.0), 0.0);
        let snap = FrameSnapshot::capture(&state, 500.0);
        assert!(snap.player.is_none());
        assert_eq!(snap.asteroids.len(), state.asteroids.len());
        // Half way through the fade-in
        assert!((snap.asteroids[0].opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(1, Field::new(800.0, 600.0), 0.0);
        state.start(0.0);
        state.spawn_black_hole(0.0);
        let json = FrameSnapshot::capture(&state, 100.0).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "Playing");
        assert_eq!(value["stats"]["score"], 0);
        assert!(value["black_hole"].is_object());
        assert!(value["player"]["pos"].is_array());
    }
}
