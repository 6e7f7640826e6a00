//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - One tick per frame, one sampled `now` per tick
//! - Seeded RNG only
//! - Dead entities are compacted at the end of a tick
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod entities;
pub mod geometry;
pub mod physics;
pub mod player;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::{PauseClock, TimeShift};
pub use entities::{Asteroid, AsteroidState, BlackHole, Bullet, PowerUp, PowerUpKind};
pub use geometry::Field;
pub use player::{Controls, Player};
pub use snapshot::FrameSnapshot;
pub use state::{GameEvent, GamePhase, GameState, SoundCue};
pub use tick::{TickInput, tick, toggle_pause};
