mod arena;
mod body;
mod car;
mod car_config;
mod car_controls;
mod chassis;
mod engine;
mod steering;
pub mod tire;

pub use arena::{Arena, ArenaConfig, FrameClock};
pub use body::BodyFrame;
pub use car::{Car, CarState};
pub use car_config::{CarConfig, ConfigError, MAX_FORWARD_GEARS};
pub use car_controls::CarControls;
pub use chassis::{Chassis, Particle, Wheel};
pub use engine::{ClutchRegime, Engine, Gear};
pub use steering::Steering;
