//! A deterministic, fixed-timestep arcade vehicle dynamics kernel.
//!
//! The car body is four corner particles integrated with position-based
//! (Verlet) steps and kept rigid by iterative distance constraints. Each
//! tick, per-wheel normal loads are redistributed by weight transfer, tire
//! forces come out of a simplified slip-based Pacejka model under a
//! friction-ellipse cap, and a torque-based engine/clutch/gearbox state
//! machine closes the loop between wheel speed and crank rpm.
//!
//! ```
//! use driftsim::sim::{Arena, CarConfig, Gear};
//!
//! let mut arena = Arena::new(CarConfig::hatch()).unwrap();
//!
//! // clutch in, let the pedal travel, then grab first gear
//! arena.car.controls.clutch = true;
//! arena.step(120);
//! arena.car.controls.gear_request = Some(Gear::First);
//! arena.car.controls.throttle = 0.5;
//! arena.advance(1.0 / 60.0);
//!
//! let state = arena.car.get_state();
//! assert!(state.is_running && !state.is_stalled);
//! ```
//!
//! Rendering, audio, input decoding and UI parameter binding are external
//! collaborators: they feed [`sim::CarControls`] and the config structs in,
//! and read [`sim::CarState`] snapshots out between steps.

pub mod consts;
pub mod logging;
pub mod math;
pub mod sim;

pub use sim::{Arena, ArenaConfig, Car, CarConfig, CarControls, CarState, ConfigError, Gear, Wheel};
