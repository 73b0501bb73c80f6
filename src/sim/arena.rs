use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Car, CarConfig, ConfigError};
use crate::consts;

/// World-level tunables: the bounded driving area and the fixed timestep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// m, walls sit at +/- these extents on each axis
    pub half_extents: Vec2,
    /// Wall coefficient of restitution
    pub restitution: f32,
    /// Fixed simulation ticks per second
    pub tick_rate: f32,
    /// Most ticks a single frame may run before the backlog is shed
    pub max_ticks_per_frame: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ArenaConfig {
    pub const DEFAULT: Self = Self {
        half_extents: Vec2::new(consts::arena::HALF_EXTENT_X, consts::arena::HALF_EXTENT_Y),
        restitution: consts::arena::RESTITUTION,
        tick_rate: consts::DEFAULT_TICK_RATE,
        max_ticks_per_frame: consts::arena::MAX_TICKS_PER_FRAME,
    };

    /// Checks the world preconditions, including that the car fits.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition.
    pub fn validate(&self, car: &CarConfig) -> Result<(), ConfigError> {
        if self.tick_rate <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "tick_rate",
                value: self.tick_rate,
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::NonPositive {
                name: "max_ticks_per_frame",
                value: 0.0,
            });
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::RestitutionOutOfRange(self.restitution));
        }

        let required = car.wheelbase.hypot(car.track_width) * 0.5;
        if self.half_extents.x <= required || self.half_extents.y <= required {
            return Err(ConfigError::ArenaTooSmall {
                x: self.half_extents.x,
                y: self.half_extents.y,
                required,
            });
        }

        Ok(())
    }
}

/// Converts real frame durations into whole fixed ticks.
///
/// Elapsed time accumulates across frames; each [`Self::advance`] call pays
/// out as many fixed ticks as the balance covers and keeps the remainder, so
/// the simulation's numerical behavior is independent of display frame rate.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    tick_time: f32,
    accumulator: f32,
    max_ticks_per_frame: u32,
}

impl FrameClock {
    #[must_use]
    pub const fn new(tick_time: f32, max_ticks_per_frame: u32) -> Self {
        Self {
            tick_time,
            accumulator: 0.0,
            max_ticks_per_frame,
        }
    }

    /// Banks `frame_time` seconds and returns how many fixed ticks to run.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.max(0.0);
        let ticks = (self.accumulator / self.tick_time) as u32;
        self.accumulator -= ticks as f32 * self.tick_time;

        if ticks > self.max_ticks_per_frame {
            // a hitch this long is unrecoverable in real time; shed the
            // backlog rather than spiral
            self.accumulator = 0.0;
            return self.max_ticks_per_frame;
        }
        ticks
    }
}

/// The world: one car inside axis-aligned walls, advanced on a fixed
/// timestep.
///
/// Single-threaded by design - there is exactly one writer ([`Arena::step`])
/// and any number of readers between steps.
pub struct Arena {
    config: ArenaConfig,
    clock: FrameClock,
    tick_time: f32,
    tick_count: u64,
    pub car: Car,
}

impl Arena {
    /// Builds a world with default bounds around a validated car.
    ///
    /// # Errors
    ///
    /// Returns the first configuration precondition the car violates.
    pub fn new(car_config: CarConfig) -> Result<Self, ConfigError> {
        Self::new_with_config(ArenaConfig::DEFAULT, car_config)
    }

    /// # Errors
    ///
    /// Returns the first violated configuration precondition.
    pub fn new_with_config(
        config: ArenaConfig,
        car_config: CarConfig,
    ) -> Result<Self, ConfigError> {
        car_config.validate()?;
        config.validate(&car_config)?;

        let tick_time = 1.0 / config.tick_rate;
        Ok(Self {
            clock: FrameClock::new(tick_time, config.max_ticks_per_frame),
            tick_time,
            tick_count: 0,
            car: Car::new(car_config, Vec2::ZERO, 0.0),
            config,
        })
    }

    /// Advances the simulation by exactly `ticks` fixed steps.
    pub fn step(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.car
                .tick(self.config.half_extents, self.config.restitution, self.tick_time);
            self.tick_count += 1;
        }
    }

    /// Feeds a real frame duration through the accumulator and runs however
    /// many fixed ticks it covers. Returns that tick count.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        let ticks = self.clock.advance(frame_time);
        self.step(ticks);
        ticks
    }

    /// Re-seats the car at a pose with zero velocity.
    pub fn reset_car(&mut self, pos: Vec2, heading: f32) {
        self.car.reset(pos, heading);
    }

    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub const fn tick_time(&self) -> f32 {
        self.tick_time
    }

    #[must_use]
    pub const fn get_tick_rate(&self) -> f32 {
        1.0 / self.tick_time
    }

    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_banks_fractional_frames() {
        let mut clock = FrameClock::new(1.0 / 120.0, 8);
        assert_eq!(clock.advance(0.017), 2);
        // too short for a tick on its own, banked instead
        assert_eq!(clock.advance(0.004), 0);
        assert_eq!(clock.advance(0.005), 1);
    }

    #[test]
    fn frame_clock_sheds_backlog() {
        let mut clock = FrameClock::new(1.0 / 120.0, 8);
        assert_eq!(clock.advance(5.0), 8);
        // the backlog is gone, not deferred
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn arena_rejects_bounds_smaller_than_the_car() {
        let config = ArenaConfig {
            half_extents: Vec2::new(1.0, 1.0),
            ..ArenaConfig::DEFAULT
        };
        assert!(matches!(
            Arena::new_with_config(config, CarConfig::hatch()),
            Err(ConfigError::ArenaTooSmall { .. })
        ));
    }

    #[test]
    fn step_counts_ticks() {
        let mut arena = Arena::new(CarConfig::hatch()).unwrap();
        arena.step(12);
        assert_eq!(arena.tick_count(), 12);
    }
}
