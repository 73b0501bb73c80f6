use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

/// Most forward gears a gearbox may define.
pub const MAX_FORWARD_GEARS: usize = 6;

/// A precondition violation caught by [`CarConfig::validate`] or
/// [`super::ArenaConfig::validate`] before the core runs.
///
/// The step functions themselves never fail; they assume a validated
/// configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("redline rpm {redline} must exceed idle rpm {idle}")]
    RedlineBelowIdle { idle: f32, redline: f32 },
    #[error("gear ratio table is empty")]
    EmptyGearTable,
    #[error("constraint iterations must be at least 1")]
    NoConstraintIterations,
    #[error("restitution {0} must be within [0, 1]")]
    RestitutionOutOfRange(f32),
    #[error("arena half extents ({x}, {y}) cannot fit the car (needs {required})")]
    ArenaTooSmall { x: f32, y: f32, required: f32 },
}

/// Every tunable of one car, immutable for the duration of a tick.
///
/// The hosting configuration layer owns this struct and may replace values
/// between ticks; the core only ever reads it. Run [`CarConfig::validate`]
/// after any edit - a zero wheelbase or peak-slip constant is undefined
/// behavior for the solver, not a handled case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    /// kg
    pub mass: f32,
    /// m/s^2
    pub gravity: f32,
    /// m, center of gravity height used by weight transfer
    pub cog_height: f32,
    /// m
    pub wheelbase: f32,
    /// m
    pub track_width: f32,
    /// m
    pub wheel_radius: f32,

    pub friction_coeff: f32,
    pub pacejka_b: f32,
    pub pacejka_c: f32,
    /// rad, slip angle of peak lateral grip
    pub peak_slip_angle: f32,
    /// normalized slip ratio of peak longitudinal grip
    pub peak_slip_ratio: f32,
    /// m/s, slip is suppressed below this wheel speed
    pub min_slip_speed: f32,

    pub rolling_resistance: f32,
    /// N / (m/s)^2
    pub aero_drag: f32,
    /// N, total while braking
    pub brake_force: f32,
    /// N
    pub idle_creep_force: f32,
    /// m/s
    pub creep_speed: f32,

    pub idle_rpm: f32,
    pub redline_rpm: f32,
    /// N*m
    pub peak_torque: f32,
    /// rpm/s free-rev rise
    pub rpm_rise_rate: f32,
    /// rpm/s free-rev fall
    pub rpm_fall_rate: f32,
    pub stall_rpm: f32,
    /// m/s, stall checks only below this speed
    pub stall_speed: f32,
    /// Higher values make the engine harder to stall
    pub stall_resistance: f32,
    /// s
    pub rev_match_time: f32,

    /// Forward ratios, first gear first
    pub gear_ratios: ArrayVec<f32, MAX_FORWARD_GEARS>,
    pub reverse_ratio: f32,
    pub final_drive: f32,

    /// Clutch pedal position where engagement begins
    pub bite_point: f32,
    /// Pedal travel across which engagement ramps to 1
    pub bite_range: f32,
    /// Power-curve exponent inside the bite zone
    pub bite_exponent: f32,
    /// s, full pedal travel time
    pub engagement_time: f32,

    /// rad, physical front-wheel lock
    pub max_lock: f32,
    /// Visual angle -> physical angle compression factor
    pub steer_compression: f32,
    /// 1/s, self-centering rate
    pub steer_centering_rate: f32,

    pub constraint_iterations: u32,
    /// m, anti-tunneling displacement cap per tick
    pub max_step_displacement: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self::hatch()
    }
}

impl CarConfig {
    /// The canonical tuned car.
    #[must_use]
    pub fn hatch() -> Self {
        Self {
            mass: consts::chassis::MASS,
            gravity: consts::GRAVITY,
            cog_height: consts::chassis::COG_HEIGHT,
            wheelbase: consts::chassis::WHEELBASE,
            track_width: consts::chassis::TRACK_WIDTH,
            wheel_radius: consts::tire::WHEEL_RADIUS,
            friction_coeff: consts::tire::FRICTION_COEFF,
            pacejka_b: consts::tire::PACEJKA_B,
            pacejka_c: consts::tire::PACEJKA_C,
            peak_slip_angle: consts::tire::PEAK_SLIP_ANGLE,
            peak_slip_ratio: consts::tire::PEAK_SLIP_RATIO,
            min_slip_speed: consts::tire::MIN_SLIP_SPEED,
            rolling_resistance: consts::tire::ROLLING_RESISTANCE,
            aero_drag: consts::tire::AERO_DRAG,
            brake_force: consts::tire::BRAKE_FORCE,
            idle_creep_force: consts::tire::IDLE_CREEP_FORCE,
            creep_speed: consts::tire::CREEP_SPEED,
            idle_rpm: consts::engine::IDLE_RPM,
            redline_rpm: consts::engine::REDLINE_RPM,
            peak_torque: consts::engine::PEAK_TORQUE,
            rpm_rise_rate: consts::engine::RPM_RISE_RATE,
            rpm_fall_rate: consts::engine::RPM_FALL_RATE,
            stall_rpm: consts::engine::STALL_RPM,
            stall_speed: consts::engine::STALL_SPEED,
            stall_resistance: consts::engine::STALL_RESISTANCE,
            rev_match_time: consts::engine::REV_MATCH_TIME,
            gear_ratios: ArrayVec::from(consts::engine::GEAR_RATIOS),
            reverse_ratio: consts::engine::REVERSE_RATIO,
            final_drive: consts::engine::FINAL_DRIVE,
            bite_point: consts::clutch::BITE_POINT,
            bite_range: consts::clutch::BITE_RANGE,
            bite_exponent: consts::clutch::BITE_EXPONENT,
            engagement_time: consts::clutch::ENGAGEMENT_TIME,
            max_lock: consts::steering::MAX_LOCK,
            steer_compression: consts::steering::COMPRESSION,
            steer_centering_rate: consts::steering::CENTERING_RATE,
            constraint_iterations: consts::chassis::CONSTRAINT_ITERATIONS,
            max_step_displacement: consts::chassis::MAX_STEP_DISPLACEMENT,
        }
    }

    /// A lighter, shorter five-speed preset.
    #[must_use]
    pub fn roadster() -> Self {
        let mut config = Self::hatch();
        config.mass = 980.0;
        config.wheelbase = 2.35;
        config.track_width = 1.42;
        config.cog_height = 0.46;
        config.peak_torque = 205.0;
        config.redline_rpm = 7800.0;
        config.gear_ratios = [3.14, 1.89, 1.33, 1.0, 0.81].into_iter().collect();
        config.final_drive = 4.1;
        config.brake_force = 7600.0;
        config
    }

    /// Checks the preconditions the step functions assume.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("mass", self.mass),
            ("gravity", self.gravity),
            ("cog_height", self.cog_height),
            ("wheelbase", self.wheelbase),
            ("track_width", self.track_width),
            ("wheel_radius", self.wheel_radius),
            ("friction_coeff", self.friction_coeff),
            ("peak_slip_angle", self.peak_slip_angle),
            ("peak_slip_ratio", self.peak_slip_ratio),
            ("idle_rpm", self.idle_rpm),
            ("stall_resistance", self.stall_resistance),
            ("reverse_ratio", self.reverse_ratio),
            ("final_drive", self.final_drive),
            ("bite_range", self.bite_range),
            ("bite_exponent", self.bite_exponent),
            ("engagement_time", self.engagement_time),
            ("rev_match_time", self.rev_match_time),
            ("max_step_displacement", self.max_step_displacement),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.redline_rpm <= self.idle_rpm {
            return Err(ConfigError::RedlineBelowIdle {
                idle: self.idle_rpm,
                redline: self.redline_rpm,
            });
        }
        if self.gear_ratios.is_empty() {
            return Err(ConfigError::EmptyGearTable);
        }
        for &ratio in &self.gear_ratios {
            if ratio <= 0.0 {
                return Err(ConfigError::NonPositive {
                    name: "gear_ratio",
                    value: ratio,
                });
            }
        }
        if self.constraint_iterations == 0 {
            return Err(ConfigError::NoConstraintIterations);
        }

        Ok(())
    }

    /// Yaw moment of inertia of the body, treated as a uniform rectangle.
    #[must_use]
    pub fn yaw_inertia(&self) -> f32 {
        self.mass * (self.wheelbase * self.wheelbase + self.track_width * self.track_width) / 12.0
    }
}
