//! Default tunables for the simulation.
//!
//! Everything here seeds [`crate::sim::CarConfig`] and
//! [`crate::sim::ArenaConfig`]; the host's configuration layer may override
//! any of it between steps.

use crate::math::PiecewiseCurve;

/// m/s^2
pub const GRAVITY: f32 = 9.81;

/// Simulation ticks per second of the default fixed timestep.
pub const DEFAULT_TICK_RATE: f32 = 120.0;

pub mod chassis {
    /// kg
    pub const MASS: f32 = 1200.0;
    /// m, front axle to rear axle
    pub const WHEELBASE: f32 = 2.6;
    /// m, left wheels to right wheels
    pub const TRACK_WIDTH: f32 = 1.5;
    /// m, center of gravity above ground
    pub const COG_HEIGHT: f32 = 0.55;
    /// Relaxation passes per constraint-solver invocation
    pub const CONSTRAINT_ITERATIONS: u32 = 6;
    /// Below this separation a distance constraint is skipped entirely
    pub const CONSTRAINT_MIN_DISTANCE: f32 = 1e-6;
    /// m, cap on any single-tick particle displacement
    pub const MAX_STEP_DISPLACEMENT: f32 = 1.0;
}

pub mod tire {
    /// m
    pub const WHEEL_RADIUS: f32 = 0.31;
    pub const FRICTION_COEFF: f32 = 1.1;
    /// Pacejka stiffness; with the shape constant below, grip peaks right
    /// around the configured peak-slip values
    pub const PACEJKA_B: f32 = 4.0;
    /// Pacejka shape
    pub const PACEJKA_C: f32 = 1.19;
    /// rad, slip angle of peak lateral grip
    pub const PEAK_SLIP_ANGLE: f32 = 0.12;
    /// Slip ratio of peak longitudinal grip
    pub const PEAK_SLIP_RATIO: f32 = 4.8;
    /// m/s, below this wheel speed slip is treated as zero
    pub const MIN_SLIP_SPEED: f32 = 0.5;
    pub const ROLLING_RESISTANCE: f32 = 0.015;
    /// N / (m/s)^2
    pub const AERO_DRAG: f32 = 0.42;
    /// m/s, below this body speed drag and braking are suppressed
    pub const MIN_DRAG_SPEED: f32 = 0.1;
    /// N, total braking force while the pedal is held
    pub const BRAKE_FORCE: f32 = 9000.0;
    /// N, forward push from a near-idle engaged drivetrain
    pub const IDLE_CREEP_FORCE: f32 = 600.0;
    /// m/s, creep cuts out above this speed
    pub const CREEP_SPEED: f32 = 1.5;
    /// Throttle below this counts as closed for creep purposes
    pub const CREEP_THROTTLE: f32 = 0.05;
}

pub mod engine {
    use super::PiecewiseCurve;

    pub const IDLE_RPM: f32 = 850.0;
    pub const REDLINE_RPM: f32 = 7200.0;
    /// N*m at the crank
    pub const PEAK_TORQUE: f32 = 310.0;
    /// rpm/s while free-revving up
    pub const RPM_RISE_RATE: f32 = 8000.0;
    /// rpm/s while free-revving down
    pub const RPM_FALL_RATE: f32 = 3500.0;
    /// rpm, base threshold below which a loaded engine dies
    pub const STALL_RPM: f32 = 400.0;
    /// m/s, stall checks only apply when slower than this
    pub const STALL_SPEED: f32 = 0.25;
    /// First-gear total reduction the stall threshold is normalized against
    pub const STALL_REFERENCE_RATIO: f32 = 14.0;
    /// Multiplier on the stall threshold; higher is harder to stall
    pub const STALL_RESISTANCE: f32 = 1.0;
    /// Throttle needed to restart a stalled engine
    pub const RECOVERY_THROTTLE: f32 = 0.1;
    /// s, duration of the downshift rev-match blip
    pub const REV_MATCH_TIME: f32 = 0.35;

    pub const GEAR_RATIOS: [f32; 6] = [3.6, 2.19, 1.41, 1.0, 0.83, 0.7];
    pub const REVERSE_RATIO: f32 = 3.8;
    pub const FINAL_DRIVE: f32 = 3.9;

    /// Normalized torque fraction over rpm/redline.
    pub const TORQUE_CURVE: PiecewiseCurve<6> = PiecewiseCurve::new([
        (0.0, 0.45),
        (0.12, 0.62),
        (0.35, 0.85),
        (0.62, 1.0),
        (0.85, 0.92),
        (1.0, 0.78),
    ]);
}

pub mod clutch {
    /// Pedal position where the clutch starts to bite
    pub const BITE_POINT: f32 = 0.35;
    /// Pedal travel across which engagement ramps 0 -> 1
    pub const BITE_RANGE: f32 = 0.5;
    /// Power-curve exponent of the ramp inside the bite zone
    pub const BITE_EXPONENT: f32 = 1.6;
    /// s, full pedal travel time
    pub const ENGAGEMENT_TIME: f32 = 0.9;
    /// Engagement above which the drivetrain counts as rigidly coupled
    pub const LOCKUP_THRESHOLD: f32 = 0.99;
    /// Engagement below which the drivetrain counts as fully open
    pub const OPEN_THRESHOLD: f32 = 0.01;
    /// Engagement above which a slipping clutch can still stall the engine
    pub const SLIP_STALL_GATE: f32 = 0.6;
    /// Pedal range (min, max) that lets a stalled engine restart
    pub const RECOVERY_PEDAL_RANGE: (f32, f32) = (0.05, 0.75);
}

pub mod steering {
    use std::f32::consts::PI;

    /// rad, physical lock of the front wheels
    pub const MAX_LOCK: f32 = PI / 5.5;
    /// Visual wheel angle -> physical angle compression
    pub const COMPRESSION: f32 = 0.12;
    /// 1/s, exponential self-centering rate of the visual angle
    pub const CENTERING_RATE: f32 = 6.0;
}

pub mod arena {
    /// m, half width of the drivable area
    pub const HALF_EXTENT_X: f32 = 120.0;
    /// m, half height of the drivable area
    pub const HALF_EXTENT_Y: f32 = 80.0;
    /// Wall coefficient of restitution
    pub const RESTITUTION: f32 = 0.45;
    /// Spiral-of-death guard for the frame accumulator
    pub const MAX_TICKS_PER_FRAME: u32 = 8;
}
