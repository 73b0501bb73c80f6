use glam::Vec2;

use super::{
    BodyFrame, CarConfig,
    chassis::{Chassis, Wheel},
    engine::Engine,
};
use crate::consts;

/// Per-wheel tire force in the wheel's own frame, after the friction-ellipse
/// clamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct WheelForce {
    /// N, along the wheel's rolling direction
    pub longitudinal: f32,
    /// N, along the wheel's right axis
    pub lateral: f32,
}

/// Accumulated output of one tire pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct TireForces {
    /// N, net world-space force on the body
    pub force: Vec2,
    /// N*m, net torque about the body center
    pub torque: f32,
    pub wheel_forces: [WheelForce; 4],
}

/// Per-wheel normal loads from the static split plus dynamic weight
/// transfer. Stateless; loads are clamped to zero, which can break exact
/// conservation under extreme transfer.
#[must_use]
pub fn wheel_loads(long_accel: f32, lat_accel: f32, config: &CarConfig) -> [f32; 4] {
    let static_axle = config.mass * config.gravity * 0.5;
    let long_transfer = config.mass * long_accel * config.cog_height / config.wheelbase;
    let lat_transfer = config.mass * lat_accel * config.cog_height / config.track_width;

    // forward acceleration loads the rear axle
    let front_axle = static_axle - long_transfer;
    let rear_axle = static_axle + long_transfer;

    // rightward acceleration loads the left (outside) wheels
    [
        (front_axle * 0.5 + lat_transfer).max(0.0), // FL
        (front_axle * 0.5 - lat_transfer).max(0.0), // FR
        (rear_axle * 0.5 + lat_transfer).max(0.0),  // RL
        (rear_axle * 0.5 - lat_transfer).max(0.0),  // RR
    ]
}

/// Total drive force at the rear axle, derived from the engine state.
///
/// Crank torque follows the normalized torque curve at the current rpm,
/// scaled by throttle; the drivetrain multiplies it by the signed gearbox
/// ratio (reverse flips the sign) and final drive, divides by wheel radius,
/// and scales by clutch engagement. A small creep force stands in for the
/// torque a nearly-idle engaged drivetrain pushes through.
#[must_use]
pub fn drive_force(engine: &Engine, throttle: f32, long_speed: f32, config: &CarConfig) -> f32 {
    if !engine.running || engine.stalled {
        return 0.0;
    }

    let ratio = engine.gear.ratio(config);
    if ratio == 0.0 {
        return 0.0;
    }

    let crank_torque = config.peak_torque
        * consts::engine::TORQUE_CURVE.sample(engine.rpm / config.redline_rpm)
        * throttle;
    let mut force =
        crank_torque * ratio * config.final_drive / config.wheel_radius * engine.engagement;

    if throttle < consts::tire::CREEP_THROTTLE
        && engine.engagement > 0.9
        && long_speed.abs() < config.creep_speed
    {
        force += config.idle_creep_force * ratio.signum();
    }

    force
}

/// The simplified Pacejka shape: a saturating S-curve over normalized slip.
fn pacejka(slip: f32, peak_slip: f32, config: &CarConfig) -> f32 {
    (config.pacejka_c * (config.pacejka_b * slip / peak_slip).atan()).sin()
}

/// Computes all four wheel forces and accumulates them into a net force and
/// torque about the body center.
///
/// `drive` is the total drive force at the rear axle; front wheels never
/// receive longitudinal drive (rear-wheel-drive assumption).
#[must_use]
pub fn tire_forces(
    chassis: &Chassis,
    body: &BodyFrame,
    steer_lock: f32,
    loads: &[f32; 4],
    drive: f32,
    config: &CarConfig,
) -> TireForces {
    let mut out = TireForces::default();
    let drive_per_wheel = drive * 0.5;

    for wheel in Wheel::ALL {
        let load = loads[wheel.index()];
        if load <= 0.0 {
            continue;
        }

        let arm = chassis.particle(wheel).pos - body.center;
        let point_vel = body.velocity + arm.perp() * body.angular_velocity;

        let wheel_heading = if wheel.is_front() {
            body.heading + steer_lock
        } else {
            body.heading
        };
        let wheel_forward = Vec2::from_angle(wheel_heading);
        let wheel_right = -wheel_forward.perp();

        let v_long = point_vel.dot(wheel_forward);
        let v_lat = point_vel.dot(wheel_right);

        // slip angle is undefined at rest
        let slip_angle = if point_vel.length() < config.min_slip_speed {
            0.0
        } else {
            v_lat.atan2(v_long.abs())
        };

        let grip = load * config.friction_coeff;
        let mut lateral = -grip * pacejka(slip_angle, config.peak_slip_angle, config);

        let mut longitudinal = 0.0;
        if wheel.is_rear() && drive_per_wheel != 0.0 {
            // Slip ratio approximated as the fraction of available grip the
            // commanded drive demands: surplus demand implies wheel speed
            // the ground is not matching.
            let slip_ratio = (drive_per_wheel / grip).clamp(-1.0, 1.0);
            longitudinal = grip * pacejka(slip_ratio, config.peak_slip_ratio, config);
        }

        // friction ellipse: the combined force can never exceed the grip
        // circle, however it is split between cornering and drive
        let combined = lateral.hypot(longitudinal);
        if combined > grip {
            let scale = grip / combined;
            lateral *= scale;
            longitudinal *= scale;
        }

        let world = wheel_forward * longitudinal + wheel_right * lateral;
        out.force += world;
        out.torque += arm.perp_dot(world);
        out.wheel_forces[wheel.index()] = WheelForce {
            longitudinal,
            lateral,
        };
    }

    out
}

/// Rolling resistance plus quadratic aerodynamic drag, opposing velocity.
/// Zero below the minimum speed so the direction stays well-defined.
#[must_use]
pub fn drag_force(velocity: Vec2, config: &CarConfig) -> Vec2 {
    let speed = velocity.length();
    if speed < consts::tire::MIN_DRAG_SPEED {
        return Vec2::ZERO;
    }

    let rolling = config.rolling_resistance * config.mass * config.gravity;
    let aero = config.aero_drag * speed * speed;
    -velocity / speed * (rolling + aero)
}

/// Fixed-magnitude braking deceleration opposing velocity, independent of
/// wheel load.
#[must_use]
pub fn brake_force(velocity: Vec2, braking: bool, config: &CarConfig) -> Vec2 {
    let speed = velocity.length();
    if !braking || speed < consts::tire::MIN_DRAG_SPEED {
        return Vec2::ZERO;
    }

    -velocity / speed * config.brake_force
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use glam::vec2;

    #[test]
    fn static_loads_split_evenly() {
        let config = CarConfig::hatch();
        let loads = wheel_loads(0.0, 0.0, &config);
        let expected = config.mass * config.gravity * 0.25;
        for load in loads {
            assert_abs_diff_eq!(load, expected, epsilon = 0.5);
        }
    }

    #[test]
    fn braking_shifts_load_forward() {
        let config = CarConfig::hatch();
        let loads = wheel_loads(-6.0, 0.0, &config);
        assert!(loads[Wheel::FrontLeft.index()] > loads[Wheel::RearLeft.index()]);
        let total: f32 = loads.iter().sum();
        assert_relative_eq!(total, config.mass * config.gravity, epsilon = 0.5);
    }

    #[test]
    fn drag_opposes_velocity_and_cuts_out_at_rest() {
        let config = CarConfig::hatch();
        let velocity = vec2(20.0, 0.0);
        let drag = drag_force(velocity, &config);
        assert!(drag.x < 0.0);
        assert_abs_diff_eq!(drag.y, 0.0);
        assert_eq!(drag_force(vec2(0.01, 0.0), &config), Vec2::ZERO);
    }

    #[test]
    fn pacejka_rises_to_peak_and_saturates() {
        let config = CarConfig::hatch();
        let mut last = 0.0;
        for i in 1..=40 {
            let slip = i as f32 * 0.01;
            let value = pacejka(slip, config.peak_slip_angle, &config);
            assert!(value <= 1.0);
            if slip < config.peak_slip_angle * 0.8 {
                assert!(value > last);
                last = value;
            }
        }

        // near-full grip at the configured peak slip
        assert!(pacejka(config.peak_slip_angle, config.peak_slip_angle, &config) > 0.95);
    }
}
