use glam::Vec2;

use super::chassis::{Chassis, Wheel};
use crate::math::wrap_angle;

/// Body-level quantities derived from the particle quadrilateral.
///
/// Never hand-set: everything here is recomputed from particle history by
/// [`BodyFrame::recompute`], which runs twice per tick - once before forces
/// are gathered and once after collision response, so external readers see
/// final values. Between the two calls these fields are caches of the
/// previous computation.
#[derive(Clone, Copy, Debug)]
pub struct BodyFrame {
    /// World center, the average of the two axle midpoints
    pub center: Vec2,
    /// rad, wrapped to (-PI, PI]; 0 points along +X
    pub heading: f32,
    /// m/s, mean particle velocity
    pub velocity: Vec2,
    /// rad/s, from the wrapped heading delta
    pub angular_velocity: f32,
    /// m/s^2, world acceleration projected on the forward axis
    pub long_accel: f32,
    /// m/s^2, world acceleration projected on the right axis
    pub lat_accel: f32,
    prev_heading: f32,
    prev_velocity: Vec2,
}

impl BodyFrame {
    #[must_use]
    pub fn new(center: Vec2, heading: f32) -> Self {
        let heading = wrap_angle(heading);
        Self {
            center,
            heading,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            long_accel: 0.0,
            lat_accel: 0.0,
            prev_heading: heading,
            prev_velocity: Vec2::ZERO,
        }
    }

    /// Unit vector the body points along.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Unit vector out the right side of the body.
    #[must_use]
    pub fn right(&self) -> Vec2 {
        -self.forward().perp()
    }

    /// Speed along the body's forward axis, signed.
    #[must_use]
    pub fn longitudinal_speed(&self) -> f32 {
        self.velocity.dot(self.forward())
    }

    /// Recomputes the frame from the particle state.
    ///
    /// The derivative quantities (angular velocity, accelerations) difference
    /// against the history captured by the last [`Self::store_history`] call,
    /// so calling this twice without moving the particles is idempotent.
    pub fn recompute(&mut self, chassis: &Chassis, dt: f32) {
        let front_mid = (chassis.particle(Wheel::FrontLeft).pos
            + chassis.particle(Wheel::FrontRight).pos)
            * 0.5;
        let rear_mid = (chassis.particle(Wheel::RearLeft).pos
            + chassis.particle(Wheel::RearRight).pos)
            * 0.5;

        self.center = (front_mid + rear_mid) * 0.5;

        let axle_vector = front_mid - rear_mid;
        self.heading = wrap_angle(axle_vector.y.atan2(axle_vector.x));

        let mut velocity_sum = Vec2::ZERO;
        for particle in chassis.particles() {
            velocity_sum += particle.velocity(dt);
        }
        self.velocity = velocity_sum * 0.25;

        self.angular_velocity = wrap_angle(self.heading - self.prev_heading) / dt;

        let accel = (self.velocity - self.prev_velocity) / dt;
        self.long_accel = accel.dot(self.forward());
        self.lat_accel = accel.dot(self.right());
    }

    /// Rolls the current heading/velocity into the derivative history.
    /// Called exactly once per tick, before the final [`Self::recompute`].
    pub fn store_history(&mut self) {
        self.prev_heading = self.heading;
        self.prev_velocity = self.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CarConfig;
    use approx::assert_relative_eq;
    use glam::vec2;

    #[test]
    fn frame_matches_construction_pose() {
        let config = CarConfig::hatch();
        let chassis = Chassis::new(vec2(4.0, 1.0), 1.2, &config);
        let mut frame = BodyFrame::new(Vec2::ZERO, 0.0);
        frame.recompute(&chassis, 1.0 / 120.0);

        assert_relative_eq!(frame.center.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(frame.center.y, 1.0, epsilon = 1e-4);
        assert_relative_eq!(frame.heading, 1.2, epsilon = 1e-4);
        assert_relative_eq!(frame.velocity.length(), 0.0);
    }

    #[test]
    fn uniform_motion_yields_velocity_without_rotation() {
        let config = CarConfig::hatch();
        let dt = 1.0 / 120.0;
        let mut chassis = Chassis::new(Vec2::ZERO, 0.0, &config);
        for particle in chassis.particles_mut() {
            particle.prev_pos -= vec2(2.0, 0.0) * dt;
        }

        let mut frame = BodyFrame::new(Vec2::ZERO, 0.0);
        frame.recompute(&chassis, dt);
        assert_relative_eq!(frame.velocity.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(frame.angular_velocity, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn right_is_clockwise_from_forward() {
        let frame = BodyFrame::new(Vec2::ZERO, 0.0);
        assert_relative_eq!(frame.forward().x, 1.0);
        assert_relative_eq!(frame.right().y, -1.0);
    }
}
