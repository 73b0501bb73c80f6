use glam::Vec2;

use super::{
    BodyFrame, CarConfig, CarControls, Gear,
    chassis::Chassis,
    engine::Engine,
    steering::Steering,
    tire,
};

/// Read-only snapshot of everything external consumers need per frame.
#[derive(Clone, Copy, Debug)]
pub struct CarState {
    pub pos: Vec2,
    /// rad, wrapped to (-PI, PI]
    pub heading: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub long_accel: f32,
    pub lat_accel: f32,
    /// N, ordered FL, FR, RL, RR
    pub wheel_loads: [f32; 4],
    pub rpm: f32,
    pub gear: Gear,
    pub clutch_pedal: f32,
    pub clutch_engagement: f32,
    pub is_stalled: bool,
    pub is_running: bool,
    /// rad, the physical front-wheel angle
    pub steer_angle: f32,
    /// rad, the arcade-range visual wheel angle
    pub wheel_angle: f32,
}

/// One simulated vehicle: the particle chassis, its derived body frame, and
/// the engine/steering state driving it.
pub struct Car {
    /// The controls to simulate the car with; hosts write these between ticks
    pub controls: CarControls,
    pub(crate) config: CarConfig,
    chassis: Chassis,
    body: BodyFrame,
    engine: Engine,
    steering: Steering,
    wheel_loads: [f32; 4],
}

impl Car {
    pub(crate) fn new(config: CarConfig, pos: Vec2, heading: f32) -> Self {
        let chassis = Chassis::new(pos, heading, &config);
        let engine = Engine::new(&config);
        Self {
            controls: CarControls::DEFAULT,
            chassis,
            body: BodyFrame::new(pos, heading),
            engine,
            steering: Steering::default(),
            wheel_loads: [config.mass * config.gravity * 0.25; 4],
            config,
        }
    }

    /// Advances the car by exactly one fixed tick.
    ///
    /// The sequence is strict: steering and engine run against the previous
    /// tick's derived frame, the frame is re-derived before forces are
    /// gathered, and re-derived once more after collision response so that
    /// external readers only ever see final values.
    pub(crate) fn tick(&mut self, half_extents: Vec2, restitution: f32, dt: f32) {
        self.controls.clamp_fix();

        self.steering
            .update(self.controls.steer_drag, &self.config, dt);

        let long_speed = self.body.longitudinal_speed();
        self.engine
            .update(&self.controls, long_speed, &self.config, dt);

        self.body.recompute(&self.chassis, dt);

        self.wheel_loads =
            tire::wheel_loads(self.body.long_accel, self.body.lat_accel, &self.config);

        let drive =
            tire::drive_force(&self.engine, self.controls.throttle, long_speed, &self.config);
        let tires = tire::tire_forces(
            &self.chassis,
            &self.body,
            self.steering.lock_angle,
            &self.wheel_loads,
            drive,
            &self.config,
        );

        let mut force = tires.force;
        force += tire::drag_force(self.body.velocity, &self.config);
        force += tire::brake_force(self.body.velocity, self.controls.brake, &self.config);

        let lin_accel = force / self.config.mass;
        let ang_accel = tires.torque / self.config.yaw_inertia();

        self.chassis
            .integrate(lin_accel, ang_accel, self.body.center, dt);
        self.chassis
            .solve_constraints(self.config.constraint_iterations);
        self.chassis
            .clamp_displacement(self.config.max_step_displacement);
        self.chassis.collide_walls(half_extents, restitution);
        self.chassis
            .solve_constraints(self.config.constraint_iterations);

        self.body.store_history();
        self.body.recompute(&self.chassis, dt);

        // gear commands are one-shot
        self.controls.gear_request = None;
    }

    /// Re-seats the car at a pose with zero velocity and a fresh drivetrain.
    pub(crate) fn reset(&mut self, pos: Vec2, heading: f32) {
        self.chassis.reset(pos, heading, &self.config);
        self.body = BodyFrame::new(pos, heading);
        self.engine = Engine::new(&self.config);
        self.steering = Steering::default();
        self.wheel_loads = [self.config.mass * self.config.gravity * 0.25; 4];
    }

    #[must_use]
    pub fn get_state(&self) -> CarState {
        CarState {
            pos: self.body.center,
            heading: self.body.heading,
            velocity: self.body.velocity,
            angular_velocity: self.body.angular_velocity,
            long_accel: self.body.long_accel,
            lat_accel: self.body.lat_accel,
            wheel_loads: self.wheel_loads,
            rpm: self.engine.rpm,
            gear: self.engine.gear,
            clutch_pedal: self.engine.clutch_pedal,
            clutch_engagement: self.engine.engagement,
            is_stalled: self.engine.stalled,
            is_running: self.engine.running,
            steer_angle: self.steering.lock_angle,
            wheel_angle: self.steering.wheel_angle,
        }
    }

    pub fn set_ignition(&mut self, on: bool) {
        self.engine.set_ignition(on, &self.config);
    }

    /// Configuration for this car
    #[must_use]
    pub const fn config(&self) -> &CarConfig {
        &self.config
    }

    #[must_use]
    pub const fn body(&self) -> &BodyFrame {
        &self.body
    }

    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub const fn chassis(&self) -> &Chassis {
        &self.chassis
    }

    pub const fn chassis_mut(&mut self) -> &mut Chassis {
        &mut self.chassis
    }

    /// N, ordered FL, FR, RL, RR
    #[must_use]
    pub const fn wheel_loads(&self) -> &[f32; 4] {
        &self.wheel_loads
    }
}
