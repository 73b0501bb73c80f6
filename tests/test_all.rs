use approx::{assert_abs_diff_eq, assert_relative_eq};
use glam::{Vec2, vec2};

use driftsim::sim::{Arena, BodyFrame, CarConfig, Chassis, Gear, Wheel, tire};

/// Rewrites particle history so the whole body carries velocity `v`.
fn set_velocity(arena: &mut Arena, v: Vec2) {
    let dt = arena.tick_time();
    for particle in arena.car.chassis_mut().particles_mut() {
        particle.prev_pos = particle.pos - v * dt;
    }
}

#[test]
fn wheel_loads_conserve_total_weight() {
    let config = CarConfig::hatch();
    let total_weight = config.mass * config.gravity;

    // moderate accelerations that keep every wheel off its zero clamp
    for long_accel in [-4.0, -1.5, 0.0, 2.0, 4.5] {
        for lat_accel in [-3.0, 0.0, 1.0, 3.5] {
            let loads = tire::wheel_loads(long_accel, lat_accel, &config);
            let sum: f32 = loads.iter().sum();
            assert_relative_eq!(sum, total_weight, epsilon = 0.5);
            for load in loads {
                assert!(load > 0.0);
            }
        }
    }
}

#[test]
fn static_load_concrete_example() {
    let mut config = CarConfig::hatch();
    config.mass = 1200.0;
    config.gravity = 9.81;

    let loads = tire::wheel_loads(0.0, 0.0, &config);
    for load in loads {
        assert_abs_diff_eq!(load, 2943.0, epsilon = 0.5);
    }
}

#[test]
fn constraint_solver_converges_monotonically() {
    let config = CarConfig::hatch();
    let mut chassis = Chassis::new(Vec2::ZERO, 0.4, &config);

    // an arbitrary fixed perturbation of every corner
    let offsets = [
        vec2(0.08, -0.05),
        vec2(-0.06, 0.09),
        vec2(0.04, 0.07),
        vec2(-0.09, -0.03),
    ];
    for (particle, offset) in chassis.particles_mut().iter_mut().zip(offsets) {
        particle.pos += offset;
    }

    let mut error = chassis.constraint_error();
    assert!(error > 0.05);

    for _ in 0..6 {
        chassis.solve_constraints(1);
        let next = chassis.constraint_error();
        assert!(next <= error + 1e-5);
        error = next;
    }
    assert!(error < 1e-3);
}

#[test]
fn verlet_preserves_velocity_under_zero_acceleration() {
    let config = CarConfig::hatch();
    let dt = 1.0 / 120.0;
    let mut chassis = Chassis::new(Vec2::ZERO, 0.0, &config);

    let velocity = vec2(7.0, -3.0);
    for particle in chassis.particles_mut() {
        particle.prev_pos = particle.pos - velocity * dt;
    }

    for _ in 0..100 {
        let center = (chassis.particles()[0].pos + chassis.particles()[3].pos) * 0.5;
        chassis.integrate(Vec2::ZERO, 0.0, center, dt);
    }

    for particle in chassis.particles() {
        let implied = particle.velocity(dt);
        assert_relative_eq!(implied.x, velocity.x, epsilon = 1e-2);
        assert_relative_eq!(implied.y, velocity.y, epsilon = 1e-2);
    }
}

#[test]
fn friction_ellipse_bounds_combined_force() {
    let config = CarConfig::hatch();
    let chassis = Chassis::new(Vec2::ZERO, 0.3, &config);
    let mut body = BodyFrame::new(Vec2::ZERO, 0.3);

    for speed in [0.0, 2.0, 10.0, 35.0] {
        for side in [-8.0, 0.0, 5.0] {
            for ang_vel in [-1.5, 0.0, 2.0] {
                for steer in [-0.4, 0.0, 0.4] {
                    for drive in [-16000.0, -3000.0, 0.0, 800.0, 16000.0] {
                        body.velocity = body.forward() * speed + body.right() * side;
                        body.angular_velocity = ang_vel;

                        let loads = tire::wheel_loads(2.0, -1.5, &config);
                        let forces =
                            tire::tire_forces(&chassis, &body, steer, &loads, drive, &config);

                        for wheel in Wheel::ALL {
                            let force = forces.wheel_forces[wheel.index()];
                            let limit = loads[wheel.index()] * config.friction_coeff;
                            assert!(
                                force.longitudinal.hypot(force.lateral) <= limit + 1e-2,
                                "combined force exceeds grip at speed {speed}, drive {drive}"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn stall_and_recover() {
    let mut arena = Arena::new(CarConfig::hatch()).unwrap();
    let idle = arena.car.config().idle_rpm;

    // near-stationary, clutch fully released, zero throttle, first gear
    arena.car.controls.gear_request = Some(Gear::First);
    arena.step(2);

    let state = arena.car.get_state();
    assert!(state.is_stalled);
    assert_eq!(state.rpm, 0.0);

    // throttle blip with the clutch pedal moving through its partial range
    arena.car.controls.throttle = 0.3;
    arena.car.controls.clutch = true;

    let mut recovered_at_rpm = None;
    for _ in 0..200 {
        arena.step(1);
        let state = arena.car.get_state();
        if !state.is_stalled {
            recovered_at_rpm = Some(state.rpm);
            break;
        }
    }
    let rpm = recovered_at_rpm.expect("engine never recovered");
    assert_relative_eq!(rpm, idle);

    // with the clutch held down it keeps running
    arena.step(200);
    let state = arena.car.get_state();
    assert!(!state.is_stalled && state.is_running);
    assert!(state.rpm >= idle);
}

#[test]
fn downshift_arms_rev_match() {
    let mut arena = Arena::new(CarConfig::hatch()).unwrap();
    let config = arena.car.config().clone();

    set_velocity(&mut arena, vec2(15.0, 0.0));
    arena.step(1); // body frame picks up the velocity in neutral

    arena.car.controls.gear_request = Some(Gear::Fourth);
    arena.step(1);
    assert!(!arena.car.get_state().is_stalled);

    // let the engage-from-neutral blip expire
    arena.step(60);
    assert_eq!(arena.car.engine().rev_match_timer, 0.0);

    let speed = arena.car.body().longitudinal_speed();
    let rpm_before = arena.car.engine().rpm;
    arena.car.controls.gear_request = Some(Gear::Second);
    arena.step(1);

    let engine = arena.car.engine();
    assert!(engine.rev_match_timer > 0.3);
    assert!(engine.rev_match_target > rpm_before);
    assert!(engine.rev_match_target <= config.redline_rpm);

    let expected = speed.abs() * 60.0
        / (std::f32::consts::TAU * config.wheel_radius)
        * Gear::Second.ratio(&config).abs()
        * config.final_drive;
    assert_relative_eq!(engine.rev_match_target, expected, max_relative = 0.05);
}

#[test]
fn downshift_rev_match_target_clamps_to_redline() {
    let mut arena = Arena::new(CarConfig::hatch()).unwrap();
    let redline = arena.car.config().redline_rpm;

    set_velocity(&mut arena, vec2(30.0, 0.0));
    arena.step(1);
    arena.car.controls.gear_request = Some(Gear::Fourth);
    arena.step(1);
    arena.step(60);

    // first gear at 30 m/s demands far beyond the redline
    arena.car.controls.gear_request = Some(Gear::First);
    arena.step(1);

    let engine = arena.car.engine();
    assert!(engine.rev_match_timer > 0.0);
    assert_eq!(engine.rev_match_target, redline);
}

#[test]
fn wall_restitution_reflects_particles() {
    let config = CarConfig::hatch();
    let mut chassis = Chassis::new(Vec2::ZERO, 0.0, &config);
    let dt = 1.0 / 120.0;
    let restitution = 0.5;
    let incoming = 12.0;

    {
        let particle = &mut chassis.particles_mut()[0];
        particle.pos = vec2(50.0 + incoming * dt, 3.0);
        particle.prev_pos = vec2(50.0, 3.0 - 2.0 * dt);
    }
    chassis.collide_walls(vec2(50.0, 50.0), restitution);

    let particle = chassis.particles()[0];
    let outgoing = particle.velocity(dt);
    assert_relative_eq!(outgoing.x, -incoming * restitution, epsilon = 1e-2);
    // tangential velocity rides through the bounce
    assert_relative_eq!(outgoing.y, 2.0, epsilon = 1e-2);
}

#[test]
fn launch_from_standstill() {
    let mut arena = Arena::new(CarConfig::hatch()).unwrap();

    // clutch in, first gear, steady throttle, then let the pedal out
    arena.car.controls.clutch = true;
    arena.step(120);
    arena.car.controls.gear_request = Some(Gear::First);
    arena.car.controls.throttle = 0.5;
    arena.step(1);
    arena.car.controls.clutch = false;
    arena.step(720);

    let state = arena.car.get_state();
    assert!(!state.is_stalled, "launch stalled");
    assert!(state.velocity.length() > 10.0);
    assert_eq!(state.gear, Gear::First);
    assert!(state.rpm > arena.car.config().idle_rpm);
}

#[test]
fn braking_stops_the_car() {
    let mut arena = Arena::new(CarConfig::hatch()).unwrap();
    set_velocity(&mut arena, vec2(20.0, 0.0));
    arena.car.controls.brake = true;
    arena.step(600);

    assert!(arena.car.get_state().velocity.length() < 1.0);
}

#[test]
fn steering_turns_the_car() {
    let mut arena = Arena::new(CarConfig::hatch()).unwrap();
    set_velocity(&mut arena, vec2(15.0, 0.0));
    arena.car.controls.steer_drag = Some(2.0);
    arena.step(120);

    let state = arena.car.get_state();
    assert!(state.angular_velocity > 0.05, "no yaw developed");
    assert!(state.heading > 0.05);
}
