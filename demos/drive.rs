use driftsim::sim::{Arena, CarConfig, Gear};
use std::time::Instant;

/// A headless driving session: launch, run up through the gears, brake hard,
/// then bounce off the far wall.
fn main() {
    driftsim::logging::try_init().ok();

    let mut arena = Arena::new(CarConfig::hatch()).unwrap();
    let frame_time = 1.0 / 60.0;

    // clutch in, grab first
    arena.car.controls.clutch = true;
    arena.step(120);
    arena.car.controls.gear_request = Some(Gear::First);
    arena.car.controls.throttle = 0.7;
    arena.step(1);
    arena.car.controls.clutch = false;

    let shift_points = [
        (2800.0, Gear::Second),
        (3600.0, Gear::Third),
        (4200.0, Gear::Fourth),
    ];
    let mut next_shift = 0;

    let start = Instant::now();
    let mut simulated = 0.0_f32;
    while simulated < 20.0 {
        let state = arena.car.get_state();

        if next_shift < shift_points.len()
            && state.clutch_engagement > 0.99
            && state.rpm > shift_points[next_shift].0
        {
            arena.car.controls.gear_request = Some(shift_points[next_shift].1);
            next_shift += 1;
        }

        // brake for the wall once we are deep into the arena
        arena.car.controls.brake = state.pos.x > 60.0;

        arena.advance(frame_time);
        simulated += frame_time;

        if (simulated * 60.0) as u32 % 60 == 0 {
            println!(
                "t={simulated:5.1}s  pos=({:7.2},{:6.2})  v={:5.1} m/s  rpm={:4.0}  gear={:?}  loads=[{:.0} {:.0} {:.0} {:.0}]",
                state.pos.x,
                state.pos.y,
                state.velocity.length(),
                state.rpm,
                state.gear,
                state.wheel_loads[0],
                state.wheel_loads[1],
                state.wheel_loads[2],
                state.wheel_loads[3],
            );
        }
    }

    let elapsed = start.elapsed().as_secs_f32();
    let ticks = arena.tick_count();
    println!("simulated {ticks} ticks in {elapsed}s ({} ticks/s)", ticks as f32 / elapsed);
}
