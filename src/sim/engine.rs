use log::{debug, trace};
use std::f32::consts::TAU;

use super::{CarConfig, CarControls};
use crate::{consts, math::approach};

/// Gearbox selector positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gear {
    Reverse,
    #[default]
    Neutral,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
}

impl Gear {
    /// Signed gearbox ratio; reverse is negative, neutral (and any forward
    /// gear the config's table does not define) is zero.
    #[must_use]
    pub fn ratio(self, config: &CarConfig) -> f32 {
        match self.forward_index() {
            Some(index) => config.gear_ratios.get(index).copied().unwrap_or(0.0),
            None => match self {
                Self::Reverse => -config.reverse_ratio,
                _ => 0.0,
            },
        }
    }

    #[must_use]
    pub const fn forward_index(self) -> Option<usize> {
        match self {
            Self::First => Some(0),
            Self::Second => Some(1),
            Self::Third => Some(2),
            Self::Fourth => Some(3),
            Self::Fifth => Some(4),
            Self::Sixth => Some(5),
            Self::Reverse | Self::Neutral => None,
        }
    }
}

/// The drivetrain coupling regime, classified fresh each tick from the
/// clutch engagement factor and the selected gear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClutchRegime {
    /// Open clutch or neutral: the engine free-revs against nothing.
    Disengaged,
    /// Partial engagement: the only regime where clutch slip is physical.
    Slipping,
    /// Locked clutch in gear: rpm is a rigid function of wheel speed.
    Engaged,
}

impl ClutchRegime {
    #[must_use]
    pub fn classify(engagement: f32, gear_ratio: f32) -> Self {
        if gear_ratio == 0.0 || engagement < consts::clutch::OPEN_THRESHOLD {
            Self::Disengaged
        } else if engagement > consts::clutch::LOCKUP_THRESHOLD {
            Self::Engaged
        } else {
            Self::Slipping
        }
    }
}

/// Engine, clutch and gearbox state.
///
/// Long-lived and mutated by exactly one writer, [`Engine::update`], once per
/// tick. Everything else reads snapshots between ticks.
#[derive(Clone, Copy, Debug)]
pub struct Engine {
    /// Crank speed; 0 while off or stalled
    pub rpm: f32,
    /// Rate-limited free-rev follower of the throttle target; what the crank
    /// would do with no load on it
    pub free_rpm: f32,
    pub gear: Gear,
    pub prev_gear: Gear,
    /// Pedal position: 0 = floored (disengaged), 1 = released
    pub clutch_pedal: f32,
    /// Bite-curve output of the pedal position, 0 = open, 1 = locked
    pub engagement: f32,
    pub stalled: bool,
    pub running: bool,
    /// s remaining of the downshift blip; 0 when idle
    pub rev_match_timer: f32,
    /// rpm the blip blends toward
    pub rev_match_target: f32,
}

impl Engine {
    /// Starts idling in neutral with the clutch pedal released.
    #[must_use]
    pub fn new(config: &CarConfig) -> Self {
        Self {
            rpm: config.idle_rpm,
            free_rpm: config.idle_rpm,
            gear: Gear::Neutral,
            prev_gear: Gear::Neutral,
            clutch_pedal: 1.0,
            engagement: Self::engagement_from_pedal(1.0, config),
            stalled: false,
            running: true,
            rev_match_timer: 0.0,
            rev_match_target: 0.0,
        }
    }

    /// The three-zone clutch bite curve: dead below the bite point, a
    /// convex power ramp across the bite range, locked beyond it.
    #[must_use]
    pub fn engagement_from_pedal(pedal: f32, config: &CarConfig) -> f32 {
        let pedal = pedal.clamp(0.0, 1.0);
        if pedal <= config.bite_point {
            0.0
        } else {
            let travel = ((pedal - config.bite_point) / config.bite_range).min(1.0);
            travel.powf(config.bite_exponent)
        }
    }

    pub fn set_ignition(&mut self, on: bool, config: &CarConfig) {
        if on == self.running {
            return;
        }
        self.running = on;
        self.stalled = false;
        self.rev_match_timer = 0.0;
        self.rpm = if on { config.idle_rpm } else { 0.0 };
        self.free_rpm = config.idle_rpm;
        debug!("ignition {}", if on { "on" } else { "off" });
    }

    pub(crate) fn update(
        &mut self,
        controls: &CarControls,
        long_speed: f32,
        config: &CarConfig,
        dt: f32,
    ) {
        self.update_clutch(controls.clutch, config, dt);
        if let Some(gear) = controls.gear_request {
            self.shift(gear, long_speed, config);
        }

        if !self.running {
            self.rpm = 0.0;
            return;
        }

        if self.stalled {
            self.rpm = 0.0;
            let (pedal_min, pedal_max) = consts::clutch::RECOVERY_PEDAL_RANGE;
            if controls.throttle > consts::engine::RECOVERY_THROTTLE
                && self.clutch_pedal > pedal_min
                && self.clutch_pedal < pedal_max
            {
                self.stalled = false;
                self.rpm = config.idle_rpm;
                self.free_rpm = config.idle_rpm;
                debug!(
                    "engine restarted with a throttle blip at pedal {:.2}",
                    self.clutch_pedal
                );
            }
            return;
        }

        self.update_free_rev(controls.throttle, config, dt);

        let ratio = self.gear.ratio(config);
        match ClutchRegime::classify(self.engagement, ratio) {
            ClutchRegime::Disengaged => self.rpm = self.free_rpm,
            ClutchRegime::Slipping => self.update_slipping(long_speed, ratio, config),
            ClutchRegime::Engaged => self.update_engaged(long_speed, ratio, config),
        }
        if self.stalled {
            return;
        }

        if self.rev_match_timer > 0.0 {
            let blend = (dt / self.rev_match_timer).min(1.0);
            self.rpm += (self.rev_match_target - self.rpm) * blend;
            self.rev_match_timer = (self.rev_match_timer - dt).max(0.0);
        }

        self.rpm = self.rpm.clamp(0.0, config.redline_rpm);
    }

    fn update_clutch(&mut self, held: bool, config: &CarConfig, dt: f32) {
        let target = if held { 0.0 } else { 1.0 };
        self.clutch_pedal =
            approach(self.clutch_pedal, target, dt / config.engagement_time).clamp(0.0, 1.0);
        self.engagement = Self::engagement_from_pedal(self.clutch_pedal, config);
    }

    fn shift(&mut self, gear: Gear, long_speed: f32, config: &CarConfig) {
        if gear == self.gear {
            return;
        }
        if let Some(index) = gear.forward_index()
            && index >= config.gear_ratios.len()
        {
            debug!("ignoring request for unavailable gear {gear:?}");
            return;
        }

        let old_total = self.gear.ratio(config).abs() * config.final_drive;
        let new_total = gear.ratio(config).abs() * config.final_drive;
        self.prev_gear = self.gear;
        self.gear = gear;
        debug!("shifted {:?} -> {:?}", self.prev_gear, self.gear);

        // A downshift that would spin the engine up gets a rev-match blip
        // instead of an instant jump.
        if new_total > old_total && self.running && !self.stalled {
            let demand = Self::wheel_demand_rpm(long_speed, new_total, config);
            if demand > self.rpm {
                self.rev_match_timer = config.rev_match_time;
                self.rev_match_target = demand.min(config.redline_rpm);
                debug!("rev match armed toward {:.0} rpm", self.rev_match_target);
            }
        }
    }

    fn update_engaged(&mut self, long_speed: f32, ratio: f32, config: &CarConfig) {
        let total = ratio.abs() * config.final_drive;
        let demand = Self::wheel_demand_rpm(long_speed, total, config);

        if long_speed.abs() < config.stall_speed && demand < Self::effective_stall_rpm(total, config)
        {
            self.stall();
            return;
        }

        if demand > config.redline_rpm {
            trace!("fuel cut at {demand:.0} rpm wheel demand");
        }
        self.rpm = demand.clamp(config.idle_rpm, config.redline_rpm);
    }

    fn update_slipping(&mut self, long_speed: f32, ratio: f32, config: &CarConfig) {
        let total = ratio.abs() * config.final_drive;
        let demand = Self::wheel_demand_rpm(long_speed, total, config);
        let blended = self.free_rpm * (1.0 - self.engagement) + demand * self.engagement;

        if self.engagement > consts::clutch::SLIP_STALL_GATE
            && long_speed.abs() < config.stall_speed
            && blended < Self::effective_stall_rpm(total, config) * self.engagement
        {
            self.stall();
            return;
        }

        self.rpm = blended.clamp(0.0, config.redline_rpm);
    }

    /// Chases the idle-plus-throttle target with asymmetric rise/fall rates.
    fn update_free_rev(&mut self, throttle: f32, config: &CarConfig, dt: f32) {
        let target = config.idle_rpm + throttle * (config.redline_rpm - config.idle_rpm);
        let rate = if target > self.free_rpm {
            config.rpm_rise_rate
        } else {
            config.rpm_fall_rate
        };
        self.free_rpm = approach(self.free_rpm, target, rate * dt)
            .clamp(config.idle_rpm, config.redline_rpm);
    }

    fn stall(&mut self) {
        self.stalled = true;
        self.rpm = 0.0;
        self.free_rpm = 0.0;
        self.rev_match_timer = 0.0;
        debug!("engine stalled");
    }

    /// The rpm the wheels demand of the crank through the given total
    /// reduction (gearbox times final drive).
    #[must_use]
    pub fn wheel_demand_rpm(long_speed: f32, total_ratio: f32, config: &CarConfig) -> f32 {
        long_speed.abs() * 60.0 / (TAU * config.wheel_radius) * total_ratio
    }

    /// Stall threshold scaled by the tunable resistance and by the
    /// mechanical advantage of the selected reduction: short gearing lowers
    /// the rpm at which the engine dies.
    #[must_use]
    pub fn effective_stall_rpm(total_ratio: f32, config: &CarConfig) -> f32 {
        config.stall_rpm * consts::engine::STALL_REFERENCE_RATIO
            / (config.stall_resistance * total_ratio).max(f32::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bite_curve_has_three_zones() {
        let config = CarConfig::hatch();
        assert_eq!(Engine::engagement_from_pedal(0.0, &config), 0.0);
        assert_eq!(Engine::engagement_from_pedal(config.bite_point, &config), 0.0);
        assert_relative_eq!(
            Engine::engagement_from_pedal(config.bite_point + config.bite_range, &config),
            1.0
        );
        assert_eq!(Engine::engagement_from_pedal(1.0, &config), 1.0);

        // convex ramp: the first half of the zone engages less than half
        let mid = Engine::engagement_from_pedal(config.bite_point + config.bite_range * 0.5, &config);
        assert!(mid > 0.0 && mid < 0.5);
    }

    #[test]
    fn gear_ratios_are_signed() {
        let config = CarConfig::hatch();
        assert_eq!(Gear::Neutral.ratio(&config), 0.0);
        assert!(Gear::Reverse.ratio(&config) < 0.0);
        assert!(Gear::First.ratio(&config) > Gear::Second.ratio(&config));
    }

    #[test]
    fn regime_classification() {
        assert_eq!(ClutchRegime::classify(1.0, 0.0), ClutchRegime::Disengaged);
        assert_eq!(ClutchRegime::classify(0.0, 3.6), ClutchRegime::Disengaged);
        assert_eq!(ClutchRegime::classify(0.5, 3.6), ClutchRegime::Slipping);
        assert_eq!(ClutchRegime::classify(1.0, 3.6), ClutchRegime::Engaged);
    }

    #[test]
    fn free_rev_stays_between_idle_and_redline() {
        let config = CarConfig::hatch();
        let mut engine = Engine::new(&config);
        let controls = CarControls {
            throttle: 1.0,
            ..CarControls::DEFAULT
        };
        for _ in 0..1200 {
            engine.update(&controls, 0.0, &config, 1.0 / 120.0);
        }
        assert_relative_eq!(engine.rpm, config.redline_rpm);

        let controls = CarControls::DEFAULT;
        for _ in 0..1200 {
            engine.update(&controls, 0.0, &config, 1.0 / 120.0);
        }
        assert_relative_eq!(engine.rpm, config.idle_rpm);
    }

    #[test]
    fn unavailable_gear_is_ignored() {
        let config = CarConfig::roadster(); // five forward gears
        let mut engine = Engine::new(&config);
        let controls = CarControls {
            gear_request: Some(Gear::Sixth),
            ..CarControls::DEFAULT
        };
        engine.update(&controls, 0.0, &config, 1.0 / 120.0);
        assert_eq!(engine.gear, Gear::Neutral);
    }

    #[test]
    fn ignition_off_zeroes_rpm() {
        let config = CarConfig::hatch();
        let mut engine = Engine::new(&config);
        engine.set_ignition(false, &config);
        engine.update(&CarControls::DEFAULT, 0.0, &config, 1.0 / 120.0);
        assert_eq!(engine.rpm, 0.0);
        assert!(!engine.running);

        engine.set_ignition(true, &config);
        assert_eq!(engine.rpm, config.idle_rpm);
    }
}
