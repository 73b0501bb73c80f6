use super::CarConfig;

/// Front-wheel steering with an arcade-range visual angle.
///
/// The visual angle is what the driver drags around (unbounded); the physical
/// lock angle fed to the tire model is a compressed, clamped mapping of it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Steering {
    /// rad, the dragged steering-wheel angle
    pub wheel_angle: f32,
    /// rad, the bounded front-wheel angle
    pub lock_angle: f32,
}

impl Steering {
    pub(crate) fn update(&mut self, drag: Option<f32>, config: &CarConfig, dt: f32) {
        match drag {
            Some(angle) => self.wheel_angle = angle,
            None => {
                // exponential self-centering
                let decay = (config.steer_centering_rate * dt).min(1.0);
                self.wheel_angle -= self.wheel_angle * decay;
            }
        }

        self.lock_angle =
            (self.wheel_angle * config.steer_compression).clamp(-config.max_lock, config.max_lock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_itself_without_input() {
        let config = CarConfig::hatch();
        let mut steering = Steering::default();
        steering.update(Some(3.0), &config, 1.0 / 120.0);
        assert!(steering.lock_angle > 0.0);

        for _ in 0..240 {
            steering.update(None, &config, 1.0 / 120.0);
        }
        assert!(steering.wheel_angle.abs() < 1e-3);
        assert!(steering.lock_angle.abs() < 1e-3);
    }

    #[test]
    fn lock_angle_is_clamped() {
        let config = CarConfig::hatch();
        let mut steering = Steering::default();
        steering.update(Some(100.0), &config, 1.0 / 120.0);
        assert_eq!(steering.lock_angle, config.max_lock);

        steering.update(Some(-100.0), &config, 1.0 / 120.0);
        assert_eq!(steering.lock_angle, -config.max_lock);
    }
}
