use super::Gear;

/// Driver inputs consumed by the next simulation tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarControls {
    /// Throttle pedal, 0 to 1
    pub throttle: f32,
    /// Brake pedal held
    pub brake: bool,
    /// Clutch pedal held to the floor
    pub clutch: bool,
    /// Visual steering-wheel angle while actively dragged; `None` lets the
    /// wheel self-center
    pub steer_drag: Option<f32>,
    /// Gear selector command, consumed on the tick it is seen
    pub gear_request: Option<Gear>,
}

impl Default for CarControls {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CarControls {
    pub const DEFAULT: Self = Self {
        throttle: 0.0,
        brake: false,
        clutch: false,
        steer_drag: None,
        gear_request: None,
    };

    pub(crate) fn clamp_fix(&mut self) {
        self.throttle = self.throttle.clamp(0.0, 1.0);
    }
}
