use std::time::Duration;

use crate::services::SimulationClock;

/// Simulation clock with a time scale, `0.0` meaning frozen.
///
/// `resume()` restores the last non-zero scale, so a slowed-down game
/// stays slowed down across a pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    scale: f32,
    running_scale: f32,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            running_scale: 1.0,
        }
    }

    /// Seconds of simulated time that pass during `real` wall-clock time.
    pub fn delta(&self, real: Duration) -> f64 {
        real.as_secs_f64() * f64::from(self.scale)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock for SimClock {
    fn pause(&mut self) {
        self.scale = 0.0;
    }

    fn resume(&mut self) {
        self.scale = self.running_scale;
    }

    fn set_scale(&mut self, scale: f32) {
        let scale = scale.max(0.0);
        self.scale = scale;
        if scale > 0.0 {
            self.running_scale = scale;
        }
    }

    fn scale(&self) -> f32 {
        self.scale
    }
}
