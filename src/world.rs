//! The bird and the pipes.
//!
//! These are the collaborators that raise [`Signal`]s for the session:
//! a pipe scrolling past the bird, or the bird hitting something.

use crate::services::{ObstacleRegistry, PlayerControl};
use crate::session::Signal;

/// Longest physics step, in seconds of simulated time.
pub const MAX_STEP: f64 = 1.0 / 60.0;

/// Play-field dimensions and physics, derived from the pixel size.
///
/// Speeds are per second of simulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub pw: usize,
    pub ph: usize,
    pub scale: f64,
    pub ground_h: usize,
    pub pipe_w: usize,
    pub pipe_gap: usize,
    pub bird_x: f64,
    pub gravity: f64,
    pub flap_vel: f64,
    pub pipe_speed: f64,
    pub pipe_spacing: f64,
}

impl Tuning {
    pub fn for_size(pw: usize, ph: usize) -> Self {
        let scale = ph as f64 / 48.0;
        Self {
            pw,
            ph,
            scale,
            ground_h: (8.0 * scale).max(6.0) as usize,
            pipe_w: (8.0 * scale).clamp(5.0, 14.0) as usize,
            pipe_gap: (15.0 * scale).max(11.0) as usize,
            bird_x: (pw as f64 * 0.22).max(10.0),
            gravity: 180.0 * scale,
            flap_vel: -60.0 * scale,
            pipe_speed: 33.0 * (pw as f64 / 80.0).max(0.8),
            pipe_spacing: (pw as f64 * 0.42).max(28.0),
        }
    }

    pub fn sky_h(&self) -> usize {
        self.ph.saturating_sub(self.ground_h)
    }

    fn bird_home(&self) -> f64 {
        self.sky_h() as f64 * 0.4
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub y: f64,
    pub vy: f64,
    enabled: bool,
}

impl Bird {
    fn new(tuning: &Tuning) -> Self {
        Self {
            y: tuning.bird_home(),
            vy: 0.0,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Ignored while control is disabled.
    pub fn flap(&mut self, tuning: &Tuning) {
        if self.enabled {
            self.vy = tuning.flap_vel;
        }
    }

    /// Back to the starting height, at rest.
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.y = tuning.bird_home();
        self.vy = 0.0;
    }

    fn fall(&mut self, dt: f64, tuning: &Tuning) {
        self.vy += tuning.gravity * dt;
        self.y += self.vy * dt;
    }
}

impl PlayerControl for Bird {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub gap_center: f64,
    scored: bool,
}

/// Every live pipe, left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeField {
    pipes: Vec<Pipe>,
    spawned: u64,
}

impl PipeField {
    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    fn spawn_if_due(&mut self, tuning: &Tuning) {
        let due = match self.pipes.last() {
            None => true,
            Some(last) => last.x < tuning.pw as f64 - tuning.pipe_spacing,
        };
        if !due {
            return;
        }
        self.spawned += 1;
        let margin = tuning.pipe_gap as f64 * 0.7;
        let range = (tuning.sky_h() as f64 - margin * 2.0).max(0.0);
        self.pipes.push(Pipe {
            x: tuning.pw as f64 + 2.0,
            gap_center: margin + pseudo_rand(self.spawned) * range,
            scored: false,
        });
    }

    /// Moves every pipe and returns how many just cleared the bird.
    fn advance(&mut self, dt: f64, tuning: &Tuning) -> usize {
        let mut passed = 0;
        let pipe_w = tuning.pipe_w as f64;
        for p in &mut self.pipes {
            p.x -= tuning.pipe_speed * dt;
            if !p.scored && p.x + pipe_w < tuning.bird_x {
                p.scored = true;
                passed += 1;
            }
        }
        self.pipes.retain(|p| p.x + pipe_w + 5.0 > 0.0);
        passed
    }

    fn hits(&self, bird: &Bird, tuning: &Tuning) -> bool {
        let half_w = 2.0 * tuning.scale;
        let half_h = 1.5 * tuning.scale;
        let (bx, by) = (tuning.bird_x, bird.y);

        if by + half_h >= tuning.sky_h() as f64 || by - half_h < 0.0 {
            return true;
        }

        let pw = tuning.pipe_w as f64;
        let half_gap = tuning.pipe_gap as f64 / 2.0;
        self.pipes.iter().any(|p| {
            let overlaps_x = bx + half_w > p.x && bx - half_w < p.x + pw;
            let outside_gap = by - half_h < p.gap_center - half_gap
                || by + half_h > p.gap_center + half_gap;
            overlaps_x && outside_gap
        })
    }
}

impl ObstacleRegistry for PipeField {
    fn live_count(&self) -> usize {
        self.pipes.len()
    }

    fn destroy_all(&mut self) -> usize {
        let n = self.pipes.len();
        self.pipes.clear();
        n
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub tuning: Tuning,
    pub bird: Bird,
    pub pipes: PipeField,
}

impl World {
    pub fn new(pw: usize, ph: usize) -> Self {
        let tuning = Tuning::for_size(pw, ph);
        Self {
            bird: Bird::new(&tuning),
            pipes: PipeField::default(),
            tuning,
        }
    }

    /// Rebuilds the field for a new size, keeping the bird's control state.
    pub fn resize(&mut self, pw: usize, ph: usize) {
        let enabled = self.bird.enabled;
        *self = World::new(pw, ph);
        self.bird.enabled = enabled;
    }

    pub fn flap(&mut self) {
        self.bird.flap(&self.tuning);
    }

    /// Steps the simulation by `dt` seconds of simulated time.
    ///
    /// Long frames are split into steps of at most [`MAX_STEP`] with a
    /// collision check after each, so a stalled frame cannot carry a pipe
    /// through the bird. Stepping stops at the first collision, which is
    /// reported once per call. A frozen frame (`dt == 0`) produces no signals.
    pub fn update(&mut self, dt: f64) -> Vec<Signal> {
        let mut signals = Vec::new();
        if dt <= 0.0 {
            return signals;
        }

        let steps = (dt / MAX_STEP).ceil().max(1.0);
        let step = dt / steps;
        for _ in 0..steps as u32 {
            self.bird.fall(step, &self.tuning);
            self.pipes.spawn_if_due(&self.tuning);
            let passed = self.pipes.advance(step, &self.tuning);
            signals.extend(std::iter::repeat_n(Signal::ObstaclePassed, passed));

            if self.pipes.hits(&self.bird, &self.tuning) {
                signals.push(Signal::PlayerCollided);
                break;
            }
        }
        signals
    }
}

fn pseudo_rand(seed: u64) -> f64 {
    let x = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    let bits = (x >> 33) ^ x;
    (bits % 1000) as f64 / 1000.0
}
