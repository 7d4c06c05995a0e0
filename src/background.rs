/// Advances a horizontal texture offset every frame.
///
/// The offset only ever accumulates; wrapping is left to whoever samples
/// it (the hill and ground patterns are periodic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundScroller {
    speed: f64,
    offset: f64,
}

impl BackgroundScroller {
    pub fn new(speed: f64) -> Self {
        Self { speed, offset: 0.0 }
    }

    pub fn tick(&mut self, dt: f64) {
        self.offset += self.speed * dt;
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

/// The three independent layers drawn behind the play field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parallax {
    pub far_hills: BackgroundScroller,
    pub near_hills: BackgroundScroller,
    pub ground: BackgroundScroller,
}

impl Parallax {
    /// `ground_speed` is in pixels per second; the hills trail behind it.
    pub fn new(ground_speed: f64) -> Self {
        Self {
            far_hills: BackgroundScroller::new(ground_speed * 0.2),
            near_hills: BackgroundScroller::new(ground_speed * 0.4),
            ground: BackgroundScroller::new(ground_speed),
        }
    }

    pub fn tick(&mut self, dt: f64) {
        self.far_hills.tick(dt);
        self.near_hills.tick(dt);
        self.ground.tick(dt);
    }
}
