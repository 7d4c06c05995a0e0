use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::background::Parallax;
use crate::services::Hud;
use crate::session::Medal;
use crate::world::World;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PANEL: Rgb = Rgb(220, 195, 120);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const BUTTON: Rgb = Rgb(230, 110, 40);

pub const BRONZE: Rgb = Rgb(205, 127, 50);
pub const SILVER: Rgb = Rgb(200, 200, 210);
pub const GOLD: Rgb = Rgb(255, 205, 50);

fn medal_color(medal: Medal) -> Option<Rgb> {
    match medal {
        Medal::None => None,
        Medal::Bronze => Some(BRONZE),
        Medal::Silver => Some(SILVER),
        Medal::Gold => Some(GOLD),
    }
}

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn fill_disc(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set(cx + dx, cy + dy, c);
                }
            }
        }
    }

    fn darken(&mut self) {
        for c in &mut self.px {
            *c = c.dim();
        }
    }

    #[cfg(test)]
    fn contains(&self, c: Rgb) -> bool {
        self.px.contains(&c)
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = None;
        let mut prev_bg = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if prev_bg != Some(bot) {
                    queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                    prev_bg = Some(bot);
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                } else {
                    if prev_fg != Some(top) {
                        queue!(out, style::SetForegroundColor(term_color(top)))?;
                        prev_fg = Some(top);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                prev_fg = None;
                prev_bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Draws the decimal digits of `text` centered on `cx`; anything else is skipped.
fn draw_digits(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, fg: Rgb) {
    let digits: Vec<u8> = text
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    let total_w = digits.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, d) in digits.into_iter().enumerate() {
        draw_digit(buf, start_x + i as i32 * 4, y, d, fg);
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Sky, hills, pipes, ground and bird.
pub fn draw_scene(buf: &mut PixelBuf, world: &World, layers: &Parallax) {
    draw_sky(buf, world);
    draw_hills(buf, world, layers);
    draw_pipes(buf, world);
    draw_ground(buf, world, layers.ground.offset());
    draw_bird(buf, world);
}

fn draw_sky(buf: &mut PixelBuf, world: &World) {
    let t = &world.tuning;
    let sky_h = t.sky_h();
    for y in 0..sky_h {
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, ((y * 256) / sky_h.max(1)) as u16);
        for x in 0..t.pw {
            buf.set(x as i32, y as i32, c);
        }
    }
}

/// Profile of one rolling hill line.
struct HillShape {
    freq: f64,
    amp: (f64, f64),
    harmonic: f64,
    lift: f64,
    color: Rgb,
}

const FAR_HILLS: HillShape = HillShape {
    freq: 0.04,
    amp: (6.0, 3.0),
    harmonic: 1.7,
    lift: 4.0,
    color: HILL_FAR,
};

const NEAR_HILLS: HillShape = HillShape {
    freq: 0.06,
    amp: (4.0, 2.0),
    harmonic: 2.3,
    lift: 2.0,
    color: HILL_NEAR,
};

fn draw_hills(buf: &mut PixelBuf, world: &World, layers: &Parallax) {
    let t = &world.tuning;
    let base = t.sky_h() as i32;
    let lines = [
        (&FAR_HILLS, layers.far_hills.offset()),
        (&NEAR_HILLS, layers.near_hills.offset()),
    ];
    for (shape, offset) in lines {
        for x in 0..t.pw as i32 {
            let fx = (x as f64 + offset) * shape.freq;
            let h = (fx.sin() * shape.amp.0 + (fx * shape.harmonic).sin() * shape.amp.1) * t.scale;
            let top = base - h as i32 - (shape.lift * t.scale) as i32;
            buf.fill_rect(x, top, 1, base - top, shape.color);
        }
    }
}

fn draw_ground(buf: &mut PixelBuf, world: &World, offset: f64) {
    let t = &world.tuning;
    let gy = t.sky_h() as i32;
    for x in 0..t.pw as i32 {
        let alt = ((x as f64 + offset) as i32 / 3) % 2 == 0;
        buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
        buf.set(x, gy + 1, GRASS);
    }
    for y in (gy + 2)..t.ph as i32 {
        for x in 0..t.pw as i32 {
            let stripe = ((x as f64 + offset * 0.8) as i32 + (y - gy) * 2) % 12 < 6;
            buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
}

fn draw_pipes(buf: &mut PixelBuf, world: &World) {
    let t = &world.tuning;
    let cap_extra = (2.0 * t.scale).max(1.0) as i32;
    let cap_h = (3.0 * t.scale).max(2.0) as i32;
    let pw = t.pipe_w as i32;
    let cap_w = pw + cap_extra * 2;
    let half_gap = t.pipe_gap as f64 / 2.0;

    for pipe in world.pipes.iter() {
        let px = pipe.x as i32;
        let gap_top = (pipe.gap_center - half_gap) as i32;
        let gap_bot = (pipe.gap_center + half_gap) as i32;
        let bodies = [0..gap_top - cap_h, gap_bot + cap_h..t.sky_h() as i32];
        let caps = [gap_top - cap_h..gap_top, gap_bot..gap_bot + cap_h];

        for x in 0..pw {
            shade_column(buf, px + x, &bodies, pipe_shade(x, pw));
        }
        for x in 0..cap_w {
            let col = px - cap_extra + x;
            shade_column(buf, col, &caps, pipe_shade(x, cap_w));
            // rims
            for cap in &caps {
                buf.set(col, cap.start, CAP_DARK);
                buf.set(col, cap.end - 1, CAP_DARK);
            }
        }
    }
}

fn shade_column(buf: &mut PixelBuf, x: i32, spans: &[std::ops::Range<i32>], c: Rgb) {
    for span in spans {
        for y in span.clone() {
            buf.set(x, y, c);
        }
    }
}

fn draw_bird(buf: &mut PixelBuf, world: &World) {
    let t = &world.tuning;
    let cx = t.bird_x as i32;
    let cy = world.bird.y as i32;
    let s = t.scale;
    let tilt = (world.bird.vy / (90.0 * s)).clamp(-1.0, 1.0) as i32;

    let bw = (3.0 * s).max(2.0) as i32;
    let bh = (2.0 * s).max(2.0) as i32;
    buf.fill_rect(cx - bw, cy - bh, bw * 2 + 1, bh * 2, BIRD_Y);
    buf.fill_rect(cx - bw + 1, cy - bh, bw * 2 - 2, 1.max((s * 0.8) as i32), BIRD_HI);

    // Wing flaps up while rising
    let wing_y_off = if world.bird.vy < 0.0 { -1 } else { 1 };
    let wing_h = (1.5 * s).max(1.0) as i32;
    let wing_w = (2.0 * s).max(1.0) as i32;
    buf.fill_rect(cx - bw + 1, cy + wing_y_off + tilt, wing_w, wing_h, BIRD_WING);

    let ex = cx + bw - (1.5 * s) as i32;
    let ey = cy - bh + (1.0 * s).max(1.0) as i32;
    let eye_r = (0.8 * s).max(1.0) as i32;
    buf.fill_rect(ex, ey, eye_r + 1, eye_r + 1, BIRD_EYE);
    buf.set(ex + eye_r, ey + eye_r, BIRD_PUPIL);

    let beak_w = (2.5 * s).max(2.0) as i32;
    let beak_h = (1.5 * s).max(1.0) as i32;
    buf.fill_rect(cx + bw, cy - (0.5 * s) as i32 + tilt, beak_w, beak_h, BIRD_BEAK);
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

// ── HUD ─────────────────────────────────────────────────────────────────────

/// Widget state set by the session, drawn over the scene each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalHud {
    score_text: String,
    medal: Medal,
    pause_icon: bool,
    game_over: bool,
    play_button: bool,
    best: u32,
}

impl TerminalHud {
    /// Title screen: play button up, everything else hidden.
    pub fn new() -> Self {
        Self {
            score_text: "0".to_string(),
            medal: Medal::None,
            pause_icon: false,
            game_over: false,
            play_button: true,
            best: 0,
        }
    }

    pub fn play_button_visible(&self) -> bool {
        self.play_button
    }

    pub fn set_best(&mut self, best: u32) {
        self.best = best;
    }

    pub fn draw(&self, buf: &mut PixelBuf, pw: usize, ph: usize, scale: f64) {
        let cx = pw as i32 / 2;
        let cy = ph as i32 / 2;

        if self.game_over {
            self.draw_game_over(buf, cx, cy, scale);
        } else {
            draw_digits(buf, cx, 4, &self.score_text, WHITE);
        }
        if self.pause_icon {
            let bar_w = (2.0 * scale).max(2.0) as i32;
            let bar_h = (8.0 * scale).max(6.0) as i32;
            buf.fill_rect(cx - bar_w * 2, cy - bar_h / 2, bar_w, bar_h, WHITE);
            buf.fill_rect(cx + bar_w, cy - bar_h / 2, bar_w, bar_h, WHITE);
        }
        if self.play_button {
            self.draw_play_button(buf, cx, ph as i32 * 3 / 4, scale);
        }
    }

    fn draw_game_over(&self, buf: &mut PixelBuf, cx: i32, cy: i32, scale: f64) {
        let panel_w = (40.0 * scale).max(30.0) as i32;
        let panel_h = (20.0 * scale).max(16.0) as i32;
        buf.darken();

        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;
        buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        buf.fill_rect(px, py, panel_w, panel_h, DIRT);
        buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL);

        if let Some(c) = medal_color(self.medal) {
            let r = (panel_h / 4).max(2);
            buf.fill_disc(px + panel_w / 4, cy, r + 1, SHADOW);
            buf.fill_disc(px + panel_w / 4, cy, r, c);
        }

        let text_x = px + panel_w * 2 / 3;
        draw_digits(buf, text_x, py + 3, &self.score_text, WHITE);
        draw_digits(buf, text_x, py + panel_h - 8, &self.best.to_string(), BIRD_Y);
    }

    fn draw_play_button(&self, buf: &mut PixelBuf, cx: i32, cy: i32, scale: f64) {
        let w = (14.0 * scale).max(10.0) as i32;
        let h = (8.0 * scale).max(6.0) as i32;
        buf.fill_rect(cx - w / 2 - 1, cy - h / 2 - 1, w + 2, h + 2, SHADOW);
        buf.fill_rect(cx - w / 2, cy - h / 2, w, h, BUTTON);
        // right-pointing triangle
        let tri = h / 2 - 1;
        for dx in 0..=tri {
            let half = tri - dx;
            for dy in -half..=half {
                buf.set(cx - tri / 2 + dx, cy + dy, WHITE);
            }
        }
    }
}

impl Default for TerminalHud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud for TerminalHud {
    fn set_score_text(&mut self, text: &str) {
        self.score_text.clear();
        self.score_text.push_str(text);
    }

    fn show_medal(&mut self, medal: Medal) {
        self.medal = medal;
    }

    fn set_pause_indicator(&mut self, visible: bool) {
        self.pause_icon = visible;
    }

    fn set_game_over(&mut self, visible: bool) {
        self.game_over = visible;
    }

    fn set_play_button(&mut self, visible: bool) {
        self.play_button = visible;
    }
}
