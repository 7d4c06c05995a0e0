//! Terminal host: owns the session and every collaborator, runs the frame loop.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, terminal,
};
use log::{debug, info, warn};
use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crate::audio;
use crate::background::Parallax;
use crate::clock::SimClock;
use crate::config::Config;
use crate::render::{PixelBuf, TerminalHud, draw_scene};
use crate::services::AudioTransport;
use crate::session::{Collaborators, SessionManager, Signal};
use crate::world::World;

/// What a key press asks of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    TogglePause,
    Press,
}

fn command_for(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Command::Press),
        _ => None,
    }
}

pub struct Game {
    session: SessionManager,
    hud: TerminalHud,
    audio: Box<dyn AudioTransport>,
    world: World,
    clock: SimClock,
    layers: Parallax,
    scroll: f64,
}

impl Game {
    pub fn new(pw: usize, ph: usize, audio: Box<dyn AudioTransport>, scroll: f64) -> Self {
        let world = World::new(pw, ph);
        let mut game = Self {
            session: SessionManager::new(),
            hud: TerminalHud::new(),
            audio,
            layers: Parallax::new(world.tuning.pipe_speed * scroll),
            world,
            clock: SimClock::new(),
            scroll,
        };
        game.dispatch_freeze();
        game
    }

    fn dispatch_freeze(&mut self) {
        let mut c = Collaborators {
            hud: &mut self.hud,
            audio: self.audio.as_mut(),
            obstacles: &mut self.world.pipes,
            player: &mut self.world.bird,
            clock: &mut self.clock,
        };
        if let Err(e) = self.session.freeze(&mut c) {
            warn!("{e}");
        }
    }

    /// Delivers a signal to the session. Rejections are logged, never fatal.
    pub fn dispatch(&mut self, signal: Signal) {
        let mut c = Collaborators {
            hud: &mut self.hud,
            audio: self.audio.as_mut(),
            obstacles: &mut self.world.pipes,
            player: &mut self.world.bird,
            clock: &mut self.clock,
        };
        match self.session.handle(signal, &mut c) {
            Ok(()) => self.hud.set_best(self.session.best_score()),
            Err(e) => warn!("{signal:?} rejected: {e}"),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Quit => {}
            Command::TogglePause => {
                if self.session.is_active() {
                    self.dispatch(Signal::TogglePause);
                }
            }
            Command::Press => {
                if self.hud.play_button_visible() && self.session.awaiting_start() {
                    self.world.bird.respawn(&self.world.tuning);
                    self.dispatch(Signal::Start);
                }
                self.world.flap();
            }
        }
    }

    pub fn resize(&mut self, pw: usize, ph: usize) {
        debug!("resized to {pw}x{ph} pixels");
        self.world.resize(pw, ph);
        // the ground keeps pace with the pipes
        self.layers = Parallax::new(self.world.tuning.pipe_speed * self.scroll);
    }

    /// Advances one frame of `real` wall-clock time.
    pub fn update(&mut self, real: Duration) {
        let dt = self.clock.delta(real);
        self.layers.tick(dt);
        for signal in self.world.update(dt) {
            self.dispatch(signal);
        }
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        draw_scene(buf, &self.world, &self.layers);
        let t = &self.world.tuning;
        self.hud.draw(buf, t.pw, t.ph, t.scale);
    }
}

pub fn run(config: &Config) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let result = frame_loop(config, &mut out);

    execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    result
}

fn frame_loop(config: &Config, out: &mut io::Stdout) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let pw = cols as usize;
    let ph = rows as usize * 2;

    let mut buf = PixelBuf::new(pw, ph);
    let mut game = Game::new(pw, ph, audio::open_transport(config.mute), config.scroll_speed);
    let frame_dur = config.frame_duration();
    info!("running at {} fps on a {pw}x{ph} pixel field", config.fps);

    let mut last = Instant::now();
    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match command_for(key.code) {
                        Some(Command::Quit) => {
                            info!("quit with best score {}", game.session().best_score());
                            return Ok(());
                        }
                        Some(command) => game.on_command(command),
                        None => {}
                    }
                }
                Event::Resize(c, r) => {
                    let npw = c as usize;
                    let nph = r as usize * 2;
                    buf.resize(npw, nph);
                    game.resize(npw, nph);
                }
                _ => {}
            }
        }

        // Update
        game.update(frame_start - last);
        last = frame_start;

        // Render
        game.draw(&mut buf);
        buf.render(out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::services::ObstacleRegistry;
    use crate::session::{Medal, PauseReason, Phase};

    const FRAME: Duration = Duration::from_millis(16);

    fn game() -> Game {
        Game::new(80, 48, Box::new(NullAudio), 1.0)
    }

    #[test]
    fn starts_frozen_on_the_title_screen() {
        let mut g = game();
        assert_eq!(g.session().phase(), Phase::Paused(PauseReason::AwaitingStart));

        let before = g.world.clone();
        g.update(FRAME);
        assert_eq!(g.world, before);
        assert_eq!(g.layers.ground.offset(), 0.0);
    }

    #[test]
    fn pause_key_is_ignored_before_first_start() {
        let mut g = game();
        g.on_command(Command::TogglePause);
        assert_eq!(g.session().phase(), Phase::Paused(PauseReason::AwaitingStart));
    }

    #[test]
    fn press_starts_then_flaps() {
        let mut g = game();
        g.on_command(Command::Press);
        assert!(g.session().is_playing());
        assert!(g.world.bird.is_enabled());
        assert_eq!(g.world.bird.vy, g.world.tuning.flap_vel);

        g.update(FRAME);
        assert!(g.layers.ground.offset() > 0.0);
        assert_eq!(g.world.pipes.live_count(), 1);
    }

    #[test]
    fn pause_freezes_world_and_scrolling() {
        let mut g = game();
        g.on_command(Command::Press);
        g.update(FRAME);
        g.on_command(Command::TogglePause);

        let world = g.world.clone();
        let offset = g.layers.ground.offset();
        g.on_command(Command::Press);
        g.update(FRAME);
        assert_eq!(g.world, world);
        assert_eq!(g.layers.ground.offset(), offset);

        g.on_command(Command::TogglePause);
        assert!(g.session().is_playing());
    }

    #[test]
    fn falling_to_the_ground_ends_the_session_once() {
        let mut g = game();
        g.on_command(Command::Press);
        for _ in 0..600 {
            g.update(FRAME);
            if g.session().phase() == Phase::GameOver {
                break;
            }
        }
        assert_eq!(g.session().phase(), Phase::GameOver);
        assert_eq!(g.session().final_medal(), Medal::Bronze);
        assert!(g.hud.play_button_visible());

        g.on_command(Command::TogglePause);
        assert_eq!(g.session().phase(), Phase::GameOver);

        g.on_command(Command::Press);
        assert!(g.session().is_playing());
        assert_eq!(g.world.pipes.live_count(), 0);
        assert_eq!(g.session().score(), 0);
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(command_for(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(command_for(KeyCode::Char('p')), Some(Command::TogglePause));
        assert_eq!(command_for(KeyCode::Enter), Some(Command::Press));
        assert_eq!(command_for(KeyCode::Char('x')), None);
    }
}
