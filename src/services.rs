//! Collaborators the session core drives but does not own.
//!
//! Everything here is write-only from the core's point of view: it sets
//! display state, moves the audio transport and freezes the clock, but
//! never reads any of it back to make a decision.

use crate::session::Medal;

/// One-shot sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Pause,
    GameOver,
}

/// Score text, medal sprite and the overlay widgets.
pub trait Hud {
    fn set_score_text(&mut self, text: &str);

    /// `Medal::None` hides the medal sprite.
    fn show_medal(&mut self, medal: Medal);

    fn set_pause_indicator(&mut self, visible: bool);

    /// Game-over panel and its caption.
    fn set_game_over(&mut self, visible: bool);

    fn set_play_button(&mut self, visible: bool);
}

/// Background music transport plus fire-and-forget cues.
///
/// Implementations must tolerate a missing clip or device by doing nothing.
pub trait AudioTransport {
    fn play_music(&mut self);
    fn pause_music(&mut self);
    fn resume_music(&mut self);
    fn stop_music(&mut self);
    fn play_one_shot(&mut self, cue: Cue);
}

/// Live obstacle entities (pipes).
pub trait ObstacleRegistry {
    fn live_count(&self) -> usize;

    /// Destroys every live obstacle and returns how many were removed.
    fn destroy_all(&mut self) -> usize;
}

/// Whether the player entity accepts control input.
pub trait PlayerControl {
    fn set_enabled(&mut self, enabled: bool);
}

/// Time scale applied to the simulation (physics, scrolling).
pub trait SimulationClock {
    fn pause(&mut self);
    fn resume(&mut self);
    fn set_scale(&mut self, scale: f32);
    fn scale(&self) -> f32;

    fn is_frozen(&self) -> bool {
        self.scale() == 0.0
    }
}
