use log::{debug, info};

use super::{Medal, Operation, PauseReason, Phase, Signal};
use crate::error::{SessionError, SessionResult};
use crate::services::{AudioTransport, Cue, Hud, ObstacleRegistry, PlayerControl, SimulationClock};

/// Everything a session operation may touch outside its own state.
///
/// Built fresh by the host for each call so the session never holds on
/// to its collaborators.
pub struct Collaborators<'a> {
    pub hud: &'a mut dyn Hud,
    pub audio: &'a mut dyn AudioTransport,
    pub obstacles: &'a mut dyn ObstacleRegistry,
    pub player: &'a mut dyn PlayerControl,
    pub clock: &'a mut dyn SimulationClock,
}

impl Collaborators<'_> {
    fn freeze_simulation(&mut self) {
        self.clock.pause();
        self.player.set_enabled(false);
    }

    fn unfreeze_simulation(&mut self) {
        self.clock.resume();
        self.player.set_enabled(true);
    }
}

/// Owns score, phase and medal for the lifetime of the process.
///
/// Out-of-phase calls are rejected with [`SessionError::InvalidTransition`]
/// and change nothing, neither here nor in the collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionManager {
    score: u32,
    best: u32,
    phase: Phase,
    medal: Medal,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            score: 0,
            best: 0,
            phase: Phase::Paused(PauseReason::AwaitingStart),
            medal: Medal::None,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest score seen at any game over since the process started.
    pub fn best_score(&self) -> u32 {
        self.best
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Medal awarded at the last game over, `Medal::None` otherwise.
    pub fn final_medal(&self) -> Medal {
        self.medal
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Whether the pause toggle applies.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Paused(PauseReason::User))
    }

    /// Whether the play button starts a session right now.
    pub fn awaiting_start(&self) -> bool {
        matches!(
            self.phase,
            Phase::Paused(PauseReason::AwaitingStart) | Phase::GameOver
        )
    }

    /// Holds the simulation before the first session, pause icon hidden.
    pub fn freeze(&mut self, c: &mut Collaborators<'_>) -> SessionResult<()> {
        self.require(Operation::Freeze, |p| {
            p == Phase::Paused(PauseReason::AwaitingStart)
        })?;

        c.freeze_simulation();
        c.hud.set_pause_indicator(false);
        debug!("session frozen until first start");
        Ok(())
    }

    pub fn start(&mut self, c: &mut Collaborators<'_>) -> SessionResult<()> {
        self.require(Operation::Start, |p| p != Phase::Playing)?;

        self.score = 0;
        self.medal = Medal::None;
        c.hud.set_score_text(&self.score.to_string());
        c.hud.show_medal(Medal::None);
        c.hud.set_play_button(false);
        c.hud.set_game_over(false);
        c.hud.set_pause_indicator(false);

        c.unfreeze_simulation();

        let cleared = c.obstacles.destroy_all();
        c.audio.play_music();

        info!("session started (cleared {cleared} obstacles from the last run)");
        self.phase = Phase::Playing;
        Ok(())
    }

    pub fn toggle_pause(&mut self, c: &mut Collaborators<'_>) -> SessionResult<()> {
        match self.phase {
            Phase::Playing => {
                c.freeze_simulation();
                c.audio.pause_music();
                c.audio.play_one_shot(Cue::Pause);
                c.hud.set_pause_indicator(true);
                self.phase = Phase::Paused(PauseReason::User);
                debug!("paused at score {}", self.score);
                Ok(())
            }
            Phase::Paused(PauseReason::User) => {
                c.unfreeze_simulation();
                c.audio.resume_music();
                c.hud.set_pause_indicator(false);
                self.phase = Phase::Playing;
                debug!("resumed at score {}", self.score);
                Ok(())
            }
            phase => Err(SessionError::InvalidTransition {
                operation: Operation::TogglePause,
                phase,
            }),
        }
    }

    pub fn end(&mut self, c: &mut Collaborators<'_>) -> SessionResult<()> {
        self.require(Operation::End, |p| p == Phase::Playing)?;

        c.hud.set_play_button(true);
        c.hud.set_game_over(true);
        c.audio.play_one_shot(Cue::GameOver);
        c.audio.stop_music();

        self.medal = Medal::for_score(self.score);
        self.best = self.best.max(self.score);
        c.hud.show_medal(self.medal);

        c.freeze_simulation();
        self.phase = Phase::GameOver;
        info!(
            "game over: score {} ({:?}), best {}",
            self.score, self.medal, self.best
        );
        Ok(())
    }

    pub fn increase_score(&mut self, c: &mut Collaborators<'_>) -> SessionResult<()> {
        self.require(Operation::IncreaseScore, |p| p == Phase::Playing)?;

        self.score = self.score.saturating_add(1);
        c.hud.set_score_text(&self.score.to_string());
        Ok(())
    }

    /// Routes a discrete signal to its operation.
    pub fn handle(&mut self, signal: Signal, c: &mut Collaborators<'_>) -> SessionResult<()> {
        match signal {
            Signal::Start => self.start(c),
            Signal::TogglePause => self.toggle_pause(c),
            Signal::ObstaclePassed => self.increase_score(c),
            Signal::PlayerCollided => self.end(c),
        }
    }

    fn require(&self, operation: Operation, allowed: impl Fn(Phase) -> bool) -> SessionResult<()> {
        if allowed(self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;

    #[derive(Default)]
    struct FakeHud {
        score_text: String,
        medal: Medal,
        pause_icon: bool,
        game_over: bool,
        play_button: bool,
    }

    impl Hud for FakeHud {
        fn set_score_text(&mut self, text: &str) {
            self.score_text = text.to_string();
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

    #[derive(Default)]
    struct FakeAudio {
        calls: Vec<&'static str>,
    }

    impl AudioTransport for FakeAudio {
        fn play_music(&mut self) {
            self.calls.push("play");
        }
        fn pause_music(&mut self) {
            self.calls.push("pause");
        }
        fn resume_music(&mut self) {
            self.calls.push("resume");
        }
        fn stop_music(&mut self) {
            self.calls.push("stop");
        }
        fn play_one_shot(&mut self, cue: Cue) {
            self.calls.push(match cue {
                Cue::Pause => "cue:pause",
                Cue::GameOver => "cue:game-over",
            });
        }
    }

    #[derive(Default)]
    struct FakeObstacles {
        live: usize,
    }

    impl ObstacleRegistry for FakeObstacles {
        fn live_count(&self) -> usize {
            self.live
        }
        fn destroy_all(&mut self) -> usize {
            std::mem::take(&mut self.live)
        }
    }

    #[derive(Default)]
    struct FakePlayer {
        enabled: bool,
    }

    impl PlayerControl for FakePlayer {
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
    }

    #[derive(Default)]
    struct Rig {
        hud: FakeHud,
        audio: FakeAudio,
        obstacles: FakeObstacles,
        player: FakePlayer,
        clock: SimClock,
    }

    impl Rig {
        fn ctx(&mut self) -> Collaborators<'_> {
            Collaborators {
                hud: &mut self.hud,
                audio: &mut self.audio,
                obstacles: &mut self.obstacles,
                player: &mut self.player,
                clock: &mut self.clock,
            }
        }
    }

    fn started() -> (SessionManager, Rig) {
        let mut rig = Rig::default();
        let mut session = SessionManager::new();
        session.freeze(&mut rig.ctx()).unwrap();
        session.start(&mut rig.ctx()).unwrap();
        (session, rig)
    }

    fn invalid(operation: Operation, phase: Phase) -> SessionError {
        SessionError::InvalidTransition { operation, phase }
    }

    #[test]
    fn freeze_holds_simulation_with_pause_icon_hidden() {
        let mut rig = Rig::default();
        rig.hud.pause_icon = true;
        rig.player.enabled = true;
        let mut session = SessionManager::new();

        session.freeze(&mut rig.ctx()).unwrap();

        assert_eq!(session.phase(), Phase::Paused(PauseReason::AwaitingStart));
        assert!(rig.clock.is_frozen());
        assert!(!rig.player.enabled);
        assert!(!rig.hud.pause_icon);
        assert!(!session.is_active());
        assert!(session.awaiting_start());
    }

    #[test]
    fn start_resets_everything_for_a_new_run() {
        let mut rig = Rig::default();
        rig.obstacles.live = 4;
        rig.hud.game_over = true;
        rig.hud.play_button = true;
        let mut session = SessionManager::new();
        session.freeze(&mut rig.ctx()).unwrap();

        session.start(&mut rig.ctx()).unwrap();

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(rig.hud.score_text, "0");
        assert_eq!(rig.hud.medal, Medal::None);
        assert!(!rig.hud.game_over);
        assert!(!rig.hud.play_button);
        assert!(!rig.clock.is_frozen());
        assert!(rig.player.enabled);
        assert_eq!(rig.obstacles.live_count(), 0);
        assert_eq!(rig.audio.calls, ["play"]);
    }

    #[test]
    fn score_counts_passes_since_last_start() {
        let (mut session, mut rig) = started();
        for n in 1..=25 {
            session.increase_score(&mut rig.ctx()).unwrap();
            assert_eq!(session.score(), n);
        }
        assert_eq!(rig.hud.score_text, "25");

        session.end(&mut rig.ctx()).unwrap();
        session.start(&mut rig.ctx()).unwrap();
        assert_eq!(session.score(), 0);
        session.increase_score(&mut rig.ctx()).unwrap();
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn start_from_user_pause_restarts_the_run() {
        let (mut session, mut rig) = started();
        session.increase_score(&mut rig.ctx()).unwrap();
        session.toggle_pause(&mut rig.ctx()).unwrap();

        session.start(&mut rig.ctx()).unwrap();

        assert_eq!(session.score(), 0);
        assert!(!rig.hud.pause_icon);
        assert!(!rig.clock.is_frozen());
    }

    #[test]
    fn start_while_playing_is_rejected() {
        let (mut session, mut rig) = started();
        session.increase_score(&mut rig.ctx()).unwrap();

        let err = session.start(&mut rig.ctx()).unwrap_err();

        assert_eq!(err, invalid(Operation::Start, Phase::Playing));
        assert_eq!(session.score(), 1);
        assert_eq!(rig.audio.calls, ["play"]);
    }

    #[test]
    fn pause_freezes_and_second_toggle_resumes() {
        let (mut session, mut rig) = started();

        session.toggle_pause(&mut rig.ctx()).unwrap();
        assert_eq!(session.phase(), Phase::Paused(PauseReason::User));
        assert!(rig.clock.is_frozen());
        assert!(!rig.player.enabled);
        assert!(rig.hud.pause_icon);
        assert!(session.is_active());

        session.toggle_pause(&mut rig.ctx()).unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert!(!rig.clock.is_frozen());
        assert!(rig.player.enabled);
        assert!(!rig.hud.pause_icon);

        assert_eq!(rig.audio.calls, ["play", "pause", "cue:pause", "resume"]);
    }

    #[test]
    fn toggle_before_first_start_is_rejected() {
        let mut rig = Rig::default();
        let mut session = SessionManager::new();
        session.freeze(&mut rig.ctx()).unwrap();

        let err = session.toggle_pause(&mut rig.ctx()).unwrap_err();

        assert_eq!(
            err,
            invalid(Operation::TogglePause, Phase::Paused(PauseReason::AwaitingStart))
        );
        assert!(rig.clock.is_frozen());
        assert!(!rig.hud.pause_icon);
    }

    #[test]
    fn end_awards_medal_and_freezes() {
        let (mut session, mut rig) = started();
        rig.obstacles.live = 2;

        session.end(&mut rig.ctx()).unwrap();

        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.final_medal(), Medal::Bronze);
        assert_eq!(rig.hud.medal, Medal::Bronze);
        assert!(rig.hud.game_over);
        assert!(rig.hud.play_button);
        assert!(rig.clock.is_frozen());
        assert!(!rig.player.enabled);
        // cleanup waits for the next start
        assert_eq!(rig.obstacles.live_count(), 2);
        assert_eq!(rig.audio.calls, ["play", "cue:game-over", "stop"]);
    }

    #[test]
    fn medal_is_not_recomputed_after_game_over() {
        let (mut session, mut rig) = started();
        session.end(&mut rig.ctx()).unwrap();

        assert!(session.increase_score(&mut rig.ctx()).is_err());
        assert_eq!(session.final_medal(), Medal::Bronze);
        assert_eq!(rig.hud.medal, Medal::Bronze);
    }

    #[test]
    fn end_twice_is_rejected() {
        let (mut session, mut rig) = started();
        session.end(&mut rig.ctx()).unwrap();
        let calls = rig.audio.calls.len();

        let err = session.end(&mut rig.ctx()).unwrap_err();

        assert_eq!(err, invalid(Operation::End, Phase::GameOver));
        assert_eq!(rig.audio.calls.len(), calls);
    }

    #[test]
    fn end_while_paused_is_rejected() {
        let (mut session, mut rig) = started();
        session.toggle_pause(&mut rig.ctx()).unwrap();

        let err = session.end(&mut rig.ctx()).unwrap_err();

        assert_eq!(err, invalid(Operation::End, Phase::Paused(PauseReason::User)));
        assert!(rig.hud.pause_icon);
        assert!(!rig.hud.game_over);
    }

    #[test]
    fn score_ignores_passes_outside_play() {
        let (mut session, mut rig) = started();
        session.increase_score(&mut rig.ctx()).unwrap();

        session.toggle_pause(&mut rig.ctx()).unwrap();
        let err = session.increase_score(&mut rig.ctx()).unwrap_err();
        assert_eq!(
            err,
            invalid(Operation::IncreaseScore, Phase::Paused(PauseReason::User))
        );
        assert_eq!(session.score(), 1);

        session.toggle_pause(&mut rig.ctx()).unwrap();
        session.end(&mut rig.ctx()).unwrap();
        let err = session.increase_score(&mut rig.ctx()).unwrap_err();
        assert_eq!(err, invalid(Operation::IncreaseScore, Phase::GameOver));
        assert_eq!(session.score(), 1);
        assert_eq!(rig.hud.score_text, "1");
    }

    #[test]
    fn toggle_during_game_over_is_rejected() {
        let (mut session, mut rig) = started();
        session.end(&mut rig.ctx()).unwrap();

        assert!(!session.is_active());
        let err = session.toggle_pause(&mut rig.ctx()).unwrap_err();
        assert_eq!(err, invalid(Operation::TogglePause, Phase::GameOver));
        assert!(!rig.hud.pause_icon);
        assert!(rig.clock.is_frozen());
    }

    #[test]
    fn freeze_only_applies_before_the_first_start() {
        let (mut session, mut rig) = started();
        let err = session.freeze(&mut rig.ctx()).unwrap_err();
        assert_eq!(err, invalid(Operation::Freeze, Phase::Playing));
        assert!(!rig.clock.is_frozen());
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let (mut session, mut rig) = started();
        session.score = u32::MAX - 1;

        session.increase_score(&mut rig.ctx()).unwrap();
        session.increase_score(&mut rig.ctx()).unwrap();

        assert_eq!(session.score(), u32::MAX);
        assert_eq!(rig.hud.score_text, u32::MAX.to_string());
    }

    #[test]
    fn seven_passes_earn_silver() {
        let (mut session, mut rig) = started();
        for _ in 0..7 {
            session.handle(Signal::ObstaclePassed, &mut rig.ctx()).unwrap();
        }
        session.handle(Signal::PlayerCollided, &mut rig.ctx()).unwrap();

        assert_eq!(session.score(), 7);
        assert_eq!(session.final_medal(), Medal::Silver);
        assert_eq!(rig.hud.medal, Medal::Silver);
    }

    #[test]
    fn pause_round_trip_then_one_pass_earns_bronze() {
        let (mut session, mut rig) = started();
        session.handle(Signal::TogglePause, &mut rig.ctx()).unwrap();
        session.handle(Signal::TogglePause, &mut rig.ctx()).unwrap();
        session.handle(Signal::ObstaclePassed, &mut rig.ctx()).unwrap();
        session.handle(Signal::PlayerCollided, &mut rig.ctx()).unwrap();

        assert_eq!(session.score(), 1);
        assert_eq!(session.final_medal(), Medal::Bronze);
    }

    #[test]
    fn twelve_passes_earn_gold_and_best_survives_restart() {
        let (mut session, mut rig) = started();
        for _ in 0..12 {
            session.increase_score(&mut rig.ctx()).unwrap();
        }
        session.end(&mut rig.ctx()).unwrap();
        assert_eq!(session.final_medal(), Medal::Gold);

        session.handle(Signal::Start, &mut rig.ctx()).unwrap();
        assert_eq!(session.final_medal(), Medal::None);
        assert_eq!(session.best_score(), 12);

        session.increase_score(&mut rig.ctx()).unwrap();
        session.end(&mut rig.ctx()).unwrap();
        assert_eq!(session.best_score(), 12);
    }
}
