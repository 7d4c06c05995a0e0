//! Play-session state: score, phase and medal.
//!
//! The [`SessionManager`] is the only writer of this state. It is built
//! once by the host and handed the collaborators it drives on every call
//! through [`Collaborators`].

use std::fmt;

mod manager;

pub use manager::{Collaborators, SessionManager};

/// Why the simulation is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseReason {
    /// Frozen at startup, before the first session.
    AwaitingStart,
    /// Paused by the player mid-session.
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Paused(PauseReason),
    Playing,
    GameOver,
}

impl Phase {
    /// Simulation time is frozen in every phase except `Playing`.
    pub fn is_frozen(self) -> bool {
        self != Phase::Playing
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Paused(PauseReason::AwaitingStart) => f.write_str("waiting for the first session"),
            Phase::Paused(PauseReason::User) => f.write_str("paused"),
            Phase::Playing => f.write_str("playing"),
            Phase::GameOver => f.write_str("game over"),
        }
    }
}

/// Award tier, decided once when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Medal {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
}

impl Medal {
    pub const BRONZE_MAX: u32 = 5;
    pub const SILVER_MAX: u32 = 10;

    pub fn for_score(score: u32) -> Medal {
        if score <= Self::BRONZE_MAX {
            Medal::Bronze
        } else if score <= Self::SILVER_MAX {
            Medal::Silver
        } else {
            Medal::Gold
        }
    }
}

/// Operations that can be rejected, named in [`SessionError`](crate::error::SessionError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Freeze,
    Start,
    TogglePause,
    End,
    IncreaseScore,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Freeze => "freeze the session",
            Operation::Start => "start a session",
            Operation::TogglePause => "toggle pause",
            Operation::End => "end the session",
            Operation::IncreaseScore => "increase the score",
        };
        f.write_str(s)
    }
}

/// Discrete events delivered to the session between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Play button pressed.
    Start,
    /// Pause key pressed.
    TogglePause,
    /// An obstacle scrolled past the player.
    ObstaclePassed,
    /// The player hit an obstacle or the bounds.
    PlayerCollided,
}
