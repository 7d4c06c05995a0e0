//! Session state machine and scrolling background for a Flappy Bird clone,
//! with a terminal host that plays it.
//!
//! The core is [`session::SessionManager`]. It owns score, phase and medal
//! and drives the collaborators in [`services`] without ever reading them.

pub mod app;
pub mod audio;
pub mod background;
pub mod clock;
pub mod config;
pub mod error;
pub mod render;
pub mod services;
pub mod session;
pub mod world;

pub use error::{ResourceError, SessionError};
pub use session::{Medal, Phase, SessionManager, Signal};
