//! Discord adapter
//!
//! Everything that talks to Discord: HTTP client wrapper, display payload
//! rendering, and the gateway event loop. The session core never touches
//! this module; it communicates through snapshots and session events.

pub mod api;
pub mod runner;
pub mod view;

pub use api::DiscordApi;
pub use runner::{run, run_event_pump, BotContext};
