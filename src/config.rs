//! Bot configuration module
//!
//! Handles loading configuration from environment variables.

use crate::error::BotError;
use std::env;
use std::time::Duration;
use twilight_gateway::Intents;

/// Default auto-close countdown for a recruitment session.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token
    pub discord_token: String,

    /// Channel players are pointed at once the roster is full
    pub lobby_channel_id: u64,

    /// Auto-close countdown for an under-filled session
    pub session_timeout: Duration,

    /// Prefix for chat commands
    pub command_prefix: String,

    /// Health/metrics HTTP port
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BotError> {
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .or_else(|_| env::var("DISCORD_BOT_TOKEN"))
            .map_err(|_| {
                BotError::Config("DISCORD_TOKEN or DISCORD_BOT_TOKEN must be set".to_string())
            })?;

        let lobby_channel_id = env::var("LOBBY_CHANNEL_ID")
            .map_err(|_| BotError::Config("LOBBY_CHANNEL_ID must be set".to_string()))?
            .parse()
            .map_err(|e| {
                BotError::Config(format!("LOBBY_CHANNEL_ID must be a valid channel id: {e}"))
            })?;
        if lobby_channel_id == 0 {
            return Err(BotError::Config(
                "LOBBY_CHANNEL_ID must be non-zero".to_string(),
            ));
        }

        let session_timeout_secs: u64 = env::var("SESSION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|e| {
                BotError::Config(format!("SESSION_TIMEOUT_SECS must be a valid number: {e}"))
            })?;

        let command_prefix = env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string());

        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "9090".to_string())
            .parse()
            .map_err(|e| BotError::Config(format!("HTTP_PORT must be a valid port number: {e}")))?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            discord_token,
            lobby_channel_id,
            session_timeout: Duration::from_secs(session_timeout_secs),
            command_prefix,
            http_port,
            log_level,
        })
    }

    /// Get configured Discord intents
    ///
    /// - GUILDS: guild lifecycle events
    /// - GUILD_MESSAGES + MESSAGE_CONTENT: prefix commands (privileged)
    pub fn intents() -> Intents {
        Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_cover_prefix_commands() {
        let intents = BotConfig::intents();

        assert!(intents.contains(Intents::GUILDS));
        assert!(intents.contains(Intents::GUILD_MESSAGES));
        assert!(intents.contains(Intents::MESSAGE_CONTENT));

        // Member events are not needed; roles arrive with each interaction.
        assert!(!intents.contains(Intents::GUILD_MEMBERS));
    }

    #[test]
    fn test_default_timeout_is_one_hour() {
        assert_eq!(DEFAULT_SESSION_TIMEOUT_SECS, 3600);
    }
}
