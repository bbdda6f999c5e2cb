//! Domain error types for scrimbot
//!
//! Structured thiserror types for navigable diagnostics and compile-time
//! exhaustive handling.
//!
//! main.rs is the ONLY module allowed to use anyhow::Result (process boundary).
//! All application code returns Result<T, BotError> or the domain result enums
//! below.

use thiserror::Error;

/// Recoverable, user-facing session errors.
///
/// Every variant maps to an ephemeral notice in Discord; none are fatal to the
/// process. The adapter pattern-matches on the variant to pick the wording.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The user is already on the roster.
    #[error("user {user_id} has already joined the session")]
    AlreadyJoined { user_id: u64 },

    /// The user is not on the roster.
    #[error("user {user_id} has not joined the session")]
    NotJoined { user_id: u64 },

    /// No session exists, or the session is no longer open.
    #[error("no open recruitment session")]
    SessionNotOpen,

    /// Close requested by someone who is neither the owner nor privileged.
    #[error("user {user_id} may not close this session")]
    Unauthorized { user_id: u64 },
}

impl SessionError {
    /// Static label for the `session_errors_total` metric.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            Self::AlreadyJoined { .. } => "already_joined",
            Self::NotJoined { .. } => "not_joined",
            Self::SessionNotOpen => "session_not_open",
            Self::Unauthorized { .. } => "unauthorized",
        }
    }
}

/// Team balancer precondition violation.
///
/// A roster of the wrong size reaching the balancer is a call-sequencing
/// defect, not routine contention; it is logged at error level when it occurs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceError {
    #[error("team assignment requires exactly {expected} players, got {actual}")]
    InvalidRosterSize { actual: usize, expected: usize },
}

/// Adapter and process-level errors.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration error (environment variable missing or invalid)
    #[error("configuration error: {0}")]
    Config(String),

    /// Discord HTTP request failed
    #[error("discord request '{action}' failed")]
    Discord {
        action: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No recruit message is being tracked (session view cannot be refreshed)
    #[error("no active recruit message to update")]
    NoRecruitMessage,

    /// Interaction arrived before the gateway handshake supplied our
    /// application id
    #[error("gateway not ready (application id unknown)")]
    NotReady,

    /// Gateway exceeded consecutive error threshold (circuit breaker tripped)
    #[error("gateway connection lost after {count} consecutive errors (max {max})")]
    GatewayCircuitBroken { count: u32, max: u32 },
}

impl BotError {
    /// Static label for the `bot_errors_total` metric.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Discord { .. } => "discord",
            Self::NoRecruitMessage => "no_recruit_message",
            Self::NotReady => "not_ready",
            Self::GatewayCircuitBroken { .. } => "gateway_circuit_broken",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_error() -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, "test"))
    }

    #[test]
    fn every_session_variant_has_distinct_label() {
        let labels = [
            SessionError::AlreadyJoined { user_id: 1 }.error_type_label(),
            SessionError::NotJoined { user_id: 1 }.error_type_label(),
            SessionError::SessionNotOpen.error_type_label(),
            SessionError::Unauthorized { user_id: 1 }.error_type_label(),
        ];

        let mut unique = labels.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(labels.len(), unique.len(), "Duplicate error_type_label found");
    }

    #[test]
    fn error_messages_contain_context() {
        let err = SessionError::AlreadyJoined { user_id: 42 };
        assert!(err.to_string().contains("42"));

        let err = BalanceError::InvalidRosterSize {
            actual: 9,
            expected: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains('9') && msg.contains("10"));

        let err = BotError::Discord {
            action: "create_message",
            source: test_error(),
        };
        assert!(err.to_string().contains("create_message"));
    }

    #[test]
    fn config_error_preserves_message() {
        let err = BotError::Config("DISCORD_TOKEN must be set".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: DISCORD_TOKEN must be set"
        );
    }
}
