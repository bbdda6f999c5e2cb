//! Command and button-action surface
//!
//! Prefix commands arrive as plain chat messages; the three session controls
//! arrive as button presses keyed by component custom id. Both are parsed into
//! explicit enums here and handled by the runner.

/// Prefix commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a new recruitment session.
    Scrim,
    /// Split the current ten-player roster into balanced teams.
    Teams,
    /// Pick a random map from the pool.
    Map,
    /// Test-only: replace the roster with ten synthetic players.
    FakeRoster,
    /// Test-only: fill the open session with ten synthetic players and run
    /// the full completion flow.
    FakeFill,
}

impl Command {
    /// Static label for the `commands_total` metric.
    pub fn label(self) -> &'static str {
        match self {
            Self::Scrim => "scrim",
            Self::Teams => "teams",
            Self::Map => "map",
            Self::FakeRoster => "fake_roster",
            Self::FakeFill => "fake_fill",
        }
    }

    /// Parse a message body against the configured prefix.
    ///
    /// Returns None for non-command chatter and unknown commands alike.
    pub fn parse(prefix: &str, content: &str) -> Option<Command> {
        let body = content.strip_prefix(prefix)?;
        let name = body.split_whitespace().next()?;
        match name {
            "scrim" => Some(Self::Scrim),
            "teams" => Some(Self::Teams),
            "map" => Some(Self::Map),
            "fakeroster" => Some(Self::FakeRoster),
            "fakefill" => Some(Self::FakeFill),
            _ => None,
        }
    }
}

/// Interactive session controls, one per button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Join,
    Leave,
    Close,
}

impl SessionAction {
    /// Component custom id carried on the button.
    pub fn custom_id(self) -> &'static str {
        match self {
            Self::Join => "scrim:join",
            Self::Leave => "scrim:leave",
            Self::Close => "scrim:close",
        }
    }

    /// Reverse of [`custom_id`](Self::custom_id).
    pub fn from_custom_id(id: &str) -> Option<SessionAction> {
        match id {
            "scrim:join" => Some(Self::Join),
            "scrim:leave" => Some(Self::Leave),
            "scrim:close" => Some(Self::Close),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("!", "!scrim"), Some(Command::Scrim));
        assert_eq!(Command::parse("!", "!teams"), Some(Command::Teams));
        assert_eq!(Command::parse("!", "!map"), Some(Command::Map));
        assert_eq!(Command::parse("!", "!fakeroster"), Some(Command::FakeRoster));
        assert_eq!(Command::parse("!", "!fakefill"), Some(Command::FakeFill));
    }

    #[test]
    fn ignores_chatter_and_unknown_commands() {
        assert_eq!(Command::parse("!", "good luck all"), None);
        assert_eq!(Command::parse("!", "!unknown"), None);
        assert_eq!(Command::parse("!", "!"), None);
        assert_eq!(Command::parse("!", ""), None);
    }

    #[test]
    fn respects_the_configured_prefix() {
        assert_eq!(Command::parse("~", "~scrim"), Some(Command::Scrim));
        assert_eq!(Command::parse("~", "!scrim"), None);
    }

    #[test]
    fn trailing_arguments_are_tolerated() {
        assert_eq!(Command::parse("!", "!scrim tonight 9pm"), Some(Command::Scrim));
    }

    #[test]
    fn custom_ids_round_trip() {
        for action in [SessionAction::Join, SessionAction::Leave, SessionAction::Close] {
            assert_eq!(SessionAction::from_custom_id(action.custom_id()), Some(action));
        }
        assert_eq!(SessionAction::from_custom_id("scrim:unknown"), None);
    }
}
