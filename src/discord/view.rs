//! Display payload rendering
//!
//! Pure builders for every message the bot sends: the recruit embed, the
//! session button row, completion and closure announcements, the team
//! assignment report, and ephemeral notices. No I/O here; the api module
//! delivers what these functions produce.

use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_model::channel::message::embed::{Embed, EmbedField, EmbedFooter};

use crate::balance::{BalanceVerdict, Team, TeamAssignment};
use crate::commands::SessionAction;
use crate::error::SessionError;
use crate::session::{CloseReason, Participant, ROSTER_CAPACITY};

const EMBED_COLOR: u32 = 0xE7_4C_3C;

const EMBED_FOOTER: &str = "⚠️ Listed tiers are peak tiers, not current ones.\n\
                            ⛔ Auto-closes after 1 hour if under 10 players.";

/// User mention markup.
pub fn mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}

/// Channel mention markup.
pub fn channel_mention(channel_id: u64) -> String {
    format!("<#{channel_id}>")
}

/// The recruit embed: tier-sorted roster plus a remaining-slot field.
pub fn session_embed(roster: &[Participant]) -> Embed {
    let mut sorted = roster.to_vec();
    sorted.sort_by_key(|p| p.tier.rank());

    let mut description = String::from("Agents currently in:\n");
    if sorted.is_empty() {
        description.push_str("No agents have joined yet.\n");
    } else {
        for (idx, p) in sorted.iter().enumerate() {
            description.push_str(&format!(
                "{}. {} {} ({})\n",
                idx + 1,
                p.tier.emoji(),
                mention(p.user_id),
                p.tier
            ));
        }
    }

    let remaining = ROSTER_CAPACITY.saturating_sub(sorted.len());

    Embed {
        author: None,
        color: Some(EMBED_COLOR),
        description: Some(description),
        fields: vec![EmbedField {
            inline: false,
            name: "Slots remaining".to_string(),
            value: format!("{remaining}"),
        }],
        footer: Some(EmbedFooter {
            icon_url: None,
            proxy_icon_url: None,
            text: EMBED_FOOTER.to_string(),
        }),
        image: None,
        kind: "rich".to_string(),
        provider: None,
        thumbnail: None,
        timestamp: None,
        title: Some("VALORANT scrim — recruiting agents!".to_string()),
        url: None,
        video: None,
    }
}

/// The join/leave/close button row.
pub fn session_buttons(disabled: bool) -> Vec<Component> {
    let button = |action: SessionAction, label: &str, style: ButtonStyle| {
        Component::Button(Button {
            custom_id: Some(action.custom_id().to_string()),
            disabled,
            emoji: None,
            id: None,
            label: Some(label.to_string()),
            style,
            url: None,
            sku_id: None,
        })
    };

    vec![Component::ActionRow(ActionRow {
        id: None,
        components: vec![
            button(SessionAction::Join, "⭕ Join", ButtonStyle::Success),
            button(SessionAction::Leave, "❌ Leave", ButtonStyle::Danger),
            button(SessionAction::Close, "🔒 Close", ButtonStyle::Secondary),
        ],
    })]
}

/// Full-roster announcement: mention everyone and point at the lobby.
pub fn completion_message(roster: &[Participant], lobby_channel_id: u64) -> String {
    let mentions = roster
        .iter()
        .map(|p| mention(p.user_id))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{mentions}\n🚩 Ten agents recruited! Get ready in the lobby!\n➡️ {}",
        channel_mention(lobby_channel_id)
    )
}

/// Closure announcement, worded per reason.
pub fn closure_message(reason: CloseReason) -> &'static str {
    match reason {
        CloseReason::Completed => "🔒 Ten players recruited — session closed automatically.",
        CloseReason::Timeout => "⏰ Recruitment timed out under 10 players — session closed.",
        CloseReason::Manual => "📢 Recruitment has been closed.",
    }
}

fn team_section(heading: &str, team: &Team) -> String {
    let mut out = format!("{heading}\n");
    for p in &team.members {
        out.push_str(&format!(
            "- {} {} ({})\n",
            p.tier.emoji(),
            mention(p.user_id),
            p.tier
        ));
    }
    let average = team
        .average_tier()
        .map_or_else(|| "N/A".to_string(), |t| t.to_string());
    out.push_str(&format!("➡️ **Average tier: {average}**\n\n"));
    out
}

/// The team assignment report.
pub fn team_report(assignment: &TeamAssignment) -> String {
    let mut msg = String::from("⚔️ **Auto team assignment**\n\n");
    msg.push_str(&team_section("🔵 **Team A (Attack)**", &assignment.team_a));
    msg.push_str(&team_section("🔴 **Team B (Defense)**", &assignment.team_b));
    msg.push_str(verdict_line(assignment.verdict()));
    msg
}

fn verdict_line(verdict: BalanceVerdict) -> &'static str {
    match verdict {
        BalanceVerdict::VeryBalanced => "✅ **Very balanced match!**",
        BalanceVerdict::SlightlyImbalanced => "⚠️ **Teams differ slightly in tier.**",
        BalanceVerdict::RecommendRebalance => {
            "❗ **Large tier gap — consider rebalancing the teams.**"
        }
    }
}

/// Random map announcement.
pub fn map_message(map: &str) -> String {
    format!("🎯 **Today's random map is… `{map}`!**")
}

/// Ephemeral notice for a rejected session operation.
pub fn session_error_notice(err: SessionError) -> &'static str {
    match err {
        SessionError::AlreadyJoined { .. } => "You have already joined!",
        SessionError::NotJoined { .. } => "You are not in the session!",
        SessionError::SessionNotOpen => "No open recruitment session right now.",
        SessionError::Unauthorized { .. } => {
            "❌ Only the session owner or a moderator can close recruitment."
        }
    }
}

/// Channel notice when team assignment is requested off a non-full roster.
pub fn teams_unavailable_notice() -> &'static str {
    "❌ Team assignment is available **after 10 players are recruited**."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::assign_teams;
    use crate::tier::Tier;

    fn roster(tiers: &[Tier]) -> Vec<Participant> {
        tiers
            .iter()
            .enumerate()
            .map(|(i, &tier)| Participant {
                user_id: i as u64 + 1,
                tier,
            })
            .collect()
    }

    #[test]
    fn empty_roster_embed_shows_placeholder_and_ten_slots() {
        let embed = session_embed(&[]);
        let description = embed.description.unwrap();
        assert!(description.contains("No agents have joined yet."));
        assert_eq!(embed.fields[0].value, "10");
    }

    #[test]
    fn embed_roster_is_tier_sorted() {
        let players = vec![
            Participant {
                user_id: 1,
                tier: Tier::Iron,
            },
            Participant {
                user_id: 2,
                tier: Tier::Radiant,
            },
        ];
        let embed = session_embed(&players);
        let description = embed.description.unwrap();

        let radiant = description.find("<@2>").unwrap();
        let iron = description.find("<@1>").unwrap();
        assert!(radiant < iron, "strongest tier should be listed first");
        assert_eq!(embed.fields[0].value, "8");
    }

    #[test]
    fn button_row_covers_all_three_actions() {
        let components = session_buttons(false);
        let Component::ActionRow(row) = &components[0] else {
            panic!("expected an action row");
        };
        assert_eq!(row.components.len(), 3);

        for component in &row.components {
            let Component::Button(button) = component else {
                panic!("expected a button");
            };
            assert!(!button.disabled);
            let id = button.custom_id.as_deref().unwrap();
            assert!(crate::commands::SessionAction::from_custom_id(id).is_some());
        }
    }

    #[test]
    fn disabled_buttons_are_disabled() {
        let components = session_buttons(true);
        let Component::ActionRow(row) = &components[0] else {
            panic!("expected an action row");
        };
        for component in &row.components {
            let Component::Button(button) = component else {
                panic!("expected a button");
            };
            assert!(button.disabled);
        }
    }

    #[test]
    fn completion_message_mentions_everyone_and_the_lobby() {
        let players = roster(&Tier::ORDER);
        let msg = completion_message(&players, 555);
        for p in &players {
            assert!(msg.contains(&mention(p.user_id)));
        }
        assert!(msg.contains("<#555>"));
    }

    #[test]
    fn team_report_includes_both_teams_and_the_verdict() {
        let players = roster(&Tier::ORDER);
        let assignment = assign_teams(&players).unwrap();
        let report = team_report(&assignment);

        assert!(report.contains("Team A"));
        assert!(report.contains("Team B"));
        assert!(report.contains("Average tier"));
        // Ladder roster has diff 5, so the rebalance line shows.
        assert!(report.contains("rebalancing"));
    }

    #[test]
    fn closure_wording_differs_per_reason() {
        let manual = closure_message(CloseReason::Manual);
        let timeout = closure_message(CloseReason::Timeout);
        let completed = closure_message(CloseReason::Completed);
        assert_ne!(manual, timeout);
        assert_ne!(manual, completed);
        assert_ne!(timeout, completed);
    }
}
