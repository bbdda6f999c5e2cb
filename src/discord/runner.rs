//! Gateway event loop and dispatch
//!
//! Runs the single Twilight shard, turns chat messages into [`Command`]s and
//! button presses into [`SessionAction`]s, and pumps session events back out
//! as Discord messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use twilight_gateway::{error::ReceiveMessageErrorType, EventTypeFlags, Shard, StreamExt as _};
use twilight_model::application::interaction::{Interaction, InteractionData};
use twilight_model::channel::Message;
use twilight_model::gateway::event::Event;
use twilight_model::guild::Permissions;

use crate::balance;
use crate::commands::{Command, SessionAction};
use crate::error::BotError;
use crate::maps;
use crate::metrics::BotMetrics;
use crate::session::{Participant, SessionEvent, SessionManager};
use crate::tier::Tier;

use super::api::DiscordApi;
use super::view;

/// Mark the gateway dead after this many consecutive receive errors.
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Everything the dispatch handlers need, cheap to clone.
#[derive(Clone)]
pub struct BotContext {
    pub api: Arc<DiscordApi>,
    pub session: SessionManager,
    pub metrics: BotMetrics,
    pub command_prefix: String,
    pub lobby_channel_id: u64,
    pub gateway_connected: Arc<AtomicBool>,
}

/// Run the shard's event loop until the stream ends or the circuit breaks.
pub async fn run(mut shard: Shard, ctx: BotContext) -> Result<(), BotError> {
    info!("Gateway shard starting");

    let mut consecutive_errors: u32 = 0;

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => {
                consecutive_errors = 0;
                event
            }
            Err(source) => {
                consecutive_errors += 1;
                warn!(error = %source, consecutive = consecutive_errors, "Error receiving event");
                ctx.gateway_connected.store(false, Ordering::SeqCst);
                ctx.metrics.set_gateway_connected(false);

                if matches!(source.kind(), ReceiveMessageErrorType::Reconnect) {
                    error!("Fatal gateway error (reconnect failed)");
                    return Err(BotError::Discord {
                        action: "gateway_reconnect",
                        source: Box::new(source),
                    });
                }

                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    error!(consecutive = consecutive_errors, "Gateway circuit breaker tripped");
                    return Err(BotError::GatewayCircuitBroken {
                        count: consecutive_errors,
                        max: MAX_CONSECUTIVE_ERRORS,
                    });
                }
                continue;
            }
        };

        match &event {
            Event::Ready(ready) => {
                ctx.api.set_application_id(ready.application.id);
                ctx.gateway_connected.store(true, Ordering::SeqCst);
                ctx.metrics.set_gateway_connected(true);
                info!(session_id = %ready.session_id, "Gateway ready");
            }
            Event::Resumed => {
                ctx.gateway_connected.store(true, Ordering::SeqCst);
                ctx.metrics.set_gateway_connected(true);
                info!("Gateway resumed");
            }
            Event::GatewayClose(_) => {
                ctx.gateway_connected.store(false, Ordering::SeqCst);
                ctx.metrics.set_gateway_connected(false);
                debug!("Gateway connection closed");
            }
            Event::MessageCreate(msg) => {
                if let Err(e) = handle_message(&ctx, msg).await {
                    ctx.metrics.record_bot_error(e.error_type_label());
                    warn!(error = %e, "Command handling failed");
                }
            }
            Event::InteractionCreate(interaction) => {
                if let Err(e) = handle_interaction(&ctx, interaction).await {
                    ctx.metrics.record_bot_error(e.error_type_label());
                    warn!(error = %e, "Interaction handling failed");
                }
            }
            _ => {}
        }
    }

    info!("Gateway event stream ended");
    Ok(())
}

/// Forward session events to Discord: completion announcements and closure
/// cleanup (disable the buttons, announce why the session ended).
pub async fn run_event_pump(
    mut rx: mpsc::UnboundedReceiver<SessionEvent>,
    api: Arc<DiscordApi>,
    metrics: BotMetrics,
    lobby_channel_id: u64,
) {
    while let Some(event) = rx.recv().await {
        match event {
            SessionEvent::Completed { session_id, roster } => {
                debug!(%session_id, "Pumping completion event");
                // Show the final ten-player roster before the buttons go dark.
                if let Err(e) = api.refresh_recruit_message(&roster).await {
                    warn!(error = %e, "Failed to refresh recruit message on completion");
                }
                if let Some(channel_id) = api.recruit_channel().await {
                    let content = view::completion_message(&roster, lobby_channel_id);
                    if let Err(e) = api.announce(channel_id, &content).await {
                        warn!(error = %e, "Failed to announce completion");
                    }
                }
            }
            SessionEvent::Closed { session_id, reason } => {
                debug!(%session_id, reason = reason.label(), "Pumping closure event");
                metrics.record_closure(reason.label());
                match api.disable_recruit_controls().await {
                    Ok(channel_id) => {
                        let content = view::closure_message(reason);
                        if let Err(e) = api.announce(channel_id, content).await {
                            warn!(error = %e, "Failed to announce closure");
                        }
                    }
                    Err(BotError::NoRecruitMessage) => {
                        debug!("Session closed without a tracked recruit message");
                    }
                    Err(e) => warn!(error = %e, "Failed to disable recruit controls"),
                }
            }
        }
    }
    debug!("Session event channel closed");
}

async fn handle_message(ctx: &BotContext, msg: &Message) -> Result<(), BotError> {
    if msg.author.bot {
        return Ok(());
    }
    let Some(command) = Command::parse(&ctx.command_prefix, &msg.content) else {
        return Ok(());
    };

    ctx.metrics.record_command(command.label());
    let author_id = msg.author.id.get();

    match command {
        Command::Scrim => {
            let session_id = ctx.session.create(author_id).await;
            ctx.metrics.record_session_created();
            debug!(%session_id, author_id, "Session created via command");
            let snapshot = ctx.session.snapshot().await;
            ctx.api
                .post_recruit_message(msg.channel_id, &snapshot.roster)
                .await
        }
        Command::Teams => {
            let snapshot = ctx.session.snapshot().await;
            match balance::assign_teams(&snapshot.roster) {
                Ok(assignment) => {
                    ctx.metrics.record_team_assignment();
                    ctx.api
                        .announce(msg.channel_id, &view::team_report(&assignment))
                        .await
                }
                Err(e) => {
                    // Precondition violation: the command fired off a roster
                    // that was never finalized at ten.
                    error!(error = %e, "Team assignment precondition violated");
                    ctx.api
                        .announce(msg.channel_id, view::teams_unavailable_notice())
                        .await
                }
            }
        }
        Command::Map => {
            ctx.api
                .announce(msg.channel_id, &view::map_message(maps::pick_random()))
                .await
        }
        Command::FakeRoster => {
            ctx.session
                .seed_roster(author_id, synthetic_roster(1))
                .await;
            ctx.api
                .announce(
                    msg.channel_id,
                    "🧪 **Synthetic ten-player roster seeded.** Run the teams command to test.",
                )
                .await
        }
        Command::FakeFill => match ctx.session.force_complete(synthetic_roster(1111)).await {
            Ok(_) => {
                ctx.api
                    .announce(msg.channel_id, "🔥 Roster force-filled with ten test players!")
                    .await
            }
            Err(e) => {
                ctx.metrics.record_session_error(e.error_type_label());
                ctx.api
                    .announce(msg.channel_id, view::session_error_notice(e))
                    .await
            }
        },
    }
}

async fn handle_interaction(ctx: &BotContext, interaction: &Interaction) -> Result<(), BotError> {
    let Some(InteractionData::MessageComponent(data)) = &interaction.data else {
        return Ok(());
    };
    let Some(action) = SessionAction::from_custom_id(&data.custom_id) else {
        return Ok(());
    };
    let Some(user_id) = interaction.author_id() else {
        return Ok(());
    };
    let user_id = user_id.get();

    let notice = match action {
        SessionAction::Join => {
            let tier = resolve_tier(ctx, interaction).await;
            match ctx.session.join(user_id, tier).await {
                Ok(outcome) => {
                    ctx.metrics.record_join(outcome.roster_size);
                    if !outcome.completed {
                        let snapshot = ctx.session.snapshot().await;
                        if let Err(e) = ctx.api.refresh_recruit_message(&snapshot.roster).await {
                            warn!(error = %e, "Failed to refresh recruit message after join");
                        }
                    }
                    format!("Joined! ({}/10)", outcome.roster_size)
                }
                Err(e) => {
                    ctx.metrics.record_session_error(e.error_type_label());
                    view::session_error_notice(e).to_string()
                }
            }
        }
        SessionAction::Leave => match ctx.session.leave(user_id).await {
            Ok(()) => {
                let snapshot = ctx.session.snapshot().await;
                ctx.metrics.record_leave(snapshot.roster.len());
                if let Err(e) = ctx.api.refresh_recruit_message(&snapshot.roster).await {
                    warn!(error = %e, "Failed to refresh recruit message after leave");
                }
                "Left the session.".to_string()
            }
            Err(e) => {
                ctx.metrics.record_session_error(e.error_type_label());
                view::session_error_notice(e).to_string()
            }
        },
        SessionAction::Close => {
            let privileged = is_privileged(interaction);
            match ctx.session.close(user_id, privileged).await {
                Ok(()) => "📢 Recruitment has been closed.".to_string(),
                Err(e) => {
                    ctx.metrics.record_session_error(e.error_type_label());
                    view::session_error_notice(e).to_string()
                }
            }
        }
    };

    ctx.api
        .ephemeral_reply(interaction.id, &interaction.token, &notice)
        .await
}

/// Resolve the presser's tier from their guild roles. Falls back to Unranked
/// when the lookup fails or the interaction has no guild context.
async fn resolve_tier(ctx: &BotContext, interaction: &Interaction) -> Tier {
    let (Some(guild_id), Some(member)) = (interaction.guild_id, &interaction.member) else {
        return Tier::Unranked;
    };

    match ctx.api.member_role_names(guild_id, &member.roles).await {
        Ok(names) => Tier::from_role_names(&names),
        Err(e) => {
            warn!(error = %e, "Role lookup failed, defaulting to Unranked");
            Tier::Unranked
        }
    }
}

/// Privileged close: the presser can manage channels.
fn is_privileged(interaction: &Interaction) -> bool {
    interaction
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.contains(Permissions::MANAGE_CHANNELS))
}

/// Ten synthetic players, one per tier, with ids derived from `first_id`.
fn synthetic_roster(first_id: u64) -> Vec<Participant> {
    Tier::ORDER
        .iter()
        .enumerate()
        .map(|(i, &tier)| Participant {
            user_id: first_id * (i as u64 + 1),
            tier,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_roster_is_ten_unique_players() {
        let roster = synthetic_roster(1111);
        assert_eq!(roster.len(), 10);

        let mut ids: Vec<u64> = roster.iter().map(|p| p.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);

        // One player per tier, so team assignment is exercisable.
        assert_eq!(roster[0].tier, Tier::Radiant);
        assert_eq!(roster[9].tier, Tier::Unranked);
    }

    #[test]
    fn circuit_breaker_threshold_matches_gateway_policy() {
        assert_eq!(MAX_CONSECUTIVE_ERRORS, 10);
    }
}
