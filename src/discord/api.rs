//! Discord HTTP adapter
//!
//! Thin wrapper over the Twilight HTTP client: posts and edits the recruit
//! message, sends announcements and ephemeral interaction replies, and
//! resolves role names for tier lookup. Tracks the one active recruit message
//! so the event pump can refresh and disable it.

use std::sync::OnceLock;

use tokio::sync::Mutex;
use tracing::debug;
use twilight_http::Client;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::{
    InteractionResponse, InteractionResponseData, InteractionResponseType,
};
use twilight_model::id::marker::{
    ApplicationMarker, ChannelMarker, GuildMarker, InteractionMarker, MessageMarker, RoleMarker,
};
use twilight_model::id::Id;

use crate::error::BotError;
use crate::session::Participant;

use super::view;

/// The recruit message currently carrying the session embed and buttons.
#[derive(Debug, Clone, Copy)]
struct RecruitMessage {
    channel_id: Id<ChannelMarker>,
    message_id: Id<MessageMarker>,
}

/// Discord HTTP surface used by the runner and the event pump.
pub struct DiscordApi {
    http: Client,
    application_id: OnceLock<Id<ApplicationMarker>>,
    recruit_message: Mutex<Option<RecruitMessage>>,
}

impl DiscordApi {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(token),
            application_id: OnceLock::new(),
            recruit_message: Mutex::new(None),
        }
    }

    /// Record our application id from the gateway Ready payload.
    pub fn set_application_id(&self, id: Id<ApplicationMarker>) {
        let _ = self.application_id.set(id);
    }

    /// Channel of the tracked recruit message, if one is live.
    pub async fn recruit_channel(&self) -> Option<Id<ChannelMarker>> {
        self.recruit_message.lock().await.map(|m| m.channel_id)
    }

    /// Post a fresh recruit message and start tracking it, replacing any
    /// previously tracked one.
    pub async fn post_recruit_message(
        &self,
        channel_id: Id<ChannelMarker>,
        roster: &[Participant],
    ) -> Result<(), BotError> {
        let embed = view::session_embed(roster);
        let components = view::session_buttons(false);

        let message = self
            .http
            .create_message(channel_id)
            .embeds(&[embed])
            .components(&components)
            .await
            .map_err(|e| BotError::Discord {
                action: "create_recruit_message",
                source: Box::new(e),
            })?
            .model()
            .await
            .map_err(|e| BotError::Discord {
                action: "create_recruit_message",
                source: Box::new(e),
            })?;

        let mut tracked = self.recruit_message.lock().await;
        *tracked = Some(RecruitMessage {
            channel_id,
            message_id: message.id,
        });
        debug!(channel_id = %channel_id, message_id = %message.id, "Recruit message posted");
        Ok(())
    }

    /// Re-render the tracked recruit message for the given roster.
    pub async fn refresh_recruit_message(&self, roster: &[Participant]) -> Result<(), BotError> {
        let tracked = self.recruit_message.lock().await;
        let Some(message) = *tracked else {
            return Err(BotError::NoRecruitMessage);
        };
        drop(tracked);

        let embed = view::session_embed(roster);
        let components = view::session_buttons(false);

        self.http
            .update_message(message.channel_id, message.message_id)
            .embeds(Some(&[embed]))
            .components(Some(&components))
            .await
            .map_err(|e| BotError::Discord {
                action: "refresh_recruit_message",
                source: Box::new(e),
            })?;
        Ok(())
    }

    /// Disable the button row on the tracked recruit message and stop
    /// tracking it. Returns the channel it lived in so closure announcements
    /// can land there.
    pub async fn disable_recruit_controls(&self) -> Result<Id<ChannelMarker>, BotError> {
        let mut tracked = self.recruit_message.lock().await;
        let Some(message) = tracked.take() else {
            return Err(BotError::NoRecruitMessage);
        };
        drop(tracked);

        let components = view::session_buttons(true);
        self.http
            .update_message(message.channel_id, message.message_id)
            .components(Some(&components))
            .await
            .map_err(|e| BotError::Discord {
                action: "disable_recruit_controls",
                source: Box::new(e),
            })?;
        Ok(message.channel_id)
    }

    /// Send a plain channel message.
    pub async fn announce(
        &self,
        channel_id: Id<ChannelMarker>,
        content: &str,
    ) -> Result<(), BotError> {
        self.http
            .create_message(channel_id)
            .content(content)
            .await
            .map_err(|e| BotError::Discord {
                action: "announce",
                source: Box::new(e),
            })?;
        Ok(())
    }

    /// Reply to an interaction with an ephemeral notice.
    pub async fn ephemeral_reply(
        &self,
        interaction_id: Id<InteractionMarker>,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), BotError> {
        let Some(application_id) = self.application_id.get() else {
            return Err(BotError::NotReady);
        };

        let response = InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(InteractionResponseData {
                allowed_mentions: None,
                attachments: None,
                choices: None,
                components: None,
                content: Some(content.to_string()),
                custom_id: None,
                embeds: None,
                flags: Some(MessageFlags::EPHEMERAL),
                poll: None,
                title: None,
                tts: None,
            }),
        };

        self.http
            .interaction(*application_id)
            .create_response(interaction_id, interaction_token, &response)
            .await
            .map_err(|e| BotError::Discord {
                action: "ephemeral_reply",
                source: Box::new(e),
            })?;
        Ok(())
    }

    /// Resolve a member's role ids to role names for tier lookup.
    pub async fn member_role_names(
        &self,
        guild_id: Id<GuildMarker>,
        role_ids: &[Id<RoleMarker>],
    ) -> Result<Vec<String>, BotError> {
        let roles = self
            .http
            .roles(guild_id)
            .await
            .map_err(|e| BotError::Discord {
                action: "fetch_guild_roles",
                source: Box::new(e),
            })?
            .models()
            .await
            .map_err(|e| BotError::Discord {
                action: "fetch_guild_roles",
                source: Box::new(e),
            })?;

        Ok(roles
            .into_iter()
            .filter(|role| role_ids.contains(&role.id))
            .map(|role| role.name)
            .collect())
    }
}
