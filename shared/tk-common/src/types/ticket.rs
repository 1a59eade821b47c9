//! Ticket Types

use serde::{Deserialize, Serialize};

use super::ids::{ChannelId, GuildId, PanelId, TeamId, TicketId, UserId};

/// A support ticket.
///
/// Created and mutated by the ticket lifecycle handlers; the worker's
/// permission logic only reads it. Claim state lives in the permission
/// store rather than on the ticket itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket number within the guild.
    pub id: TicketId,
    /// Guild the ticket belongs to.
    pub guild_id: GuildId,
    /// User who opened the ticket.
    pub user_id: UserId,
    /// Panel the ticket was opened from, if any.
    pub panel_id: Option<PanelId>,
    /// Channel or thread hosting the conversation.
    pub channel_id: Option<ChannelId>,
}

impl Ticket {
    /// Whether `user_id` opened this ticket.
    #[must_use]
    pub fn is_opener(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Ticket intake panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub panel_id: PanelId,
    pub guild_id: GuildId,
    pub title: String,
    /// Whether the guild's default support team also handles this panel.
    pub with_default_team: bool,
}

/// Named support team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTeam {
    pub id: TeamId,
    pub guild_id: GuildId,
    pub name: String,
}
