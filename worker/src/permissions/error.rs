//! Access Resolution Error Types

use std::time::Duration;

use tk_common::{GuildId, PanelId, UserId};

/// Permission store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Permission store unavailable: {0}")]
    Unavailable(String),

    /// No connection settings were supplied.
    #[error("Permission store not configured: {0} is not set")]
    NotConfigured(&'static str),
}

/// Membership provider failures.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// The user is not (or no longer) a member of the guild.
    #[error("User {user_id} is not a member of guild {guild_id}")]
    NotFound { guild_id: GuildId, user_id: UserId },

    #[error("Membership provider rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Membership provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by ticket access resolution.
///
/// There is no fallback decision on error: callers receive the failure
/// rather than an implicit allow or deny.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// The ticket references a panel that does not exist.
    #[error("Panel {0} not found")]
    PanelNotFound(PanelId),

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    /// A staff lookup task panicked or was cancelled.
    #[error("Staff lookup task failed: {0}")]
    Task(String),
}

impl AccessError {
    /// Whether this error means a guild member could not be found.
    #[must_use]
    pub const fn is_member_not_found(&self) -> bool {
        matches!(self, Self::Membership(MembershipError::NotFound { .. }))
    }

    /// Whether this error indicates missing data rather than a provider failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.is_member_not_found() || matches!(self, Self::PanelNotFound(_))
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
