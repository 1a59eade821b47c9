//! Identifier Types
//!
//! Discord entities are addressed by 64-bit snowflakes. Tickets, panels and
//! support teams use the integer keys assigned by the tickets database.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Raw identifier value.
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Guild (server) snowflake.
    GuildId(u64)
);
id_type!(
    /// User snowflake.
    UserId(u64)
);
id_type!(
    /// Role snowflake.
    RoleId(u64)
);
id_type!(
    /// Channel snowflake. Ticket threads are channels too.
    ChannelId(u64)
);
id_type!(
    /// Ticket number, unique within a guild.
    TicketId(i32)
);
id_type!(
    /// Panel primary key.
    PanelId(i32)
);
id_type!(
    /// Support team primary key.
    TeamId(i32)
);
