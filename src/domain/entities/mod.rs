//! Domain entity definitions.

mod channel;
mod guild;
mod message;
mod settings;
mod token;
mod user;

pub use channel::{Channel, ChannelId, ChannelKind};
pub use guild::{Guild, GuildId};
pub use message::{Attachment, Embed, EmbedMedia, Message, MessageId};
pub use settings::{ChannelSettings, ServerSettings, Settings};
pub use token::AuthToken;
pub use user::{User, UserId};
