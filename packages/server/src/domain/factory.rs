//! Domain factories for creating identifiers.

use super::{ConnectionId, MessageId, PollId};

/// Factory for generating ConnectionId instances for new transport connections.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a new ConnectionId with a random UUID v4.
    pub fn generate() -> ConnectionId {
        ConnectionId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating PollId instances.
///
/// Keeps id generation out of the PollId value object itself.
pub struct PollIdFactory;

impl PollIdFactory {
    /// Generate a new PollId with a random UUID v4.
    pub fn generate() -> PollId {
        PollId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating MessageId instances.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a new MessageId with a random UUID v4.
    pub fn generate() -> MessageId {
        MessageId::from_uuid(uuid::Uuid::new_v4())
    }
}
