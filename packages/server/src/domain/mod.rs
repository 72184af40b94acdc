//! Domain layer for the classroom session.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{ChatMessage, MessageKind, Participant, Poll, Student, Teacher};
pub use error::{JoinError, ResponseError, ValueObjectError};
pub use event::{ClassroomEvent, EventPublisher};
#[cfg(test)]
pub use event::MockEventPublisher;
pub use factory::{ConnectionIdFactory, MessageIdFactory, PollIdFactory};
pub use repository::{SessionGuard, SessionRepository};
pub use session::{CountdownTick, ResponseAccepted, SessionState};
pub use value_object::{
    ConnectionId, ConversationKey, MessageContent, MessageId, PollId, Timestamp, Username,
};
