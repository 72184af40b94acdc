//! Outbound events and the publisher seam.
//!
//! UseCases describe what happened as [`ClassroomEvent`]s and hand them to an
//! [`EventPublisher`], either for one connection or for every connection.
//! Publishing never fails from the caller's point of view: delivery is best
//! effort and undeliverable events are dropped by the publisher.

use async_trait::async_trait;

use super::{ChatMessage, ConnectionId, Participant, Poll};

/// State change or reply sent from the server to clients
#[derive(Debug, Clone)]
pub enum ClassroomEvent {
    /// First event on every connection
    Connected { connection_id: ConnectionId },
    JoinSuccess(Participant),
    JoinError { message: String },
    KickedOut { message: String },
    CurrentPoll(Option<Poll>),
    PollCreated(Poll),
    PollStarted(Poll),
    PollStopped(Poll),
    PollUpdated(Poll),
    PollTimerUpdate { time_remaining: u32 },
    PollHistoryUpdated(Vec<Poll>),
    StudentsUpdated(Vec<Participant>),
    ResponseSuccess { poll: Poll, is_correct: bool },
    ResponseError { message: String },
    NewMessage(ChatMessage),
    PrivateMessage(ChatMessage),
    ChatHistory(Vec<ChatMessage>),
    PrivateConversation {
        participant_id: ConnectionId,
        messages: Vec<ChatMessage>,
    },
}

impl ClassroomEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ClassroomEvent::Connected { .. } => "connected",
            ClassroomEvent::JoinSuccess(_) => "join-success",
            ClassroomEvent::JoinError { .. } => "join-error",
            ClassroomEvent::KickedOut { .. } => "kicked-out",
            ClassroomEvent::CurrentPoll(_) => "current-poll",
            ClassroomEvent::PollCreated(_) => "poll-created",
            ClassroomEvent::PollStarted(_) => "poll-started",
            ClassroomEvent::PollStopped(_) => "poll-stopped",
            ClassroomEvent::PollUpdated(_) => "poll-updated",
            ClassroomEvent::PollTimerUpdate { .. } => "poll-timer-update",
            ClassroomEvent::PollHistoryUpdated(_) => "poll-history-updated",
            ClassroomEvent::StudentsUpdated(_) => "students-updated",
            ClassroomEvent::ResponseSuccess { .. } => "response-success",
            ClassroomEvent::ResponseError { .. } => "response-error",
            ClassroomEvent::NewMessage(_) => "new-message",
            ClassroomEvent::PrivateMessage(_) => "private-message",
            ClassroomEvent::ChatHistory(_) => "chat-history",
            ClassroomEvent::PrivateConversation { .. } => "private-conversation",
        }
    }
}

/// Delivers outbound events to connected clients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Send to a single connection; a no-op if it is not connected
    async fn send_to(&self, connection_id: ConnectionId, event: ClassroomEvent);

    /// Send to every connection
    async fn broadcast(&self, event: ClassroomEvent);
}
