//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::{EventPublisher, SessionRepository},
    infrastructure::{BroadcastHub, repository::InMemorySessionRepository},
    usecase::{
        ChatHistoryUseCase, ParticipantRegistryUseCase, PollLifecycleUseCase, SendMessageUseCase,
        SubmitResponseUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn SessionRepository>,
    /// Connected WebSocket clients (also the event publisher of every use case)
    pub hub: Arc<BroadcastHub>,
    pub registry: ParticipantRegistryUseCase,
    /// Owns the countdown task, so it must be shared by every connection
    pub poll_lifecycle: PollLifecycleUseCase,
    pub submit_response: SubmitResponseUseCase,
    pub send_message: SendMessageUseCase,
    pub chat_history: ChatHistoryUseCase,
}

impl AppState {
    /// Wire the use cases to `repository` and `hub`
    pub fn new(repository: Arc<dyn SessionRepository>, hub: Arc<BroadcastHub>) -> Self {
        let publisher: Arc<dyn EventPublisher> = hub.clone();
        Self {
            registry: ParticipantRegistryUseCase::new(repository.clone(), publisher.clone()),
            poll_lifecycle: PollLifecycleUseCase::new(repository.clone(), publisher.clone()),
            submit_response: SubmitResponseUseCase::new(repository.clone(), publisher.clone()),
            send_message: SendMessageUseCase::new(repository.clone(), publisher.clone()),
            chat_history: ChatHistoryUseCase::new(repository.clone(), publisher),
            repository,
            hub,
        }
    }

    /// Empty in-memory session with no connections
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemorySessionRepository::default()),
            Arc::new(BroadcastHub::new()),
        )
    }
}
