//! HTTP API endpoint handlers.
//!
//! Read-only views of the session; nothing here mutates state.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{
        http::{HealthDto, SessionSnapshotDto},
        websocket::{ChatMessageDto, ParticipantDto, PollDto, participant_list, poll_list},
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok",
        connections: state.hub.connection_count().await,
    })
}

/// Whole session: participants, current poll, history and chat log
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshotDto> {
    let session = state.repository.snapshot().await;

    Json(SessionSnapshotDto {
        participants: participant_list(session.participants()),
        current_poll: session.current_poll().map(PollDto::from),
        poll_history: poll_list(&session.poll_history()),
        chat_history: session
            .chat_log()
            .iter()
            .map(ChatMessageDto::from)
            .collect(),
    })
}

pub async fn get_current_poll(State(state): State<Arc<AppState>>) -> Json<Option<PollDto>> {
    let session = state.repository.snapshot().await;
    Json(session.current_poll().map(PollDto::from))
}

/// Ended polls, newest first
pub async fn get_poll_history(State(state): State<Arc<AppState>>) -> Json<Vec<PollDto>> {
    let session = state.repository.snapshot().await;
    Json(poll_list(&session.poll_history()))
}

pub async fn get_participants(State(state): State<Arc<AppState>>) -> Json<Vec<ParticipantDto>> {
    let participants = state.registry.list_participants().await;
    Json(participant_list(&participants))
}
