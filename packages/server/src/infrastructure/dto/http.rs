//! HTTP API response DTOs for the classroom session.

use serde::Serialize;

use super::websocket::{ChatMessageDto, ParticipantDto, PollDto};

/// Health check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub connections: usize,
}

/// Read-only view of the whole session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotDto {
    pub participants: Vec<ParticipantDto>,
    pub current_poll: Option<PollDto>,
    pub poll_history: Vec<PollDto>,
    pub chat_history: Vec<ChatMessageDto>,
}
