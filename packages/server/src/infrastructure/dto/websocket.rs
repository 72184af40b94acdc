//! WebSocket message DTOs for the classroom session.
//!
//! Inbound frames are internally tagged (`{"event": "join-student", "username": "alice"}`).
//! Outbound frames are adjacently tagged (`{"event": "poll-updated", "data": {...}}`)
//! because several payloads are arrays.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kyoshitsu_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, ClassroomEvent, MessageKind, Participant, Poll, ValueObjectError,
};

/// Minimum number of options a poll must offer
pub const MIN_POLL_OPTIONS: usize = 2;

/// Poll duration used when a create-poll command omits it
const DEFAULT_POLL_DURATION_SECS: u32 = 60;

fn default_poll_duration() -> u32 {
    DEFAULT_POLL_DURATION_SECS
}

// ----------------------------------------------------------------------------
// Inbound (client -> server)
// ----------------------------------------------------------------------------

/// Message received from a client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinStudent { username: String },
    #[serde(rename_all = "camelCase")]
    JoinTeacher {
        #[serde(default)]
        teacher_name: Option<String>,
    },
    CreatePoll(CreatePollPayload),
    StartPoll,
    StopPoll,
    #[serde(rename_all = "camelCase")]
    SubmitResponse { option_index: usize },
    #[serde(rename_all = "camelCase")]
    RemoveStudent { student_id: String },
    GetStudents,
    #[serde(rename_all = "camelCase")]
    SendMessage {
        message: String,
        #[serde(default, rename = "type")]
        kind: MessageKind,
        #[serde(default)]
        recipient_id: Option<String>,
    },
    GetChatHistory,
    #[serde(rename_all = "camelCase")]
    GetPrivateConversation { participant_id: String },
}

/// Body of a create-poll command
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollPayload {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_poll_duration")]
    pub duration: u32,
    #[serde(default)]
    pub correct_answers: Vec<usize>,
}

impl CreatePollPayload {
    /// Check the command before it reaches the poll engine.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: empty question, fewer than two
    /// options, an empty option, a zero duration, or a correct answer that
    /// does not point at an option.
    pub fn validate(&self) -> Result<(), ValueObjectError> {
        if self.question.trim().is_empty() {
            return Err(ValueObjectError::PollQuestionEmpty);
        }
        if self.options.len() < MIN_POLL_OPTIONS {
            return Err(ValueObjectError::PollOptionsTooFew {
                min: MIN_POLL_OPTIONS,
                actual: self.options.len(),
            });
        }
        if let Some(index) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(ValueObjectError::PollOptionEmpty { index });
        }
        if self.duration == 0 {
            return Err(ValueObjectError::PollDurationZero);
        }
        if let Some(&index) = self
            .correct_answers
            .iter()
            .find(|&&index| index >= self.options.len())
        {
            return Err(ValueObjectError::CorrectAnswerOutOfRange {
                index,
                options: self.options.len(),
            });
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Outbound (server -> client)
// ----------------------------------------------------------------------------

/// Message sent to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: String },
    JoinSuccess(JoinSuccessDto),
    JoinError(ErrorDto),
    KickedOut(ErrorDto),
    CurrentPoll(Option<PollDto>),
    PollCreated(PollDto),
    PollStarted(PollDto),
    PollStopped(PollDto),
    PollUpdated(PollDto),
    #[serde(rename_all = "camelCase")]
    PollTimerUpdate { time_remaining: u32 },
    PollHistoryUpdated(Vec<PollDto>),
    StudentsUpdated(Vec<ParticipantDto>),
    #[serde(rename_all = "camelCase")]
    ResponseSuccess { poll: PollDto, is_correct: bool },
    ResponseError(ErrorDto),
    NewMessage(ChatMessageDto),
    PrivateMessage(ChatMessageDto),
    ChatHistory(Vec<ChatMessageDto>),
    #[serde(rename_all = "camelCase")]
    PrivateConversation {
        participant_id: String,
        messages: Vec<ChatMessageDto>,
    },
}

/// Human-readable rejection
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub message: String,
}

/// Payload of join-success
#[derive(Debug, Clone, Serialize)]
pub struct JoinSuccessDto {
    pub participant: ParticipantDto,
}

/// Participant kind on the wire
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Student,
    Teacher,
}

/// Participant as seen by clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub username: String,
    pub kind: ParticipantKind,
    pub is_teacher: bool,
    pub is_online: bool,
    pub joined_at: String, // RFC 3339
    /// Present for students only
    #[serde(flatten)]
    pub response: Option<StudentResponseDto>,
}

/// Response state of a student
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponseDto {
    pub has_responded: bool,
    pub selected_option: Option<usize>,
    pub answered_correctly: Option<bool>,
}

/// Poll as seen by clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDto {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answers: Vec<usize>,
    pub duration: u32,
    pub is_active: bool,
    /// Option index -> count (JSON object keys are the indices as strings)
    pub responses: BTreeMap<usize, u32>,
    pub total_responses: u32,
    pub time_remaining: u32,
    pub created_at: String, // RFC 3339
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

/// Chat message as seen by clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub timestamp: String, // RFC 3339
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        match participant {
            Participant::Student(student) => Self {
                id: student.id.as_str().to_string(),
                username: student.username.as_str().to_string(),
                kind: ParticipantKind::Student,
                is_teacher: false,
                is_online: student.is_online,
                joined_at: timestamp_to_rfc3339(student.joined_at.value()),
                response: Some(StudentResponseDto {
                    has_responded: student.has_responded,
                    selected_option: student.selected_option,
                    answered_correctly: student.answered_correctly,
                }),
            },
            Participant::Teacher(teacher) => Self {
                id: teacher.id.as_str().to_string(),
                username: teacher.username.as_str().to_string(),
                kind: ParticipantKind::Teacher,
                is_teacher: true,
                is_online: teacher.is_online,
                joined_at: timestamp_to_rfc3339(teacher.joined_at.value()),
                response: None,
            },
        }
    }
}

impl From<&Poll> for PollDto {
    fn from(poll: &Poll) -> Self {
        Self {
            id: poll.id.as_str().to_string(),
            question: poll.question.clone(),
            options: poll.options.clone(),
            correct_answers: poll.correct_answers.iter().copied().collect(),
            duration: poll.duration,
            is_active: poll.is_active,
            responses: poll.responses.clone(),
            total_responses: poll.total_responses,
            time_remaining: poll.time_remaining,
            created_at: timestamp_to_rfc3339(poll.created_at.value()),
            started_at: poll.started_at.map(|t| timestamp_to_rfc3339(t.value())),
            ended_at: poll.ended_at.map(|t| timestamp_to_rfc3339(t.value())),
        }
    }
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            sender_id: message.sender_id.as_str().to_string(),
            sender_name: message.sender_name.as_str().to_string(),
            message: message.content.as_str().to_string(),
            kind: message.kind,
            recipient_id: message
                .recipient_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            timestamp: timestamp_to_rfc3339(message.timestamp.value()),
        }
    }
}

pub fn participant_list(participants: &[Participant]) -> Vec<ParticipantDto> {
    participants.iter().map(ParticipantDto::from).collect()
}

pub fn poll_list(polls: &[Poll]) -> Vec<PollDto> {
    polls.iter().map(PollDto::from).collect()
}

fn message_list(messages: &[ChatMessage]) -> Vec<ChatMessageDto> {
    messages.iter().map(ChatMessageDto::from).collect()
}

fn error(message: &str) -> ErrorDto {
    ErrorDto {
        message: message.to_string(),
    }
}

impl From<&ClassroomEvent> for ServerMessage {
    fn from(event: &ClassroomEvent) -> Self {
        match event {
            ClassroomEvent::Connected { connection_id } => ServerMessage::Connected {
                connection_id: connection_id.as_str().to_string(),
            },
            ClassroomEvent::JoinSuccess(participant) => {
                ServerMessage::JoinSuccess(JoinSuccessDto {
                    participant: participant.into(),
                })
            }
            ClassroomEvent::JoinError { message } => ServerMessage::JoinError(error(message)),
            ClassroomEvent::KickedOut { message } => ServerMessage::KickedOut(error(message)),
            ClassroomEvent::CurrentPoll(poll) => {
                ServerMessage::CurrentPoll(poll.as_ref().map(PollDto::from))
            }
            ClassroomEvent::PollCreated(poll) => ServerMessage::PollCreated(poll.into()),
            ClassroomEvent::PollStarted(poll) => ServerMessage::PollStarted(poll.into()),
            ClassroomEvent::PollStopped(poll) => ServerMessage::PollStopped(poll.into()),
            ClassroomEvent::PollUpdated(poll) => ServerMessage::PollUpdated(poll.into()),
            ClassroomEvent::PollTimerUpdate { time_remaining } => ServerMessage::PollTimerUpdate {
                time_remaining: *time_remaining,
            },
            ClassroomEvent::PollHistoryUpdated(history) => {
                ServerMessage::PollHistoryUpdated(poll_list(history))
            }
            ClassroomEvent::StudentsUpdated(participants) => {
                ServerMessage::StudentsUpdated(participant_list(participants))
            }
            ClassroomEvent::ResponseSuccess { poll, is_correct } => {
                ServerMessage::ResponseSuccess {
                    poll: poll.into(),
                    is_correct: *is_correct,
                }
            }
            ClassroomEvent::ResponseError { message } => {
                ServerMessage::ResponseError(error(message))
            }
            ClassroomEvent::NewMessage(message) => ServerMessage::NewMessage(message.into()),
            ClassroomEvent::PrivateMessage(message) => {
                ServerMessage::PrivateMessage(message.into())
            }
            ClassroomEvent::ChatHistory(messages) => {
                ServerMessage::ChatHistory(message_list(messages))
            }
            ClassroomEvent::PrivateConversation {
                participant_id,
                messages,
            } => ServerMessage::PrivateConversation {
                participant_id: participant_id.as_str().to_string(),
                messages: message_list(messages),
            },
        }
    }
}
